//! Observer reference frame with origin rebasing.
//!
//! The observer's true position is split into a double-precision `reference`
//! and a `local` offset that mirrors its f32 native position. Once the local
//! offset grows past the rebase threshold it is folded into the reference and
//! the native position is snapped back to the origin.

use glam::Vec3;
use orrery_math::DoubleVector3;

use crate::native::NativeRoot;

/// Local displacement (native units) that triggers a rebase.
pub const DEFAULT_REBASE_THRESHOLD: f64 = 5000.0;

/// Reference/local split for one observer.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatingOriginFrame {
    reference: DoubleVector3,
    local: DoubleVector3,
    rebase_threshold: f64,
    rebase_count: u64,
}

impl FloatingOriginFrame {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_REBASE_THRESHOLD)
    }

    pub fn with_threshold(rebase_threshold: f64) -> Self {
        Self {
            reference: DoubleVector3::ZERO,
            local: DoubleVector3::ZERO,
            rebase_threshold,
            rebase_count: 0,
        }
    }

    /// Teleport the observer: the reference becomes `position`, the local
    /// offset is cleared and the root's native position is zeroed.
    pub fn set_world_position(&mut self, position: DoubleVector3, root: &mut impl NativeRoot) {
        self.reference = position;
        self.local = DoubleVector3::ZERO;
        root.set_native_position(Vec3::ZERO);
        tracing::debug!(%position, "observer placed");
    }

    /// Per-tick update. Must run before anything else reads the observer's
    /// native position this tick.
    ///
    /// Reads the root's native position into the local offset. If the offset
    /// magnitude exceeds the threshold, it is folded into the reference and
    /// both the local offset and the native position are zeroed. Returns the
    /// folded offset when a rebase happened, so native positions of other
    /// bodies can be shifted by the same amount.
    pub fn update(&mut self, root: &mut impl NativeRoot) -> Option<DoubleVector3> {
        self.local = DoubleVector3::from(root.native_position());
        if self.local.magnitude() <= self.rebase_threshold {
            return None;
        }

        let shift = self.local;
        self.reference += shift;
        self.local = DoubleVector3::ZERO;
        root.set_native_position(Vec3::ZERO);
        self.rebase_count += 1;
        tracing::debug!(
            %shift,
            reference = %self.reference,
            rebases = self.rebase_count,
            "floating origin rebased"
        );
        Some(shift)
    }

    /// True observer position, `reference + local`. Recomputed on every call.
    pub fn universe_position(&self) -> DoubleVector3 {
        self.reference + self.local
    }

    pub fn reference(&self) -> DoubleVector3 {
        self.reference
    }

    pub fn local(&self) -> DoubleVector3 {
        self.local
    }

    pub fn rebase_threshold(&self) -> f64 {
        self.rebase_threshold
    }

    pub fn set_rebase_threshold(&mut self, threshold: f64) {
        self.rebase_threshold = threshold;
    }

    /// Number of rebases since construction.
    pub fn rebase_count(&self) -> u64 {
        self.rebase_count
    }
}

impl Default for FloatingOriginFrame {
    fn default() -> Self {
        Self::new()
    }
}
