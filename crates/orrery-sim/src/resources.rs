//! ECS resources.

use bevy_ecs::prelude::*;
use orrery_coords::{CameraOptics, DetailBands, PlacementSettings};
use orrery_math::DoubleVector3;

/// Tick timing.
#[derive(Resource, Debug, Clone)]
pub struct SimTime {
    /// Wall-clock seconds in the current tick.
    pub delta: f64,
    /// Simulated seconds per wall-clock second.
    pub time_scale: f64,
    /// Simulated seconds since start.
    pub elapsed: f64,
    /// Ticks run so far.
    pub tick: u64,
}

impl SimTime {
    /// Simulated seconds covered by the current tick.
    pub fn scaled_delta(&self) -> f64 {
        self.delta * self.time_scale
    }
}

impl Default for SimTime {
    fn default() -> Self {
        Self {
            delta: 0.0,
            time_scale: 1.0,
            elapsed: 0.0,
            tick: 0,
        }
    }
}

/// Shared placement inputs.
#[derive(Resource, Debug, Clone, Default)]
pub struct ViewSettings {
    pub placement: PlacementSettings,
    pub optics: CameraOptics,
    pub detail: DetailBands,
}

/// Floating-origin activity, for reporting.
#[derive(Resource, Debug, Clone, Default)]
pub struct OriginShift {
    /// Offset folded into the reference on the most recent rebase.
    pub last_shift: Option<DoubleVector3>,
    /// Tick on which the most recent rebase happened.
    pub last_tick: Option<u64>,
    pub total_rebases: u64,
}
