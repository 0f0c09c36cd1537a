//! Floating-origin coordinates and distance-based placement for Orrery.
//!
//! The engine works in f32 native coordinates. A [`FloatingOriginFrame`]
//! keeps the observer's native position small by folding displacement into a
//! double-precision reference, and [`DistancePlacementState`] decides how a
//! body far from the observer is mapped into that native space.

mod detail;
mod frame;
mod native;
mod placement;

pub use detail::{DetailBands, DetailLevel};
pub use frame::{DEFAULT_REBASE_THRESHOLD, FloatingOriginFrame};
pub use native::{NativeRoot, NativeTransform};
pub use placement::{
    CameraOptics, DistancePlacementState, ObserverView, PlacementMode, PlacementResult,
    PlacementSettings, compute_apparent_width, world_width_for_pixels,
};
