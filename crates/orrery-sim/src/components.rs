//! ECS components.

use bevy_ecs::prelude::*;
use glam::Vec3;
use orrery_coords::{
    DetailLevel, DistancePlacementState, FloatingOriginFrame, NativeTransform, PlacementResult,
};
use orrery_math::DoubleVector3;
use orrery_orbit::OrbitState;

/// Marker for the entity whose frame everything is placed against.
#[derive(Component, Debug, Default)]
pub struct Observer;

/// The observer's floating-origin frame.
#[derive(Component, Debug, Default)]
pub struct ObserverFrame(pub FloatingOriginFrame);

/// Observer movement in native units per wall-clock second.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct ObserverVelocity(pub Vec3);

/// Engine-native f32 transform of an entity.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Native(pub NativeTransform);

/// True double-precision position in universe space.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct UniversePos(pub DoubleVector3);

/// Human-readable label used in reports.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct BodyName(pub String);

/// A body on a Kepler orbit.
#[derive(Component, Debug, Clone)]
pub struct OrbitBody {
    pub orbit: OrbitState,
    /// Per-body multiplier on simulated time.
    pub time_scale: f64,
    /// Set while the orbit is invalid: [`UniversePos`] still holds the last
    /// valid position.
    pub stale: bool,
}

impl OrbitBody {
    pub fn new(orbit: OrbitState) -> Self {
        Self {
            orbit,
            time_scale: 1.0,
            stale: false,
        }
    }
}

/// The orbit's attractor follows this entity's [`UniversePos`].
///
/// The attractor position is read before this tick's view propagation, so a
/// satellite trails its parent by one tick.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachedTo(pub Entity);

/// Distance placement state plus the body's unscaled width.
#[derive(Component, Debug, Clone)]
pub struct Placed {
    pub state: DistancePlacementState,
    pub true_width: f64,
    pub last: Option<PlacementResult>,
}

impl Placed {
    pub fn new(true_width: f64) -> Self {
        Self {
            state: DistancePlacementState::new(),
            true_width,
            last: None,
        }
    }
}

/// Auxiliary detail switched by distance.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Detail(pub DetailLevel);
