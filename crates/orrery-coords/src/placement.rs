//! Distance-based placement of bodies into native coordinates.
//!
//! Bodies closer than the near threshold are placed directly at their offset
//! from the observer's reference. Anything farther away is moved in to a
//! fixed native distance along its true direction and scaled down so that its
//! on-screen size matches what it would be at its real distance.

use glam::{DQuat, DVec3, Vec3};
use orrery_math::{DoubleMatrix4x4, DoubleVector3, deg_to_rad};

use crate::frame::FloatingOriginFrame;

/// Thresholds for the direct/rescaled decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementSettings {
    /// Below this distance the body is placed directly.
    pub near_threshold: f64,
    /// Native distance from the observer at which rescaled bodies are placed.
    pub fixed_native_distance: f64,
    /// Extra multiplier on the rescaled visual width.
    pub rescale_factor: f64,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            near_threshold: 150_000.0,
            fixed_native_distance: 148_500.0,
            rescale_factor: 1.0,
        }
    }
}

/// Pinhole camera parameters used for apparent-size matching.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraOptics {
    /// Horizontal field of view in radians.
    pub fov_radians: f64,
    pub image_width_px: f64,
}

impl CameraOptics {
    pub fn from_degrees(fov_degrees: f64, image_width_px: f64) -> Self {
        Self {
            fov_radians: deg_to_rad(fov_degrees),
            image_width_px,
        }
    }
}

impl Default for CameraOptics {
    fn default() -> Self {
        Self::from_degrees(60.0, 1920.0)
    }
}

/// Pinhole relation: on-screen width in pixels of an object `true_width`
/// across at `distance`.
///
/// `width_px = true_width × image_px / (2·distance·tan(fov/2))`
pub fn compute_apparent_width(
    distance: f64,
    fov_radians: f64,
    image_width_px: f64,
    true_width: f64,
) -> f64 {
    true_width * image_width_px / (2.0 * distance * (fov_radians * 0.5).tan())
}

/// Inverse of [`compute_apparent_width`]: the world width that covers
/// `width_px` pixels at `distance`.
pub fn world_width_for_pixels(width_px: f64, distance: f64, optics: &CameraOptics) -> f64 {
    width_px * 2.0 * distance * (optics.fov_radians * 0.5).tan() / optics.image_width_px
}

/// How a body ended up in native space this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementMode {
    Direct,
    Rescaled,
}

/// Native transform values to apply to the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementResult {
    pub native_position: Vec3,
    /// Uniform scale for all three axes.
    pub scale: f64,
    pub mode: PlacementMode,
    /// True double-precision distance from the observer.
    pub distance: f64,
}

/// Everything placement needs to know about the observer this frame.
#[derive(Clone, Copy, Debug)]
pub struct ObserverView<'a> {
    pub frame: &'a FloatingOriginFrame,
    pub native_position: Vec3,
    pub rotation: DQuat,
}

/// Per-body placement cache.
#[derive(Clone, Debug, PartialEq)]
pub struct DistancePlacementState {
    bounding_width: Option<f64>,
    visual_scale: f64,
    last_distance: f64,
    mode: Option<PlacementMode>,
}

impl DistancePlacementState {
    pub fn new() -> Self {
        Self {
            bounding_width: None,
            visual_scale: 1.0,
            last_distance: 0.0,
            mode: None,
        }
    }

    /// Unscaled width of the body, measured on first access only. Later
    /// calls return the cached value and never run `measure`.
    pub fn bounding_width(&mut self, measure: impl FnOnce() -> f64) -> f64 {
        *self.bounding_width.get_or_insert_with(measure)
    }

    pub fn cached_bounding_width(&self) -> Option<f64> {
        self.bounding_width
    }

    pub fn visual_scale(&self) -> f64 {
        self.visual_scale
    }

    pub fn last_distance(&self) -> f64 {
        self.last_distance
    }

    pub fn mode(&self) -> Option<PlacementMode> {
        self.mode
    }

    /// Decide where the body at `target` goes in native space.
    ///
    /// `measure` is consulted at most once per state lifetime to obtain the
    /// body's unscaled width.
    pub fn place(
        &mut self,
        observer: &ObserverView<'_>,
        target: DoubleVector3,
        optics: &CameraOptics,
        settings: &PlacementSettings,
        measure: impl FnOnce() -> f64,
    ) -> PlacementResult {
        let universe = observer.frame.universe_position();
        let distance = (universe - target).magnitude();
        self.last_distance = distance;

        let result = if distance < settings.near_threshold {
            self.visual_scale = 1.0;
            PlacementResult {
                native_position: (target - observer.frame.reference()).to_native(),
                scale: 1.0,
                mode: PlacementMode::Direct,
                distance,
            }
        } else {
            let unscaled_width = self.bounding_width(measure);
            let direction = observer_direction(universe, observer.rotation, target);
            let offset = (direction * settings.fixed_native_distance).to_native();

            // Same pixel width at the fixed distance as at the true distance.
            let apparent_px = compute_apparent_width(
                distance,
                optics.fov_radians,
                optics.image_width_px,
                unscaled_width,
            );
            let target_width = world_width_for_pixels(apparent_px, settings.fixed_native_distance, optics)
                * settings.rescale_factor;
            let scale = if unscaled_width > 0.0 && target_width.is_finite() {
                target_width / unscaled_width
            } else {
                1.0
            };
            self.visual_scale = scale;
            PlacementResult {
                native_position: observer.native_position + offset,
                scale,
                mode: PlacementMode::Rescaled,
                distance,
            }
        };

        if self.mode != Some(result.mode) {
            tracing::debug!(
                mode = ?result.mode,
                distance,
                scale = result.scale,
                "placement mode changed"
            );
            self.mode = Some(result.mode);
        }
        result
    }
}

impl Default for DistancePlacementState {
    fn default() -> Self {
        Self::new()
    }
}

/// Unit direction to `target`, computed in the observer's local space and
/// rotated back into world orientation.
fn observer_direction(universe: DoubleVector3, rotation: DQuat, target: DoubleVector3) -> DoubleVector3 {
    let to_local = DoubleMatrix4x4::trs(universe, rotation, DoubleVector3::ONE).inverse();
    let local_direction = to_local.multiply_point3x4(target).normalized();
    DoubleVector3::from(rotation * DVec3::from(local_direction))
}
