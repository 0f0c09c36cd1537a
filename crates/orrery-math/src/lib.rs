//! Double-precision vector and affine-transform primitives for Orrery.
//!
//! Everything here is a pure value type. The engine's own coordinates are
//! f32 (`glam::Vec3`); these types carry positions that would lose accuracy in
//! f32 and convert down only after subtracting a nearby reference.

mod constants;
mod conversion;
mod matrix;
mod vector;

pub use constants::{
    APPROX_EQ_EPSILON_SQR, DEG2RAD, MAX_SAFE_NATIVE_DELTA, PI, PI_2, RAD2DEG, VECTOR_EPSILON,
    deg_to_rad, rad_to_deg,
};
pub use conversion::{to_double, to_native, to_native_batch, to_native_checked};
pub use matrix::{DoubleMatrix4x4, rotation_from_euler_degrees};
pub use vector::{DoubleVector3, DoubleVector4};

// Re-exported so downstream crates name the same glam types.
pub use glam::{DQuat, Vec3};
