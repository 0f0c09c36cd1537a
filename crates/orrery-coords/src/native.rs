use glam::{DQuat, Quat, Vec3};

/// The engine-side root of a body: whatever owns its f32 transform.
///
/// Frames and placement write through this seam instead of touching an
/// engine transform directly.
pub trait NativeRoot {
    fn native_position(&self) -> Vec3;
    fn set_native_position(&mut self, position: Vec3);
}

/// Minimal engine-native transform: f32 position, rotation and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NativeTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl NativeTransform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Rotation widened to f64 for double-precision transform math.
    pub fn rotation_f64(&self) -> DQuat {
        let q = self.rotation;
        DQuat::from_xyzw(q.x as f64, q.y as f64, q.z as f64, q.w as f64)
    }

    /// Apply the same factor on all three axes.
    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vec3::splat(scale);
    }
}

impl Default for NativeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl NativeRoot for NativeTransform {
    fn native_position(&self) -> Vec3 {
        self.position
    }

    fn set_native_position(&mut self, position: Vec3) {
        self.position = position;
    }
}
