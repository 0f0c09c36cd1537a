use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::{APPROX_EQ_EPSILON_SQR, VECTOR_EPSILON};

/// 3D vector in double precision.
///
/// Used wherever an f32 engine coordinate would lose accuracy: universe
/// positions, orbit state, reference frame offsets. Serializes as `(x, y, z)`.
///
/// `PartialEq` is exact component equality. Interactive code should compare
/// with [`approx_eq`](Self::approx_eq) instead, which is deliberately loose.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct DoubleVector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl DoubleVector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    pub const RIGHT: Self = Self::new(1.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    pub const FORWARD: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Zero vector (0, 0, 0).
    pub fn zero() -> Self {
        Self::ZERO
    }

    /// Component-wise product.
    pub fn scale(self, rhs: DoubleVector3) -> DoubleVector3 {
        DoubleVector3::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    /// Per-axis minimum.
    pub fn component_min(self, rhs: DoubleVector3) -> DoubleVector3 {
        DoubleVector3::new(self.x.min(rhs.x), self.y.min(rhs.y), self.z.min(rhs.z))
    }

    /// Per-axis maximum.
    pub fn component_max(self, rhs: DoubleVector3) -> DoubleVector3 {
        DoubleVector3::new(self.x.max(rhs.x), self.y.max(rhs.y), self.z.max(rhs.z))
    }

    pub fn dot(self, rhs: DoubleVector3) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Right-handed cross product `self × rhs`.
    pub fn cross(self, rhs: DoubleVector3) -> DoubleVector3 {
        DoubleVector3::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    pub fn magnitude(self) -> f64 {
        self.sqr_magnitude().sqrt()
    }

    /// x² + y² + z². Prefer this for comparisons; it skips the square root.
    pub fn sqr_magnitude(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn distance(self, rhs: DoubleVector3) -> f64 {
        (self - rhs).magnitude()
    }

    /// Unit vector in the same direction.
    ///
    /// Returns the zero vector when the magnitude is at or below
    /// [`VECTOR_EPSILON`] instead of producing NaN or infinities.
    pub fn normalized(self) -> DoubleVector3 {
        let magnitude = self.magnitude();
        if magnitude > VECTOR_EPSILON {
            self / magnitude
        } else {
            DoubleVector3::ZERO
        }
    }

    /// In-place variant of [`normalized`](Self::normalized).
    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    /// Linear interpolation with `t` clamped to `[0, 1]`.
    pub fn lerp(self, to: DoubleVector3, t: f64) -> DoubleVector3 {
        self.lerp_unclamped(to, t.clamp(0.0, 1.0))
    }

    pub fn lerp_unclamped(self, to: DoubleVector3, t: f64) -> DoubleVector3 {
        DoubleVector3::new(
            self.x + (to.x - self.x) * t,
            self.y + (to.y - self.y) * t,
            self.z + (to.z - self.z) * t,
        )
    }

    /// Step towards `target` by at most `max_distance_delta`, landing exactly
    /// on `target` when it is within reach.
    pub fn move_towards(self, target: DoubleVector3, max_distance_delta: f64) -> DoubleVector3 {
        let delta = target - self;
        let magnitude = delta.magnitude();
        if magnitude <= max_distance_delta || magnitude == 0.0 {
            return target;
        }
        self + delta / magnitude * max_distance_delta
    }

    /// Reflect off the plane defined by `normal` (expected to be unit length).
    pub fn reflect(self, normal: DoubleVector3) -> DoubleVector3 {
        normal * (-2.0 * normal.dot(self)) + self
    }

    /// Projection onto `on_normal`. A degenerate normal projects to zero.
    pub fn project(self, on_normal: DoubleVector3) -> DoubleVector3 {
        let denominator = on_normal.dot(on_normal);
        if denominator < VECTOR_EPSILON {
            return DoubleVector3::ZERO;
        }
        on_normal * (self.dot(on_normal) / denominator)
    }

    /// Removes the component along `normal`, leaving the part of `self` that
    /// lies in the plane perpendicular to it.
    pub fn exclude(self, normal: DoubleVector3) -> DoubleVector3 {
        self - self.project(normal)
    }

    /// Unsigned angle in radians between two vectors.
    ///
    /// The cosine is clamped to `[-1, 1]` before `acos`, so rounding in the
    /// dot product of two nearly parallel unit vectors never yields NaN.
    pub fn angle(self, to: DoubleVector3) -> f64 {
        self.normalized()
            .dot(to.normalized())
            .clamp(-1.0, 1.0)
            .acos()
    }

    /// Shortens the vector to `max_length` if it is longer.
    pub fn clamp_magnitude(self, max_length: f64) -> DoubleVector3 {
        if self.sqr_magnitude() > max_length * max_length {
            self.normalized() * max_length
        } else {
            self
        }
    }

    /// Interactive equality: true when the squared distance is below
    /// [`APPROX_EQ_EPSILON_SQR`].
    ///
    /// This is not transitive: `a ≈ b` and `b ≈ c` do not imply `a ≈ c`, and
    /// for very large magnitudes two distinct f64 positions can compare
    /// unequal even though they round to the same f32 position. Use it for
    /// "has this moved" checks, not for keys or sorting.
    pub fn approx_eq(self, other: DoubleVector3) -> bool {
        (self - other).sqr_magnitude() < APPROX_EQ_EPSILON_SQR
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Cast to the engine's native single-precision vector.
    pub fn to_native(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

impl fmt::Display for DoubleVector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DoubleVector3({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<DVec3> for DoubleVector3 {
    fn from(v: DVec3) -> Self {
        DoubleVector3::new(v.x, v.y, v.z)
    }
}

impl From<DoubleVector3> for DVec3 {
    fn from(v: DoubleVector3) -> Self {
        DVec3::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for DoubleVector3 {
    fn from(v: Vec3) -> Self {
        DoubleVector3::new(v.x as f64, v.y as f64, v.z as f64)
    }
}

impl Add for DoubleVector3 {
    type Output = DoubleVector3;

    fn add(self, rhs: DoubleVector3) -> Self::Output {
        DoubleVector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for DoubleVector3 {
    type Output = DoubleVector3;

    fn sub(self, rhs: DoubleVector3) -> Self::Output {
        DoubleVector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for DoubleVector3 {
    type Output = DoubleVector3;

    fn neg(self) -> Self::Output {
        DoubleVector3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for DoubleVector3 {
    type Output = DoubleVector3;

    fn mul(self, rhs: f64) -> Self::Output {
        DoubleVector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Mul<DoubleVector3> for f64 {
    type Output = DoubleVector3;

    fn mul(self, rhs: DoubleVector3) -> Self::Output {
        rhs * self
    }
}

impl Div<f64> for DoubleVector3 {
    type Output = DoubleVector3;

    fn div(self, rhs: f64) -> Self::Output {
        DoubleVector3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl AddAssign for DoubleVector3 {
    fn add_assign(&mut self, rhs: DoubleVector3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl SubAssign for DoubleVector3 {
    fn sub_assign(&mut self, rhs: DoubleVector3) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl MulAssign<f64> for DoubleVector3 {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
        self.z *= rhs;
    }
}

impl DivAssign<f64> for DoubleVector3 {
    fn div_assign(&mut self, rhs: f64) {
        self.x /= rhs;
        self.y /= rhs;
        self.z /= rhs;
    }
}

/// 4D vector in double precision, used for homogeneous coordinates and
/// matrix rows/columns. Serializes as `(x, y, z, w)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct DoubleVector4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl DoubleVector4 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Homogeneous point (w = 1).
    pub fn from_point(p: DoubleVector3) -> Self {
        Self::new(p.x, p.y, p.z, 1.0)
    }

    /// Homogeneous direction (w = 0).
    pub fn from_direction(d: DoubleVector3) -> Self {
        Self::new(d.x, d.y, d.z, 0.0)
    }

    pub fn xyz(self) -> DoubleVector3 {
        DoubleVector3::new(self.x, self.y, self.z)
    }

    pub fn dot(self, rhs: DoubleVector4) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z + self.w * rhs.w
    }

    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector, or zero at or below [`VECTOR_EPSILON`].
    pub fn normalized(self) -> DoubleVector4 {
        let magnitude = self.magnitude();
        if magnitude > VECTOR_EPSILON {
            self / magnitude
        } else {
            DoubleVector4::ZERO
        }
    }

    /// Linear interpolation with `t` clamped to `[0, 1]`.
    pub fn lerp(self, to: DoubleVector4, t: f64) -> DoubleVector4 {
        let t = t.clamp(0.0, 1.0);
        self + (to - self) * t
    }

    /// Same loose equality as [`DoubleVector3::approx_eq`].
    pub fn approx_eq(self, other: DoubleVector4) -> bool {
        let d = self - other;
        d.dot(d) < APPROX_EQ_EPSILON_SQR
    }
}

impl fmt::Display for DoubleVector4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DoubleVector4({}, {}, {}, {})",
            self.x, self.y, self.z, self.w
        )
    }
}

impl Add for DoubleVector4 {
    type Output = DoubleVector4;

    fn add(self, rhs: DoubleVector4) -> Self::Output {
        DoubleVector4::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.w + rhs.w,
        )
    }
}

impl Sub for DoubleVector4 {
    type Output = DoubleVector4;

    fn sub(self, rhs: DoubleVector4) -> Self::Output {
        DoubleVector4::new(
            self.x - rhs.x,
            self.y - rhs.y,
            self.z - rhs.z,
            self.w - rhs.w,
        )
    }
}

impl Neg for DoubleVector4 {
    type Output = DoubleVector4;

    fn neg(self) -> Self::Output {
        DoubleVector4::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl Mul<f64> for DoubleVector4 {
    type Output = DoubleVector4;

    fn mul(self, rhs: f64) -> Self::Output {
        DoubleVector4::new(self.x * rhs, self.y * rhs, self.z * rhs, self.w * rhs)
    }
}

impl Div<f64> for DoubleVector4 {
    type Output = DoubleVector4;

    fn div(self, rhs: f64) -> Self::Output {
        DoubleVector4::new(self.x / rhs, self.y / rhs, self.z / rhs, self.w / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_add_sub_neg() {
        let a = DoubleVector3::new(1.0, 2.0, 3.0);
        let b = DoubleVector3::new(10.0, 20.0, 30.0);
        assert_eq!(a + b, DoubleVector3::new(11.0, 22.0, 33.0));
        assert_eq!(b - a, DoubleVector3::new(9.0, 18.0, 27.0));
        assert_eq!(-a, DoubleVector3::new(-1.0, -2.0, -3.0));
    }

    #[test]
    fn test_operators_do_not_mutate_operands() {
        let a = DoubleVector3::new(1.0, 2.0, 3.0);
        let b = DoubleVector3::new(4.0, 5.0, 6.0);
        let _ = a + b;
        let _ = a * 2.0;
        assert_eq!(a, DoubleVector3::new(1.0, 2.0, 3.0));
        assert_eq!(b, DoubleVector3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_scalar_mul_both_sides() {
        let v = DoubleVector3::new(2.0, 3.0, 4.0);
        assert_eq!(v * 10.0, DoubleVector3::new(20.0, 30.0, 40.0));
        assert_eq!(10.0 * v, v * 10.0);
    }

    #[test]
    fn test_component_scale_min_max() {
        let a = DoubleVector3::new(1.0, 5.0, 3.0);
        let b = DoubleVector3::new(4.0, 2.0, 6.0);
        assert_eq!(a.scale(b), DoubleVector3::new(4.0, 10.0, 18.0));
        assert_eq!(a.component_min(b), DoubleVector3::new(1.0, 2.0, 3.0));
        assert_eq!(a.component_max(b), DoubleVector3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_cross_basis_vectors() {
        let x = DoubleVector3::RIGHT;
        let y = DoubleVector3::UP;
        let z = DoubleVector3::FORWARD;
        assert_eq!(x.cross(y), z);
        assert_eq!(y.cross(z), x);
        assert_eq!(z.cross(x), y);
    }

    #[test]
    fn test_dot_general() {
        let a = DoubleVector3::new(1.0, 2.0, 3.0);
        let b = DoubleVector3::new(4.0, 5.0, 6.0);
        assert_eq!(a.dot(b), 32.0);
    }

    #[test]
    fn test_magnitude_3_4_5() {
        let v = DoubleVector3::new(3.0, 4.0, 0.0);
        assert_eq!(v.sqr_magnitude(), 25.0);
        assert!(close(v.magnitude(), 5.0));
    }

    #[test]
    fn test_normalized_matches_division() {
        let samples = [
            DoubleVector3::new(3.0, 4.0, 0.0),
            DoubleVector3::new(-1e12, 5e11, 3.0),
            DoubleVector3::new(1e-30, 0.0, 0.0),
        ];
        for v in samples {
            let n = v.normalized();
            let expected = v / v.magnitude();
            assert!(n.approx_eq(expected), "{v} -> {n}");
            assert!(close(n.magnitude(), 1.0));
        }
    }

    #[test]
    fn test_normalized_near_zero_is_zero() {
        assert_eq!(DoubleVector3::ZERO.normalized(), DoubleVector3::ZERO);
        let subnormal = DoubleVector3::new(1e-46, 0.0, 0.0);
        assert_eq!(subnormal.normalized(), DoubleVector3::ZERO);
        let mut v = DoubleVector3::new(0.0, 1.0e-300 * 1.0e-20, 0.0);
        v.normalize();
        assert_eq!(v, DoubleVector3::ZERO);
    }

    #[test]
    fn test_lerp_clamps_parameter() {
        let a = DoubleVector3::ZERO;
        let b = DoubleVector3::new(10.0, 0.0, 0.0);
        assert_eq!(a.lerp(b, 0.5), DoubleVector3::new(5.0, 0.0, 0.0));
        assert_eq!(a.lerp(b, 2.0), b);
        assert_eq!(a.lerp(b, -1.0), a);
        assert_eq!(a.lerp_unclamped(b, 2.0), DoubleVector3::new(20.0, 0.0, 0.0));
    }

    #[test]
    fn test_move_towards() {
        let a = DoubleVector3::ZERO;
        let b = DoubleVector3::new(10.0, 0.0, 0.0);
        assert_eq!(a.move_towards(b, 3.0), DoubleVector3::new(3.0, 0.0, 0.0));
        assert_eq!(a.move_towards(b, 30.0), b);
        assert_eq!(b.move_towards(b, 1.0), b);
    }

    #[test]
    fn test_reflect() {
        let v = DoubleVector3::new(1.0, -1.0, 0.0);
        assert_eq!(v.reflect(DoubleVector3::UP), DoubleVector3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_project_and_exclude() {
        let v = DoubleVector3::new(3.0, 4.0, 5.0);
        let n = DoubleVector3::new(0.0, 2.0, 0.0);
        assert_eq!(v.project(n), DoubleVector3::new(0.0, 4.0, 0.0));
        assert_eq!(v.exclude(n), DoubleVector3::new(3.0, 0.0, 5.0));
        assert_eq!(v.project(DoubleVector3::ZERO), DoubleVector3::ZERO);
    }

    #[test]
    fn test_angle_is_radians_and_never_nan() {
        let a = DoubleVector3::RIGHT;
        assert!(close(a.angle(DoubleVector3::UP), std::f64::consts::FRAC_PI_2));
        assert_eq!(a.angle(a * 3.0), 0.0);
        let nearly = DoubleVector3::new(1.0, 1e-17, 0.0);
        assert!(!a.angle(nearly).is_nan());
        assert!(close(a.angle(-a), std::f64::consts::PI));
    }

    #[test]
    fn test_clamp_magnitude() {
        let v = DoubleVector3::new(30.0, 40.0, 0.0);
        assert!(close(v.clamp_magnitude(5.0).magnitude(), 5.0));
        assert_eq!(v.clamp_magnitude(100.0), v);
    }

    #[test]
    fn test_approx_eq_is_loose() {
        let a = DoubleVector3::new(1.0, 2.0, 3.0);
        assert!(a.approx_eq(a + DoubleVector3::new(1e-6, 0.0, 0.0)));
        assert!(!a.approx_eq(a + DoubleVector3::new(1e-4, 0.0, 0.0)));
    }

    #[test]
    fn test_approx_eq_not_transitive() {
        let a = DoubleVector3::ZERO;
        let b = DoubleVector3::new(7e-6, 0.0, 0.0);
        let c = DoubleVector3::new(1.4e-5, 0.0, 0.0);
        assert!(a.approx_eq(b));
        assert!(b.approx_eq(c));
        assert!(!a.approx_eq(c));
    }

    #[test]
    fn test_glam_roundtrip() {
        let v = DoubleVector3::new(1.5, -2.5, 1e15);
        let g: DVec3 = v.into();
        assert_eq!(DoubleVector3::from(g), v);
        assert_eq!(v.to_native(), Vec3::new(1.5, -2.5, 1e15));
    }

    #[test]
    fn test_serialized_field_order() {
        let v = DoubleVector3::new(1.0, 2.0, 3.0);
        let s = ron::to_string(&v).unwrap();
        let order: Vec<usize> = ["x:", "y:", "z:"]
            .iter()
            .map(|k| s.find(k).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{s}");
        assert_eq!(ron::from_str::<DoubleVector3>(&s).unwrap(), v);

        let w = DoubleVector4::new(1.0, 2.0, 3.0, 4.0);
        let s = ron::to_string(&w).unwrap();
        assert!(s.find("z:").unwrap() < s.find("w:").unwrap(), "{s}");
        assert_eq!(ron::from_str::<DoubleVector4>(&s).unwrap(), w);
    }

    #[test]
    fn test_vector4_basics() {
        let p = DoubleVector4::from_point(DoubleVector3::new(1.0, 2.0, 3.0));
        assert_eq!(p.w, 1.0);
        assert_eq!(p.xyz(), DoubleVector3::new(1.0, 2.0, 3.0));
        assert_eq!(DoubleVector4::from_direction(DoubleVector3::UP).w, 0.0);
        let v = DoubleVector4::new(2.0, 0.0, 0.0, 0.0);
        assert_eq!(v.normalized(), DoubleVector4::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(DoubleVector4::ZERO.normalized(), DoubleVector4::ZERO);
        assert_eq!(
            DoubleVector4::ZERO.lerp(v, 5.0),
            v,
        );
        assert!(v.approx_eq(v + DoubleVector4::new(0.0, 0.0, 0.0, 1e-7)));
    }
}
