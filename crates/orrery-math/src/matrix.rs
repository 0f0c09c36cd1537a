use std::fmt;
use std::ops::Mul;

use glam::{DMat4, DQuat, DVec4};
use serde::{Deserialize, Serialize};

use crate::constants::DEG2RAD;
use crate::vector::{DoubleVector3, DoubleVector4};

/// 4×4 affine transform in double precision.
///
/// Storage is row-major: element `(row, col)` lives at `m[row * 4 + col]`,
/// and the 16 values serialize in that order (m00, m01, … m33). Points are
/// column vectors, so translation sits in the last column.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoubleMatrix4x4 {
    pub m: [f64; 16],
}

impl Default for DoubleMatrix4x4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl DoubleMatrix4x4 {
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub const ZERO: Self = Self { m: [0.0; 16] };

    pub fn from_rows(rows: [DoubleVector4; 4]) -> Self {
        let mut m = [0.0; 16];
        for (r, row) in rows.iter().enumerate() {
            m[r * 4] = row.x;
            m[r * 4 + 1] = row.y;
            m[r * 4 + 2] = row.z;
            m[r * 4 + 3] = row.w;
        }
        Self { m }
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.m[row * 4 + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.m[row * 4 + col] = value;
    }

    pub fn row(&self, row: usize) -> DoubleVector4 {
        DoubleVector4::new(
            self.m[row * 4],
            self.m[row * 4 + 1],
            self.m[row * 4 + 2],
            self.m[row * 4 + 3],
        )
    }

    pub fn column(&self, col: usize) -> DoubleVector4 {
        DoubleVector4::new(self.m[col], self.m[4 + col], self.m[8 + col], self.m[12 + col])
    }

    /// Translation-rotation-scale transform: scale first, then rotate, then
    /// translate.
    pub fn trs(translation: DoubleVector3, rotation: DQuat, scale: DoubleVector3) -> Self {
        DMat4::from_scale_rotation_translation(
            scale.into(),
            rotation.normalize(),
            translation.into(),
        )
        .into()
    }

    pub fn from_translation(translation: DoubleVector3) -> Self {
        let mut out = Self::IDENTITY;
        out.m[3] = translation.x;
        out.m[7] = translation.y;
        out.m[11] = translation.z;
        out
    }

    pub fn from_scale(scale: DoubleVector3) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0] = scale.x;
        out.m[5] = scale.y;
        out.m[10] = scale.z;
        out
    }

    pub fn from_rotation(rotation: DQuat) -> Self {
        DMat4::from_quat(rotation.normalize()).into()
    }

    /// Translation column.
    pub fn translation(&self) -> DoubleVector3 {
        DoubleVector3::new(self.m[3], self.m[7], self.m[11])
    }

    /// Per-axis scale recovered from basis lengths. Sign information from
    /// reflections is lost.
    pub fn lossy_scale(&self) -> DoubleVector3 {
        DoubleVector3::new(
            self.column(0).xyz().magnitude(),
            self.column(1).xyz().magnitude(),
            self.column(2).xyz().magnitude(),
        )
    }

    pub fn transpose(&self) -> Self {
        let mut m = [0.0; 16];
        for r in 0..4 {
            for c in 0..4 {
                m[c * 4 + r] = self.m[r * 4 + c];
            }
        }
        Self { m }
    }

    pub fn determinant(&self) -> f64 {
        DMat4::from(*self).determinant()
    }

    /// Inverse, or `None` when the matrix is singular or not finite.
    pub fn try_inverse(&self) -> Option<Self> {
        let matrix = DMat4::from(*self);
        let det = matrix.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inverse = matrix.inverse();
        inverse.is_finite().then(|| inverse.into())
    }

    /// Inverse that never fails. A singular input (for example a zero scale
    /// axis) yields the identity matrix; callers must not feed zero scale if
    /// they need a meaningful result.
    pub fn inverse(&self) -> Self {
        self.try_inverse().unwrap_or(Self::IDENTITY)
    }

    /// Transforms a point by the affine 3×4 part, ignoring the projective
    /// bottom row (w is taken as 1).
    pub fn multiply_point3x4(&self, p: DoubleVector3) -> DoubleVector3 {
        let m = &self.m;
        DoubleVector3::new(
            m[0] * p.x + m[1] * p.y + m[2] * p.z + m[3],
            m[4] * p.x + m[5] * p.y + m[6] * p.z + m[7],
            m[8] * p.x + m[9] * p.y + m[10] * p.z + m[11],
        )
    }

    /// Full projective point transform with homogeneous divide. When the
    /// resulting w is zero the undivided affine result is returned.
    pub fn multiply_point(&self, p: DoubleVector3) -> DoubleVector3 {
        let m = &self.m;
        let affine = self.multiply_point3x4(p);
        let w = m[12] * p.x + m[13] * p.y + m[14] * p.z + m[15];
        if w == 0.0 { affine } else { affine / w }
    }

    /// Transforms a direction (no translation).
    pub fn multiply_vector(&self, v: DoubleVector3) -> DoubleVector3 {
        let m = &self.m;
        DoubleVector3::new(
            m[0] * v.x + m[1] * v.y + m[2] * v.z,
            m[4] * v.x + m[5] * v.y + m[6] * v.z,
            m[8] * v.x + m[9] * v.y + m[10] * v.z,
        )
    }
}

/// Orientation from Euler angles in degrees, applied Z first, then X, then Y
/// (roll, then pitch, then yaw).
pub fn rotation_from_euler_degrees(x: f64, y: f64, z: f64) -> DQuat {
    DQuat::from_rotation_y(y * DEG2RAD)
        * DQuat::from_rotation_x(x * DEG2RAD)
        * DQuat::from_rotation_z(z * DEG2RAD)
}

impl Mul for DoubleMatrix4x4 {
    type Output = DoubleMatrix4x4;

    fn mul(self, rhs: DoubleMatrix4x4) -> Self::Output {
        let mut m = [0.0; 16];
        for r in 0..4 {
            for c in 0..4 {
                m[r * 4 + c] = (0..4).map(|k| self.m[r * 4 + k] * rhs.m[k * 4 + c]).sum();
            }
        }
        DoubleMatrix4x4 { m }
    }
}

impl Mul<DoubleVector4> for DoubleMatrix4x4 {
    type Output = DoubleVector4;

    fn mul(self, v: DoubleVector4) -> Self::Output {
        DoubleVector4::new(
            self.row(0).dot(v),
            self.row(1).dot(v),
            self.row(2).dot(v),
            self.row(3).dot(v),
        )
    }
}

impl From<DMat4> for DoubleMatrix4x4 {
    fn from(g: DMat4) -> Self {
        // glam is column-major; transposing its column array gives rows.
        let cols = g.to_cols_array();
        let mut m = [0.0; 16];
        for c in 0..4 {
            for r in 0..4 {
                m[r * 4 + c] = cols[c * 4 + r];
            }
        }
        Self { m }
    }
}

impl From<DoubleMatrix4x4> for DMat4 {
    fn from(d: DoubleMatrix4x4) -> Self {
        let col = |c: usize| DVec4::new(d.m[c], d.m[4 + c], d.m[8 + c], d.m[12 + c]);
        DMat4::from_cols(col(0), col(1), col(2), col(3))
    }
}

impl fmt::Display for DoubleMatrix4x4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..4 {
            let row = self.row(r);
            writeln!(f, "{:.6}\t{:.6}\t{:.6}\t{:.6}", row.x, row.y, row.z, row.w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Error relative to the largest magnitude involved in the round trip.
    fn relative_err(a: DoubleVector3, b: DoubleVector3, translation: DoubleVector3) -> f64 {
        let reference = b.magnitude().max(translation.magnitude()).max(1.0);
        (a - b).magnitude() / reference
    }

    #[test]
    fn test_identity_leaves_point() {
        let p = DoubleVector3::new(1.0, -2.0, 3.0);
        assert_eq!(DoubleMatrix4x4::IDENTITY.multiply_point3x4(p), p);
        assert_eq!(DoubleMatrix4x4::default(), DoubleMatrix4x4::IDENTITY);
    }

    #[test]
    fn test_translation_layout() {
        let t = DoubleVector3::new(10.0, 20.0, 30.0);
        let m = DoubleMatrix4x4::trs(t, DQuat::IDENTITY, DoubleVector3::ONE);
        assert_eq!(m.get(0, 3), 10.0);
        assert_eq!(m.get(1, 3), 20.0);
        assert_eq!(m.get(2, 3), 30.0);
        assert_eq!(m.translation(), t);
        assert_eq!(m, DoubleMatrix4x4::from_translation(t));
    }

    #[test]
    fn test_trs_applies_scale_then_rotation_then_translation() {
        let rotation = rotation_from_euler_degrees(0.0, 0.0, 90.0);
        let m = DoubleMatrix4x4::trs(
            DoubleVector3::new(100.0, 0.0, 0.0),
            rotation,
            DoubleVector3::new(2.0, 1.0, 1.0),
        );
        // (1,0,0) → scale (2,0,0) → rotate 90° about z (0,2,0) → translate.
        let p = m.multiply_point3x4(DoubleVector3::RIGHT);
        assert!(p.approx_eq(DoubleVector3::new(100.0, 2.0, 0.0)), "{p}");
    }

    #[test]
    fn test_inverse_roundtrip_within_tolerance() {
        let rotations = [
            rotation_from_euler_degrees(0.0, 0.0, 0.0),
            rotation_from_euler_degrees(30.0, 45.0, 60.0),
            rotation_from_euler_degrees(-170.0, 12.5, 89.0),
        ];
        let translations = [
            DoubleVector3::ZERO,
            DoubleVector3::new(1.5e11, -3.0e10, 7.0e9),
            DoubleVector3::new(-5.0, 2.0, 0.25),
        ];
        let scales = [
            DoubleVector3::ONE,
            DoubleVector3::new(0.5, 3.0, 1e-3),
            DoubleVector3::new(1e4, 1e4, 1e4),
        ];
        let points = [
            DoubleVector3::new(1.0, 2.0, 3.0),
            DoubleVector3::new(-4.0e8, 1.0e9, 2.0),
            DoubleVector3::ZERO,
        ];
        for &r in &rotations {
            for &t in &translations {
                for &s in &scales {
                    let m = DoubleMatrix4x4::trs(t, r, s);
                    let inv = m.inverse();
                    for &p in &points {
                        let back = m.multiply_point3x4(inv.multiply_point3x4(p));
                        assert!(relative_err(back, p, t) < 1e-9, "{p} -> {back}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_singular_inverse_does_not_panic() {
        let m = DoubleMatrix4x4::trs(
            DoubleVector3::new(1.0, 2.0, 3.0),
            DQuat::IDENTITY,
            DoubleVector3::new(0.0, 1.0, 1.0),
        );
        assert!(m.try_inverse().is_none());
        assert_eq!(m.inverse(), DoubleMatrix4x4::IDENTITY);
        assert_eq!(DoubleMatrix4x4::ZERO.inverse(), DoubleMatrix4x4::IDENTITY);
    }

    #[test]
    fn test_product_matches_sequential_application() {
        let a = DoubleMatrix4x4::trs(
            DoubleVector3::new(1.0, 0.0, 0.0),
            rotation_from_euler_degrees(0.0, 90.0, 0.0),
            DoubleVector3::ONE,
        );
        let b = DoubleMatrix4x4::from_scale(DoubleVector3::new(2.0, 2.0, 2.0));
        let p = DoubleVector3::new(0.5, -1.0, 4.0);
        let combined = (a * b).multiply_point3x4(p);
        let sequential = a.multiply_point3x4(b.multiply_point3x4(p));
        assert!(combined.approx_eq(sequential));
        assert_eq!(a * DoubleMatrix4x4::IDENTITY, a);
    }

    #[test]
    fn test_multiply_point_divides_by_w() {
        let mut m = DoubleMatrix4x4::IDENTITY;
        m.set(3, 3, 2.0);
        let p = DoubleVector3::new(2.0, 4.0, 6.0);
        assert_eq!(m.multiply_point(p), DoubleVector3::new(1.0, 2.0, 3.0));
        assert_eq!(m.multiply_point3x4(p), p);
        let hv = m * DoubleVector4::from_point(p);
        assert_eq!(hv.w, 2.0);
    }

    #[test]
    fn test_multiply_vector_ignores_translation() {
        let m = DoubleMatrix4x4::from_translation(DoubleVector3::new(5.0, 5.0, 5.0));
        assert_eq!(m.multiply_vector(DoubleVector3::UP), DoubleVector3::UP);
    }

    #[test]
    fn test_determinant_and_transpose() {
        let m = DoubleMatrix4x4::from_scale(DoubleVector3::new(2.0, 3.0, 4.0));
        assert!((m.determinant() - 24.0).abs() < 1e-12);
        let t = DoubleMatrix4x4::from_translation(DoubleVector3::new(1.0, 2.0, 3.0));
        assert_eq!(t.transpose().get(3, 0), 1.0);
        assert_eq!(t.transpose().transpose(), t);
    }

    #[test]
    fn test_lossy_scale() {
        let s = DoubleVector3::new(2.0, 3.0, 4.0);
        let m = DoubleMatrix4x4::trs(
            DoubleVector3::ZERO,
            rotation_from_euler_degrees(10.0, 20.0, 30.0),
            s,
        );
        assert!(m.lossy_scale().approx_eq(s));
    }

    #[test]
    fn test_glam_roundtrip() {
        let m = DoubleMatrix4x4::trs(
            DoubleVector3::new(7.0, 8.0, 9.0),
            rotation_from_euler_degrees(1.0, 2.0, 3.0),
            DoubleVector3::new(1.0, 2.0, 3.0),
        );
        let g: DMat4 = m.into();
        assert_eq!(DoubleMatrix4x4::from(g), m);
        assert_eq!(g.w_axis.x, 7.0);
    }

    #[test]
    fn test_serializes_sixteen_values() {
        let s = ron::to_string(&DoubleMatrix4x4::IDENTITY).unwrap();
        let back: DoubleMatrix4x4 = ron::from_str(&s).unwrap();
        assert_eq!(back, DoubleMatrix4x4::IDENTITY);
        assert_eq!(s.matches(',').count(), 15);
    }
}
