use glam::Vec3;

use crate::constants::MAX_SAFE_NATIVE_DELTA;
use crate::vector::DoubleVector3;

/// Convert a double-precision universe position to an engine-native f32
/// position relative to `reference`.
///
/// This is the precision-critical path: the subtraction happens in f64 where
/// both operands are exact, and only the small delta is cast down.
///
/// # Precision
/// Within ±2²³ units per axis of the reference the result resolves whole
/// units exactly. Farther out the f32 result degrades gracefully; it never
/// panics.
pub fn to_native(position: DoubleVector3, reference: DoubleVector3) -> Vec3 {
    (position - reference).to_native()
}

/// Inverse of [`to_native`]: widen a native position and add the reference.
pub fn to_double(native: Vec3, reference: DoubleVector3) -> DoubleVector3 {
    reference + DoubleVector3::from(native)
}

/// Like [`to_native`], but reports whether any axis delta exceeds
/// [`MAX_SAFE_NATIVE_DELTA`]. The `Err` variant still carries the converted
/// position; callers decide whether degraded precision is acceptable.
pub fn to_native_checked(position: DoubleVector3, reference: DoubleVector3) -> Result<Vec3, Vec3> {
    let delta = position - reference;
    let native = delta.to_native();
    if delta.x.abs() > MAX_SAFE_NATIVE_DELTA
        || delta.y.abs() > MAX_SAFE_NATIVE_DELTA
        || delta.z.abs() > MAX_SAFE_NATIVE_DELTA
    {
        Err(native)
    } else {
        Ok(native)
    }
}

/// Convert a slice of universe positions in one pass, reusing `out`.
pub fn to_native_batch(positions: &[DoubleVector3], reference: DoubleVector3, out: &mut Vec<Vec3>) {
    out.clear();
    out.reserve(positions.len());
    out.extend(positions.iter().map(|&p| to_native(p, reference)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_reference_is_zero() {
        let reference = DoubleVector3::new(1000.0, 2000.0, 3000.0);
        assert_eq!(to_native(reference, reference), Vec3::ZERO);
    }

    #[test]
    fn test_large_reference_small_delta() {
        // Ten AU out in metres, object 1.25 m away.
        let reference = DoubleVector3::new(1.495978707e12, -3.0e12, 0.0);
        let position = reference + DoubleVector3::new(1.25, 0.0, -0.5);
        let native = to_native(position, reference);
        assert_eq!(native, Vec3::new(1.25, 0.0, -0.5));
    }

    #[test]
    fn test_roundtrip_nearby() {
        let reference = DoubleVector3::new(1.0e12, 2.0e12, 3.0e12);
        let original = reference + DoubleVector3::new(1000.0, -2000.0, 3000.0);
        let back = to_double(to_native(original, reference), reference);
        assert_eq!(back, original);
    }

    #[test]
    fn test_checked_within_and_outside_safe_range() {
        let reference = DoubleVector3::ZERO;
        assert!(to_native_checked(DoubleVector3::new(1_000_000.0, 0.0, 0.0), reference).is_ok());
        let far = to_native_checked(DoubleVector3::new(0.0, 100_000_000.0, 0.0), reference);
        assert_eq!(far, Err(Vec3::new(0.0, 100_000_000.0, 0.0)));
    }

    #[test]
    fn test_batch_conversion() {
        let reference = DoubleVector3::new(10.0, 10.0, 10.0);
        let positions = [
            DoubleVector3::new(110.0, 210.0, 310.0),
            DoubleVector3::new(410.0, 510.0, 610.0),
        ];
        let mut out = vec![Vec3::ONE; 7];
        to_native_batch(&positions, reference, &mut out);
        assert_eq!(out, vec![Vec3::new(100.0, 200.0, 300.0), Vec3::new(400.0, 500.0, 600.0)]);
    }
}
