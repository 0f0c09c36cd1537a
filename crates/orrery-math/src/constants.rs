/// Radians → degrees. Fixed literal so results match other implementations
/// that carry the same constant bit for bit.
pub const RAD2DEG: f64 = 57.295779513082;

/// Degrees → radians. Fixed literal, see [`RAD2DEG`].
pub const DEG2RAD: f64 = 0.017453292519943;

/// π, as used by the anomaly conversions.
pub const PI: f64 = std::f64::consts::PI;

/// 2π (one full revolution).
pub const PI_2: f64 = std::f64::consts::TAU;

/// Magnitude at or below which a vector is treated as zero when normalizing.
///
/// This is the smallest positive subnormal f32 (1.401298×10⁻⁴⁵). Comparing
/// against it instead of literal zero keeps subnormal noise from producing
/// huge, meaningless unit vectors.
pub const VECTOR_EPSILON: f64 = 1.401298e-45;

/// Squared distance below which two vectors compare approximately equal.
pub const APPROX_EQ_EPSILON_SQR: f64 = 9.99999943962493e-11;

/// Largest per-axis delta (2²³ units) that survives a cast to f32 with
/// unit resolution.
pub const MAX_SAFE_NATIVE_DELTA: f64 = 8_388_608.0;

/// Convert degrees to radians using [`DEG2RAD`].
pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees * DEG2RAD
}

/// Convert radians to degrees using [`RAD2DEG`].
pub fn rad_to_deg(radians: f64) -> f64 {
    radians * RAD2DEG
}
