//! Reasons an orbit element set is not usable.

/// Why an [`OrbitState`](crate::OrbitState) is flagged invalid.
///
/// These are never returned from mutators; they are recorded on the state
/// and exposed through [`OrbitState::invalid_reason`](crate::OrbitState::invalid_reason).
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum OrbitError {
    /// Attractor mass is zero, negative or NaN.
    #[error("attractor mass must be positive, got {0}")]
    NonPositiveMass(f64),

    /// Gravitational constant is zero, negative or NaN.
    #[error("gravitational constant must be positive, got {0}")]
    NonPositiveGravConst(f64),

    /// Eccentricity below zero.
    #[error("eccentricity must be non-negative, got {0}")]
    NegativeEccentricity(f64),

    /// Semi-major axis sign does not match the conic branch (positive for
    /// ellipses and for the periapsis distance of parabolas, negative for
    /// hyperbolas).
    #[error("semi-major axis {semi_major_axis} has the wrong sign for eccentricity {eccentricity}")]
    SemiMajorAxisSign {
        eccentricity: f64,
        semi_major_axis: f64,
    },

    /// An element or the attractor position is NaN or infinite.
    #[error("orbit element `{0}` is not finite")]
    NonFiniteElement(&'static str),
}
