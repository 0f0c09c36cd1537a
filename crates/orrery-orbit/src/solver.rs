//! Anomaly conversions and Kepler-equation solvers.
//!
//! All functions are pure and reentrant. Angles are radians. The branch is
//! chosen by eccentricity: `e < 1` elliptic, `e > 1` hyperbolic, `e == 1`
//! parabolic. For the parabolic branch the "eccentric anomaly" is Barker's
//! parameter `D = tan(ν/2)` and the mean anomaly is `(D + D³/3) / 2`.

use orrery_math::{DoubleVector3, PI, PI_2};

/// Default iteration cap for [`solve_hyperbolic`].
pub const HYPERBOLIC_MAX_ITERATIONS: u32 = 100;

/// Default convergence tolerance for [`solve_hyperbolic`].
pub const HYPERBOLIC_TOLERANCE: f64 = 1e-8;

/// Tunables for the iterative hyperbolic branch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverSettings {
    pub hyperbolic_max_iterations: u32,
    pub hyperbolic_tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            hyperbolic_max_iterations: HYPERBOLIC_MAX_ITERATIONS,
            hyperbolic_tolerance: HYPERBOLIC_TOLERANCE,
        }
    }
}

/// Outcome of the hyperbolic Kepler iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HyperbolicSolution {
    /// Best estimate of the hyperbolic eccentric anomaly.
    pub eccentric_anomaly: f64,
    /// Newton steps taken.
    pub iterations: u32,
    /// False when the cap was hit or the iteration produced a non-finite step.
    pub converged: bool,
}

/// Mean → eccentric anomaly for any branch, using the default hyperbolic cap.
pub fn convert_mean_to_eccentric_anomaly(mean_anomaly: f64, eccentricity: f64) -> f64 {
    if eccentricity < 1.0 {
        kepler_solver(mean_anomaly, eccentricity)
    } else if eccentricity > 1.0 {
        solve_hyperbolic(
            mean_anomaly,
            eccentricity,
            HYPERBOLIC_MAX_ITERATIONS,
            HYPERBOLIC_TOLERANCE,
        )
        .eccentric_anomaly
    } else {
        parabolic_mean_to_barker(mean_anomaly)
    }
}

/// Eccentric → mean anomaly for any branch.
pub fn convert_eccentric_to_mean_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    if eccentricity < 1.0 {
        eccentric_anomaly - eccentricity * eccentric_anomaly.sin()
    } else if eccentricity > 1.0 {
        eccentricity * eccentric_anomaly.sinh() - eccentric_anomaly
    } else {
        let d = eccentric_anomaly;
        (d + d * d * d / 3.0) * 0.5
    }
}

/// Eccentric → true anomaly for any branch.
///
/// Elliptic inputs are expected in `[0, 2π)`; the `acos` result is mirrored
/// for the second half of the orbit.
pub fn convert_eccentric_to_true_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    if eccentricity < 1.0 {
        let cos_e = eccentric_anomaly.cos();
        let cos_t = (cos_e - eccentricity) / (1.0 - eccentricity * cos_e);
        let true_anomaly = cos_t.clamp(-1.0, 1.0).acos();
        if eccentric_anomaly > PI {
            PI_2 - true_anomaly
        } else {
            true_anomaly
        }
    } else if eccentricity > 1.0 {
        ((eccentricity * eccentricity - 1.0).sqrt() * eccentric_anomaly.sinh())
            .atan2(eccentricity - eccentric_anomaly.cosh())
    } else {
        2.0 * eccentric_anomaly.atan()
    }
}

/// True → eccentric anomaly for any branch.
///
/// A non-finite eccentricity returns the input unchanged.
pub fn convert_true_to_eccentric_anomaly(true_anomaly: f64, eccentricity: f64) -> f64 {
    if !eccentricity.is_finite() {
        return true_anomaly;
    }
    let true_anomaly = true_anomaly % PI_2;
    if eccentricity < 1.0 {
        let true_anomaly = if true_anomaly < 0.0 {
            true_anomaly + PI_2
        } else {
            true_anomaly
        };
        let cos_t = true_anomaly.cos();
        let cos_e = (eccentricity + cos_t) / (1.0 + eccentricity * cos_t);
        let eccentric_anomaly = cos_e.clamp(-1.0, 1.0).acos();
        if true_anomaly > PI {
            PI_2 - eccentric_anomaly
        } else {
            eccentric_anomaly
        }
    } else if eccentricity > 1.0 {
        let cos_t = true_anomaly.cos();
        acosh((eccentricity + cos_t) / (1.0 + eccentricity * cos_t)) * sign(true_anomaly)
    } else {
        (true_anomaly * 0.5).tan()
    }
}

/// Mean → true anomaly, composed from the two conversions above.
pub fn convert_mean_to_true_anomaly(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let eccentric = convert_mean_to_eccentric_anomaly(mean_anomaly, eccentricity);
    convert_eccentric_to_true_anomaly(eccentric, eccentricity)
}

/// True → mean anomaly, composed from the two conversions above.
pub fn convert_true_to_mean_anomaly(true_anomaly: f64, eccentricity: f64) -> f64 {
    let eccentric = convert_true_to_eccentric_anomaly(true_anomaly, eccentricity);
    convert_eccentric_to_mean_anomaly(eccentric, eccentricity)
}

/// Elliptic Kepler solver (`E − e·sin E = M`).
///
/// Fixed-count Laguerre–Conway iteration. The count depends only on `e`
/// (2 steps for a circle up to 6 as `e → 1`) and is computed once per call.
/// The `sign(n)·sqrt(|…|)` denominator keeps the step bounded where plain
/// Newton overshoots for eccentricities close to 1.
pub fn kepler_solver(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let iterations = ((eccentricity + 0.7) * 1.25).ceil() as u32 * 2;
    let mut m = mean_anomaly;
    for _ in 0..iterations {
        let e_sin = eccentricity * m.sin();
        let e_cos = eccentricity * m.cos();
        let delta = m - e_sin - mean_anomaly;
        let n = 1.0 - e_cos;
        m += -5.0 * delta / (n + sign(n) * (16.0 * n * n - 20.0 * delta * e_sin).abs().sqrt());
    }
    m
}

/// Hyperbolic Kepler solver (`e·sinh F − F = M`) with an iteration cap.
///
/// Newton iteration seeded with `ln(2|M|/e + 1.8)`, mirrored to the sign of
/// `M` so negative mean anomalies converge as the exact mirror image of
/// positive ones. A non-finite seed returns `M` unchanged (flagged as
/// not converged). A non-finite step stops the loop and keeps the last
/// finite estimate.
pub fn solve_hyperbolic(
    mean_anomaly: f64,
    eccentricity: f64,
    max_iterations: u32,
    tolerance: f64,
) -> HyperbolicSolution {
    let seed = (2.0 * mean_anomaly.abs() / eccentricity + 1.8).ln();
    if !seed.is_finite() {
        return HyperbolicSolution {
            eccentric_anomaly: mean_anomaly,
            iterations: 0,
            converged: false,
        };
    }
    let mut f = if mean_anomaly < 0.0 { -seed } else { seed };
    for iteration in 1..=max_iterations {
        let delta =
            (eccentricity * f.sinh() - f - mean_anomaly) / (eccentricity * f.cosh() - 1.0);
        if !delta.is_finite() {
            return HyperbolicSolution {
                eccentric_anomaly: f,
                iterations: iteration,
                converged: false,
            };
        }
        f -= delta;
        if delta.abs() <= tolerance {
            return HyperbolicSolution {
                eccentric_anomaly: f,
                iterations: iteration,
                converged: true,
            };
        }
    }
    HyperbolicSolution {
        eccentric_anomaly: f,
        iterations: max_iterations,
        converged: false,
    }
}

/// Barker's equation solved in closed form (real root of the cubic
/// `D³ + 3D − 6M = 0`). Never iterates.
///
/// The root is odd in `M`; solving for `|M|` and restoring the sign avoids
/// cancellation in `12m + 4·sqrt(4 + 9m²)` for large negative inputs.
pub fn parabolic_mean_to_barker(mean_anomaly: f64) -> f64 {
    let m = mean_anomaly.abs() * 2.0;
    let v = 12.0 * m + 4.0 * (4.0 + 9.0 * m * m).sqrt();
    let root = v.cbrt();
    (0.5 * root - 2.0 / root).copysign(mean_anomaly)
}

/// Inverse hyperbolic cosine that returns 0 for inputs below 1 instead of NaN.
///
/// This is a numerical-safety clamp for rounding just under the domain
/// boundary; values well below 1 indicate a caller bug, not valid math.
pub fn acosh(x: f64) -> f64 {
    if x < 1.0 {
        0.0
    } else {
        (x + (x * x - 1.0).sqrt()).ln()
    }
}

/// Sign with `sign(0) == 1`, matching the convention the elliptic solver's
/// denominator relies on.
pub fn sign(x: f64) -> f64 {
    if x < 0.0 { -1.0 } else { 1.0 }
}

/// True anomaly at which a body on the given conic is `distance` from the
/// focus. Returns the non-negative branch `[0, π]`.
///
/// For parabolic orbits `periapsis_distance` is used; otherwise
/// `|semi_major_axis|`. A circular orbit has no unique answer and returns 0.
pub fn calc_true_anomaly_for_distance(
    distance: f64,
    eccentricity: f64,
    semi_major_axis: f64,
    periapsis_distance: f64,
) -> f64 {
    if eccentricity <= 0.0 || distance <= 0.0 {
        return 0.0;
    }
    let cos_t = if eccentricity < 1.0 {
        (semi_major_axis.abs() * (1.0 - eccentricity * eccentricity) - distance)
            / (distance * eccentricity)
    } else if eccentricity > 1.0 {
        (semi_major_axis.abs() * (eccentricity * eccentricity - 1.0) - distance)
            / (distance * eccentricity)
    } else {
        2.0 * periapsis_distance / distance - 1.0
    };
    cos_t.clamp(-1.0, 1.0).acos()
}

/// Velocity that puts a body at `body_position` on a circular orbit around
/// `attractor_position`, travelling counter-clockwise about `orbit_normal`.
pub fn calc_circle_orbit_velocity(
    attractor_position: DoubleVector3,
    body_position: DoubleVector3,
    attractor_mass: f64,
    orbit_normal: DoubleVector3,
    grav_const: f64,
) -> DoubleVector3 {
    let radius_vector = body_position - attractor_position;
    let distance = radius_vector.magnitude();
    if distance <= 0.0 {
        return DoubleVector3::ZERO;
    }
    let speed = (attractor_mass * grav_const / distance).sqrt();
    orbit_normal.cross(radius_vector).normalized() * speed
}

/// Barycentre of two masses. With no positive total mass the midpoint is
/// returned.
pub fn calc_center_of_mass(
    position_a: DoubleVector3,
    mass_a: f64,
    position_b: DoubleVector3,
    mass_b: f64,
) -> DoubleVector3 {
    calc_center_of_mass_of(&[(position_a, mass_a), (position_b, mass_b)])
}

/// Barycentre of any number of `(position, mass)` pairs. With no positive
/// total mass the unweighted mean is returned (zero for an empty slice).
pub fn calc_center_of_mass_of(bodies: &[(DoubleVector3, f64)]) -> DoubleVector3 {
    let total_mass: f64 = bodies.iter().map(|(_, mass)| mass).sum();
    if total_mass > 0.0 {
        bodies
            .iter()
            .fold(DoubleVector3::ZERO, |acc, &(p, mass)| acc + p * mass)
            / total_mass
    } else if bodies.is_empty() {
        DoubleVector3::ZERO
    } else {
        bodies.iter().fold(DoubleVector3::ZERO, |acc, &(p, _)| acc + p) / bodies.len() as f64
    }
}

/// Rotate `v` by `angle` radians about `axis` (Rodrigues' rotation formula).
/// A zero axis leaves `v` unchanged.
pub fn rotate_vector_by_angle(v: DoubleVector3, angle: f64, axis: DoubleVector3) -> DoubleVector3 {
    let k = axis.normalized();
    if k == DoubleVector3::ZERO {
        return v;
    }
    let (sin, cos) = angle.sin_cos();
    v * cos + k.cross(v) * sin + k * (k.dot(v) * (1.0 - cos))
}

/// Wrap an angle into `[0, 2π)`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(PI_2);
    // rem_euclid can return exactly 2π for tiny negative inputs.
    if wrapped >= PI_2 { 0.0 } else { wrapped }
}
