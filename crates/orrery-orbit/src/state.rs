//! Per-body Keplerian orbit state.
//!
//! [`OrbitState`] owns one mutable element set and every quantity derived
//! from it. Every mutator funnels through a single recompute, so position,
//! velocity, anomalies and mean motion are never observed out of step with
//! the elements.

use orrery_math::{DEG2RAD, DoubleVector3, PI, PI_2};
use serde::{Deserialize, Serialize};

use crate::error::OrbitError;
use crate::solver::{
    SolverSettings, calc_true_anomaly_for_distance, convert_eccentric_to_mean_anomaly,
    convert_eccentric_to_true_anomaly, convert_mean_to_eccentric_anomaly,
    convert_true_to_mean_anomaly, rotate_vector_by_angle, solve_hyperbolic, wrap_angle,
};

/// Reference direction for a zero ascending-node longitude.
pub const ECLIPTIC_RIGHT: DoubleVector3 = DoubleVector3::RIGHT;
/// In-plane direction perpendicular to [`ECLIPTIC_RIGHT`].
pub const ECLIPTIC_UP: DoubleVector3 = DoubleVector3::UP;
/// Normal of the reference plane; a zero-inclination orbit circulates
/// counter-clockwise about it.
pub const ECLIPTIC_NORMAL: DoubleVector3 = DoubleVector3::FORWARD;

/// Threshold below which node/eccentricity vectors are treated as undefined.
const DEGENERATE_EPSILON: f64 = 1e-12;

/// Classical orbital elements. Angles are radians.
///
/// For `eccentricity == 1` the semi-major axis is infinite; the field then
/// holds the periapsis distance instead.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct OrbitElements {
    pub eccentricity: f64,
    pub semi_major_axis: f64,
    pub mean_anomaly: f64,
    pub inclination: f64,
    pub ascending_node_longitude: f64,
    pub argument_of_perifocus: f64,
}

/// The body being orbited.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Attractor {
    pub position: DoubleVector3,
    pub mass: f64,
    pub grav_const: f64,
}

impl Attractor {
    pub fn new(mass: f64, grav_const: f64) -> Self {
        Self {
            position: DoubleVector3::ZERO,
            mass,
            grav_const,
        }
    }

    pub fn with_position(mut self, position: DoubleVector3) -> Self {
        self.position = position;
        self
    }

    /// Standard gravitational parameter μ = G·M.
    pub fn mu(&self) -> f64 {
        self.mass * self.grav_const
    }
}

/// Lifecycle of an [`OrbitState`].
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum OrbitStatus {
    /// Default-constructed; no elements assigned yet.
    #[default]
    Uninitialized,
    /// Elements are self-consistent and derived values are meaningful.
    Valid,
    /// The last mutation produced an unusable element set.
    Invalid(OrbitError),
}

/// Snapshot handed to whatever mirrors the orbit visually.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitView {
    /// Attractor position plus the relative position.
    pub world_position: DoubleVector3,
    /// Position relative to the attractor.
    pub relative_position: DoubleVector3,
    pub velocity: DoubleVector3,
}

/// Mutable orbit of one body around one attractor.
#[derive(Clone, Debug, Default)]
pub struct OrbitState {
    elements: OrbitElements,
    attractor: Attractor,
    solver: SolverSettings,
    status: OrbitStatus,

    eccentric_anomaly: f64,
    true_anomaly: f64,
    position: DoubleVector3,
    velocity: DoubleVector3,
    mean_motion: f64,
    period: Option<f64>,
    semi_minor_axis: f64,
    periapsis_distance: f64,
    apoapsis_distance: Option<f64>,
    focal_parameter: f64,
    periapsis_direction: DoubleVector3,
    minor_axis_direction: DoubleVector3,
    orbit_normal: DoubleVector3,

    solver_converged: bool,
    view_dirty: bool,
}

impl OrbitState {
    /// Build an orbit from elements given in degrees at the boundary.
    ///
    /// Angles are stored in radians. The attractor sits at the origin; move
    /// it with [`set_attractor_position`](Self::set_attractor_position).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        eccentricity: f64,
        semi_major_axis: f64,
        mean_anomaly_deg: f64,
        inclination_deg: f64,
        arg_of_perifocus_deg: f64,
        ascending_node_deg: f64,
        attractor_mass: f64,
        grav_const: f64,
    ) -> Self {
        Self::from_elements(
            OrbitElements {
                eccentricity,
                semi_major_axis,
                mean_anomaly: mean_anomaly_deg * DEG2RAD,
                inclination: inclination_deg * DEG2RAD,
                ascending_node_longitude: ascending_node_deg * DEG2RAD,
                argument_of_perifocus: arg_of_perifocus_deg * DEG2RAD,
            },
            Attractor::new(attractor_mass, grav_const),
        )
    }

    /// Build an orbit from radian elements and an attractor.
    pub fn from_elements(elements: OrbitElements, attractor: Attractor) -> Self {
        let mut state = Self {
            elements,
            attractor,
            ..Self::default()
        };
        state.recompute();
        state
    }

    /// Derive the element set from an attractor-relative position and
    /// velocity.
    ///
    /// Degenerate geometry is resolved towards the reference plane: a
    /// zero-inclination orbit takes its node along [`ECLIPTIC_RIGHT`], and a
    /// circular orbit takes its periapsis at the node.
    pub fn from_state_vectors(
        position: DoubleVector3,
        velocity: DoubleVector3,
        attractor: Attractor,
    ) -> Self {
        let elements = elements_from_state_vectors(position, velocity, attractor.mu());
        Self::from_elements(elements, attractor)
    }

    /// Use custom hyperbolic solver settings and recompute.
    pub fn with_solver_settings(mut self, solver: SolverSettings) -> Self {
        self.solver = solver;
        self.recompute();
        self
    }

    // --- validity ---

    pub fn status(&self) -> OrbitStatus {
        self.status
    }

    pub fn is_valid_orbit(&self) -> bool {
        self.status == OrbitStatus::Valid
    }

    pub fn invalid_reason(&self) -> Option<OrbitError> {
        match self.status {
            OrbitStatus::Invalid(err) => Some(err),
            _ => None,
        }
    }

    /// False when the last hyperbolic solve hit its cap or diverged.
    pub fn solver_converged(&self) -> bool {
        self.solver_converged
    }

    // --- elements ---

    pub fn elements(&self) -> &OrbitElements {
        &self.elements
    }

    pub fn attractor(&self) -> &Attractor {
        &self.attractor
    }

    pub fn eccentricity(&self) -> f64 {
        self.elements.eccentricity
    }

    pub fn semi_major_axis(&self) -> f64 {
        self.elements.semi_major_axis
    }

    pub fn mean_anomaly(&self) -> f64 {
        self.elements.mean_anomaly
    }

    pub fn inclination(&self) -> f64 {
        self.elements.inclination
    }

    pub fn ascending_node_longitude(&self) -> f64 {
        self.elements.ascending_node_longitude
    }

    pub fn argument_of_perifocus(&self) -> f64 {
        self.elements.argument_of_perifocus
    }

    pub fn attractor_mass(&self) -> f64 {
        self.attractor.mass
    }

    pub fn grav_const(&self) -> f64 {
        self.attractor.grav_const
    }

    // --- derived ---

    pub fn eccentric_anomaly(&self) -> f64 {
        self.eccentric_anomaly
    }

    pub fn true_anomaly(&self) -> f64 {
        self.true_anomaly
    }

    /// Position relative to the attractor. Zero while invalid.
    pub fn position(&self) -> DoubleVector3 {
        self.position
    }

    /// Attractor position plus [`position`](Self::position).
    pub fn world_position(&self) -> DoubleVector3 {
        self.attractor.position + self.position
    }

    /// Velocity relative to the attractor. Zero while invalid.
    pub fn velocity(&self) -> DoubleVector3 {
        self.velocity
    }

    /// Mean angular rate `n` in radians per time unit. Zero while invalid.
    pub fn mean_motion(&self) -> f64 {
        self.mean_motion
    }

    /// Orbital period; `None` for open orbits or while invalid.
    pub fn period(&self) -> Option<f64> {
        self.period
    }

    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_minor_axis
    }

    pub fn periapsis_distance(&self) -> f64 {
        self.periapsis_distance
    }

    /// `None` for open orbits.
    pub fn apoapsis_distance(&self) -> Option<f64> {
        self.apoapsis_distance
    }

    /// Semi-latus rectum `p`.
    pub fn focal_parameter(&self) -> f64 {
        self.focal_parameter
    }

    /// Unit vector from the attractor towards periapsis.
    pub fn periapsis_direction(&self) -> DoubleVector3 {
        self.periapsis_direction
    }

    /// Unit normal of the orbital plane (direction of angular momentum).
    pub fn orbit_normal(&self) -> DoubleVector3 {
        self.orbit_normal
    }

    pub fn attractor_distance(&self) -> f64 {
        self.position.magnitude()
    }

    /// Specific orbital energy `v²/2 − μ/r`. Zero while invalid.
    pub fn specific_energy(&self) -> f64 {
        if !self.is_valid_orbit() {
            return 0.0;
        }
        let r = self.position.magnitude();
        if r <= 0.0 {
            return 0.0;
        }
        self.velocity.sqr_magnitude() * 0.5 - self.attractor.mu() / r
    }

    /// Time since periapsis passage, `M / n`. Zero while invalid.
    pub fn current_orbit_time(&self) -> f64 {
        if !self.is_valid_orbit() || self.mean_motion <= 0.0 {
            return 0.0;
        }
        self.elements.mean_anomaly / self.mean_motion
    }

    // --- anomaly mutation ---

    /// Set the mean anomaly in radians and recompute everything.
    pub fn set_mean_anomaly(&mut self, mean_anomaly: f64) {
        self.elements.mean_anomaly = mean_anomaly;
        self.recompute();
    }

    pub fn set_mean_anomaly_degrees(&mut self, mean_anomaly_deg: f64) {
        self.set_mean_anomaly(mean_anomaly_deg * DEG2RAD);
    }

    pub fn set_eccentric_anomaly(&mut self, eccentric_anomaly: f64) {
        let mean = convert_eccentric_to_mean_anomaly(eccentric_anomaly, self.elements.eccentricity);
        self.set_mean_anomaly(mean);
    }

    pub fn set_true_anomaly(&mut self, true_anomaly: f64) {
        let mean = convert_true_to_mean_anomaly(true_anomaly, self.elements.eccentricity);
        self.set_mean_anomaly(mean);
    }

    /// Advance along the orbit by `dt` time units (`M += n·dt`).
    /// Does nothing while invalid.
    pub fn advance(&mut self, dt: f64) {
        if !self.is_valid_orbit() {
            return;
        }
        self.set_mean_anomaly(self.elements.mean_anomaly + self.mean_motion * dt);
    }

    // --- element mutation ---

    pub fn set_eccentricity(&mut self, eccentricity: f64) {
        self.elements.eccentricity = eccentricity;
        self.recompute();
    }

    pub fn set_semi_major_axis(&mut self, semi_major_axis: f64) {
        self.elements.semi_major_axis = semi_major_axis;
        self.recompute();
    }

    pub fn set_inclination(&mut self, inclination: f64) {
        self.elements.inclination = inclination;
        self.recompute();
    }

    pub fn set_ascending_node_longitude(&mut self, longitude: f64) {
        self.elements.ascending_node_longitude = longitude;
        self.recompute();
    }

    pub fn set_argument_of_perifocus(&mut self, argument: f64) {
        self.elements.argument_of_perifocus = argument;
        self.recompute();
    }

    pub fn set_attractor_mass(&mut self, mass: f64) {
        self.attractor.mass = mass;
        self.recompute();
    }

    pub fn set_grav_const(&mut self, grav_const: f64) {
        self.attractor.grav_const = grav_const;
        self.recompute();
    }

    /// Move the attractor. The relative orbit is unchanged, but the world
    /// position is, so the view is marked dirty.
    ///
    /// A non-finite position invalidates the orbit; moving back to a finite
    /// one revalidates it.
    pub fn set_attractor_position(&mut self, position: DoubleVector3) {
        self.attractor.position = position;
        if position.is_finite() && self.is_valid_orbit() {
            self.view_dirty = true;
        } else {
            self.recompute();
        }
    }

    /// Replace all elements at once.
    pub fn set_elements(&mut self, elements: OrbitElements) {
        self.elements = elements;
        self.recompute();
    }

    /// Collapse the orbit to the circular orbit through the current position.
    ///
    /// Eccentricity becomes exactly 0, the semi-major axis becomes the
    /// current attractor distance, and inclination and node are kept, so the
    /// orbital plane and the current position are preserved. Invalid orbits
    /// are left untouched.
    pub fn set_auto_circle_orbit(&mut self) {
        if !self.is_valid_orbit() {
            tracing::warn!(
                reason = ?self.invalid_reason(),
                "cannot circularize an invalid orbit"
            );
            return;
        }
        let radius = self.position.magnitude();
        if radius <= 0.0 {
            return;
        }
        let direction = self.position / radius;
        let angle = direction
            .dot(self.minor_axis_direction)
            .atan2(direction.dot(self.periapsis_direction));
        self.elements.eccentricity = 0.0;
        self.elements.semi_major_axis = radius;
        // On a circle mean, eccentric and true anomaly coincide.
        self.elements.mean_anomaly = wrap_angle(angle);
        self.recompute();
        tracing::debug!(radius, "orbit circularized");
    }

    // --- view propagation ---

    /// True when position changed since the last [`update_view`](Self::update_view).
    pub fn is_view_dirty(&self) -> bool {
        self.view_dirty
    }

    /// Hand the current position/velocity to a visual mirror and clear the
    /// dirty flag. Returns `None` when nothing changed or the orbit is
    /// invalid, so callers can batch propagation.
    pub fn update_view(&mut self) -> Option<OrbitView> {
        if !self.view_dirty || !self.is_valid_orbit() {
            return None;
        }
        self.view_dirty = false;
        Some(OrbitView {
            world_position: self.world_position(),
            relative_position: self.position,
            velocity: self.velocity,
        })
    }

    // --- path sampling ---

    /// Attractor-relative points along the conic for line rendering.
    ///
    /// Closed orbits are sampled uniformly in eccentric anomaly starting at
    /// periapsis. Open orbits are sampled symmetrically about periapsis in
    /// true anomaly, out to `max_distance` from the attractor or just short
    /// of the asymptotes, whichever comes first.
    pub fn orbit_points(&self, point_count: usize, max_distance: f64) -> Vec<DoubleVector3> {
        if !self.is_valid_orbit() || point_count < 2 {
            return Vec::new();
        }
        let e = self.elements.eccentricity;
        let p = self.periapsis_direction;
        let q = self.minor_axis_direction;

        if e < 1.0 {
            let a = self.elements.semi_major_axis;
            let b = self.semi_minor_axis;
            return (0..point_count)
                .map(|i| {
                    let ecc = PI_2 * i as f64 / point_count as f64;
                    p * (a * (ecc.cos() - e)) + q * (b * ecc.sin())
                })
                .collect();
        }

        let asymptote = if e > 1.0 { (-1.0 / e).acos() } else { PI };
        let mut limit = asymptote * 0.999;
        if max_distance > self.periapsis_distance {
            let at_distance = calc_true_anomaly_for_distance(
                max_distance,
                e,
                self.elements.semi_major_axis,
                self.periapsis_distance,
            );
            limit = limit.min(at_distance);
        }
        (0..point_count)
            .map(|i| {
                let nu = -limit + 2.0 * limit * i as f64 / (point_count - 1) as f64;
                let r = self.focal_parameter / (1.0 + e * nu.cos());
                (p * nu.cos() + q * nu.sin()) * r
            })
            .collect()
    }

    // --- internals ---

    fn validate(&self) -> Result<(), OrbitError> {
        let el = &self.elements;
        let checks = [
            ("eccentricity", el.eccentricity),
            ("semi_major_axis", el.semi_major_axis),
            ("mean_anomaly", el.mean_anomaly),
            ("inclination", el.inclination),
            ("ascending_node_longitude", el.ascending_node_longitude),
            ("argument_of_perifocus", el.argument_of_perifocus),
        ];
        if let Some((name, _)) = checks.iter().find(|(_, v)| !v.is_finite()) {
            return Err(OrbitError::NonFiniteElement(name));
        }
        if !self.attractor.position.is_finite() {
            return Err(OrbitError::NonFiniteElement("attractor_position"));
        }
        if !(self.attractor.mass > 0.0) {
            return Err(OrbitError::NonPositiveMass(self.attractor.mass));
        }
        if !(self.attractor.grav_const > 0.0) {
            return Err(OrbitError::NonPositiveGravConst(self.attractor.grav_const));
        }
        if el.eccentricity < 0.0 {
            return Err(OrbitError::NegativeEccentricity(el.eccentricity));
        }
        let sign_ok = if el.eccentricity > 1.0 {
            el.semi_major_axis < 0.0
        } else {
            el.semi_major_axis > 0.0
        };
        if !sign_ok {
            return Err(OrbitError::SemiMajorAxisSign {
                eccentricity: el.eccentricity,
                semi_major_axis: el.semi_major_axis,
            });
        }
        Ok(())
    }

    fn recompute(&mut self) {
        self.view_dirty = true;

        if let Err(err) = self.validate() {
            if self.status != OrbitStatus::Invalid(err) {
                tracing::warn!(%err, "orbit became invalid");
            }
            self.status = OrbitStatus::Invalid(err);
            self.clear_derived();
            return;
        }

        let e = self.elements.eccentricity;
        let a = self.elements.semi_major_axis;
        let mu = self.attractor.mu();

        self.update_basis();

        if e < 1.0 {
            self.elements.mean_anomaly = wrap_angle(self.elements.mean_anomaly);
            self.semi_minor_axis = a * (1.0 - e * e).sqrt();
            self.periapsis_distance = a * (1.0 - e);
            self.apoapsis_distance = Some(a * (1.0 + e));
            self.focal_parameter = a * (1.0 - e * e);
            self.mean_motion = (mu / (a * a * a)).sqrt();
            self.period = Some(PI_2 / self.mean_motion);
        } else if e > 1.0 {
            let a_abs = a.abs();
            self.semi_minor_axis = a_abs * (e * e - 1.0).sqrt();
            self.periapsis_distance = a_abs * (e - 1.0);
            self.apoapsis_distance = None;
            self.focal_parameter = a_abs * (e * e - 1.0);
            self.mean_motion = (mu / (a_abs * a_abs * a_abs)).sqrt();
            self.period = None;
        } else {
            // Parabola: `a` carries the periapsis distance. The mean motion
            // matches the (D + D³/3)/2 mean-anomaly convention.
            let q = a;
            self.semi_minor_axis = 0.0;
            self.periapsis_distance = q;
            self.apoapsis_distance = None;
            self.focal_parameter = 2.0 * q;
            self.mean_motion = (mu / (8.0 * q * q * q)).sqrt();
            self.period = None;
        }

        let mean = self.elements.mean_anomaly;
        if e > 1.0 {
            let solution = solve_hyperbolic(
                mean,
                e,
                self.solver.hyperbolic_max_iterations,
                self.solver.hyperbolic_tolerance,
            );
            if !solution.converged {
                tracing::warn!(
                    mean_anomaly = mean,
                    eccentricity = e,
                    iterations = solution.iterations,
                    "hyperbolic Kepler solver did not converge; using best estimate"
                );
            }
            self.solver_converged = solution.converged;
            self.eccentric_anomaly = solution.eccentric_anomaly;
        } else {
            self.solver_converged = true;
            self.eccentric_anomaly = convert_mean_to_eccentric_anomaly(mean, e);
        }
        self.true_anomaly = convert_eccentric_to_true_anomaly(self.eccentric_anomaly, e);

        let (sin_nu, cos_nu) = self.true_anomaly.sin_cos();
        let radius = self.focal_parameter / (1.0 + e * cos_nu);
        self.position =
            (self.periapsis_direction * cos_nu + self.minor_axis_direction * sin_nu) * radius;
        let speed_scale = (mu / self.focal_parameter).sqrt();
        self.velocity = (self.periapsis_direction * -sin_nu
            + self.minor_axis_direction * (e + cos_nu))
            * speed_scale;

        if self.status != OrbitStatus::Valid {
            tracing::debug!(eccentricity = e, semi_major_axis = a, "orbit is valid");
        }
        self.status = OrbitStatus::Valid;
    }

    /// Orbital-plane basis from node longitude, inclination and argument of
    /// periapsis, applied in that order as rotations about the current
    /// normal, the node line and the new normal.
    fn update_basis(&mut self) {
        let el = &self.elements;
        let node = rotate_vector_by_angle(ECLIPTIC_RIGHT, el.ascending_node_longitude, ECLIPTIC_NORMAL)
            .normalized();
        let normal = rotate_vector_by_angle(ECLIPTIC_NORMAL, el.inclination, node).normalized();
        let periapsis = rotate_vector_by_angle(node, el.argument_of_perifocus, normal).normalized();
        self.orbit_normal = normal;
        self.periapsis_direction = periapsis;
        self.minor_axis_direction = normal.cross(periapsis);
    }

    fn clear_derived(&mut self) {
        self.eccentric_anomaly = 0.0;
        self.true_anomaly = 0.0;
        self.position = DoubleVector3::ZERO;
        self.velocity = DoubleVector3::ZERO;
        self.mean_motion = 0.0;
        self.period = None;
        self.semi_minor_axis = 0.0;
        self.periapsis_distance = 0.0;
        self.apoapsis_distance = None;
        self.focal_parameter = 0.0;
        self.solver_converged = true;
    }
}

/// Signed angle from `from` to `to` measured counter-clockwise about `axis`.
fn signed_angle(from: DoubleVector3, to: DoubleVector3, axis: DoubleVector3) -> f64 {
    axis.dot(from.cross(to)).atan2(from.dot(to))
}

fn elements_from_state_vectors(
    position: DoubleVector3,
    velocity: DoubleVector3,
    mu: f64,
) -> OrbitElements {
    let radius = position.magnitude();
    if !(mu > 0.0) || radius <= 0.0 {
        // Leave the set for validation to reject; a zero axis cannot pass.
        return OrbitElements::default();
    }

    let momentum = position.cross(velocity);
    let normal = if momentum.magnitude() > DEGENERATE_EPSILON {
        momentum.normalized()
    } else {
        ECLIPTIC_NORMAL
    };
    let inclination = ECLIPTIC_NORMAL.angle(normal);

    let node_vector = ECLIPTIC_NORMAL.cross(normal);
    let node = if node_vector.magnitude() > DEGENERATE_EPSILON {
        node_vector.normalized()
    } else {
        ECLIPTIC_RIGHT
    };
    let ascending_node_longitude = signed_angle(ECLIPTIC_RIGHT, node, ECLIPTIC_NORMAL);

    let eccentricity_vector = velocity.cross(momentum) / mu - position / radius;
    let mut eccentricity = eccentricity_vector.magnitude();
    let periapsis = if eccentricity > DEGENERATE_EPSILON {
        eccentricity_vector / eccentricity
    } else {
        eccentricity = 0.0;
        node
    };
    let argument_of_perifocus = signed_angle(node, periapsis, normal);
    let true_anomaly = signed_angle(periapsis, position / radius, normal);

    let semi_major_axis = if (eccentricity - 1.0).abs() <= DEGENERATE_EPSILON {
        eccentricity = 1.0;
        momentum.sqr_magnitude() / (2.0 * mu)
    } else {
        let energy = velocity.sqr_magnitude() * 0.5 - mu / radius;
        -mu / (2.0 * energy)
    };

    let mean_anomaly = if eccentricity < 1.0 {
        convert_true_to_mean_anomaly(wrap_angle(true_anomaly), eccentricity)
    } else {
        convert_true_to_mean_anomaly(true_anomaly, eccentricity)
    };

    OrbitElements {
        eccentricity,
        semi_major_axis,
        mean_anomaly,
        inclination,
        ascending_node_longitude,
        argument_of_perifocus,
    }
}
