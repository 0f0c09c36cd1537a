//! Kepler orbit propagation for Orrery.
//!
//! [`solver`] holds the pure anomaly conversions and Kepler-equation solvers
//! for elliptic, parabolic and hyperbolic conics. [`OrbitState`] wraps one
//! body's elements and keeps position, velocity and anomalies consistent
//! with them.

mod error;
pub mod solver;
mod state;

pub use error::OrbitError;
pub use solver::{HyperbolicSolution, SolverSettings};
pub use state::{
    Attractor, ECLIPTIC_NORMAL, ECLIPTIC_RIGHT, ECLIPTIC_UP, OrbitElements, OrbitState,
    OrbitStatus, OrbitView,
};
