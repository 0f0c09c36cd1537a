//! Configuration for Orrery.
//!
//! Tunables for the floating origin, distance placement, detail bands, the
//! hyperbolic solver and the simulation loop, persisted as RON and
//! overridable from the command line.

mod cli;
mod config;
mod error;

use std::path::PathBuf;

pub use cli::CliArgs;
pub use config::{
    CameraConfig, Config, DebugConfig, DetailConfig, OriginConfig, PlacementConfig, SimulationConfig,
    SolverConfig,
};
pub use error::ConfigError;

/// Platform config directory for Orrery (`<config_dir>/orrery`), if the
/// platform has one.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("orrery"))
}
