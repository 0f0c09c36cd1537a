//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Floating-origin settings.
    pub origin: OriginConfig,
    /// Direct/rescaled placement settings.
    pub placement: PlacementConfig,
    /// Auxiliary detail distance bands.
    pub detail: DetailConfig,
    /// Camera optics used for apparent-size matching.
    pub camera: CameraConfig,
    /// Kepler solver settings.
    pub solver: SolverConfig,
    /// Headless simulation loop settings.
    pub simulation: SimulationConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Floating-origin configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OriginConfig {
    /// Observer displacement (native units) that triggers a rebase.
    pub rebase_threshold: f64,
}

/// Distance placement configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlacementConfig {
    /// Bodies closer than this are placed directly.
    pub near_threshold: f64,
    /// Native distance at which rescaled bodies are placed.
    pub fixed_native_distance: f64,
    /// Multiplier on the rescaled visual width.
    pub rescale_factor: f64,
}

/// Distances below which auxiliary detail is enabled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetailConfig {
    pub atmosphere_distance: f64,
    pub cloud_detail_distance: f64,
    pub surface_lod_distance: f64,
}

/// Camera optics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Horizontal field of view in degrees.
    pub fov_degrees: f64,
    /// Image width in pixels.
    pub image_width_px: u32,
}

/// Hyperbolic Kepler solver configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    /// Newton step cap before giving up with the best estimate.
    pub hyperbolic_max_iterations: u32,
    /// Step size below which the iteration counts as converged.
    pub hyperbolic_tolerance: f64,
}

/// Simulation loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of ticks to run.
    pub ticks: u64,
    /// Wall-clock seconds per tick.
    pub tick_seconds: f64,
    /// Simulated seconds per wall-clock second.
    pub time_scale: f64,
    /// Observer speed in native units per wall-clock second.
    pub observer_speed: f64,
    /// Emit a status report every N ticks (0 = never).
    pub report_every: u64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            rebase_threshold: 5000.0,
        }
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            near_threshold: 150_000.0,
            fixed_native_distance: 148_500.0,
            rescale_factor: 1.0,
        }
    }
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            atmosphere_distance: 120_000.0,
            cloud_detail_distance: 40_000.0,
            surface_lod_distance: 10_000.0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            image_width_px: 1920,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            hyperbolic_max_iterations: 100,
            hyperbolic_tolerance: 1e-8,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            tick_seconds: 1.0 / 60.0,
            time_scale: 86_400.0,
            observer_speed: 1200.0,
            report_every: 60,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Validation ---

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be a positive finite number, got {value}"),
        })
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be a non-negative finite number, got {value}"),
        })
    }
}

impl Config {
    /// Check that every value is usable. Parsing accepts any number; this
    /// rejects the ones that would make placement or the solver degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("origin.rebase_threshold", self.origin.rebase_threshold)?;
        require_positive("placement.near_threshold", self.placement.near_threshold)?;
        require_positive(
            "placement.fixed_native_distance",
            self.placement.fixed_native_distance,
        )?;
        require_positive("placement.rescale_factor", self.placement.rescale_factor)?;
        require_non_negative("detail.atmosphere_distance", self.detail.atmosphere_distance)?;
        require_non_negative("detail.cloud_detail_distance", self.detail.cloud_detail_distance)?;
        require_non_negative("detail.surface_lod_distance", self.detail.surface_lod_distance)?;
        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return Err(ConfigError::InvalidValue {
                field: "camera.fov_degrees",
                reason: format!("must be in (0, 180), got {}", self.camera.fov_degrees),
            });
        }
        if self.camera.image_width_px == 0 {
            return Err(ConfigError::InvalidValue {
                field: "camera.image_width_px",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.solver.hyperbolic_max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                field: "solver.hyperbolic_max_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        require_positive("solver.hyperbolic_tolerance", self.solver.hyperbolic_tolerance)?;
        require_positive("simulation.tick_seconds", self.simulation.tick_seconds)?;
        require_non_negative("simulation.time_scale", self.simulation.time_scale)?;
        require_non_negative("simulation.observer_speed", self.simulation.observer_speed)?;
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-read `config.ron`: returns `Some(new_config)` if it differs from
    /// `self`, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
