//! Command-line argument parsing for Orrery.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Headless orbit and floating-origin simulation")]
pub struct CliArgs {
    /// Number of ticks to simulate.
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Wall-clock seconds per tick.
    #[arg(long)]
    pub tick_seconds: Option<f64>,

    /// Simulated seconds per wall-clock second.
    #[arg(long)]
    pub time_scale: Option<f64>,

    /// Observer displacement that triggers a floating-origin rebase.
    #[arg(long)]
    pub rebase_threshold: Option<f64>,

    /// Distance below which bodies are placed directly.
    #[arg(long)]
    pub near_threshold: Option<f64>,

    /// Native distance for rescaled bodies.
    #[arg(long)]
    pub fixed_native_distance: Option<f64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ticks) = args.ticks {
            self.simulation.ticks = ticks;
        }
        if let Some(dt) = args.tick_seconds {
            self.simulation.tick_seconds = dt;
        }
        if let Some(scale) = args.time_scale {
            self.simulation.time_scale = scale;
        }
        if let Some(threshold) = args.rebase_threshold {
            self.origin.rebase_threshold = threshold;
        }
        if let Some(near) = args.near_threshold {
            self.placement.near_threshold = near;
        }
        if let Some(fixed) = args.fixed_native_distance {
            self.placement.fixed_native_distance = fixed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
