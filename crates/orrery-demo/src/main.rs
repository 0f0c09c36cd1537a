//! Headless Orrery demo.
//!
//! Spawns a star, a planet, a moon riding on the planet and a hyperbolic
//! comet, parks an observer near the planet and runs the tick schedule,
//! reporting placement and floating-origin activity along the way.
//!
//! Run with: `cargo run -p orrery-demo -- --ticks 1200`

use std::path::PathBuf;

use clap::Parser;
use glam::Vec3;
use orrery_config::{CliArgs, Config};
use orrery_math::DoubleVector3;
use orrery_orbit::{Attractor, OrbitState};
use orrery_sim::{BodySpec, Simulation, SimulationSettings};
use tracing::{error, info, warn};

const G: f64 = 6.674_30e-11;
const SUN_MASS: f64 = 1.988_47e30;
const EARTH_MASS: f64 = 5.972_2e24;
const AU: f64 = 1.495_978_707e11;

fn resolve_config_dir(args: &CliArgs) -> PathBuf {
    args.config
        .clone()
        .or_else(orrery_config::default_config_dir)
        .unwrap_or_else(|| PathBuf::from(".orrery"))
}

fn load_config(config_dir: &std::path::Path, args: &CliArgs) -> Config {
    let mut config = Config::load_or_create(config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(args);
    if let Err(e) = config.validate() {
        eprintln!("{e}, using defaults");
        config = Config::default();
    }
    config
}

fn spawn_system(sim: &mut Simulation) -> DoubleVector3 {
    sim.spawn_body(BodySpec::fixed("sun", DoubleVector3::ZERO, 1.392_7e9));

    let earth_orbit = OrbitState::new(0.0167, AU, 40.0, 0.0, 102.9, -11.3, SUN_MASS, G);
    let earth_position = earth_orbit.world_position();
    let earth = sim.spawn_body(BodySpec::orbiting("earth", earth_orbit, 1.274_2e7));

    let moon_orbit = OrbitState::new(0.0549, 3.844e8, 135.0, 5.145, 318.15, 125.08, EARTH_MASS, G);
    sim.spawn_body(BodySpec::orbiting("moon", moon_orbit, 3.474_8e6).attached_to(earth));

    // Comet on a flyby, defined by its state vectors near periapsis.
    let sun = Attractor::new(SUN_MASS, G);
    let comet_position = DoubleVector3::new(-0.8 * AU, 0.3 * AU, 0.05 * AU);
    let escape_speed = (2.0 * sun.mu() / comet_position.magnitude()).sqrt();
    let comet_velocity = DoubleVector3::new(0.0, -1.0, 0.2).normalized() * (escape_speed * 1.3);
    let comet = OrbitState::from_state_vectors(comet_position, comet_velocity, sun);
    info!(
        "Comet: e={:.3}, periapsis={:.3} AU",
        comet.eccentricity(),
        comet.periapsis_distance() / AU
    );
    sim.spawn_body(BodySpec::orbiting("comet", comet, 1.0e4));

    earth_position
}

fn main() {
    let args = CliArgs::parse();
    let config_dir = resolve_config_dir(&args);
    let config = load_config(&config_dir, &args);

    let log_dir = config_dir.join("logs");
    orrery_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!("Orrery demo");
    info!(
        "Ticks: {} x {:.4}s, time scale {}x",
        config.simulation.ticks, config.simulation.tick_seconds, config.simulation.time_scale
    );

    let mut sim = Simulation::new(SimulationSettings::from_config(&config));
    let earth_position = spawn_system(&mut sim);
    let observer = sim.spawn_observer(
        earth_position + DoubleVector3::new(0.0, 2.0e7, 1.0e4),
        Vec3::new(config.simulation.observer_speed as f32, 0.0, 0.0),
    );

    for report in sim.report().iter().filter(|r| r.valid_orbit == Some(false)) {
        error!("{} has an invalid orbit", report.name);
    }

    let dt = config.simulation.tick_seconds;
    let report_every = config.simulation.report_every;
    let mut last_rebases = 0;
    for tick in 1..=config.simulation.ticks {
        sim.tick(dt);

        let rebases = sim.origin_shift().total_rebases;
        if rebases != last_rebases {
            if let Some(shift) = sim.origin_shift().last_shift {
                info!("tick {tick}: origin rebased by {shift}");
            }
            last_rebases = rebases;
        }

        if report_every > 0 && tick % report_every == 0 {
            let elapsed_days = sim.time().elapsed / 86_400.0;
            info!("tick {tick}: {elapsed_days:.2} simulated days");
            for report in sim.report() {
                match report.mode {
                    Some(_) if report.stale_position => warn!(
                        "  {:<6} {:>14.3e} m  holding last valid position",
                        report.name, report.distance
                    ),
                    Some(mode) => info!(
                        "  {:<6} {:>14.3e} m  {:?} scale={:.3e}",
                        report.name, report.distance, mode, report.scale
                    ),
                    None => warn!("  {:<6} not placed", report.name),
                }
            }
        }
    }

    if let Some(frame) = sim.observer_frame(observer) {
        info!(
            "Observer finished at {} after {} rebases",
            frame.universe_position(),
            frame.rebase_count()
        );
    }
}
