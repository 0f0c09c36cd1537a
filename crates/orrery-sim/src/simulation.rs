//! World + schedule wrapper that owns one simulation.

use bevy_ecs::prelude::*;
use glam::Vec3;
use orrery_config::Config;
use orrery_coords::{
    CameraOptics, DetailBands, FloatingOriginFrame, NativeTransform, PlacementMode,
    PlacementResult, PlacementSettings,
};
use orrery_math::DoubleVector3;
use orrery_orbit::{OrbitState, SolverSettings};

use crate::components::{
    AttachedTo, BodyName, Detail, Native, Observer, ObserverFrame, ObserverVelocity, OrbitBody,
    Placed, UniversePos,
};
use crate::resources::{OriginShift, SimTime, ViewSettings};
use crate::systems::build_tick_schedule;

/// Everything a [`Simulation`] needs that is not per-entity.
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    pub rebase_threshold: f64,
    pub view: ViewSettings,
    pub solver: SolverSettings,
    /// Simulated seconds per wall-clock second.
    pub time_scale: f64,
}

impl SimulationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            rebase_threshold: config.origin.rebase_threshold,
            view: ViewSettings {
                placement: PlacementSettings {
                    near_threshold: config.placement.near_threshold,
                    fixed_native_distance: config.placement.fixed_native_distance,
                    rescale_factor: config.placement.rescale_factor,
                },
                optics: CameraOptics::from_degrees(
                    config.camera.fov_degrees,
                    config.camera.image_width_px as f64,
                ),
                detail: DetailBands {
                    atmosphere_distance: config.detail.atmosphere_distance,
                    cloud_detail_distance: config.detail.cloud_detail_distance,
                    surface_lod_distance: config.detail.surface_lod_distance,
                },
            },
            solver: SolverSettings {
                hyperbolic_max_iterations: config.solver.hyperbolic_max_iterations,
                hyperbolic_tolerance: config.solver.hyperbolic_tolerance,
            },
            time_scale: config.simulation.time_scale,
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Description of a body to spawn.
#[derive(Debug, Clone)]
pub struct BodySpec {
    pub name: String,
    /// Unscaled width used for apparent-size matching.
    pub width: f64,
    /// Universe position for bodies without an orbit.
    pub position: DoubleVector3,
    pub orbit: Option<OrbitState>,
    pub attached_to: Option<Entity>,
    pub time_scale: f64,
}

impl BodySpec {
    /// A body that stays put at `position`.
    pub fn fixed(name: impl Into<String>, position: DoubleVector3, width: f64) -> Self {
        Self {
            name: name.into(),
            width,
            position,
            orbit: None,
            attached_to: None,
            time_scale: 1.0,
        }
    }

    /// A body on `orbit`.
    pub fn orbiting(name: impl Into<String>, orbit: OrbitState, width: f64) -> Self {
        Self {
            position: orbit.world_position(),
            orbit: Some(orbit),
            ..Self::fixed(name, DoubleVector3::ZERO, width)
        }
    }

    /// Keep the orbit's attractor on `parent`.
    pub fn attached_to(mut self, parent: Entity) -> Self {
        self.attached_to = Some(parent);
        self
    }

    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale;
        self
    }
}

/// Snapshot of one body for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyReport {
    pub name: String,
    pub position: DoubleVector3,
    pub distance: f64,
    pub mode: Option<PlacementMode>,
    pub scale: f64,
    pub valid_orbit: Option<bool>,
    /// The orbit is invalid and `position` is the last valid one.
    pub stale_position: bool,
}

/// One ECS world driven by the tick schedule.
pub struct Simulation {
    world: World,
    schedule: Schedule,
    settings: SimulationSettings,
}

impl Simulation {
    pub fn new(settings: SimulationSettings) -> Self {
        let mut world = World::new();
        world.insert_resource(SimTime {
            time_scale: settings.time_scale,
            ..SimTime::default()
        });
        world.insert_resource(settings.view.clone());
        world.insert_resource(OriginShift::default());

        let mut schedule = Schedule::default();
        build_tick_schedule(&mut schedule);

        Self {
            world,
            schedule,
            settings,
        }
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Spawn the observer at `position`, moving at `velocity` native units
    /// per second.
    pub fn spawn_observer(&mut self, position: DoubleVector3, velocity: Vec3) -> Entity {
        let mut frame = FloatingOriginFrame::with_threshold(self.settings.rebase_threshold);
        let mut native = NativeTransform::default();
        frame.set_world_position(position, &mut native);
        self.world
            .spawn((
                Observer,
                ObserverFrame(frame),
                ObserverVelocity(velocity),
                Native(native),
                UniversePos(position),
                BodyName("observer".to_string()),
            ))
            .id()
    }

    pub fn spawn_body(&mut self, spec: BodySpec) -> Entity {
        let mut entity = self.world.spawn((
            BodyName(spec.name.clone()),
            UniversePos(spec.position),
            Placed::new(spec.width),
            Native::default(),
            Detail::default(),
        ));
        if let Some(orbit) = spec.orbit {
            let orbit = orbit.with_solver_settings(self.settings.solver);
            if !orbit.is_valid_orbit() {
                tracing::warn!(
                    name = %spec.name,
                    reason = ?orbit.invalid_reason(),
                    "spawned body with an invalid orbit"
                );
            }
            let mut body = OrbitBody::new(orbit);
            body.time_scale = spec.time_scale;
            entity.insert(body);
        }
        if let Some(parent) = spec.attached_to {
            entity.insert(AttachedTo(parent));
        }
        let id = entity.id();
        tracing::debug!(name = %spec.name, ?id, "body spawned");
        id
    }

    /// Run one tick covering `dt` wall-clock seconds.
    pub fn tick(&mut self, dt: f64) {
        {
            let mut time = self.world.resource_mut::<SimTime>();
            time.delta = dt;
            time.tick += 1;
            time.elapsed += dt * time.time_scale;
        }
        self.schedule.run(&mut self.world);
    }

    pub fn time(&self) -> &SimTime {
        self.world.resource::<SimTime>()
    }

    pub fn origin_shift(&self) -> &OriginShift {
        self.world.resource::<OriginShift>()
    }

    pub fn universe_position(&self, entity: Entity) -> Option<DoubleVector3> {
        self.world.get::<UniversePos>(entity).map(|p| p.0)
    }

    pub fn native(&self, entity: Entity) -> Option<NativeTransform> {
        self.world.get::<Native>(entity).map(|n| n.0)
    }

    pub fn placement(&self, entity: Entity) -> Option<PlacementResult> {
        self.world.get::<Placed>(entity).and_then(|p| p.last)
    }

    pub fn orbit(&self, entity: Entity) -> Option<&OrbitState> {
        self.world.get::<OrbitBody>(entity).map(|b| &b.orbit)
    }

    pub fn observer_frame(&self, entity: Entity) -> Option<&FloatingOriginFrame> {
        self.world.get::<ObserverFrame>(entity).map(|f| &f.0)
    }

    /// Reports for every placed body, sorted by name.
    pub fn report(&mut self) -> Vec<BodyReport> {
        let mut query = self
            .world
            .query::<(&BodyName, &UniversePos, &Placed, Option<&OrbitBody>)>();
        let mut reports: Vec<BodyReport> = query
            .iter(&self.world)
            .map(|(name, position, placed, body)| BodyReport {
                name: name.0.clone(),
                position: position.0,
                distance: placed.state.last_distance(),
                mode: placed.last.map(|r| r.mode),
                scale: placed.state.visual_scale(),
                valid_orbit: body.map(|b| b.orbit.is_valid_orbit()),
                stale_position: body.is_some_and(|b| b.stale),
            })
            .collect();
        reports.sort_by(|a, b| a.name.cmp(&b.name));
        reports
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimulationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_follow_config() {
        let mut config = Config::default();
        config.origin.rebase_threshold = 250.0;
        config.placement.fixed_native_distance = 90_000.0;
        config.solver.hyperbolic_max_iterations = 7;
        let settings = SimulationSettings::from_config(&config);
        assert_eq!(settings.rebase_threshold, 250.0);
        assert_eq!(settings.view.placement.fixed_native_distance, 90_000.0);
        assert_eq!(settings.solver.hyperbolic_max_iterations, 7);
        assert_eq!(settings.view.optics.fov_radians, orrery_math::deg_to_rad(60.0));
    }

    #[test]
    fn test_tick_counts_time() {
        let mut sim = Simulation::new(SimulationSettings {
            time_scale: 10.0,
            ..SimulationSettings::default()
        });
        sim.tick(0.5);
        sim.tick(0.5);
        assert_eq!(sim.time().tick, 2);
        assert!((sim.time().elapsed - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_spawn_body_with_orbit_and_observer() {
        let mut sim = Simulation::new(SimulationSettings {
            time_scale: 0.0,
            ..SimulationSettings::default()
        });
        let observer = sim.spawn_observer(DoubleVector3::new(0.0, 0.0, -2.0e5), Vec3::ZERO);
        let orbit = OrbitState::new(0.0, 1.0e5, 0.0, 0.0, 0.0, 0.0, 1.0e12, 1.0);
        let body = sim.spawn_body(BodySpec::orbiting("moon", orbit, 3474.0));
        sim.tick(1.0);

        assert_eq!(sim.universe_position(body), Some(DoubleVector3::new(1.0e5, 0.0, 0.0)));
        let placement = sim.placement(body).unwrap();
        assert_eq!(placement.mode, PlacementMode::Rescaled);
        assert!(sim.orbit(body).unwrap().is_valid_orbit());
        assert_eq!(sim.observer_frame(observer).unwrap().rebase_count(), 0);

        let reports = sim.report();
        let names: Vec<_> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["moon"]);
        assert_eq!(reports[0].valid_orbit, Some(true));
    }

    #[test]
    fn test_invalid_orbit_body_is_still_spawned() {
        let mut sim = Simulation::default();
        let orbit = OrbitState::new(0.1, 1.0e5, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let body = sim.spawn_body(BodySpec::orbiting("ghost", orbit, 1.0));
        sim.tick(1.0);
        assert!(!sim.orbit(body).unwrap().is_valid_orbit());
        assert_eq!(sim.universe_position(body), Some(DoubleVector3::ZERO));
        let report = &sim.report()[0];
        assert_eq!(report.valid_orbit, Some(false));
        assert!(report.stale_position);
    }
}
