//! Per-tick systems and the ordered tick schedule.

use bevy_ecs::prelude::*;
use orrery_coords::ObserverView;

use crate::components::{
    AttachedTo, Detail, Native, Observer, ObserverFrame, ObserverVelocity, OrbitBody, Placed,
    UniversePos,
};
use crate::resources::{OriginShift, SimTime, ViewSettings};

/// Moves observers by their native velocity.
pub fn move_observer_system(
    time: Res<SimTime>,
    mut query: Query<(&ObserverVelocity, &mut Native), With<Observer>>,
) {
    let dt = time.delta as f32;
    for (velocity, mut native) in query.iter_mut() {
        native.0.position += velocity.0 * dt;
    }
}

/// Reads each observer's native position back into its frame and rebases
/// when the local offset exceeds the threshold.
pub fn rebase_observer_system(
    time: Res<SimTime>,
    mut shift: ResMut<OriginShift>,
    mut query: Query<(&mut ObserverFrame, &mut Native, Option<&mut UniversePos>), With<Observer>>,
) {
    for (mut frame, mut native, universe) in query.iter_mut() {
        if let Some(delta) = frame.0.update(&mut native.0) {
            shift.last_shift = Some(delta);
            shift.last_tick = Some(time.tick);
            shift.total_rebases += 1;
        }
        if let Some(mut universe) = universe {
            universe.0 = frame.0.universe_position();
        }
    }
}

/// Moves each attached orbit's attractor to its parent's universe position.
pub fn follow_attractor_system(
    parents: Query<&UniversePos>,
    mut query: Query<(&AttachedTo, &mut OrbitBody)>,
) {
    for (attached, mut body) in query.iter_mut() {
        let Ok(parent) = parents.get(attached.0) else {
            continue;
        };
        if body.orbit.attractor().position != parent.0 {
            body.orbit.set_attractor_position(parent.0);
        }
    }
}

/// Advances every orbit by the tick's simulated time times its own scale.
pub fn advance_orbits_system(time: Res<SimTime>, mut query: Query<&mut OrbitBody>) {
    let dt = time.scaled_delta();
    for mut body in query.iter_mut() {
        let step = dt * body.time_scale;
        if step != 0.0 {
            body.orbit.advance(step);
        }
    }
}

/// Copies changed orbit positions into [`UniversePos`].
///
/// An invalid orbit leaves the last position in place and marks the body
/// stale, warning once per transition.
pub fn propagate_orbit_views_system(mut query: Query<(&mut OrbitBody, &mut UniversePos)>) {
    for (mut body, mut universe) in query.iter_mut() {
        let stale = !body.orbit.is_valid_orbit();
        if stale && !body.stale {
            let held = universe.0;
            tracing::warn!(
                reason = ?body.orbit.invalid_reason(),
                position = %held,
                "orbit invalid, holding last position"
            );
        }
        body.stale = stale;
        if let Some(view) = body.orbit.update_view() {
            universe.0 = view.world_position;
        }
    }
}

/// Places every body relative to the first observer.
pub fn place_bodies_system(
    settings: Res<ViewSettings>,
    observers: Query<(&ObserverFrame, &Native), With<Observer>>,
    mut bodies: Query<(&UniversePos, &mut Placed, &mut Native), Without<Observer>>,
) {
    let Some((frame, observer_native)) = observers.iter().next() else {
        return;
    };
    let observer = ObserverView {
        frame: &frame.0,
        native_position: observer_native.0.position,
        rotation: observer_native.0.rotation_f64(),
    };
    for (universe, mut placed, mut native) in bodies.iter_mut() {
        let placed = &mut *placed;
        let width = placed.true_width;
        let result = placed.state.place(
            &observer,
            universe.0,
            &settings.optics,
            &settings.placement,
            || width,
        );
        native.0.position = result.native_position;
        native.0.set_uniform_scale(result.scale as f32);
        placed.last = Some(result);
    }
}

/// Switches detail bands from the distance placement just measured.
pub fn update_detail_system(settings: Res<ViewSettings>, mut query: Query<(&Placed, &mut Detail)>) {
    for (placed, mut detail) in query.iter_mut() {
        let Some(result) = placed.last else {
            continue;
        };
        let level = settings.detail.classify(result.distance);
        if detail.0 != level {
            tracing::debug!(distance = result.distance, ?level, "detail level changed");
            detail.0 = level;
        }
    }
}

/// Adds the tick systems to `schedule`, chained so that the observer is
/// rebased before anything reads it and orbits move before placement.
pub fn build_tick_schedule(schedule: &mut Schedule) {
    schedule.add_systems(
        (
            move_observer_system,
            rebase_observer_system,
            follow_attractor_system,
            advance_orbits_system,
            propagate_orbit_views_system,
            place_bodies_system,
            update_detail_system,
        )
            .chain(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use orrery_coords::{FloatingOriginFrame, NativeTransform, PlacementMode};
    use orrery_math::DoubleVector3;
    use orrery_orbit::OrbitState;

    fn world_with_resources() -> World {
        let mut world = World::new();
        world.insert_resource(SimTime {
            delta: 1.0,
            ..SimTime::default()
        });
        world.insert_resource(ViewSettings::default());
        world.insert_resource(OriginShift::default());
        world
    }

    #[test]
    fn test_observer_moves_and_rebases_in_order() {
        let mut world = world_with_resources();
        let observer = world
            .spawn((
                Observer,
                ObserverFrame(FloatingOriginFrame::new()),
                ObserverVelocity(Vec3::new(3000.0, 0.0, 0.0)),
                Native::default(),
                UniversePos::default(),
            ))
            .id();
        let mut schedule = Schedule::default();
        build_tick_schedule(&mut schedule);

        schedule.run(&mut world);
        assert_eq!(world.resource::<OriginShift>().total_rebases, 0);
        schedule.run(&mut world);
        // 6000 > 5000: folded into the reference on the same tick.
        let shift = world.resource::<OriginShift>();
        assert_eq!(shift.total_rebases, 1);
        assert_eq!(shift.last_shift, Some(DoubleVector3::new(6000.0, 0.0, 0.0)));
        assert_eq!(world.get::<Native>(observer).unwrap().0.position, Vec3::ZERO);
        assert_eq!(
            world.get::<UniversePos>(observer).unwrap().0,
            DoubleVector3::new(6000.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_orbit_advances_and_updates_universe_position() {
        let mut world = world_with_resources();
        let orbit = OrbitState::new(0.0, 1000.0, 0.0, 0.0, 0.0, 0.0, 1.0e6, 1.0);
        let period = orbit.period().unwrap();
        let body = world
            .spawn((OrbitBody::new(orbit), UniversePos::default()))
            .id();
        world.resource_mut::<SimTime>().delta = period / 4.0;

        let mut schedule = Schedule::default();
        build_tick_schedule(&mut schedule);
        schedule.run(&mut world);

        let position = world.get::<UniversePos>(body).unwrap().0;
        assert!((position - DoubleVector3::new(0.0, 1000.0, 0.0)).magnitude() < 1e-6);
    }

    #[test]
    fn test_time_scale_zero_freezes_orbit() {
        let mut world = world_with_resources();
        let orbit = OrbitState::new(0.2, 1000.0, 10.0, 0.0, 0.0, 0.0, 1.0e6, 1.0);
        let start = orbit.world_position();
        let mut body = OrbitBody::new(orbit);
        body.time_scale = 0.0;
        let entity = world.spawn((body, UniversePos::default())).id();

        let mut schedule = Schedule::default();
        build_tick_schedule(&mut schedule);
        schedule.run(&mut world);
        schedule.run(&mut world);
        // The initial view is still propagated once.
        assert_eq!(world.get::<UniversePos>(entity).unwrap().0, start);
        assert_eq!(world.get::<OrbitBody>(entity).unwrap().orbit.world_position(), start);
    }

    #[test]
    fn test_invalid_orbit_holds_position_and_marks_stale() {
        let mut world = world_with_resources();
        let orbit = OrbitState::new(0.0, 1000.0, 0.0, 0.0, 0.0, 0.0, 1.0e6, 1.0);
        let entity = world
            .spawn((OrbitBody::new(orbit), UniversePos::default()))
            .id();
        world.resource_mut::<SimTime>().delta = 0.0;
        let mut schedule = Schedule::default();
        build_tick_schedule(&mut schedule);
        schedule.run(&mut world);
        let held = DoubleVector3::new(1000.0, 0.0, 0.0);
        assert_eq!(world.get::<UniversePos>(entity).unwrap().0, held);

        world
            .get_mut::<OrbitBody>(entity)
            .unwrap()
            .orbit
            .set_attractor_position(DoubleVector3::new(f64::NAN, 0.0, 0.0));
        schedule.run(&mut world);
        assert!(world.get::<OrbitBody>(entity).unwrap().stale);
        assert_eq!(world.get::<UniversePos>(entity).unwrap().0, held);

        world
            .get_mut::<OrbitBody>(entity)
            .unwrap()
            .orbit
            .set_attractor_position(DoubleVector3::new(0.0, 50.0, 0.0));
        schedule.run(&mut world);
        assert!(!world.get::<OrbitBody>(entity).unwrap().stale);
        assert_eq!(
            world.get::<UniversePos>(entity).unwrap().0,
            DoubleVector3::new(1000.0, 50.0, 0.0)
        );
    }

    #[test]
    fn test_attached_orbit_follows_parent() {
        let mut world = world_with_resources();
        let parent = world
            .spawn(UniversePos(DoubleVector3::new(1.0e9, 0.0, 0.0)))
            .id();
        let orbit = OrbitState::new(0.0, 10.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0);
        let child = world
            .spawn((OrbitBody::new(orbit), AttachedTo(parent), UniversePos::default()))
            .id();
        world.resource_mut::<SimTime>().delta = 0.0;

        let mut schedule = Schedule::default();
        build_tick_schedule(&mut schedule);
        schedule.run(&mut world);
        assert_eq!(
            world.get::<UniversePos>(child).unwrap().0,
            DoubleVector3::new(1.0e9 + 10.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_bodies_placed_against_observer() {
        let mut world = world_with_resources();
        world.resource_mut::<SimTime>().delta = 0.0;
        world.spawn((
            Observer,
            ObserverFrame(FloatingOriginFrame::new()),
            ObserverVelocity::default(),
            Native::default(),
        ));
        let near = world
            .spawn((
                UniversePos(DoubleVector3::new(0.0, 5_000.0, 0.0)),
                Placed::new(100.0),
                Native(NativeTransform::default()),
                Detail::default(),
            ))
            .id();
        let far = world
            .spawn((
                UniversePos(DoubleVector3::new(0.0, 0.0, 1.0e9)),
                Placed::new(1.0e6),
                Native(NativeTransform::default()),
                Detail::default(),
            ))
            .id();

        let mut schedule = Schedule::default();
        build_tick_schedule(&mut schedule);
        schedule.run(&mut world);

        let near_native = world.get::<Native>(near).unwrap().0;
        assert_eq!(near_native.position, Vec3::new(0.0, 5_000.0, 0.0));
        assert_eq!(near_native.scale, Vec3::ONE);
        let near_detail = world.get::<Detail>(near).unwrap().0;
        assert!(near_detail.atmosphere && near_detail.surface_lod);

        let far_placed = world.get::<Placed>(far).unwrap();
        assert_eq!(far_placed.last.unwrap().mode, PlacementMode::Rescaled);
        let far_native = world.get::<Native>(far).unwrap().0;
        assert!((far_native.position.z - 148_500.0).abs() < 0.1);
        assert!(far_native.scale.x < 1.0);
        assert!(!world.get::<Detail>(far).unwrap().0.atmosphere);
    }
}
