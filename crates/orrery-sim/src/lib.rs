//! ECS wiring for Orrery.
//!
//! Components carry per-entity orbit, frame and placement state; systems
//! run once per tick in a fixed chain so the observer is rebased before
//! anything reads its position and orbits are advanced before placement.

mod components;
mod resources;
mod simulation;
mod systems;

pub use components::{
    AttachedTo, BodyName, Detail, Native, Observer, ObserverFrame, ObserverVelocity, OrbitBody,
    Placed, UniversePos,
};
pub use resources::{OriginShift, SimTime, ViewSettings};
pub use simulation::{BodyReport, BodySpec, Simulation, SimulationSettings};
pub use systems::{
    advance_orbits_system, build_tick_schedule, follow_attractor_system, move_observer_system,
    place_bodies_system, propagate_orbit_views_system, rebase_observer_system,
    update_detail_system,
};
