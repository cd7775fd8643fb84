//! Per-frame orchestration of the physics core
//!
//! Each steady tick runs, in order:
//! 1. disturbance sample and finite-difference ground velocity
//! 2. forces, damping and integration
//! 3. room collisions
//! 4. pairwise collisions
//! 5. transform commit
//!
//! Room resolution runs before pairwise resolution, so a pair push can move
//! a body back through a wall for one frame. The next frame corrects it.

use tremor_math::mat4;
use tremor_math::Vec3;

use crate::quake::Quake;
use crate::world::PhysicsWorld;

/// Lifecycle of the integrator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorState {
    /// Bodies have not been placed inside the room yet
    #[default]
    Uninitialized,
    /// No previous disturbance sample exists; forces are skipped
    FirstFrame,
    /// Full simulation
    Steady,
}

/// What happened during one tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// The state the tick ran in
    pub state: IntegratorState,
    /// Simulated time after the tick
    pub elapsed: f64,
    /// Room displacement applied this tick
    pub displacement: Vec3,
    /// Ground velocity injected into the bodies
    pub ground_velocity: Vec3,
    /// Bodies corrected back into the room
    pub room_corrections: usize,
    /// Body pairs found in contact
    pub contacts: usize,
}

/// Drives a [`PhysicsWorld`] one frame at a time
#[derive(Clone, Debug, Default)]
pub struct FrameIntegrator {
    state: IntegratorState,
    quake: Quake,
    elapsed: f64,
    previous_displacement: Vec3,
}

impl FrameIntegrator {
    pub fn new(quake: Quake) -> Self {
        Self {
            quake,
            ..Default::default()
        }
    }

    pub fn state(&self) -> IntegratorState {
        self.state
    }

    pub fn quake(&self) -> &Quake {
        &self.quake
    }

    /// Mutable access for live tuning between ticks
    pub fn quake_mut(&mut self) -> &mut Quake {
        &mut self.quake
    }

    /// Simulated seconds since the first steady tick
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Return to `Uninitialized`, keeping the disturbance parameters
    pub fn reset(&mut self) {
        self.state = IntegratorState::Uninitialized;
        self.elapsed = 0.0;
        self.previous_displacement = Vec3::ZERO;
    }

    /// Place every body inside the room and move to `FirstFrame`
    ///
    /// Does nothing once the integrator has left `Uninitialized`.
    pub fn initialize(&mut self, world: &mut PhysicsWorld) {
        if self.state != IntegratorState::Uninitialized {
            return;
        }
        let placed = world.place_inside_room();
        log::debug!("integrator initialized, {} bodies placed inside the room", placed);
        self.state = IntegratorState::FirstFrame;
    }

    /// Advance the world by `dt` seconds
    ///
    /// An uninitialized integrator initializes first, then runs the first
    /// frame. A tick always runs to completion.
    pub fn tick(&mut self, world: &mut PhysicsWorld, dt: f32) -> FrameReport {
        self.initialize(world);

        match self.state {
            IntegratorState::FirstFrame => self.first_frame(world),
            _ => self.steady_frame(world, dt),
        }
    }

    fn first_frame(&mut self, world: &mut PhysicsWorld) -> FrameReport {
        // Only the standing transforms are reapplied
        self.previous_displacement = self.quake.displacement(self.elapsed);
        world.set_room_effect(mat4::translation(self.previous_displacement));
        world.commit();

        self.state = IntegratorState::Steady;
        FrameReport {
            state: IntegratorState::FirstFrame,
            elapsed: self.elapsed,
            displacement: self.previous_displacement,
            ..Default::default()
        }
    }

    fn steady_frame(&mut self, world: &mut PhysicsWorld, dt: f32) -> FrameReport {
        // (a) disturbance
        self.elapsed += f64::from(dt.max(0.0));
        let displacement = self.quake.displacement(self.elapsed);
        let ground_velocity = Quake::velocity(self.previous_displacement, displacement, dt);
        self.previous_displacement = displacement;
        world.set_room_effect(mat4::translation(displacement));

        // (b) forces and integration
        world.apply_forces(dt, ground_velocity);

        // (c) room, (d) pairs
        let room_corrections = world.resolve_room_collisions();
        let contacts = world.resolve_body_collisions();

        // (e) commit
        world.commit();

        if contacts > 0 || room_corrections > 0 {
            log::trace!(
                "t={:.3}s: {} room corrections, {} contacts",
                self.elapsed,
                room_corrections,
                contacts
            );
        }

        FrameReport {
            state: IntegratorState::Steady,
            elapsed: self.elapsed,
            displacement,
            ground_velocity,
            room_corrections,
            contacts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{BodyKey, BodyType, RigidBody};
    use crate::quake::QuakeParams;
    use crate::shapes::CollisionShape;
    use crate::transform::BodyTransform;
    use crate::world::PhysicsConfig;
    use std::sync::Arc;

    const DT: f32 = 1.0 / 60.0;

    fn cube(center: Vec3, half: f32) -> RigidBody {
        RigidBody::new(
            Arc::new(CollisionShape::cuboid(Vec3::splat(half))),
            BodyTransform::from_translation(center),
        )
    }

    fn scene(config: PhysicsConfig, body_center: Vec3) -> (PhysicsWorld, BodyKey, BodyKey) {
        let mut world = PhysicsWorld::with_config(config);
        let room = world.add_body(cube(Vec3::ZERO, 10.0).with_body_type(BodyType::Static));
        world.set_room(room);
        let body = world.add_body(cube(body_center, 0.5));
        (world, room, body)
    }

    #[test]
    fn test_state_machine() {
        let (mut world, _, _) = scene(PhysicsConfig::default(), Vec3::ZERO);
        let mut integrator = FrameIntegrator::default();
        assert_eq!(integrator.state(), IntegratorState::Uninitialized);

        integrator.initialize(&mut world);
        assert_eq!(integrator.state(), IntegratorState::FirstFrame);

        let first = integrator.tick(&mut world, DT);
        assert_eq!(first.state, IntegratorState::FirstFrame);
        assert_eq!(integrator.state(), IntegratorState::Steady);

        let second = integrator.tick(&mut world, DT);
        assert_eq!(second.state, IntegratorState::Steady);

        integrator.reset();
        assert_eq!(integrator.state(), IntegratorState::Uninitialized);
        assert_eq!(integrator.elapsed(), 0.0);
    }

    #[test]
    fn test_elapsed_holds_over_an_hour() {
        let mut world = PhysicsWorld::new();
        let mut integrator = FrameIntegrator::default();
        integrator.tick(&mut world, DT);

        let frames = 60 * 60 * 60;
        let mut report = FrameReport::default();
        for _ in 0..frames {
            report = integrator.tick(&mut world, DT);
        }

        let expected = f64::from(DT) * frames as f64;
        assert!((report.elapsed - expected).abs() < 1e-6, "elapsed drifted to {}", report.elapsed);
        let closed_form = integrator.quake().displacement(expected);
        assert!((report.displacement - closed_form).length() < 1e-5);
    }

    #[test]
    fn test_first_frame_applies_no_forces() {
        let (mut world, _, body) = scene(PhysicsConfig::default(), Vec3::ZERO);
        let mut integrator = FrameIntegrator::default();

        let report = integrator.tick(&mut world, 0.5);

        assert_eq!(report.ground_velocity, Vec3::ZERO);
        let body = world.get_body(body).unwrap();
        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.displaced_position, Vec3::ZERO);
    }

    #[test]
    fn test_uninitialized_places_bodies_inside() {
        let (mut world, _, body) = scene(PhysicsConfig::default(), Vec3::new(0.0, -10.2, 0.0));
        let mut integrator = FrameIntegrator::default();
        integrator.quake_mut().set_enabled(false);

        integrator.tick(&mut world, DT);

        let room = world.room_bounds().unwrap();
        assert!(world.get_body(body).unwrap().global_bounds().is_inside(&room));
    }

    #[test]
    fn test_gravity_only_steady_frame() {
        let config = PhysicsConfig {
            linear_damping: 1.0,
            ..Default::default()
        };
        let (mut world, _, body) = scene(config, Vec3::ZERO);
        let mut integrator = FrameIntegrator::new(Quake::new(QuakeParams::new(0.0, 10.0)));

        integrator.tick(&mut world, DT);
        let report = integrator.tick(&mut world, DT);

        assert_eq!(report.room_corrections, 0);
        let body = world.get_body(body).unwrap();
        assert!((body.velocity.y - (-9.81 * DT)).abs() < 1e-6);
        assert!(body.displaced_position.y < 0.0);
    }

    #[test]
    fn test_room_follows_disturbance() {
        let (mut world, room, _) = scene(PhysicsConfig::default(), Vec3::ZERO);
        let mut integrator = FrameIntegrator::default();

        integrator.tick(&mut world, DT);
        let report = integrator.tick(&mut world, DT);

        let expected = integrator.quake().displacement(report.elapsed);
        assert_eq!(report.displacement, expected);
        let room_matrix = world.committed_matrix(room).unwrap();
        let origin = mat4::transform_point(&room_matrix, Vec3::ZERO);
        assert!((origin - expected).length() < 1e-6);
    }

    #[test]
    fn test_ground_velocity_is_finite_difference() {
        let (mut world, _, _) = scene(PhysicsConfig::default(), Vec3::ZERO);
        let mut integrator = FrameIntegrator::default();

        let first = integrator.tick(&mut world, DT);
        let second = integrator.tick(&mut world, DT);

        let expected = (second.displacement - first.displacement) / DT;
        assert!((second.ground_velocity - expected).length() < 1e-4);
    }

    #[test]
    fn test_shaking_moves_resting_body() {
        let config = PhysicsConfig {
            gravity: 0.0,
            ..Default::default()
        };
        let (mut world, _, body) = scene(config, Vec3::ZERO);
        let mut integrator = FrameIntegrator::default();

        for _ in 0..10 {
            integrator.tick(&mut world, DT);
        }

        let body = world.get_body(body).unwrap();
        assert_ne!(body.displaced_position, Vec3::ZERO);
        assert!(body.velocity.is_finite());
    }

    #[test]
    fn test_disabled_quake_leaves_room_still() {
        let (mut world, room, _) = scene(PhysicsConfig::default(), Vec3::ZERO);
        let mut integrator = FrameIntegrator::default();
        integrator.quake_mut().set_enabled(false);

        for _ in 0..5 {
            let report = integrator.tick(&mut world, DT);
            assert_eq!(report.displacement, Vec3::ZERO);
            assert_eq!(report.ground_velocity, Vec3::ZERO);
        }
        assert_eq!(world.committed_matrix(room), Some(mat4::IDENTITY));
    }

    #[test]
    fn test_zero_dt_is_harmless() {
        let (mut world, _, body) = scene(PhysicsConfig::default(), Vec3::ZERO);
        let mut integrator = FrameIntegrator::default();
        integrator.tick(&mut world, DT);

        let report = integrator.tick(&mut world, 0.0);
        assert_eq!(report.ground_velocity, Vec3::ZERO);
        assert!(world.get_body(body).unwrap().velocity.is_finite());
    }
}
