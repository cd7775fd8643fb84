//! Physics world and simulation

use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};
use tremor_math::mat4::{self, Mat4};
use tremor_math::Vec3;

use crate::aabb::Aabb;
use crate::body::{BodyKey, RigidBody};
use crate::collision::{collide_with_room, orient_normal, resolve_pair, shape_contact};
use crate::material::PhysicsMaterial;

/// Configuration for the physics simulation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity acceleration (applied to Y-axis, negative = down)
    pub gravity: f32,
    /// Per-frame multiplicative decay of linear velocity
    pub linear_damping: f32,
    /// Speeds below this are snapped to zero after damping
    pub velocity_epsilon: f32,
    /// Contact response shared by every body
    pub material: PhysicsMaterial,
    /// Vertical speed below which a floor bounce comes to rest
    pub rest_speed: f32,
    /// Clearance kept from the room walls on initial placement
    pub room_margin: f32,
    /// Scale of the shake force (`ground_velocity * mass * coupling`)
    pub shake_coupling: f32,
    /// Scale of the yaw torque induced by horizontal shaking
    pub shake_spin: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            linear_damping: 0.99,
            velocity_epsilon: 0.01,
            material: PhysicsMaterial::default(),
            rest_speed: 0.1,
            room_margin: 0.01,
            shake_coupling: 1.0,
            shake_spin: 0.05,
        }
    }
}

impl PhysicsConfig {
    /// Create a new physics config with the given gravity
    pub fn new(gravity: f32) -> Self {
        Self {
            gravity,
            ..Default::default()
        }
    }

    /// Gravity as a vector
    pub fn gravity_vector(&self) -> Vec3 {
        Vec3::new(0.0, self.gravity, 0.0)
    }
}

/// The physics world containing all rigid bodies
pub struct PhysicsWorld {
    /// All rigid bodies in the world (using generational keys)
    bodies: SlotMap<BodyKey, RigidBody>,
    /// The static body whose box contains everything else
    room: Option<BodyKey>,
    /// World matrices published by the last commit
    committed: SecondaryMap<BodyKey, Mat4>,
    /// Physics configuration
    pub config: PhysicsConfig,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            room: None,
            committed: SecondaryMap::new(),
            config,
        }
    }

    /// Add a body to the world and return its key
    pub fn add_body(&mut self, body: RigidBody) -> BodyKey {
        self.bodies.insert(body)
    }

    /// Remove a body from the world and return it
    pub fn remove_body(&mut self, key: BodyKey) -> Option<RigidBody> {
        if self.room == Some(key) {
            self.room = None;
        }
        self.committed.remove(key);
        self.bodies.remove(key)
    }

    /// Get an immutable reference to a body by key
    pub fn get_body(&self, key: BodyKey) -> Option<&RigidBody> {
        self.bodies.get(key)
    }

    /// Get a mutable reference to a body by key
    pub fn get_body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        self.bodies.get_mut(key)
    }

    /// Get the number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Iterate over all body keys
    pub fn body_keys(&self) -> impl Iterator<Item = BodyKey> + '_ {
        self.bodies.keys()
    }

    /// Iterate over all bodies
    pub fn bodies(&self) -> impl Iterator<Item = (BodyKey, &RigidBody)> + '_ {
        self.bodies.iter()
    }

    /// Designate the room; returns false for a stale key
    pub fn set_room(&mut self, key: BodyKey) -> bool {
        if !self.bodies.contains_key(key) {
            return false;
        }
        self.room = Some(key);
        true
    }

    /// Key of the room body, if any
    pub fn room(&self) -> Option<BodyKey> {
        self.room
    }

    /// The room's current world box (effect included)
    pub fn room_bounds(&self) -> Option<Aabb> {
        self.room.and_then(|key| self.bodies.get(key)).map(RigidBody::global_bounds)
    }

    /// Replace the room's transient effect (clear, then apply)
    pub fn set_room_effect(&mut self, effect: Mat4) {
        if let Some(room) = self.room.and_then(|key| self.bodies.get_mut(key)) {
            room.transform.clear_effect();
            room.transform.set_effect(effect);
        }
    }

    /// Bodies that take part in the simulation: movable and not the room
    fn simulated_keys(&self) -> Vec<BodyKey> {
        self.bodies
            .iter()
            // Massless dynamic bodies never move and are skipped by pair contacts
            .filter(|(key, body)| Some(*key) != self.room && body.is_movable())
            .map(|(key, _)| key)
            .collect()
    }

    /// Push every simulated body at least `room_margin` inside the room
    ///
    /// Returns the number of bodies moved.
    pub fn place_inside_room(&mut self) -> usize {
        let Some(room) = self.room_bounds() else {
            return 0;
        };
        let margin = self.config.room_margin;

        let mut moved = 0;
        for key in self.simulated_keys() {
            let body = &mut self.bodies[key];
            let correction = body.global_bounds().translate_to_inside(&room, margin);
            if correction != Vec3::ZERO {
                log::debug!("placing body {:?} inside room by {:?}", key, correction);
                body.apply_correction(correction);
                moved += 1;
            }
        }
        moved
    }

    /// Gravity, shake force and torque, damping, then integration
    pub fn apply_forces(&mut self, dt: f32, ground_velocity: Vec3) {
        let gravity = self.config.gravity_vector();
        let coupling = self.config.shake_coupling;
        let spin = self.config.shake_spin;
        let damping = self.config.linear_damping;
        let epsilon = self.config.velocity_epsilon;

        for key in self.simulated_keys() {
            let body = &mut self.bodies[key];
            let mass = body.mass;

            body.apply_gravity(gravity, dt);
            body.apply_force(ground_velocity * (mass * coupling), dt);
            body.apply_torque(spin * mass * (ground_velocity.x - ground_velocity.z), dt);
            body.apply_damping(damping, epsilon);
            body.integrate(dt);
        }
    }

    /// Resolve every simulated body against the room
    ///
    /// Returns the number of bodies that needed a positional correction.
    pub fn resolve_room_collisions(&mut self) -> usize {
        let Some(room) = self.room_bounds() else {
            return 0;
        };
        let material = self.config.material;
        let rest_speed = self.config.rest_speed;

        let mut corrected = 0;
        for key in self.simulated_keys() {
            let body = &mut self.bodies[key];
            let response = collide_with_room(&body.global_bounds(), &room, body.velocity, &material, rest_speed);

            body.velocity = response.velocity;
            if response.is_corrected() {
                body.apply_correction(response.correction);
                corrected += 1;
            }
        }
        corrected
    }

    /// Resolve collisions between every unordered pair of simulated bodies
    ///
    /// Returns the number of pairs that were in contact.
    pub fn resolve_body_collisions(&mut self) -> usize {
        let keys = self.simulated_keys();
        let restitution = self.config.material.restitution;

        let mut contacts = 0;
        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                if self.handle_pair_collision(keys[i], keys[j], restitution) {
                    contacts += 1;
                }
            }
        }
        contacts
    }

    /// Detect and resolve one pair; true if they were in contact
    fn handle_pair_collision(&mut self, key_a: BodyKey, key_b: BodyKey, restitution: f32) -> bool {
        let Some([a, b]) = self.bodies.get_disjoint_mut([key_a, key_b]) else {
            return false;
        };

        let (matrix_a, matrix_b) = (a.world_matrix(), b.world_matrix());

        // Cheap whole-body rejection before walking the hierarchies
        if !a.shape().global_bounds(&matrix_a).overlaps(&b.shape().global_bounds(&matrix_b)) {
            return false;
        }

        let Some(contact) = shape_contact(a.shape(), &matrix_a, b.shape(), &matrix_b) else {
            return false;
        };
        let contact = orient_normal(contact, a.position(), b.position());

        log::trace!(
            "contact {:?} <-> {:?}: normal {:?}, depth {:.4}",
            key_a,
            key_b,
            contact.normal,
            contact.penetration
        );
        resolve_pair(a, b, &contact, restitution)
    }

    /// Step the physics simulation forward by dt seconds without shaking
    ///
    /// This performs:
    /// 1. Force application, damping and integration
    /// 2. Room collision resolution
    /// 3. Body-body collision resolution
    /// 4. Transform commit
    pub fn step(&mut self, dt: f32) {
        self.apply_forces(dt, Vec3::ZERO);
        self.resolve_room_collisions();
        self.resolve_body_collisions();
        self.commit();
    }

    /// Publish every body's world matrix for readers outside the tick
    pub fn commit(&mut self) {
        self.committed.clear();
        for (key, body) in &self.bodies {
            self.committed.insert(key, body.world_matrix());
        }
    }

    /// World matrix from the last commit (identity before the first one)
    pub fn committed_matrix(&self, key: BodyKey) -> Option<Mat4> {
        if !self.bodies.contains_key(key) {
            return None;
        }
        Some(self.committed.get(key).copied().unwrap_or(mat4::IDENTITY))
    }
}
