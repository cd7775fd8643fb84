//! Rigid body state and force application

use std::sync::Arc;

use crate::aabb::Aabb;
use crate::shapes::CollisionShape;
use crate::transform::BodyTransform;
use tremor_math::mat4::{self, Mat4};
use tremor_math::Vec3;
use slotmap::new_key_type;

// Define generational key type for rigid bodies
new_key_type! {
    /// Key to a rigid body in the physics world
    ///
    /// Uses generational indexing to prevent the ABA problem where a handle
    /// could point to a reused slot. If a body is removed and its slot reused,
    /// old keys will return None instead of pointing to the wrong body.
    pub struct BodyKey;
}

/// Default multiplicative decay of the yaw rate per frame
pub const DEFAULT_ANGULAR_DAMPING: f32 = 0.95;

/// Type of physics body
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BodyType {
    /// Affected by forces and collisions
    #[default]
    Dynamic,
    /// Never moves through physics (the room, fixed props)
    Static,
}

/// Physical state of one model instance
///
/// Physics never edits the designer-authored base transform. Integration
/// accumulates into `displaced_position` and `spin`, which are applied
/// outside the base when the world matrix is built.
#[derive(Clone, Debug)]
pub struct RigidBody {
    /// Mass of the body; must be positive for the body to respond to forces
    pub mass: f32,
    /// Linear velocity in world space (units per second)
    pub velocity: Vec3,
    /// Angular velocity in radians per second; only `y` is driven
    pub angular_velocity: Vec3,
    /// Multiplicative decay applied to `angular_velocity` each frame, in [0, 1]
    pub angular_damping: f32,
    /// Accumulated physics offset applied outside the base transform
    pub displaced_position: Vec3,
    /// Accumulated yaw about the body's own origin (radians)
    pub spin: f32,
    /// Dynamic or static
    pub body_type: BodyType,
    /// Base placement and transient effect
    pub transform: BodyTransform,
    shape: Arc<CollisionShape>,
}

impl RigidBody {
    /// Create a dynamic body with unit mass and zero velocity
    pub fn new(shape: Arc<CollisionShape>, transform: BodyTransform) -> Self {
        Self {
            mass: 1.0,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            angular_damping: DEFAULT_ANGULAR_DAMPING,
            displaced_position: Vec3::ZERO,
            spin: 0.0,
            body_type: BodyType::Dynamic,
            transform,
            shape,
        }
    }

    /// Create a static body
    pub fn new_static(shape: Arc<CollisionShape>, transform: BodyTransform) -> Self {
        Self::new(shape, transform).with_body_type(BodyType::Static)
    }

    /// Set the mass of this body
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Set the velocity of this body
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the angular damping factor (clamped to [0, 1])
    pub fn with_angular_damping(mut self, damping: f32) -> Self {
        self.angular_damping = damping.clamp(0.0, 1.0);
        self
    }

    /// Set the body type
    pub fn with_body_type(mut self, body_type: BodyType) -> Self {
        self.body_type = body_type;
        self
    }

    /// The collision shape shared with other instances of the same mesh
    pub fn shape(&self) -> &Arc<CollisionShape> {
        &self.shape
    }

    /// Check if this body is static
    #[inline]
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    /// Check if this body is dynamic
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    /// True for dynamic bodies with a usable mass
    ///
    /// Zero, negative and non-finite masses make the body behave as static.
    #[inline]
    pub fn is_movable(&self) -> bool {
        self.is_dynamic() && self.mass > 0.0 && self.mass.is_finite()
    }

    /// `1 / mass` for movable bodies, zero otherwise
    pub fn inverse_mass(&self) -> f32 {
        if self.is_movable() {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    /// `velocity += (force / mass) * dt`
    ///
    /// Returns false and leaves the body untouched if it is not movable.
    pub fn apply_force(&mut self, force: Vec3, dt: f32) -> bool {
        if !self.is_movable() {
            log::debug!("force rejected on immovable body (mass {})", self.mass);
            return false;
        }
        self.velocity += force / self.mass * dt;
        true
    }

    /// Gravity as a force of `mass * gravity`
    pub fn apply_gravity(&mut self, gravity: Vec3, dt: f32) -> bool {
        self.apply_force(gravity * self.mass, dt)
    }

    /// Instantaneous change of momentum: `velocity += impulse / mass`
    pub fn apply_impulse(&mut self, impulse: Vec3) -> bool {
        if !self.is_movable() {
            log::debug!("impulse rejected on immovable body (mass {})", self.mass);
            return false;
        }
        self.velocity += impulse * self.inverse_mass();
        true
    }

    /// Torque about the vertical axis
    pub fn apply_torque(&mut self, torque_y: f32, dt: f32) -> bool {
        if !self.is_movable() {
            return false;
        }
        self.angular_velocity.y += torque_y / self.mass * dt;
        true
    }

    /// Decay both velocities and snap them to zero below `epsilon`
    pub fn apply_damping(&mut self, linear_factor: f32, epsilon: f32) {
        self.velocity *= linear_factor;
        if self.velocity.length() < epsilon {
            self.velocity = Vec3::ZERO;
        }

        self.angular_velocity *= self.angular_damping;
        if self.angular_velocity.length() < epsilon {
            self.angular_velocity = Vec3::ZERO;
        }
    }

    /// Advance the physics offset and yaw by one step
    pub fn integrate(&mut self, dt: f32) {
        self.displaced_position += self.velocity * dt;
        self.spin += self.angular_velocity.y * dt;
    }

    /// Apply a positional correction (e.g., from collision resolution)
    pub fn apply_correction(&mut self, correction: Vec3) {
        self.displaced_position += correction;
    }

    /// World matrix: `effect · T(displaced) · translate · Ry(spin) · rotate · scale`
    pub fn world_matrix(&self) -> Mat4 {
        let placed = mat4::mul(
            mat4::translation(self.displaced_position),
            self.transform.base_with_yaw(self.spin),
        );
        mat4::mul(self.transform.effect(), placed)
    }

    /// World-space box of the whole body
    pub fn global_bounds(&self) -> Aabb {
        self.shape.global_bounds(&self.world_matrix())
    }

    /// Reference position of the body: the center of its world box
    pub fn position(&self) -> Vec3 {
        self.global_bounds().center()
    }
}
