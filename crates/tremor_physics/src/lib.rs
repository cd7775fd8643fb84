//! Rigid body physics for tremor
//!
//! This crate provides the collision and physics core, including:
//! - Axis-aligned boxes and per-mesh bounding volume hierarchies
//! - Rigid body state with separate base placement and transient effect
//! - Room containment and pairwise narrow-phase collision response
//! - A deterministic ground shaking disturbance
//! - A frame integrator driving it all in a fixed order

pub mod aabb;
pub mod body;
pub mod bvh;
pub mod collision;
pub mod integrator;
pub mod material;
pub mod quake;
pub mod shapes;
pub mod transform;
pub mod world;

// Re-export commonly used types
pub use aabb::Aabb;
pub use body::{BodyKey, BodyType, RigidBody};
pub use bvh::{Bvh, BvhNode, LEAF_SIZE, MAX_DEPTH};
pub use collision::{bvh_contact, collide_with_room, resolve_pair, shape_contact, Contact, RoomResponse};
pub use integrator::{FrameIntegrator, FrameReport, IntegratorState};
pub use material::PhysicsMaterial;
pub use quake::{Quake, QuakeParams};
pub use shapes::{CollisionShape, MeshCollider};
pub use transform::BodyTransform;
pub use world::{PhysicsConfig, PhysicsWorld};
