//! Core types for tremor
//!
//! This crate turns files on disk into a running physics world:
//!
//! - [`MeshData`] - OBJ geometry reduced to collision sub-meshes
//! - [`Scene`] - Loadable/saveable room plus model placements
//! - [`ModelTemplate`] - Serializable model placement
//! - [`World`] - Instantiated scene driven by the frame integrator
//! - [`RenderSnapshot`] - Committed per-model state for drawing

mod asset_error;
mod mesh;
mod scene;
mod world;

pub use asset_error::AssetError;
pub use mesh::{MeshData, SubMesh};
pub use scene::{
    scene_dir, MeshSource, ModelTemplate, Rotation, Scene, SceneError, SceneLoadError, SceneSaveError,
};
pub use world::{DebugBox, DirtyFlags, Model, ModelFlags, RenderModel, RenderSnapshot, World};

// Re-export commonly used types for convenience
pub use tremor_math::{Mat4, Vec3};
pub use tremor_physics::{
    Aabb, BodyKey, FrameReport, IntegratorState, PhysicsConfig, PhysicsMaterial, PhysicsWorld, QuakeParams,
    RigidBody,
};
