//! Collision shapes built from a model's sub-meshes
//!
//! A model is a list of sub-meshes; each keeps its local box (as supplied by
//! the mesh loader) and a hierarchy built from its vertex positions. The
//! raw vertex data is never consulted again after construction.

use tremor_math::{Mat4, Vec3};

use crate::aabb::Aabb;
use crate::bvh::Bvh;

/// Collision data for a single sub-mesh
#[derive(Clone, Debug)]
pub struct MeshCollider {
    /// Local-space bounds of the whole sub-mesh
    pub local_bounds: Aabb,
    /// Hierarchy over the sub-mesh's vertices
    pub bvh: Bvh,
}

impl MeshCollider {
    /// Build a collider from vertex positions
    ///
    /// An empty vertex list yields an empty tree and a zero-extent box.
    pub fn from_vertices(vertices: &[Vec3]) -> Self {
        Self {
            local_bounds: Aabb::from_points(vertices).unwrap_or_default(),
            bvh: Bvh::build(vertices),
        }
    }

    /// Build a collider from vertex positions and a precomputed local box
    pub fn with_bounds(vertices: &[Vec3], local_bounds: Aabb) -> Self {
        Self {
            local_bounds,
            bvh: Bvh::build(vertices),
        }
    }
}

/// Collision shape of a whole model
#[derive(Clone, Debug, Default)]
pub struct CollisionShape {
    meshes: Vec<MeshCollider>,
}

impl CollisionShape {
    /// Create a shape from per-mesh colliders
    pub fn new(meshes: Vec<MeshCollider>) -> Self {
        Self { meshes }
    }

    /// Shape made of a single axis-aligned box mesh (its 8 corners)
    pub fn cuboid(half_extents: Vec3) -> Self {
        let bounds = Aabb::from_center_half_extents(Vec3::ZERO, half_extents.abs());
        Self::new(vec![MeshCollider::from_vertices(&bounds.corners())])
    }

    /// The sub-mesh colliders
    pub fn meshes(&self) -> &[MeshCollider] {
        &self.meshes
    }

    /// True when the model has no sub-meshes
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Union of the sub-mesh local boxes (zero-extent box when there are none)
    pub fn local_bounds(&self) -> Aabb {
        self.meshes
            .iter()
            .map(|m| m.local_bounds)
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_default()
    }

    /// World-space box: each sub-mesh box is transformed on its own, then merged
    ///
    /// A shape without meshes yields a zero-extent box at the origin.
    pub fn global_bounds(&self, matrix: &Mat4) -> Aabb {
        self.meshes
            .iter()
            .map(|m| m.local_bounds.transformed(matrix))
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_default()
    }
}
