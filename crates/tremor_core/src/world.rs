//! World container for models
//!
//! The World instantiates a scene into a physics world, drives the frame
//! integrator and publishes what a renderer needs after each tick.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use bitflags::bitflags;
use tremor_math::Mat4;
use tremor_physics::{
    Aabb, BodyKey, BodyType, CollisionShape, FrameIntegrator, FrameReport, PhysicsConfig, PhysicsWorld, Quake,
    QuakeParams, RigidBody,
};

use crate::scene::{scene_dir, ModelTemplate, Scene, SceneError};

bitflags! {
    /// Role of a model in the scene
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ModelFlags: u8 {
        /// The static containment volume
        const ROOM = 1 << 0;
        /// Moved by forces and collisions
        const DYNAMIC = 1 << 1;
    }
}

bitflags! {
    /// Flags indicating which parts of a model changed since the last frame
    ///
    /// A renderer only needs to re-upload models that are dirty.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        /// No changes
        const NONE = 0;
        /// World matrix has changed
        const TRANSFORM = 1 << 0;
        /// Model was just added
        const CREATED = 1 << 1;
        /// All flags set
        const ALL = Self::TRANSFORM.bits() | Self::CREATED.bits();
    }
}

/// A named model backed by a physics body
#[derive(Clone, Debug)]
pub struct Model {
    /// Name from the scene file
    pub name: String,
    /// The model's physics body
    pub body: BodyKey,
    /// Role flags
    pub flags: ModelFlags,
    dirty: DirtyFlags,
    published: Option<Mat4>,
}

impl Model {
    /// Check if this model has changed since the last frame
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Get the current dirty flags
    #[inline]
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty
    }

    /// Clear all dirty flags
    pub fn clear_dirty(&mut self) {
        self.dirty = DirtyFlags::NONE;
    }
}

/// A world-space hierarchy box for debug drawing
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugBox {
    /// Depth of the node in its tree (root is 0)
    pub depth: usize,
    /// True for leaf nodes
    pub leaf: bool,
    /// Node box after the model's world matrix
    pub bounds: Aabb,
}

/// What a renderer draws for one model
#[derive(Clone, Debug, PartialEq)]
pub struct RenderModel {
    pub name: String,
    /// Committed world matrix (`effect · base`, after physics)
    pub matrix: Mat4,
    /// Hierarchy boxes, empty unless BVH drawing is enabled
    pub bvh_boxes: Vec<DebugBox>,
}

/// Fully committed frame state, safe to hand to a renderer
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderSnapshot {
    /// Number of ticks completed
    pub frame: u64,
    pub models: Vec<RenderModel>,
}

/// The simulated scene
pub struct World {
    models: Vec<Model>,
    physics: PhysicsWorld,
    integrator: FrameIntegrator,
    shapes: HashMap<String, Arc<CollisionShape>>,
    frame: u64,
    show_bvh: bool,
}

impl World {
    /// Create an empty world
    pub fn new(config: PhysicsConfig, quake: QuakeParams) -> Self {
        Self {
            models: Vec::new(),
            physics: PhysicsWorld::with_config(config),
            integrator: FrameIntegrator::new(Quake::new(quake)),
            shapes: HashMap::new(),
            frame: 0,
            show_bvh: false,
        }
    }

    /// Load a scene file and instantiate it
    ///
    /// Mesh paths resolve against the scene file's directory.
    pub fn load<P: AsRef<Path>>(path: P, config: PhysicsConfig, quake: QuakeParams) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let scene = Scene::load(path)?;
        Self::from_scene(&scene, &scene_dir(path), config, quake)
    }

    /// Instantiate a scene
    pub fn from_scene(
        scene: &Scene,
        base_dir: &Path,
        config: PhysicsConfig,
        quake: QuakeParams,
    ) -> Result<Self, SceneError> {
        let mut world = Self::new(config, quake);

        let room = world.add_model(&scene.room, base_dir, ModelFlags::ROOM)?;
        world.physics.set_room(room);

        for template in &scene.models {
            world.add_model(template, base_dir, ModelFlags::DYNAMIC)?;
        }

        log::info!(
            "scene '{}' loaded: {} models, {} distinct shapes",
            scene.name,
            world.models.len(),
            world.shapes.len()
        );
        Ok(world)
    }

    /// Add one model, sharing collision shapes between identical meshes
    pub fn add_model(
        &mut self,
        template: &ModelTemplate,
        base_dir: &Path,
        flags: ModelFlags,
    ) -> Result<BodyKey, SceneError> {
        template.validate()?;

        let key = template.mesh.cache_key(base_dir);
        let shape = match self.shapes.get(&key) {
            Some(shape) => Arc::clone(shape),
            None => {
                let mesh = template.mesh.load(base_dir)?;
                let shape = Arc::new(mesh.to_collision_shape());
                self.shapes.insert(key, Arc::clone(&shape));
                shape
            }
        };

        let body_type = if flags.contains(ModelFlags::DYNAMIC) {
            BodyType::Dynamic
        } else {
            BodyType::Static
        };
        let mut body = RigidBody::new(shape, template.to_transform())
            .with_mass(template.mass)
            .with_body_type(body_type);
        if let Some(velocity) = template.velocity {
            body = body.with_velocity(velocity);
        }
        if body.is_dynamic() && !body.is_movable() {
            log::warn!("model '{}' has mass {}; it will not move", template.name, template.mass);
        }

        let body = self.physics.add_body(body);
        self.models.push(Model {
            name: template.name.clone(),
            body,
            flags,
            dirty: DirtyFlags::ALL,
            published: None,
        });
        Ok(body)
    }

    /// Advance the simulation and mark models whose matrix changed
    pub fn update(&mut self, dt: f32) -> FrameReport {
        let report = self.integrator.tick(&mut self.physics, dt);
        self.frame += 1;

        for model in &mut self.models {
            let matrix = self.physics.committed_matrix(model.body);
            if matrix != model.published {
                model.dirty |= DirtyFlags::TRANSFORM;
                model.published = matrix;
            }
        }

        report
    }

    /// Committed state of every model for drawing
    pub fn render_snapshot(&self) -> RenderSnapshot {
        let models = self
            .models
            .iter()
            .filter_map(|model| {
                let matrix = self.physics.committed_matrix(model.body)?;
                let bvh_boxes = if self.show_bvh {
                    self.physics
                        .get_body(model.body)
                        .map(|body| debug_boxes(body.shape(), &matrix))
                        .unwrap_or_default()
                } else {
                    Vec::new()
                };
                Some(RenderModel {
                    name: model.name.clone(),
                    matrix,
                    bvh_boxes,
                })
            })
            .collect();

        RenderSnapshot {
            frame: self.frame,
            models,
        }
    }

    /// All models
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// Look up a model by name
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    /// The physics body of a named model
    pub fn body(&self, name: &str) -> Option<&RigidBody> {
        self.model(name).and_then(|m| self.physics.get_body(m.body))
    }

    /// Models changed since their flags were last cleared
    pub fn dirty_models(&self) -> impl Iterator<Item = &Model> {
        self.models.iter().filter(|m| m.is_dirty())
    }

    /// Clear every model's dirty flags
    pub fn clear_dirty(&mut self) {
        for model in &mut self.models {
            model.clear_dirty();
        }
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    pub fn integrator(&self) -> &FrameIntegrator {
        &self.integrator
    }

    /// Shaking parameters, for live tuning between frames
    pub fn quake_params_mut(&mut self) -> &mut QuakeParams {
        &mut self.integrator.quake_mut().params
    }

    /// Turn shaking on or off; returns the new state
    pub fn toggle_quake(&mut self) -> bool {
        self.integrator.quake_mut().toggle()
    }

    /// Whether snapshots include hierarchy boxes
    pub fn show_bvh(&self) -> bool {
        self.show_bvh
    }

    pub fn set_show_bvh(&mut self, show: bool) {
        self.show_bvh = show;
    }

    /// Flip hierarchy drawing; returns the new state
    pub fn toggle_bvh(&mut self) -> bool {
        self.show_bvh = !self.show_bvh;
        self.show_bvh
    }

    /// Number of completed ticks
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// Every hierarchy node of a shape, in world space
fn debug_boxes(shape: &CollisionShape, matrix: &Mat4) -> Vec<DebugBox> {
    let mut boxes = Vec::new();
    for mesh in shape.meshes() {
        mesh.bvh.visit(|node, depth| {
            boxes.push(DebugBox {
                depth,
                leaf: node.is_leaf(),
                bounds: node.bounds().transformed(matrix),
            });
        });
    }
    boxes
}
