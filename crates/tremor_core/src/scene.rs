//! Scene serialization
//!
//! Provides Scene struct for loading/saving scenes from RON files.
//! A scene names one static room and the dynamic models placed inside it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tremor_math::Vec3;
use tremor_physics::BodyTransform;

use crate::asset_error::AssetError;
use crate::mesh::MeshData;

/// Where a model's geometry comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MeshSource {
    /// Wavefront OBJ file, relative to the scene file's directory
    Obj { path: String },
    /// Axis-aligned box centered on the model origin
    Cuboid { half_extents: Vec3 },
}

impl MeshSource {
    /// Load or generate the mesh
    pub fn load(&self, base_dir: &Path) -> Result<MeshData, AssetError> {
        match self {
            MeshSource::Obj { path } => MeshData::load(base_dir.join(path)),
            MeshSource::Cuboid { half_extents } => Ok(MeshData::cuboid(*half_extents)),
        }
    }

    /// Reject generated geometry that cannot produce a bounding box
    pub fn validate(&self) -> Result<(), String> {
        match self {
            MeshSource::Obj { path } if path.trim().is_empty() => Err("empty OBJ path".to_string()),
            MeshSource::Cuboid { half_extents } if !half_extents.is_finite() => {
                Err(format!("non-finite cuboid half extents {:?}", half_extents))
            }
            _ => Ok(()),
        }
    }

    /// Key identifying identical geometry, used to share collision shapes
    pub fn cache_key(&self, base_dir: &Path) -> String {
        match self {
            MeshSource::Obj { path } => base_dir.join(path).display().to_string(),
            MeshSource::Cuboid { half_extents } => {
                format!("cuboid:{}:{}:{}", half_extents.x, half_extents.y, half_extents.z)
            }
        }
    }
}

/// A rotation in degrees about an axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub degrees: f32,
    pub axis: Vec3,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

fn unit_mass() -> f32 {
    1.0
}

/// A serializable model placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTemplate {
    /// Name for lookup and logging
    pub name: String,
    /// The model's geometry
    pub mesh: MeshSource,
    /// Base translation
    #[serde(default)]
    pub translation: Vec3,
    /// Rotations, accumulated in order
    #[serde(default)]
    pub rotations: Vec<Rotation>,
    /// Per-axis scale (negative values mirror)
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    /// Mass; zero or negative makes the model immovable
    #[serde(default = "unit_mass")]
    pub mass: f32,
    /// Initial velocity
    #[serde(default)]
    pub velocity: Option<Vec3>,
}

impl ModelTemplate {
    /// Create a template at the origin with unit scale and mass
    pub fn new(name: impl Into<String>, mesh: MeshSource) -> Self {
        Self {
            name: name.into(),
            mesh,
            translation: Vec3::ZERO,
            rotations: Vec::new(),
            scale: Vec3::ONE,
            mass: 1.0,
            velocity: None,
        }
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_rotation(mut self, degrees: f32, axis: Vec3) -> Self {
        self.rotations.push(Rotation { degrees, axis });
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// Build the base transform
    pub fn to_transform(&self) -> BodyTransform {
        let mut transform = BodyTransform::identity();
        transform.translate(self.translation);
        for rotation in &self.rotations {
            transform.rotate(rotation.degrees, rotation.axis);
        }
        transform.scale(self.scale);
        transform
    }

    /// Reject placements that cannot produce an invertible transform
    pub fn validate(&self) -> Result<(), SceneError> {
        let finite = self.translation.is_finite()
            && self.scale.is_finite()
            && self.mass.is_finite()
            && self.velocity.map_or(true, Vec3::is_finite)
            && self.rotations.iter().all(|r| r.degrees.is_finite() && r.axis.is_finite());
        if !finite {
            return Err(SceneError::InvalidModel(format!("{}: non-finite parameter", self.name)));
        }
        if (0..3).any(|axis| self.scale[axis] == 0.0) {
            return Err(SceneError::InvalidModel(format!("{}: zero scale", self.name)));
        }
        self.mesh
            .validate()
            .map_err(|msg| SceneError::InvalidModel(format!("{}: {}", self.name, msg)))
    }
}

/// A serializable scene: one room and the models inside it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene name (for display/debugging)
    pub name: String,
    /// The static model whose box contains everything else
    pub room: ModelTemplate,
    /// Dynamic models
    #[serde(default)]
    pub models: Vec<ModelTemplate>,
}

impl Scene {
    /// Create a new scene with just a room
    pub fn new(name: impl Into<String>, room: ModelTemplate) -> Self {
        Self {
            name: name.into(),
            room,
            models: Vec::new(),
        }
    }

    /// Load a scene from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneLoadError> {
        let contents = fs::read_to_string(path)?;
        let scene = ron::from_str(&contents)?;
        Ok(scene)
    }

    /// Save a scene to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneSaveError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Add a dynamic model to this scene
    pub fn add_model(&mut self, model: ModelTemplate) {
        self.models.push(model);
    }

    /// Builder form of [`Scene::add_model`]
    pub fn with_model(mut self, model: ModelTemplate) -> Self {
        self.add_model(model);
        self
    }
}

/// Directory that relative mesh paths in a scene file resolve against
pub fn scene_dir<P: AsRef<Path>>(scene_path: P) -> PathBuf {
    scene_path
        .as_ref()
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

/// Error loading a scene
#[derive(Debug)]
pub enum SceneLoadError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
}

impl From<io::Error> for SceneLoadError {
    fn from(e: io::Error) -> Self {
        SceneLoadError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneLoadError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneLoadError::Parse(e)
    }
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::Io(e) => write!(f, "IO error: {}", e),
            SceneLoadError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for SceneLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneLoadError::Io(e) => Some(e),
            SceneLoadError::Parse(e) => Some(e),
        }
    }
}

/// Error saving a scene
#[derive(Debug)]
pub enum SceneSaveError {
    /// IO error (permission denied, disk full, etc.)
    Io(io::Error),
    /// Serialization error
    Serialize(ron::Error),
}

impl From<io::Error> for SceneSaveError {
    fn from(e: io::Error) -> Self {
        SceneSaveError::Io(e)
    }
}

impl From<ron::Error> for SceneSaveError {
    fn from(e: ron::Error) -> Self {
        SceneSaveError::Serialize(e)
    }
}

impl std::fmt::Display for SceneSaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneSaveError::Io(e) => write!(f, "IO error: {}", e),
            SceneSaveError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for SceneSaveError {}

/// Error turning a scene into a running world
#[derive(Debug)]
pub enum SceneError {
    /// The scene file could not be read
    Load(SceneLoadError),
    /// A mesh referenced by the scene could not be loaded
    Asset(AssetError),
    /// A model's parameters are unusable
    InvalidModel(String),
}

impl From<SceneLoadError> for SceneError {
    fn from(e: SceneLoadError) -> Self {
        SceneError::Load(e)
    }
}

impl From<AssetError> for SceneError {
    fn from(e: AssetError) -> Self {
        SceneError::Asset(e)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::Load(e) => write!(f, "Scene load error: {}", e),
            SceneError::Asset(e) => write!(f, "{}", e),
            SceneError::InvalidModel(msg) => write!(f, "Invalid model: {}", msg),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Load(e) => Some(e),
            SceneError::Asset(e) => Some(e),
            SceneError::InvalidModel(_) => None,
        }
    }
}
