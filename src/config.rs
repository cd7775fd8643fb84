//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`TREMOR_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};
use tremor_physics::{PhysicsMaterial, QuakeParams};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Scene configuration
    #[serde(default)]
    pub scene: SceneConfig,
    /// Physics configuration
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Ground shaking configuration
    #[serde(default)]
    pub quake: QuakeConfig,
    /// Frame loop configuration
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`TREMOR_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Load user config (optional)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // TREMOR_QUAKE__AMPLITUDE=0.5 -> quake.amplitude = 0.5
        figment = figment.merge(Env::prefixed("TREMOR_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }

    /// Physics parameters for the simulation core
    pub fn to_physics_config(&self) -> tremor_physics::PhysicsConfig {
        let p = &self.physics;
        tremor_physics::PhysicsConfig {
            gravity: p.gravity,
            linear_damping: p.linear_damping,
            velocity_epsilon: p.velocity_epsilon,
            material: PhysicsMaterial::new(p.friction, p.restitution),
            rest_speed: p.rest_speed,
            room_margin: p.room_margin,
            shake_coupling: p.shake_coupling,
            shake_spin: p.shake_spin,
        }
    }

    /// Starting shake parameters (negative values clamp to zero)
    pub fn to_quake_params(&self) -> QuakeParams {
        QuakeParams::new(self.quake.amplitude, self.quake.frequency)
    }
}

/// Scene configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// RON scene file; mesh paths inside it resolve against its directory
    pub path: PathBuf,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("scenes/bedroom.ron"),
        }
    }
}

/// Physics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity (negative = downward)
    pub gravity: f32,
    /// Per-frame velocity decay factor
    pub linear_damping: f32,
    /// Speeds below this snap to zero
    pub velocity_epsilon: f32,
    /// Fraction of velocity kept after an impact
    pub restitution: f32,
    /// Horizontal velocity factor on floor contact
    pub friction: f32,
    /// Vertical speed below which floor bounces stop
    pub rest_speed: f32,
    /// Wall clearance for initial placement
    pub room_margin: f32,
    /// Shake force scale
    pub shake_coupling: f32,
    /// Shake yaw torque scale
    pub shake_spin: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let core = tremor_physics::PhysicsConfig::default();
        Self {
            gravity: core.gravity,
            linear_damping: core.linear_damping,
            velocity_epsilon: core.velocity_epsilon,
            restitution: core.material.restitution,
            friction: core.material.friction,
            rest_speed: core.rest_speed,
            room_margin: core.room_margin,
            shake_coupling: core.shake_coupling,
            shake_spin: core.shake_spin,
        }
    }
}

/// Ground shaking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuakeConfig {
    /// Displacement amplitude (world units)
    pub amplitude: f32,
    /// Angular frequency (radians per second)
    pub frequency: f32,
    /// Change applied by one press of a tuning key
    pub step: f32,
    /// Start with shaking on
    pub enabled: bool,
}

impl Default for QuakeConfig {
    fn default() -> Self {
        let params = QuakeParams::default();
        Self {
            amplitude: params.amplitude(),
            frequency: params.frequency(),
            step: 0.1,
            enabled: true,
        }
    }
}

/// Frame loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed timestep in seconds; wall-clock time is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_timestep: Option<f32>,
    /// Stop after this many frames; run until exit when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_limit: Option<u64>,
    /// Frames between summary log lines
    pub log_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: None,
            frame_limit: None,
            log_interval: 120,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Include BVH boxes in render snapshots
    pub show_bvh: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            show_bvh: false,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
