//! Global contact response coefficients

use serde::{Deserialize, Serialize};

/// Contact response shared by every body in the world
///
/// There is one material per world, not one per body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsMaterial {
    /// Fraction of horizontal velocity kept after a floor hit (1.0 = no friction)
    pub friction: f32,
    /// Restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub restitution: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            friction: 0.8,
            restitution: 0.6,
        }
    }
}

impl PhysicsMaterial {
    /// Create a new material
    ///
    /// Values are clamped to the range [0.0, 1.0].
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction: friction.clamp(0.0, 1.0),
            restitution: restitution.clamp(0.0, 1.0),
        }
    }
}
