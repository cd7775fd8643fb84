//! Body placement: designer-authored base transform plus a transient effect
//!
//! The base is kept as three separate matrices composed `translate · rotate ·
//! scale`. On top of it sits an effect matrix used for per-frame overlays
//! such as room shaking. The effect is replaced every frame rather than
//! accumulated, and it never feeds back into the base.

use tremor_math::mat4::{self, Mat4, IDENTITY};
use tremor_math::Vec3;

/// Placement of a body in the world
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyTransform {
    translate: Mat4,
    rotate: Mat4,
    scale: Mat4,
    effect: Mat4,
}

impl Default for BodyTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl BodyTransform {
    /// Identity placement with no effect
    pub fn identity() -> Self {
        Self {
            translate: IDENTITY,
            rotate: IDENTITY,
            scale: IDENTITY,
            effect: IDENTITY,
        }
    }

    /// Placement with just a translation
    pub fn from_translation(offset: Vec3) -> Self {
        let mut t = Self::identity();
        t.translate(offset);
        t
    }

    /// Accumulate a translation into the base
    pub fn translate(&mut self, offset: Vec3) {
        self.translate = mat4::mul(self.translate, mat4::translation(offset));
    }

    /// Accumulate a rotation of `degrees` about `axis` into the base
    pub fn rotate(&mut self, degrees: f32, axis: Vec3) {
        self.rotate = mat4::mul(self.rotate, mat4::axis_rotation(degrees.to_radians(), axis));
    }

    /// Accumulate a (possibly non-uniform or negative) scale into the base
    pub fn scale(&mut self, factors: Vec3) {
        self.scale = mat4::mul(self.scale, mat4::scaling(factors));
    }

    /// Builder form of [`BodyTransform::translate`]
    pub fn with_translation(mut self, offset: Vec3) -> Self {
        self.translate(offset);
        self
    }

    /// Builder form of [`BodyTransform::rotate`]
    pub fn with_rotation(mut self, degrees: f32, axis: Vec3) -> Self {
        self.rotate(degrees, axis);
        self
    }

    /// Builder form of [`BodyTransform::scale`]
    pub fn with_scale(mut self, factors: Vec3) -> Self {
        self.scale(factors);
        self
    }

    /// Base translation matrix
    pub fn translate_matrix(&self) -> Mat4 {
        self.translate
    }

    /// Base rotation matrix
    pub fn rotate_matrix(&self) -> Mat4 {
        self.rotate
    }

    /// Base scale matrix
    pub fn scale_matrix(&self) -> Mat4 {
        self.scale
    }

    /// Designer-authored base: `translate · rotate · scale`
    pub fn base(&self) -> Mat4 {
        mat4::mul(self.translate, mat4::mul(self.rotate, self.scale))
    }

    /// Base with a yaw spin inserted about the model's own origin:
    /// `translate · Ry(yaw) · rotate · scale`
    pub fn base_with_yaw(&self, yaw: f32) -> Mat4 {
        if yaw == 0.0 {
            return self.base();
        }
        let spun = mat4::mul(mat4::rotation_y(yaw), mat4::mul(self.rotate, self.scale));
        mat4::mul(self.translate, spun)
    }

    /// The current transient effect
    pub fn effect(&self) -> Mat4 {
        self.effect
    }

    /// Replace the effect (not cumulative)
    pub fn set_effect(&mut self, effect: Mat4) {
        self.effect = effect;
    }

    /// Reset the effect to identity, restoring the pre-effect placement
    pub fn clear_effect(&mut self) {
        self.effect = IDENTITY;
    }

    /// World matrix without physics offsets: `effect · base`
    pub fn matrix(&self) -> Mat4 {
        mat4::mul(self.effect, self.base())
    }
}
