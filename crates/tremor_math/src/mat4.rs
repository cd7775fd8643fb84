//! 4x4 Matrix utilities for 3D affine transformations
//!
//! Matrices are homogeneous, column-major (`m[column][row]`), and follow the
//! usual graphics convention: `mul(a, b)` applies `b` first, then `a`. A model
//! placement built as `translate · rotate · scale` therefore scales first.

use crate::Vec3;

/// 4x4 matrix type (column-major)
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Create a translation matrix
pub fn translation(offset: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    m[3][0] = offset.x;
    m[3][1] = offset.y;
    m[3][2] = offset.z;
    m
}

/// Create a non-uniform scaling matrix
///
/// Negative components are allowed and produce a reflection.
pub fn scaling(factors: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    m[0][0] = factors.x;
    m[1][1] = factors.y;
    m[2][2] = factors.z;
    m
}

/// Rotation of `angle` radians about an arbitrary axis (right-handed).
///
/// A zero-length axis yields the identity.
pub fn axis_rotation(angle: f32, axis: Vec3) -> Mat4 {
    let n = axis.normalized();
    if n == Vec3::ZERO {
        return IDENTITY;
    }

    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;
    let (x, y, z) = (n.x, n.y, n.z);

    [
        [t * x * x + c, t * x * y + s * z, t * x * z - s * y, 0.0],
        [t * x * y - s * z, t * y * y + c, t * y * z + s * x, 0.0],
        [t * x * z + s * y, t * y * z - s * x, t * z * z + c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Rotation about the +Y axis (yaw)
#[inline]
pub fn rotation_y(angle: f32) -> Mat4 {
    axis_rotation(angle, Vec3::Y)
}

/// Multiply two 4x4 matrices: result = a * b
///
/// In column-major convention, this applies b first, then a.
#[allow(clippy::needless_range_loop)]
pub fn mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut result = [[0.0f32; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }

    result
}

/// Transform a point (w = 1) by a 4x4 matrix
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0],
        m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1],
        m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
    }

    fn mat_approx_eq(a: Mat4, b: Mat4) -> bool {
        for i in 0..4 {
            for j in 0..4 {
                if !approx_eq(a[i][j], b[i][j]) {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn test_identity() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(vec_approx_eq(transform_point(&IDENTITY, p), p));
    }

    #[test]
    fn test_translation_moves_points() {
        let m = translation(Vec3::new(1.0, 2.0, 3.0));
        assert!(vec_approx_eq(transform_point(&m, Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0)));
        assert!(vec_approx_eq(transform_point(&m, Vec3::X), Vec3::new(2.0, 2.0, 3.0)));
    }

    #[test]
    fn test_scaling() {
        let m = scaling(Vec3::new(2.0, -1.0, 0.5));
        let p = transform_point(&m, Vec3::ONE);
        assert!(vec_approx_eq(p, Vec3::new(2.0, -1.0, 0.5)));
    }

    #[test]
    fn test_rotation_y() {
        let m = rotation_y(FRAC_PI_2);
        // +X rotates to -Z about +Y (right-handed)
        let result = transform_point(&m, Vec3::X);
        assert!(vec_approx_eq(result, -Vec3::Z), "got {:?}", result);
        let result = transform_point(&m, Vec3::Y);
        assert!(vec_approx_eq(result, Vec3::Y));
    }

    #[test]
    fn test_axis_rotation_normalizes_axis() {
        let a = axis_rotation(0.7, Vec3::new(0.0, 3.0, 0.0));
        assert!(mat_approx_eq(a, rotation_y(0.7)));
    }

    #[test]
    fn test_axis_rotation_about_z() {
        let m = axis_rotation(FRAC_PI_2, Vec3::Z);
        let result = transform_point(&m, Vec3::X);
        assert!(vec_approx_eq(result, Vec3::Y), "got {:?}", result);
    }

    #[test]
    fn test_axis_rotation_zero_axis_is_identity() {
        assert!(mat_approx_eq(axis_rotation(1.0, Vec3::ZERO), IDENTITY));
    }

    #[test]
    fn test_mul_order() {
        // translate · scale: scale first, then translate
        let m = mul(translation(Vec3::new(10.0, 0.0, 0.0)), scaling(Vec3::splat(2.0)));
        let p = transform_point(&m, Vec3::X);
        assert!(vec_approx_eq(p, Vec3::new(12.0, 0.0, 0.0)));
    }

    #[test]
    fn test_mul_identity() {
        let a = axis_rotation(0.5, Vec3::new(1.0, 1.0, 0.0));
        assert!(mat_approx_eq(mul(IDENTITY, a), a));
        assert!(mat_approx_eq(mul(a, IDENTITY), a));
    }

    #[test]
    fn test_rotation_round_trip() {
        let axis = Vec3::new(0.3, 1.0, -0.2);
        let m = mul(axis_rotation(-0.9, axis), axis_rotation(0.9, axis));
        assert!(mat_approx_eq(m, IDENTITY));
    }
}
