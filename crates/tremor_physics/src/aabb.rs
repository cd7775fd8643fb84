//! Axis-aligned bounding boxes
//!
//! Boxes are value types: every operation returns a new box instead of
//! mutating in place, and every box is derived from vertex extents or from a
//! stored box pushed through a matrix.

use tremor_math::mat4::{self, Mat4};
use tremor_math::Vec3;

/// A 3D axis-aligned bounding box
///
/// Invariant: `min <= max` componentwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner (all components are minimums)
    pub min: Vec3,
    /// Maximum corner (all components are maximums)
    pub max: Vec3,
}

impl Aabb {
    /// Zero-extent box at the origin, used when there is nothing to bound
    pub const ZERO: Self = Self {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        debug_assert!(
            min.x <= max.x && min.y <= max.y && min.z <= max.z,
            "invalid AABB: min {:?} > max {:?}",
            min,
            max
        );
        Self { min, max }
    }

    /// Create an AABB centered at a position with given half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Tight box around a set of points, or `None` for an empty set
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min_components(*p), hi.max_components(*p)));
        Some(Self { min, max })
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents (half the size in each dimension)
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Get the full size in each dimension
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min_components(other.min),
            max: self.max.max_components(other.max),
        }
    }

    /// Check if a point is inside or on the AABB
    pub fn contains_point(&self, point: Vec3) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    /// Translate the AABB by a delta
    pub fn translated(&self, delta: Vec3) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// The eight corners of the box
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
        ]
    }

    /// Box bounding this box after transformation by `matrix`
    ///
    /// All eight corners go through the matrix and the result is their
    /// componentwise min/max, so it stays valid under rotation and under the
    /// reflection a negative scale introduces.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let corners = self.corners();
        let first = mat4::transform_point(matrix, corners[0]);
        let (min, max) = corners[1..].iter().fold((first, first), |(lo, hi), c| {
            let p = mat4::transform_point(matrix, *c);
            (lo.min_components(p), hi.max_components(p))
        });
        Self { min, max }
    }

    /// Closed-interval overlap test: touching faces count as overlapping
    pub fn overlaps(&self, other: &Self) -> bool {
        (0..3).all(|axis| self.min[axis] <= other.max[axis] && self.max[axis] >= other.min[axis])
    }

    /// True if `self` lies completely inside `outer`
    pub fn is_inside(&self, outer: &Self) -> bool {
        (0..3).all(|axis| self.min[axis] >= outer.min[axis] && self.max[axis] <= outer.max[axis])
    }

    /// Per-axis overlap depth: `min(maxA, maxB) - max(minA, minB)`
    ///
    /// Components are negative on axes where the boxes are apart.
    pub fn penetration(&self, other: &Self) -> Vec3 {
        self.max.min_components(other.max) - self.min.max_components(other.min)
    }

    /// Minimum translation vector that moves `other` out of `self`
    ///
    /// The displacement lies on a single axis: the one needing the smallest
    /// push, ties going to x, then y, then z. After translating `other` by the
    /// result the boxes at most touch.
    ///
    /// Precondition: the boxes overlap. Callers gate on [`Aabb::overlaps`];
    /// for separated boxes the result is meaningless.
    pub fn minimum_translation(&self, other: &Self) -> Vec3 {
        debug_assert!(self.overlaps(other), "minimum_translation on separated boxes");

        let mut best = Vec3::ZERO;
        let mut best_depth = f32::INFINITY;

        for axis in 0..3 {
            // Push `other` past our max face, or back past our min face
            let forward = self.max[axis] - other.min[axis];
            let backward = other.max[axis] - self.min[axis];

            let (depth, sign) = if forward < backward {
                (forward, 1.0)
            } else if backward < forward {
                (backward, -1.0)
            } else if other.center()[axis] >= self.center()[axis] {
                (forward, 1.0)
            } else {
                (backward, -1.0)
            };

            if depth < best_depth {
                best_depth = depth;
                best = Vec3::unit(axis) * (depth * sign);
            }
        }

        best
    }

    /// Per-axis correction that moves `self` at least `margin` inside `room`
    ///
    /// Axes that already respect the margin contribute zero. When a box is
    /// too large to fit on an axis the min side wins.
    pub fn translate_to_inside(&self, room: &Self, margin: f32) -> Vec3 {
        let mut correction = Vec3::ZERO;

        for axis in 0..3 {
            let low = room.min[axis] + margin;
            let high = room.max[axis] - margin;

            if self.min[axis] < low {
                correction[axis] = low - self.min[axis];
            } else if self.max[axis] > high {
                correction[axis] = high - self.max[axis];
            }
        }

        correction
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::ZERO
    }
}
