//! Collision detection and response
//!
//! Two kinds of contact are handled here:
//! - bodies against the room, one axis at a time;
//! - body against body, via a lockstep walk over both bounding volume
//!   hierarchies that keeps the single deepest leaf-leaf contact.
//!
//! Everything is a free function over plain data so the world can call it
//! with whatever borrows it holds.

use tremor_math::{Mat4, Vec3};

use crate::aabb::Aabb;
use crate::body::RigidBody;
use crate::bvh::{Bvh, BvhNode};
use crate::material::PhysicsMaterial;
use crate::shapes::CollisionShape;

/// Index of the vertical axis
const UP_AXIS: usize = 1;

/// Contact information from a collision
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Collision normal, a unit axis vector
    pub normal: Vec3,
    /// Penetration depth (positive when colliding)
    pub penetration: f32,
}

impl Contact {
    /// Create a new contact
    pub fn new(normal: Vec3, penetration: f32) -> Self {
        Self { normal, penetration }
    }

    /// Returns true if this represents an actual collision
    #[inline]
    pub fn is_colliding(&self) -> bool {
        self.penetration > 0.0
    }

    /// The same contact with its normal reversed
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            penetration: self.penetration,
        }
    }
}

/// Outcome of resolving one body against the room
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoomResponse {
    /// Translation that brings the body back inside (zero when already inside)
    pub correction: Vec3,
    /// Velocity after any reflection, friction and rest snapping
    pub velocity: Vec3,
    /// True when the body struck the floor moving downward
    pub floor_hit: bool,
}

impl RoomResponse {
    /// True if any axis needed a positional correction
    pub fn is_corrected(&self) -> bool {
        self.correction != Vec3::ZERO
    }
}

/// Resolve a body's box against the room box, one axis at a time
///
/// On each axis where the body pokes out of the room the correction equals
/// the penetration depth. The velocity component is reflected and scaled by
/// restitution only when it still points outward. A floor strike also scales
/// the horizontal components by `material.friction` and snaps small vertical
/// speeds (below `rest_speed`) to zero.
///
/// Corner and edge penetrations are treated as independent axes.
pub fn collide_with_room(
    body: &Aabb,
    room: &Aabb,
    velocity: Vec3,
    material: &PhysicsMaterial,
    rest_speed: f32,
) -> RoomResponse {
    let mut correction = Vec3::ZERO;
    let mut velocity = velocity;
    let mut floor_hit = false;

    for axis in 0..3 {
        if body.min[axis] < room.min[axis] {
            correction[axis] = room.min[axis] - body.min[axis];

            if velocity[axis] < 0.0 {
                velocity[axis] *= -material.restitution;

                if axis == UP_AXIS {
                    floor_hit = true;
                    velocity.x *= material.friction;
                    velocity.z *= material.friction;
                    if velocity.y.abs() < rest_speed {
                        velocity.y = 0.0;
                    }
                }
            }
        } else if body.max[axis] > room.max[axis] {
            correction[axis] = room.max[axis] - body.max[axis];

            if velocity[axis] > 0.0 {
                velocity[axis] *= -material.restitution;
            }
        }
    }

    RoomResponse {
        correction,
        velocity,
        floor_hit,
    }
}

/// Deepest contact between two hierarchies placed by their world matrices
///
/// Walks both trees in lockstep with an explicit work list. Node boxes are
/// transformed on demand and pairs whose boxes miss are pruned. Leaf pairs
/// report the axis of least overlap; merely touching leaves are ignored.
///
/// The returned normal is a positive unit axis; orient it with
/// [`orient_normal`] before resolving.
pub fn bvh_contact(a: &Bvh, a_matrix: &Mat4, b: &Bvh, b_matrix: &Mat4) -> Option<Contact> {
    let (a_root, b_root) = (a.root()?, b.root()?);

    let mut deepest: Option<Contact> = None;
    let mut work: Vec<(&BvhNode, &BvhNode)> = vec![(a_root, b_root)];

    while let Some((na, nb)) = work.pop() {
        let box_a = na.bounds().transformed(a_matrix);
        let box_b = nb.bounds().transformed(b_matrix);
        if !box_a.overlaps(&box_b) {
            continue;
        }

        match (na.children(), nb.children()) {
            (None, None) => {
                if let Some(contact) = leaf_contact(&box_a, &box_b) {
                    if deepest.map_or(true, |d| contact.penetration > d.penetration) {
                        deepest = Some(contact);
                    }
                }
            }
            (Some((al, ar)), None) => {
                work.push((al, nb));
                work.push((ar, nb));
            }
            (None, Some((bl, br))) => {
                work.push((na, bl));
                work.push((na, br));
            }
            (Some((al, ar)), Some((bl, br))) => {
                work.push((al, bl));
                work.push((al, br));
                work.push((ar, bl));
                work.push((ar, br));
            }
        }
    }

    deepest
}

/// Axis of minimum overlap between two leaf boxes
fn leaf_contact(a: &Aabb, b: &Aabb) -> Option<Contact> {
    let depth = a.penetration(b);

    let mut axis = 0;
    for candidate in 1..3 {
        if depth[candidate] < depth[axis] {
            axis = candidate;
        }
    }

    if depth[axis] <= 0.0 {
        return None;
    }
    Some(Contact::new(Vec3::unit(axis), depth[axis]))
}

/// Deepest contact over every (mesh, mesh) pair of two shapes
pub fn shape_contact(
    a: &CollisionShape,
    a_matrix: &Mat4,
    b: &CollisionShape,
    b_matrix: &Mat4,
) -> Option<Contact> {
    let mut deepest: Option<Contact> = None;

    for mesh_a in a.meshes() {
        for mesh_b in b.meshes() {
            if let Some(contact) = bvh_contact(&mesh_a.bvh, a_matrix, &mesh_b.bvh, b_matrix) {
                if deepest.map_or(true, |d| contact.penetration > d.penetration) {
                    deepest = Some(contact);
                }
            }
        }
    }

    deepest
}

/// Point `contact.normal` from `b_position` toward `a_position`
pub fn orient_normal(contact: Contact, a_position: Vec3, b_position: Vec3) -> Contact {
    if contact.normal.dot(a_position - b_position) < 0.0 {
        contact.flipped()
    } else {
        contact
    }
}

/// Separate two bodies and exchange momentum along an oriented contact
///
/// `contact.normal` must point from `b` toward `a`. The positional
/// correction is shared in proportion to inverse mass. An impulse is only
/// applied while the bodies approach along the normal.
///
/// Returns false when neither body can move.
pub fn resolve_pair(a: &mut RigidBody, b: &mut RigidBody, contact: &Contact, restitution: f32) -> bool {
    let inv_a = a.inverse_mass();
    let inv_b = b.inverse_mass();
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return false;
    }

    let push = contact.normal * contact.penetration;
    a.apply_correction(push * (inv_a / inv_sum));
    b.apply_correction(-(push * (inv_b / inv_sum)));

    let approach = (a.velocity - b.velocity).dot(contact.normal);
    if approach < 0.0 {
        let j = -(1.0 + restitution) * approach / inv_sum;
        let impulse = contact.normal * j;
        a.apply_impulse(impulse);
        b.apply_impulse(-impulse);
        log::trace!("pair impulse {:.4} along {:?}", j, contact.normal);
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::BodyTransform;
    use std::sync::Arc;
    use tremor_math::mat4::{self, IDENTITY};

    const EPSILON: f32 = 1e-5;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn unit_cube() -> Arc<CollisionShape> {
        Arc::new(CollisionShape::cuboid(Vec3::splat(0.5)))
    }

    fn cube_at(x: f32, velocity: Vec3) -> RigidBody {
        RigidBody::new(unit_cube(), BodyTransform::from_translation(Vec3::new(x, 0.0, 0.0)))
            .with_velocity(velocity)
    }

    // ===== Room Tests =====

    fn room() -> Aabb {
        Aabb::new(Vec3::splat(-10.0), Vec3::splat(10.0))
    }

    #[test]
    fn test_room_inside_is_untouched() {
        let body = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let v = Vec3::new(1.0, -2.0, 3.0);
        let resp = collide_with_room(&body, &room(), v, &PhysicsMaterial::default(), 0.05);
        assert!(!resp.is_corrected());
        assert!(!resp.floor_hit);
        assert_eq!(resp.velocity, v);
    }

    #[test]
    fn test_room_floor_hit() {
        let material = PhysicsMaterial::new(0.8, 0.6);
        // min.y = -10.25, penetration 0.25
        let body = Aabb::from_center_half_extents(Vec3::new(0.0, -9.25, 0.0), Vec3::ONE);
        let v = Vec3::new(2.0, -5.0, -1.0);

        let resp = collide_with_room(&body, &room(), v, &material, 0.05);

        assert!(resp.floor_hit);
        assert!(approx(resp.correction.y, 0.25));
        assert_eq!(resp.correction.x, 0.0);
        assert_eq!(resp.correction.z, 0.0);
        assert!(approx(resp.velocity.y, 3.0));
        assert!(approx(resp.velocity.x, 1.6));
        assert!(approx(resp.velocity.z, -0.8));
    }

    #[test]
    fn test_room_floor_rest_snap() {
        let material = PhysicsMaterial::new(0.8, 0.6);
        let body = Aabb::from_center_half_extents(Vec3::new(0.0, -9.01, 0.0), Vec3::ONE);
        let resp = collide_with_room(&body, &room(), Vec3::new(0.0, -0.05, 0.0), &material, 0.05);
        assert!(resp.floor_hit);
        assert_eq!(resp.velocity.y, 0.0);
    }

    #[test]
    fn test_room_correction_without_outward_velocity() {
        let body = Aabb::from_center_half_extents(Vec3::new(9.5, 0.0, 0.0), Vec3::ONE);
        let v = Vec3::new(-1.0, 0.0, 0.0);
        let resp = collide_with_room(&body, &room(), v, &PhysicsMaterial::default(), 0.05);

        assert!(approx(resp.correction.x, -0.5));
        assert_eq!(resp.velocity, v, "inward velocity is not reflected");
    }

    #[test]
    fn test_room_ceiling_reflects_without_friction() {
        let material = PhysicsMaterial::new(0.5, 0.5);
        let body = Aabb::from_center_half_extents(Vec3::new(0.0, 9.5, 0.0), Vec3::ONE);
        let resp = collide_with_room(&body, &room(), Vec3::new(2.0, 4.0, 0.0), &material, 0.05);

        assert!(!resp.floor_hit);
        assert!(approx(resp.correction.y, -0.5));
        assert!(approx(resp.velocity.y, -2.0));
        assert_eq!(resp.velocity.x, 2.0);
    }

    #[test]
    fn test_room_corner_resolves_axes_independently() {
        let body = Aabb::from_center_half_extents(Vec3::new(-9.5, 0.0, 9.8), Vec3::ONE);
        let resp = collide_with_room(
            &body,
            &room(),
            Vec3::new(-1.0, 0.0, 1.0),
            &PhysicsMaterial::new(1.0, 1.0),
            0.0,
        );
        assert!(approx(resp.correction.x, 0.5));
        assert!(approx(resp.correction.z, -0.8));
        assert!(approx(resp.velocity.x, 1.0));
        assert!(approx(resp.velocity.z, -1.0));
    }

    // ===== BVH Contact Tests =====

    #[test]
    fn test_bvh_contact_overlap() {
        let shape = CollisionShape::cuboid(Vec3::splat(0.5));
        let bvh = &shape.meshes()[0].bvh;
        let mb = mat4::translation(Vec3::new(0.5, 0.1, 0.0));

        let contact = bvh_contact(bvh, &IDENTITY, bvh, &mb).unwrap();
        assert_eq!(contact.normal, Vec3::X);
        assert!(approx(contact.penetration, 0.5));
    }

    #[test]
    fn test_bvh_contact_touching_is_not_collision() {
        let shape = CollisionShape::cuboid(Vec3::splat(0.5));
        let bvh = &shape.meshes()[0].bvh;
        let mb = mat4::translation(Vec3::new(1.0, 0.0, 0.0));
        assert!(bvh_contact(bvh, &IDENTITY, bvh, &mb).is_none());
    }

    #[test]
    fn test_bvh_contact_separated() {
        let shape = CollisionShape::cuboid(Vec3::splat(0.5));
        let bvh = &shape.meshes()[0].bvh;
        let mb = mat4::translation(Vec3::new(0.0, 3.0, 0.0));
        assert!(bvh_contact(bvh, &IDENTITY, bvh, &mb).is_none());
    }

    #[test]
    fn test_bvh_contact_empty_tree() {
        let shape = CollisionShape::cuboid(Vec3::splat(0.5));
        let empty = Bvh::build(&[]);
        assert!(bvh_contact(&empty, &IDENTITY, &shape.meshes()[0].bvh, &IDENTITY).is_none());
    }

    #[test]
    fn test_bvh_contact_deep_trees_keep_deepest() {
        // Two dense point clouds along x; only the overlapping ends touch
        let points: Vec<Vec3> = (0..=400)
            .map(|i| Vec3::new(i as f32 * 0.01, ((i % 7) as f32) * 0.1, ((i % 5) as f32) * 0.1))
            .collect();
        let bvh = Bvh::build(&points);
        assert!(!bvh.root().unwrap().is_leaf());

        let mb = mat4::translation(Vec3::new(3.5, 0.0, 0.0));
        let contact = bvh_contact(&bvh, &IDENTITY, &bvh, &mb).unwrap();
        assert!(contact.is_colliding());
        assert!(contact.penetration <= 0.5 + EPSILON);
    }

    #[test]
    fn test_shape_contact_over_mesh_pairs() {
        use crate::shapes::MeshCollider;
        let near = MeshCollider::from_vertices(&Aabb::new(Vec3::ZERO, Vec3::ONE).corners());
        let far = MeshCollider::from_vertices(&Aabb::new(Vec3::splat(5.0), Vec3::splat(6.0)).corners());
        let a = CollisionShape::new(vec![far, near]);
        let b = CollisionShape::cuboid(Vec3::splat(0.5));

        let mb = mat4::translation(Vec3::new(1.2, 0.5, 0.5));
        let contact = shape_contact(&a, &IDENTITY, &b, &mb).unwrap();
        assert_eq!(contact.normal, Vec3::X);
        assert!(approx(contact.penetration, 0.3));

        assert!(shape_contact(&CollisionShape::default(), &IDENTITY, &b, &mb).is_none());
    }

    #[test]
    fn test_orient_normal() {
        let c = Contact::new(Vec3::X, 0.2);
        let flipped = orient_normal(c, Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(flipped.normal, -Vec3::X);
        let kept = orient_normal(c, Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO);
        assert_eq!(kept.normal, Vec3::X);
    }

    // ===== Pair Resolution Tests =====

    #[test]
    fn test_head_on_unit_cubes() {
        let mut a = cube_at(0.0, Vec3::new(1.0, 0.0, 0.0));
        let mut b = cube_at(0.5, Vec3::new(-1.0, 0.0, 0.0));

        let contact = shape_contact(a.shape(), &a.world_matrix(), b.shape(), &b.world_matrix()).unwrap();
        let contact = orient_normal(contact, a.position(), b.position());
        assert_eq!(contact.normal, -Vec3::X);
        assert!(approx(contact.penetration, 0.5));

        assert!(resolve_pair(&mut a, &mut b, &contact, 0.6));

        assert!(approx(a.displaced_position.x, -0.25));
        assert!(approx(b.displaced_position.x, 0.25));
        assert!(approx(a.velocity.x, -0.6));
        assert!(approx(b.velocity.x, 0.6));
    }

    #[test]
    fn test_equal_mass_transfer_conserves_momentum() {
        let e = 0.6;
        let mut a = cube_at(0.0, Vec3::new(2.0, 0.0, 0.0));
        let mut b = cube_at(0.9, Vec3::ZERO);
        let before = a.velocity.x * a.mass + b.velocity.x * b.mass;

        let contact = Contact::new(-Vec3::X, 0.1);
        resolve_pair(&mut a, &mut b, &contact, e);

        assert!(approx(b.velocity.x, 2.0 * (1.0 + e) / 2.0));
        assert!(approx(a.velocity.x, 2.0 * (1.0 - e) / 2.0));
        let after = a.velocity.x * a.mass + b.velocity.x * b.mass;
        assert!(approx(before, after));
    }

    #[test]
    fn test_heavier_body_moves_less() {
        let mut a = cube_at(0.0, Vec3::ZERO).with_mass(3.0);
        let mut b = cube_at(0.6, Vec3::ZERO).with_mass(1.0);

        resolve_pair(&mut a, &mut b, &Contact::new(-Vec3::X, 0.4), 0.5);

        assert!(approx(a.displaced_position.x, -0.1));
        assert!(approx(b.displaced_position.x, 0.3));
        assert_eq!(a.velocity, Vec3::ZERO, "resting bodies receive no impulse");
    }

    #[test]
    fn test_separating_bodies_get_no_impulse() {
        let mut a = cube_at(0.0, Vec3::new(-1.0, 0.0, 0.0));
        let mut b = cube_at(0.5, Vec3::new(1.0, 0.0, 0.0));

        resolve_pair(&mut a, &mut b, &Contact::new(-Vec3::X, 0.5), 0.6);

        assert_eq!(a.velocity.x, -1.0);
        assert_eq!(b.velocity.x, 1.0);
    }

    #[test]
    fn test_immovable_pair_is_skipped() {
        let mut a = cube_at(0.0, Vec3::X).with_mass(0.0);
        let mut b = cube_at(0.5, -Vec3::X).with_mass(-2.0);

        assert!(!resolve_pair(&mut a, &mut b, &Contact::new(-Vec3::X, 0.5), 0.6));
        assert_eq!(a.displaced_position, Vec3::ZERO);
        assert_eq!(b.velocity, -Vec3::X);
    }
}
