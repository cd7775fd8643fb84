//! Static bounding volume hierarchy over a mesh's vertices
//!
//! The tree is an object-median split: at each level the vertices are sorted
//! along the axis of greatest extent and cut in half at the median index.
//! Only leaves keep vertices; internal nodes keep just their box. Trees are
//! built once when a mesh is loaded and never refit, so they can be shared
//! between bodies and read from any number of collision queries.

use tremor_math::Vec3;

use crate::aabb::Aabb;

/// Maximum number of vertices stored in a leaf
pub const LEAF_SIZE: usize = 50;

/// Depth at which recursion stops regardless of vertex count (root is depth 0)
pub const MAX_DEPTH: usize = 10;

/// A node in the hierarchy
///
/// Children are exclusively owned, so dropping a node drops its subtree.
#[derive(Clone, Debug)]
pub enum BvhNode {
    /// Leaf holding a vertex subset and its tight bounds
    Leaf { bounds: Aabb, vertices: Vec<Vec3> },
    /// Internal node whose bounds enclose both children
    Internal {
        bounds: Aabb,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    /// Local-space bounds of this node
    pub fn bounds(&self) -> &Aabb {
        match self {
            BvhNode::Leaf { bounds, .. } | BvhNode::Internal { bounds, .. } => bounds,
        }
    }

    /// A node is a leaf iff it has no children
    pub fn is_leaf(&self) -> bool {
        matches!(self, BvhNode::Leaf { .. })
    }

    /// Both children of an internal node
    pub fn children(&self) -> Option<(&BvhNode, &BvhNode)> {
        match self {
            BvhNode::Leaf { .. } => None,
            BvhNode::Internal { left, right, .. } => Some((left, right)),
        }
    }

    /// Vertices stored at a leaf (empty for internal nodes)
    pub fn vertices(&self) -> &[Vec3] {
        match self {
            BvhNode::Leaf { vertices, .. } => vertices,
            BvhNode::Internal { .. } => &[],
        }
    }
}

/// Bounding volume hierarchy for one mesh
#[derive(Clone, Debug, Default)]
pub struct Bvh {
    root: Option<BvhNode>,
}

impl Bvh {
    /// Build a hierarchy with the default leaf size and depth cap
    ///
    /// An empty vertex list gives an empty tree.
    pub fn build(vertices: &[Vec3]) -> Self {
        Self::build_with_limits(vertices, LEAF_SIZE, MAX_DEPTH)
    }

    /// Build a hierarchy with an explicit leaf size and depth cap
    pub fn build_with_limits(vertices: &[Vec3], leaf_size: usize, max_depth: usize) -> Self {
        if vertices.is_empty() {
            return Self { root: None };
        }

        let root = build_node(vertices.to_vec(), 0, leaf_size.max(1), max_depth);
        Self { root: Some(root) }
    }

    /// Root node, if the mesh had any vertices
    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    /// True for a tree built from no vertices
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Bounds of the whole tree
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.as_ref().map(|r| *r.bounds())
    }

    /// Visit every node depth-first with its depth
    ///
    /// Uses an explicit stack; handy for debug drawing and invariant checks.
    pub fn visit<F: FnMut(&BvhNode, usize)>(&self, mut f: F) {
        let mut stack: Vec<(&BvhNode, usize)> = self.root.iter().map(|r| (r, 0)).collect();
        while let Some((node, depth)) = stack.pop() {
            f(node, depth);
            if let Some((left, right)) = node.children() {
                stack.push((right, depth + 1));
                stack.push((left, depth + 1));
            }
        }
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.visit(|_, _| count += 1);
        count
    }

    /// Number of leaves in the tree
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.visit(|node, _| {
            if node.is_leaf() {
                count += 1;
            }
        });
        count
    }

    /// Deepest node depth (0 for a single leaf, `None` when empty)
    pub fn depth(&self) -> Option<usize> {
        let mut deepest = None;
        self.visit(|_, depth| deepest = Some(deepest.map_or(depth, |d: usize| d.max(depth))));
        deepest
    }
}

fn build_node(mut vertices: Vec<Vec3>, depth: usize, leaf_size: usize, max_depth: usize) -> BvhNode {
    // Callers never pass an empty set: the root is guarded and median splits
    // only happen for more than `leaf_size >= 1` vertices.
    let bounds = Aabb::from_points(&vertices).unwrap_or_default();

    if vertices.len() <= leaf_size || depth >= max_depth {
        return BvhNode::Leaf { bounds, vertices };
    }

    let axis = longest_axis(&bounds);
    vertices.sort_by(|a, b| a[axis].total_cmp(&b[axis]));

    let mid = vertices.len() / 2;
    let right_half = vertices.split_off(mid);

    let left = Box::new(build_node(vertices, depth + 1, leaf_size, max_depth));
    let right = Box::new(build_node(right_half, depth + 1, leaf_size, max_depth));

    BvhNode::Internal { bounds, left, right }
}

/// Axis of greatest extent, ties preferring x then y then z
fn longest_axis(bounds: &Aabb) -> usize {
    let size = bounds.size();
    if size.x >= size.y && size.x >= size.z {
        0
    } else if size.y >= size.z {
        1
    } else {
        2
    }
}
