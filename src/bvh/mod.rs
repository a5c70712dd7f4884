// src/bvh/mod.rs
pub mod sah;

use crate::primitives::AABB;

pub use sah::BVHBuilder;

/// Flat binary BVH over single-triangle leaves. Root is node 0; for N
/// triangles the array holds exactly 2N-1 nodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BVHNode {
    pub aabb: AABB,
    pub kind: BVHNodeKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BVHNodeKind {
    /// References one triangle in merge order.
    Leaf { triangle: u32 },
    /// Child slots index into the same node array.
    Internal { left: u32, right: u32 },
}

impl BVHNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, BVHNodeKind::Leaf { .. })
    }
}

/// Serializes the node array into the AABB texture, three texels per node
/// at texel offset `3 * node_index`:
///
/// ```text
/// texel 0: min.x  min.y  min.z  link0
/// texel 1: max.x  max.y  max.z  link1
/// texel 2: ctr.x  ctr.y  ctr.z  0
/// ```
///
/// Internal nodes store their child node indices in `link0`/`link1`. Leaves
/// store `link0 = -(triangle + 1)` and `link1 = -1`: a negative `link0`
/// marks the leaf and recovers the triangle index for the matching record
/// in the triangle texture. The traversal shader depends on this exact
/// layout; changing it is a breaking protocol change.
pub fn pack_nodes(nodes: &[BVHNode], aabb_data: &mut [f32]) {
    for (i, node) in nodes.iter().enumerate() {
        let off = i * 12;
        let (link0, link1) = match node.kind {
            BVHNodeKind::Leaf { triangle } => (-(triangle as f32) - 1.0, -1.0),
            BVHNodeKind::Internal { left, right } => (left as f32, right as f32),
        };
        let center = node.aabb.center();

        aabb_data[off] = node.aabb.min.x;
        aabb_data[off + 1] = node.aabb.min.y;
        aabb_data[off + 2] = node.aabb.min.z;
        aabb_data[off + 3] = link0;

        aabb_data[off + 4] = node.aabb.max.x;
        aabb_data[off + 5] = node.aabb.max.y;
        aabb_data[off + 6] = node.aabb.max.z;
        aabb_data[off + 7] = link1;

        aabb_data[off + 8] = center.x;
        aabb_data[off + 9] = center.y;
        aabb_data[off + 10] = center.z;
        aabb_data[off + 11] = 0.0;
    }
}
