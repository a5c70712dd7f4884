// src/bvh/sah.rs
use super::{BVHNode, BVHNodeKind};
use crate::primitives::AABB;
use glam::Vec3;

/// Fixed SAH bucket count. Candidate split planes sit between adjacent
/// buckets, so each node evaluates at most BINS - 1 planes.
const BINS: usize = 16;

#[derive(Clone, Copy)]
enum ChildSlot {
    Left,
    Right,
}

/// One pending range on the explicit work stack. `parent` names the
/// internal node (and which of its child links) to backfill once this
/// range's node is allocated.
#[derive(Clone, Copy)]
struct BuildJob {
    first: usize,
    count: usize,
    parent: Option<(usize, ChildSlot)>,
}

/// Top-down SAH BVH builder over per-triangle AABBs, expressed iteratively
/// with an array-backed work stack. Pathologically deep trees (collinear
/// centroids and the like) therefore cannot overflow the call stack.
///
/// Identical input always yields an identical node array: splitting,
/// partitioning and the median fallback are all order-stable.
pub struct BVHBuilder<'a> {
    aabbs: &'a [AABB],
    centers: Vec<Vec3>,
    tri_indices: Vec<u32>,
    nodes: Vec<BVHNode>,
}

impl<'a> BVHBuilder<'a> {
    pub fn new(aabbs: &'a [AABB]) -> Self {
        let centers = aabbs.iter().map(|aabb| aabb.center()).collect();
        Self {
            aabbs,
            centers,
            tri_indices: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Builds the tree. Leaves hold exactly one triangle, so the result has
    /// exactly `2N - 1` nodes with the root at index 0. The caller rejects
    /// empty scenes before construction.
    pub fn build(mut self) -> Vec<BVHNode> {
        let count = self.aabbs.len();
        debug_assert!(count > 0, "empty scenes are rejected before BVH construction");

        self.tri_indices = (0..count as u32).collect();
        self.nodes = Vec::with_capacity(2 * count - 1);

        let mut stack = vec![BuildJob {
            first: 0,
            count,
            parent: None,
        }];

        while let Some(job) = stack.pop() {
            let node_index = self.nodes.len();
            if let Some((parent, slot)) = job.parent {
                self.link_child(parent, slot, node_index as u32);
            }

            if job.count == 1 {
                let triangle = self.tri_indices[job.first];
                self.nodes.push(BVHNode {
                    aabb: self.aabbs[triangle as usize],
                    kind: BVHNodeKind::Leaf { triangle },
                });
                continue;
            }

            let bounds = self.range_bounds(job.first, job.count);
            let mid = self.partition(job.first, job.count, &bounds);

            // Placeholder links; each child backfills its slot when popped.
            self.nodes.push(BVHNode {
                aabb: bounds,
                kind: BVHNodeKind::Internal { left: 0, right: 0 },
            });

            // Right first so the left subtree is laid out first.
            stack.push(BuildJob {
                first: mid,
                count: job.first + job.count - mid,
                parent: Some((node_index, ChildSlot::Right)),
            });
            stack.push(BuildJob {
                first: job.first,
                count: mid - job.first,
                parent: Some((node_index, ChildSlot::Left)),
            });
        }

        self.nodes
    }

    fn link_child(&mut self, parent: usize, slot: ChildSlot, child: u32) {
        let BVHNodeKind::Internal { left, right } = &mut self.nodes[parent].kind else {
            unreachable!("leaf nodes never receive children");
        };
        match slot {
            ChildSlot::Left => *left = child,
            ChildSlot::Right => *right = child,
        }
    }

    fn range_bounds(&self, first: usize, count: usize) -> AABB {
        let mut bounds = AABB::empty();
        for &triangle in &self.tri_indices[first..first + count] {
            bounds = bounds.union(&self.aabbs[triangle as usize]);
        }
        bounds
    }

    /// Splits `[first, first + count)` and returns the index of the first
    /// right-side element, always strictly inside the range so both sides
    /// make progress. SAH over centroid buckets along the widest axis of
    /// `bounds`; falls back to a median count split whenever the candidate
    /// planes cannot separate the centroids.
    fn partition(&mut self, first: usize, count: usize, bounds: &AABB) -> usize {
        let extent = bounds.extent();
        // Widest axis wins; exact ties resolve X before Y before Z.
        let mut axis = 0;
        if extent.y > extent[axis] {
            axis = 1;
        }
        if extent.z > extent[axis] {
            axis = 2;
        }

        let range = &self.tri_indices[first..first + count];
        let mut cmin = f32::INFINITY;
        let mut cmax = f32::NEG_INFINITY;
        for &triangle in range {
            let c = self.centers[triangle as usize][axis];
            cmin = cmin.min(c);
            cmax = cmax.max(c);
        }

        if !(cmax - cmin).is_normal() {
            // All centroids coincide on this axis.
            return self.median_split(first, count, axis);
        }

        let scale = BINS as f32 / (cmax - cmin);
        let bin_of = |center: f32| (((center - cmin) * scale) as usize).min(BINS - 1);

        let mut bin_counts = [0usize; BINS];
        let mut bin_bounds = [AABB::empty(); BINS];
        for &triangle in range {
            let bin = bin_of(self.centers[triangle as usize][axis]);
            bin_counts[bin] += 1;
            bin_bounds[bin] = bin_bounds[bin].union(&self.aabbs[triangle as usize]);
        }

        // Prefix/suffix sweeps so each candidate plane costs O(1).
        let mut left_area = [0.0f32; BINS];
        let mut left_count = [0usize; BINS];
        let mut sweep_box = AABB::empty();
        let mut sweep_sum = 0;
        for i in 0..BINS {
            sweep_sum += bin_counts[i];
            sweep_box = sweep_box.union(&bin_bounds[i]);
            left_area[i] = sweep_box.area();
            left_count[i] = sweep_sum;
        }

        let mut right_area = [0.0f32; BINS];
        let mut right_count = [0usize; BINS];
        sweep_box = AABB::empty();
        sweep_sum = 0;
        for i in (0..BINS).rev() {
            sweep_sum += bin_counts[i];
            sweep_box = sweep_box.union(&bin_bounds[i]);
            right_area[i] = sweep_box.area();
            right_count[i] = sweep_sum;
        }

        let mut best_cost = f32::INFINITY;
        let mut best_plane = None;
        for plane in 0..BINS - 1 {
            if left_count[plane] == 0 || right_count[plane + 1] == 0 {
                continue;
            }
            let cost = left_area[plane] * left_count[plane] as f32
                + right_area[plane + 1] * right_count[plane + 1] as f32;
            if cost < best_cost {
                best_cost = cost;
                best_plane = Some(plane);
            }
        }

        let Some(best_plane) = best_plane else {
            // Every centroid landed in one bucket.
            return self.median_split(first, count, axis);
        };

        // Stable partition: both sides keep their relative order.
        let centers = &self.centers;
        let range = &mut self.tri_indices[first..first + count];
        let mut scratch = Vec::with_capacity(count);
        let mut write = 0;
        for read in 0..count {
            let triangle = range[read];
            if bin_of(centers[triangle as usize][axis]) <= best_plane {
                range[write] = triangle;
                write += 1;
            } else {
                scratch.push(triangle);
            }
        }
        range[write..].copy_from_slice(&scratch);

        first + write
    }

    /// Deterministic progress guarantee: stable-sort the range by centroid
    /// along `axis` and split at the median count.
    fn median_split(&mut self, first: usize, count: usize, axis: usize) -> usize {
        let centers = &self.centers;
        let range = &mut self.tri_indices[first..first + count];
        range.sort_by(|&a, &b| {
            centers[a as usize][axis].total_cmp(&centers[b as usize][axis])
        });
        first + count / 2
    }
}
