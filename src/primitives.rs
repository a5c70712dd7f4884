// src/primitives.rs
use glam::{Vec3, vec3};

/// Minimum extent kept on every triangle AABB axis. Zero-thickness boxes
/// (axis-aligned quads, degenerate triangles) would otherwise produce
/// zero surface areas and break SAH cost comparisons.
pub const DEGENERATE_EPSILON: f32 = 1e-4;

// --- AABB ---
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for AABB {
    fn default() -> Self {
        Self::empty()
    }
}

impl AABB {
    /// Inverted bounds so the first `grow`/`union` snaps to real geometry.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Surface area for SAH costs. Inverted boxes count as zero.
    pub fn area(&self) -> f32 {
        let d = self.max - self.min;
        if d.x < 0.0 || d.y < 0.0 || d.z < 0.0 {
            0.0
        } else {
            2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
        }
    }

    /// Box midpoint. This is the centroid used for all BVH partitioning,
    /// deliberately not the vertex average.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Bounds of one triangle. Collapsed axes are inflated by
    /// `DEGENERATE_EPSILON` (flat axis-aligned triangles are normal input
    /// and stay silent); the flag fires only for genuinely degenerate
    /// triangles: zero area or non-finite vertices, whose components are
    /// clamped to the origin so they cannot poison sibling bounds.
    pub fn from_triangle(v0: Vec3, v1: Vec3, v2: Vec3) -> (AABB, bool) {
        let mut min = v0.min(v1).min(v2);
        let mut max = v0.max(v1).max(v2);

        let double_area_sq = (v1 - v0).cross(v2 - v0).length_squared();
        let mut degenerate = !(double_area_sq > 0.0);

        for axis in 0..3 {
            if !min[axis].is_finite() || !max[axis].is_finite() {
                min[axis] = 0.0;
                max[axis] = 0.0;
                degenerate = true;
            }
        }

        let size = max - min;
        let pad = vec3(
            if size.x < DEGENERATE_EPSILON { DEGENERATE_EPSILON } else { 0.0 },
            if size.y < DEGENERATE_EPSILON { DEGENERATE_EPSILON } else { 0.0 },
            if size.z < DEGENERATE_EPSILON { DEGENERATE_EPSILON } else { 0.0 },
        );

        (
            AABB {
                min: min - pad * 0.5,
                max: max + pad * 0.5,
            },
            degenerate,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_and_area() {
        let a = AABB { min: Vec3::ZERO, max: Vec3::ONE };
        let b = AABB {
            min: vec3(2.0, 0.0, 0.0),
            max: vec3(3.0, 1.0, 1.0),
        };
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::ZERO);
        assert_eq!(u.max, vec3(3.0, 1.0, 1.0));
        assert_eq!(a.area(), 6.0);
        assert_eq!(AABB::empty().area(), 0.0);
    }

    #[test]
    fn center_is_box_midpoint() {
        let (aabb, _) = AABB::from_triangle(
            vec3(0.0, 0.0, 0.0),
            vec3(4.0, 0.0, 0.0),
            vec3(0.0, 2.0, 2.0),
        );
        assert_eq!(aabb.center(), vec3(2.0, 1.0, 1.0));
    }

    #[test]
    fn flat_triangle_gets_inflated_silently() {
        // Axis-aligned triangle with zero Z extent: valid geometry, so the
        // box is padded but no degeneracy is reported.
        let (aabb, degenerate) = AABB::from_triangle(
            vec3(0.0, 0.0, 5.0),
            vec3(1.0, 0.0, 5.0),
            vec3(0.0, 1.0, 5.0),
        );
        assert!(!degenerate);
        assert!(aabb.max.z - aabb.min.z >= DEGENERATE_EPSILON * 0.99);
        assert!(aabb.area() > 0.0);
    }

    #[test]
    fn zero_area_triangle_is_degenerate() {
        let (aabb, degenerate) =
            AABB::from_triangle(Vec3::ONE, Vec3::ONE, Vec3::ONE);
        assert!(degenerate);
        assert!(aabb.area() > 0.0);
    }

    #[test]
    fn nan_vertex_does_not_poison_bounds() {
        let (aabb, degenerate) = AABB::from_triangle(
            vec3(f32::NAN, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
        );
        assert!(degenerate);
        assert!(aabb.min.x.is_finite() && aabb.max.x.is_finite());
        assert!(aabb.area().is_finite());
    }
}
