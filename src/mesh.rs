// src/mesh.rs
use crate::error::BuildError;
use glam::{Vec2, Vec3, vec2, vec3};

/// One indexed input mesh, already decoded by the caller. Positions and
/// indices are mandatory; normals and UVs are optional per mesh.
#[derive(Default, Clone, Debug)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub uvs: Option<Vec<Vec2>>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals: None,
            uvs: None,
            indices,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn validate(&self, mesh_index: usize) -> Result<(), BuildError> {
        if self.indices.len() % 3 != 0 {
            return Err(BuildError::InvalidIndexCount {
                mesh: mesh_index,
                count: self.indices.len(),
            });
        }
        for &index in &self.indices {
            if index as usize >= self.positions.len() {
                return Err(BuildError::IndexOutOfRange {
                    mesh: mesh_index,
                    index,
                    vertex_count: self.positions.len(),
                });
            }
        }
        if let Some(normals) = &self.normals {
            if normals.len() != self.positions.len() {
                return Err(BuildError::AttributeLengthMismatch {
                    mesh: mesh_index,
                    attribute: "normal",
                    expected: self.positions.len(),
                    actual: normals.len(),
                });
            }
        }
        if let Some(uvs) = &self.uvs {
            if uvs.len() != self.positions.len() {
                return Err(BuildError::AttributeLengthMismatch {
                    mesh: mesh_index,
                    attribute: "uv",
                    expected: self.positions.len(),
                    actual: uvs.len(),
                });
            }
        }
        Ok(())
    }

    /// Per-vertex normals from accumulated face normals. The cross products
    /// are left unnormalized during accumulation, so larger faces weigh more.
    /// Call only on validated meshes.
    pub fn computed_normals(&self) -> Vec<Vec3> {
        let mut accumulated = vec![Vec3::ZERO; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let face = (self.positions[i1] - self.positions[i0])
                .cross(self.positions[i2] - self.positions[i0]);
            accumulated[i0] += face;
            accumulated[i1] += face;
            accumulated[i2] += face;
        }

        accumulated
            .into_iter()
            .map(|n| {
                if n.length_squared() > 0.0 {
                    n.normalize()
                } else {
                    // Unreferenced vertex or fully degenerate fan.
                    vec3(0.0, 1.0, 0.0)
                }
            })
            .collect()
    }

    /// Axis-aligned unit cube centered on `center`: 6 quads, 24 vertices,
    /// 12 triangles, per-face normals and UVs.
    pub fn unit_cube(center: Vec3) -> Self {
        let mut mesh = MeshData {
            normals: Some(Vec::new()),
            uvs: Some(Vec::new()),
            ..Default::default()
        };

        let dx = vec3(0.5, 0.0, 0.0);
        let dy = vec3(0.0, 0.5, 0.0);
        let dz = vec3(0.0, 0.0, 0.5);

        let quads = [
            // Front, back, top, bottom, right, left
            [-dx - dy + dz, dx - dy + dz, dx + dy + dz, -dx + dy + dz],
            [dx - dy - dz, -dx - dy - dz, -dx + dy - dz, dx + dy - dz],
            [-dx + dy + dz, dx + dy + dz, dx + dy - dz, -dx + dy - dz],
            [-dx - dy - dz, dx - dy - dz, dx - dy + dz, -dx - dy + dz],
            [dx - dy + dz, dx - dy - dz, dx + dy - dz, dx + dy + dz],
            [-dx - dy - dz, -dx - dy + dz, -dx + dy + dz, -dx + dy - dz],
        ];

        for [a, b, c, d] in quads {
            mesh.add_quad(a + center, b + center, c + center, d + center);
        }
        mesh
    }

    fn add_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
        let n = (b - a).cross(d - a).normalize();
        let base = self.positions.len() as u32;

        self.positions.extend_from_slice(&[a, b, c, d]);
        let normals = self.normals.as_mut().unwrap();
        normals.extend_from_slice(&[n; 4]);
        let uvs = self.uvs.as_mut().unwrap();
        uvs.extend_from_slice(&[
            vec2(0.0, 0.0),
            vec2(1.0, 0.0),
            vec2(1.0, 1.0),
            vec2(0.0, 1.0),
        ]);

        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_cube_shape() {
        let cube = MeshData::unit_cube(Vec3::ZERO);
        assert_eq!(cube.positions.len(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube.validate(0).is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_index() {
        let mesh = MeshData::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 3]);
        assert_eq!(
            mesh.validate(2),
            Err(BuildError::IndexOutOfRange {
                mesh: 2,
                index: 3,
                vertex_count: 3,
            })
        );
    }

    #[test]
    fn validate_rejects_partial_triangle() {
        let mesh = MeshData::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1]);
        assert!(matches!(
            mesh.validate(0),
            Err(BuildError::InvalidIndexCount { mesh: 0, count: 2 })
        ));
    }

    #[test]
    fn validate_rejects_short_uv_array() {
        let mut mesh = MeshData::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2]);
        mesh.uvs = Some(vec![vec2(0.0, 0.0)]);
        assert!(matches!(
            mesh.validate(0),
            Err(BuildError::AttributeLengthMismatch { attribute: "uv", .. })
        ));
    }

    #[test]
    fn computed_normals_point_away_from_face() {
        // Single CCW triangle in the XY plane; face normal is +Z.
        let mesh = MeshData::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2]);
        let normals = mesh.computed_normals();
        for n in normals {
            assert!((n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn computed_normals_average_adjacent_faces() {
        // Two faces of the cube share no vertices (24-vertex layout), so
        // use a simple ridge: two triangles sharing an edge along Y.
        let positions = vec![
            vec3(0.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
            vec3(1.0, 0.0, 1.0),
            vec3(-1.0, 0.0, 1.0),
        ];
        let mesh = MeshData::new(positions, vec![0, 2, 1, 0, 1, 3]);
        let normals = mesh.computed_normals();
        // The two slope normals are (-1,0,1) and (1,0,1); at the shared
        // edge the X components cancel and +Z remains.
        assert!((normals[0] - Vec3::Z).length() < 1e-6);
        assert!((normals[1] - Vec3::Z).length() < 1e-6);
    }
}
