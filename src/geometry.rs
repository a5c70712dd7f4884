// src/geometry.rs
use crate::error::BuildError;
use crate::mesh::MeshData;
use glam::{Vec2, Vec3, vec2};

/// UV pair written for every vertex of a mesh that carries no UV layer.
/// The traversal shader treats negative coordinates as "do not sample".
pub const UV_SENTINEL: Vec2 = vec2(-1.0, -1.0);

/// All input meshes flattened into one non-indexed triangle array: every
/// triangle owns three independent vertex records, in source-mesh order.
/// The GPU format stores raw vertex triples, so indexing is unrolled here.
#[derive(Default, Clone, Debug)]
pub struct TriangleSoup {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
}

impl TriangleSoup {
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Concatenates `meshes` into one soup. Meshes without normals get
/// smooth normals computed from their indexed topology first; meshes
/// without UVs get the sentinel pair on every vertex.
///
/// The second return value is `material_start_offset`: entry `i` holds the
/// cumulative triangle count through mesh `i`, so triangle `t` belongs to
/// the first mesh whose offset exceeds `t`.
pub fn merge_meshes(meshes: &[MeshData]) -> Result<(TriangleSoup, Vec<u32>), BuildError> {
    let mut soup = TriangleSoup::default();
    let mut material_start_offset = Vec::with_capacity(meshes.len());
    let mut triangle_offset = 0u32;

    for (mesh_index, mesh) in meshes.iter().enumerate() {
        mesh.validate(mesh_index)?;

        let computed;
        let normals = match &mesh.normals {
            Some(normals) => normals,
            None => {
                computed = mesh.computed_normals();
                &computed
            }
        };

        for &index in &mesh.indices {
            let index = index as usize;
            soup.positions.push(mesh.positions[index]);
            soup.normals.push(normals[index]);
            soup.uvs.push(match &mesh.uvs {
                Some(uvs) => uvs[index],
                None => UV_SENTINEL,
            });
        }

        triangle_offset += mesh.triangle_count() as u32;
        material_start_offset.push(triangle_offset);
    }

    Ok((soup, material_start_offset))
}
