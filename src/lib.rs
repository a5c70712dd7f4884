// src/lib.rs
//! Offline scene preprocessing for a GPU path tracer: merges input meshes
//! into one triangle soup, builds a SAH BVH over it and serializes both
//! into fixed-layout 2048x2048 float data textures, together with a
//! deduplicated material texture table.
//!
//! The crate is pure CPU and batch-oriented: one [`build_scene`] call runs
//! to completion and returns a fresh snapshot; nothing here touches the
//! GPU, loads assets or renders.

use std::time::Instant;

pub mod buffers;
pub mod bvh;
pub mod encode;
pub mod error;
pub mod geometry;
pub mod material;
pub mod mesh;
pub mod primitives;

pub use buffers::{SceneBuffers, MAX_TRIANGLES, TEXTURE_DIM};
pub use error::{BuildError, Diagnostic};
pub use material::{MaterialIndices, MaterialSlot, MaterialTable, TextureHandle};
pub use mesh::MeshData;
pub use primitives::AABB;

/// How triangle texel 6 (the material color group) is populated. A single
/// model applies to the whole build, not per triangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MaterialModel {
    /// Texture-indexed materials; the color group stays zeroed.
    #[default]
    Textured,
    /// Flat/tinted materials; the color group carries each slot's type and
    /// color.
    Solid,
}

/// Build-time configuration. Replaces the ambient mutable state the
/// surrounding application used to keep next to its shader uniforms.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildConfig {
    pub material_model: MaterialModel,
}

/// One complete, immutable scene snapshot. The builder never mutates a
/// returned snapshot; swap timing against the previous one is the caller's
/// concern.
#[derive(Debug)]
pub struct SceneBuild {
    pub buffers: SceneBuffers,
    pub material_table: MaterialTable,
    pub triangle_count: u32,
    pub node_count: u32,
    /// Non-fatal events recovered during the build.
    pub diagnostics: Vec<Diagnostic>,
}

/// Rebuilds the whole scene from scratch: merge, material table, triangle
/// encoding, SAH BVH, node encoding. `slots[i]` governs `meshes[i]`.
///
/// Fatal conditions (zero triangles, capacity overflow, malformed meshes,
/// invalid texture handles) return an error before any output buffer is
/// allocated, so a previously published snapshot stays valid.
pub fn build_scene(
    meshes: &[MeshData],
    slots: &[MaterialSlot],
    config: &BuildConfig,
) -> Result<SceneBuild, BuildError> {
    if meshes.len() != slots.len() {
        return Err(BuildError::SlotCountMismatch {
            meshes: meshes.len(),
            slots: slots.len(),
        });
    }

    let start = Instant::now();

    // Capacity is checked before the merge allocates anything.
    let triangle_count: usize = meshes.iter().map(MeshData::triangle_count).sum();
    buffers::check_capacity(triangle_count)?;

    let (soup, material_start_offset) = geometry::merge_meshes(meshes)?;
    debug_assert_eq!(soup.triangle_count(), triangle_count);

    let material_table = material::MaterialTable::build(slots)?;
    log::debug!(
        "merged {} meshes: {} triangles, {} unique textures",
        meshes.len(),
        triangle_count,
        material_table.textures.len()
    );

    let mut buffers = SceneBuffers::allocate();

    let (tri_aabbs, diagnostics) = encode::encode_triangles(
        &soup,
        &material_start_offset,
        slots,
        &material_table,
        config.material_model,
        &mut buffers.triangle_data,
    );

    let bvh_start = Instant::now();
    let nodes = bvh::BVHBuilder::new(&tri_aabbs).build();
    log::debug!(
        "built BVH: {} nodes in {:?}",
        nodes.len(),
        bvh_start.elapsed()
    );

    bvh::pack_nodes(&nodes, &mut buffers.aabb_data);

    log::info!(
        "scene build done: {} triangles, {} nodes, {} diagnostics, {:?}",
        triangle_count,
        nodes.len(),
        diagnostics.len(),
        start.elapsed()
    );

    Ok(SceneBuild {
        buffers,
        material_table,
        triangle_count: triangle_count as u32,
        node_count: nodes.len() as u32,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn slot_count_must_match_mesh_count() {
        let meshes = [MeshData::unit_cube(Vec3::ZERO)];
        let err = build_scene(&meshes, &[], &BuildConfig::default()).unwrap_err();
        assert_eq!(err, BuildError::SlotCountMismatch { meshes: 1, slots: 0 });
    }

    #[test]
    fn empty_scene_is_rejected() {
        let err = build_scene(&[], &[], &BuildConfig::default()).unwrap_err();
        assert_eq!(err, BuildError::EmptyScene);
    }

    #[test]
    fn capacity_overflow_fails_before_encoding() {
        // One shared triangle referenced past the texture budget; merging
        // unrolls indices, so this overflows without huge vertex data.
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let indices: Vec<u32> = (0..(MAX_TRIANGLES + 1))
            .flat_map(|_| [0u32, 1, 2])
            .collect();
        let mesh = MeshData::new(positions, indices);

        let err = build_scene(&[mesh], &[MaterialSlot::default()], &BuildConfig::default())
            .unwrap_err();
        assert!(matches!(err, BuildError::CapacityExceeded { .. }));
    }
}
