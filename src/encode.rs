// src/encode.rs
use crate::error::Diagnostic;
use crate::geometry::TriangleSoup;
use crate::material::{MaterialSlot, MaterialTable};
use crate::primitives::AABB;
use crate::MaterialModel;

/// Floats per triangle record: 8 texels of 4 components.
pub const FLOATS_PER_TRIANGLE: usize = 32;

/// Packs every triangle into the triangle texture and returns the
/// per-triangle AABBs consumed by the BVH builder, plus diagnostics for
/// triangles whose bounds needed repair.
///
/// Record `i` occupies floats `32*i .. 32*i + 32`, the 24 geometry floats
/// flattened across texel boundaries in position/normal/UV order:
///
/// ```text
/// floats  0..9   p0.xyz p1.xyz p2.xyz
/// floats  9..18  n0.xyz n1.xyz n2.xyz   (normalized here)
/// floats 18..24  uv0.xy uv1.xy uv2.xy   (-1,-1 per vertex when absent)
/// texel 6        material type + color  (zeros in textured mode)
/// texel 7        albedoTextureID, opacity, pbrTextureID, emissiveTextureID
/// ```
///
/// Texture IDs are the material-table indices cast to f32; -1 means "no
/// texture" and the shader must not index with it.
pub fn encode_triangles(
    soup: &TriangleSoup,
    material_start_offset: &[u32],
    slots: &[MaterialSlot],
    table: &MaterialTable,
    material_model: MaterialModel,
    triangle_data: &mut [f32],
) -> (Vec<AABB>, Vec<Diagnostic>) {
    let triangle_count = soup.triangle_count();
    let mut aabbs = Vec::with_capacity(triangle_count);
    let mut diagnostics = Vec::new();

    // Consecutive triangles share a slot, so the material lookup is a
    // monotonic cursor over the cumulative offsets, never a re-search.
    let mut material = 0usize;

    for i in 0..triangle_count {
        while i as u32 >= material_start_offset[material] {
            material += 1;
        }
        let ids = table.indices[material];
        let slot = &slots[material];

        let p0 = soup.positions[3 * i];
        let p1 = soup.positions[3 * i + 1];
        let p2 = soup.positions[3 * i + 2];
        let n0 = soup.normals[3 * i].normalize_or_zero();
        let n1 = soup.normals[3 * i + 1].normalize_or_zero();
        let n2 = soup.normals[3 * i + 2].normalize_or_zero();
        let uv0 = soup.uvs[3 * i];
        let uv1 = soup.uvs[3 * i + 1];
        let uv2 = soup.uvs[3 * i + 2];

        let record = &mut triangle_data[FLOATS_PER_TRIANGLE * i..FLOATS_PER_TRIANGLE * (i + 1)];
        record[0..3].copy_from_slice(&p0.to_array());
        record[3..6].copy_from_slice(&p1.to_array());
        record[6..9].copy_from_slice(&p2.to_array());
        record[9..12].copy_from_slice(&n0.to_array());
        record[12..15].copy_from_slice(&n1.to_array());
        record[15..18].copy_from_slice(&n2.to_array());
        record[18..20].copy_from_slice(&uv0.to_array());
        record[20..22].copy_from_slice(&uv1.to_array());
        record[22..24].copy_from_slice(&uv2.to_array());

        match material_model {
            // Texture-indexed scenes leave the color group zeroed.
            MaterialModel::Textured => record[24..28].fill(0.0),
            MaterialModel::Solid => {
                record[24] = slot.material_type as f32;
                record[25] = slot.color.x;
                record[26] = slot.color.y;
                record[27] = slot.color.z;
            }
        }

        record[28] = ids.albedo as f32;
        record[29] = slot.opacity;
        record[30] = ids.pbr as f32;
        record[31] = ids.emissive as f32;

        let (aabb, degenerate) = AABB::from_triangle(p0, p1, p2);
        if degenerate {
            log::warn!("triangle {i}: degenerate bounds, epsilon-inflated");
            diagnostics.push(Diagnostic::DegenerateTriangle { triangle: i as u32 });
        }
        aabbs.push(aabb);
    }

    (aabbs, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{merge_meshes, UV_SENTINEL};
    use crate::material::TextureHandle;
    use crate::mesh::MeshData;
    use glam::{Vec3, vec3};

    fn encode(
        meshes: &[MeshData],
        slots: &[MaterialSlot],
        model: MaterialModel,
    ) -> (Vec<f32>, Vec<AABB>, Vec<Diagnostic>) {
        let (soup, offsets) = merge_meshes(meshes).unwrap();
        let table = MaterialTable::build(slots).unwrap();
        let mut data = vec![0.0; soup.triangle_count() * FLOATS_PER_TRIANGLE];
        let (aabbs, diagnostics) =
            encode_triangles(&soup, &offsets, slots, &table, model, &mut data);
        (data, aabbs, diagnostics)
    }

    fn tri_at(offset: Vec3) -> MeshData {
        MeshData::new(
            vec![offset, offset + Vec3::X, offset + Vec3::Y],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn geometry_packing_layout() {
        let mesh = tri_at(vec3(1.0, 2.0, 3.0));
        let (data, _, _) = encode(&[mesh], &[MaterialSlot::default()], MaterialModel::Textured);

        assert_eq!(&data[0..3], &[1.0, 2.0, 3.0]); // p0
        assert_eq!(&data[3..6], &[2.0, 2.0, 3.0]); // p1
        assert_eq!(&data[6..9], &[1.0, 3.0, 3.0]); // p2
        // Generated flat normal is +Z for all three vertices.
        assert_eq!(&data[9..12], &[0.0, 0.0, 1.0]);
        assert_eq!(&data[15..18], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn missing_uvs_encode_sentinel_pairs() {
        let (data, _, _) = encode(
            &[tri_at(Vec3::ZERO)],
            &[MaterialSlot::default()],
            MaterialModel::Textured,
        );
        assert_eq!(&data[18..24], &[-1.0; 6]);
        assert_eq!(UV_SENTINEL.x, -1.0);
    }

    #[test]
    fn normals_are_renormalized_at_encode_time() {
        let mut mesh = tri_at(Vec3::ZERO);
        mesh.normals = Some(vec![vec3(0.0, 0.0, 10.0); 3]);
        let (data, _, _) = encode(&[mesh], &[MaterialSlot::default()], MaterialModel::Textured);
        assert_eq!(&data[9..12], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn material_ids_and_opacity_in_texel_seven() {
        let slot = MaterialSlot {
            albedo: Some(TextureHandle::new(11)),
            emissive: Some(TextureHandle::new(12)),
            opacity: 0.5,
            ..Default::default()
        };
        let (data, _, _) = encode(&[tri_at(Vec3::ZERO)], &[slot], MaterialModel::Textured);
        assert_eq!(&data[28..32], &[0.0, 0.5, -1.0, 1.0]);
        // Textured mode leaves the color group zeroed.
        assert_eq!(&data[24..28], &[0.0; 4]);
    }

    #[test]
    fn solid_model_writes_type_and_color() {
        let slot = MaterialSlot {
            material_type: 2,
            color: vec3(0.9, 0.1, 0.2),
            ..Default::default()
        };
        let (data, _, _) = encode(&[tri_at(Vec3::ZERO)], &[slot], MaterialModel::Solid);
        assert_eq!(&data[24..28], &[2.0, 0.9, 0.1, 0.2]);
    }

    #[test]
    fn material_cursor_tracks_mesh_boundaries() {
        let slots = [
            MaterialSlot {
                albedo: Some(TextureHandle::new(1)),
                ..Default::default()
            },
            MaterialSlot {
                albedo: Some(TextureHandle::new(2)),
                ..Default::default()
            },
        ];
        let (data, _, _) = encode(
            &[tri_at(Vec3::ZERO), tri_at(Vec3::X)],
            &slots,
            MaterialModel::Textured,
        );
        assert_eq!(data[28], 0.0); // first triangle: texture table entry 0
        assert_eq!(data[32 + 28], 1.0); // second mesh: entry 1
    }

    #[test]
    fn degenerate_triangle_reports_diagnostic() {
        // All three vertices coincide.
        let mesh = MeshData::new(vec![Vec3::ONE, Vec3::ONE, Vec3::ONE], vec![0, 1, 2]);
        let (_, aabbs, diagnostics) =
            encode(&[mesh], &[MaterialSlot::default()], MaterialModel::Textured);
        assert_eq!(diagnostics, vec![Diagnostic::DegenerateTriangle { triangle: 0 }]);
        assert!(aabbs[0].area() > 0.0);
    }
}
