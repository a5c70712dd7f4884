// src/material.rs
use crate::error::BuildError;
use glam::Vec3;

/// Opaque reference to a texture resource owned by the caller's renderer.
/// Handles compare by identity: two handles with the same id are the same
/// physical texture, two distinct ids stay distinct even if their pixels
/// match. Id 0 is reserved for handles whose resource has been disposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    pub id: u64,
}

impl TextureHandle {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn is_valid(&self) -> bool {
        self.id != 0
    }
}

/// Texture references and surface parameters for one source mesh. Replaces
/// the open-ended material property bags of the original scene format with
/// a closed set of optional channels.
#[derive(Clone, Copy, Debug)]
pub struct MaterialSlot {
    pub albedo: Option<TextureHandle>,
    pub pbr: Option<TextureHandle>,
    pub emissive: Option<TextureHandle>,
    /// Material type number understood by the traversal shader.
    pub material_type: u32,
    pub color: Vec3,
    pub opacity: f32,
}

impl Default for MaterialSlot {
    fn default() -> Self {
        Self {
            albedo: None,
            pbr: None,
            emissive: None,
            material_type: 1, // diffuse opaque
            color: Vec3::ONE,
            opacity: 1.0,
        }
    }
}

/// Indices into the deduplicated texture list, one triple per slot.
/// -1 marks an absent channel; the shader must not index with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaterialIndices {
    pub albedo: i32,
    pub pbr: i32,
    pub emissive: i32,
}

/// Deduplicated texture list plus the per-slot index triples resolved
/// against it. Table order is first-seen order scanning slot by slot,
/// albedo then pbr then emissive within each slot.
#[derive(Clone, Debug, Default)]
pub struct MaterialTable {
    pub textures: Vec<TextureHandle>,
    pub indices: Vec<MaterialIndices>,
}

impl MaterialTable {
    pub fn build(slots: &[MaterialSlot]) -> Result<MaterialTable, BuildError> {
        let mut table = MaterialTable::default();

        for (slot_index, slot) in slots.iter().enumerate() {
            let channels = [
                ("albedo", slot.albedo),
                ("pbr", slot.pbr),
                ("emissive", slot.emissive),
            ];
            let mut resolved = [-1i32; 3];

            for (resolved, (channel, handle)) in resolved.iter_mut().zip(channels) {
                let Some(handle) = handle else { continue };
                if !handle.is_valid() {
                    return Err(BuildError::InvalidTextureHandle {
                        slot: slot_index,
                        channel,
                    });
                }
                *resolved = table.intern(handle);
            }

            table.indices.push(MaterialIndices {
                albedo: resolved[0],
                pbr: resolved[1],
                emissive: resolved[2],
            });
        }

        Ok(table)
    }

    // Linear scan keeps first-seen order without an auxiliary map; the
    // table holds a handful of textures per scene.
    fn intern(&mut self, handle: TextureHandle) -> i32 {
        for (i, existing) in self.textures.iter().enumerate() {
            if *existing == handle {
                return i as i32;
            }
        }
        self.textures.push(handle);
        (self.textures.len() - 1) as i32
    }
}
