// src/buffers.rs
use crate::error::BuildError;

/// Width and height of both data textures.
pub const TEXTURE_DIM: usize = 2048;
/// Total texel count per texture; each texel holds 4 f32 components.
pub const TEXELS: usize = TEXTURE_DIM * TEXTURE_DIM;
/// One triangle record spans 8 texels (32 floats).
pub const TEXELS_PER_TRIANGLE: usize = 8;
/// One BVH node record spans 3 texels (12 floats).
pub const TEXELS_PER_NODE: usize = 3;
/// Hard triangle capacity of the fixed-layout triangle texture.
pub const MAX_TRIANGLES: usize = TEXELS / TEXELS_PER_TRIANGLE;

/// The two fixed 2048x2048 RGBA-f32 textures handed to the traversal
/// shader, as flat row-major float arrays. A build allocates fresh
/// zero-filled buffers and never touches previously returned ones, so the
/// consumer can keep sampling an old snapshot while a new one is built.
#[derive(Debug)]
pub struct SceneBuffers {
    pub triangle_data: Vec<f32>,
    pub aabb_data: Vec<f32>,
}

impl SceneBuffers {
    pub fn allocate() -> Self {
        Self {
            triangle_data: vec![0.0; TEXELS * 4],
            aabb_data: vec![0.0; TEXELS * 4],
        }
    }

    /// Triangle texture as 4-float texels.
    pub fn triangle_texels(&self) -> &[[f32; 4]] {
        bytemuck::cast_slice(&self.triangle_data)
    }

    /// AABB/node texture as 4-float texels.
    pub fn aabb_texels(&self) -> &[[f32; 4]] {
        bytemuck::cast_slice(&self.aabb_data)
    }
}

/// Fails fast when the scene cannot fit the fixed-capacity contract.
/// Checked before any buffer is allocated; overflow must never truncate.
pub fn check_capacity(triangles: usize) -> Result<(), BuildError> {
    if triangles == 0 {
        return Err(BuildError::EmptyScene);
    }
    if triangles > MAX_TRIANGLES {
        return Err(BuildError::CapacityExceeded {
            triangles,
            max_triangles: MAX_TRIANGLES,
        });
    }
    Ok(())
}
