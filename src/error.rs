// src/error.rs
use thiserror::Error;

/// Fatal build errors. Any of these aborts the build before output buffers
/// are produced, so a previously published scene snapshot stays usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A scene with zero triangles is a configuration error, not an empty tree.
    #[error("scene contains no triangles")]
    EmptyScene,

    /// The fixed 2048x2048 triangle texture cannot hold the scene.
    #[error("triangle count {triangles} exceeds texture capacity ({max_triangles} triangles)")]
    CapacityExceeded {
        triangles: usize,
        max_triangles: usize,
    },

    /// An index references a vertex outside the mesh's position array.
    #[error("mesh {mesh}: index {index} out of range (vertex count: {vertex_count})")]
    IndexOutOfRange {
        mesh: usize,
        index: u32,
        vertex_count: usize,
    },

    /// The index array length is not a multiple of 3.
    #[error("mesh {mesh}: index count {count} is not a multiple of 3")]
    InvalidIndexCount { mesh: usize, count: usize },

    /// An optional attribute array is present but does not match the vertex count.
    #[error("mesh {mesh}: {attribute} count {actual} does not match vertex count {expected}")]
    AttributeLengthMismatch {
        mesh: usize,
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    /// One material slot per mesh is required.
    #[error("mesh count {meshes} does not match material slot count {slots}")]
    SlotCountMismatch { meshes: usize, slots: usize },

    /// A texture reference has no stable identity (e.g. already disposed);
    /// deduplicating it would corrupt the material table.
    #[error("material slot {slot}: {channel} texture handle has no stable identity")]
    InvalidTextureHandle { slot: usize, channel: &'static str },
}

/// Non-fatal events recovered during a build. Collected and returned with a
/// successful result so the caller can log them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// Triangle had zero-area or non-finite bounds; its AABB was
    /// epsilon-inflated so SAH partitioning stays well defined.
    DegenerateTriangle { triangle: u32 },
}
