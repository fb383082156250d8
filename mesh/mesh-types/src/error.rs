//! Error types for mesh validation.

use thiserror::Error;

/// Result type for mesh validation.
pub type MeshResult<T> = Result<T, MeshError>;

/// Structural problems found by [`IndexedMesh::validate`](crate::IndexedMesh::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// A face references fewer than three vertices.
    #[error("face {face} has {len} indices; at least 3 are required")]
    FaceTooSmall {
        /// Position of the face in the face list.
        face: usize,
        /// Number of indices the face holds.
        len: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        /// Position of the face in the face list.
        face: usize,
        /// The offending vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },
}
