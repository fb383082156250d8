//! Indexed polygon mesh.

use crate::{Aabb, Face, MeshBounds, MeshError, MeshResult, MeshTopology, Vertex};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Vertices plus polygon faces that refer to them by 0-based index.
///
/// Vertex order and face order are identities: once a mesh is loaded, the
/// OFF writer and the transforms never reorder either. Fields are public so
/// loaders can push into them; [`IndexedMesh::validate`] checks the index
/// invariant afterwards.
///
/// ```
/// use mesh_types::{Face, IndexedMesh, MeshTopology, Vertex};
///
/// let mesh = IndexedMesh::from_parts(
///     vec![
///         Vertex::from_coords(0.0, 0.0, 0.0),
///         Vertex::from_coords(2.0, 0.0, 0.0),
///         Vertex::from_coords(2.0, 2.0, 0.0),
///         Vertex::from_coords(0.0, 2.0, 0.0),
///     ],
///     vec![Face::from([0, 1, 2, 3])],
/// );
/// assert!(mesh.validate().is_ok());
/// assert_eq!((mesh.vertex_count(), mesh.face_count()), (4, 1));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexedMesh {
    /// Positions, indexed by face entries.
    pub vertices: Vec<Vertex>,

    /// Polygons in file order.
    pub faces: Vec<Face>,
}

impl IndexedMesh {
    /// A mesh with nothing in it.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::from_parts(Vec::new(), Vec::new())
    }

    /// An empty mesh with room reserved for the given counts.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self::from_parts(Vec::with_capacity(vertices), Vec::with_capacity(faces))
    }

    /// Wrap existing vertex and face lists. Nothing is checked.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Vertex>, faces: Vec<Face>) -> Self {
        Self { vertices, faces }
    }

    /// Build from bare coordinate triples and index lists.
    ///
    /// ```
    /// use mesh_types::IndexedMesh;
    ///
    /// let mesh = IndexedMesh::from_raw(
    ///     &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
    ///     [vec![0, 1, 2, 3]],
    /// );
    /// assert_eq!(mesh.vertices.len(), 4);
    /// assert_eq!(mesh.faces[0].len(), 4);
    /// ```
    #[must_use]
    pub fn from_raw<F>(positions: &[[f64; 3]], faces: impl IntoIterator<Item = F>) -> Self
    where
        F: Into<Face>,
    {
        Self::from_parts(
            positions
                .iter()
                .map(|&[x, y, z]| Vertex::from_coords(x, y, z))
                .collect(),
            faces.into_iter().map(Into::into).collect(),
        )
    }

    /// Check the index invariant: every face has at least three indices and
    /// every index refers to an existing vertex.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, in face order.
    pub fn validate(&self) -> MeshResult<()> {
        let vertex_count = self.vertices.len();
        for (face_idx, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(MeshError::FaceTooSmall {
                    face: face_idx,
                    len: face.len(),
                });
            }
            if let Some(index) = face.iter().find(|&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    face: face_idx,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Number of indices of every face, in face order.
    #[must_use]
    pub fn face_cardinalities(&self) -> Vec<usize> {
        self.faces.iter().map(Face::len).collect()
    }
}

impl MeshTopology for IndexedMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    #[inline]
    fn face(&self, index: usize) -> Option<&Face> {
        self.faces.get(index)
    }
}

impl MeshBounds for IndexedMesh {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }
}

/// The cube `[0,1]^3` as six outward-wound quads.
///
/// ```
/// use mesh_types::unit_cube;
///
/// let cube = unit_cube();
/// assert_eq!((cube.vertices.len(), cube.faces.len()), (8, 6));
/// ```
#[must_use]
pub fn unit_cube() -> IndexedMesh {
    IndexedMesh::from_raw(
        &[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ],
        [
            [0, 3, 2, 1], // bottom, -Z
            [4, 5, 6, 7], // top, +Z
            [0, 1, 5, 4], // front, -Y
            [3, 7, 6, 2], // back, +Y
            [0, 4, 7, 3], // left, -X
            [1, 2, 6, 5], // right, +X
        ],
    )
}
