//! Polygon faces.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered polygon of vertex indices.
///
/// The order of the indices is the winding of the polygon and is preserved
/// verbatim by every operation in the workspace. A valid face has at least
/// three indices, each smaller than the owning mesh's vertex count; that
/// invariant is checked by [`IndexedMesh::validate`](crate::IndexedMesh::validate)
/// rather than here, because a face alone does not know its mesh.
///
/// # Example
///
/// ```
/// use mesh_types::Face;
///
/// let quad = Face::from([0, 1, 2, 3]);
/// assert_eq!(quad.len(), 4);
/// assert_eq!(quad.indices(), &[0, 1, 2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Face {
    indices: Vec<u32>,
}

impl Face {
    /// Create a face from an index list.
    #[inline]
    #[must_use]
    pub const fn new(indices: Vec<u32>) -> Self {
        Self { indices }
    }

    /// Create a triangle.
    #[inline]
    #[must_use]
    pub fn triangle(a: u32, b: u32, c: u32) -> Self {
        Self::new(vec![a, b, c])
    }

    /// Number of vertices in the polygon.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True if the face holds no indices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The vertex indices in winding order.
    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Iterate over the vertex indices in winding order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.indices.iter().copied()
    }
}

impl From<Vec<u32>> for Face {
    fn from(indices: Vec<u32>) -> Self {
        Self::new(indices)
    }
}

impl<const N: usize> From<[u32; N]> for Face {
    fn from(indices: [u32; N]) -> Self {
        Self::new(indices.to_vec())
    }
}

impl From<&[u32]> for Face {
    fn from(indices: &[u32]) -> Self {
        Self::new(indices.to_vec())
    }
}
