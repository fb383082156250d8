//! Shared read-only mesh interfaces.

use crate::{Aabb, Face, Vertex};

/// Counts and indexed access over vertices and faces.
pub trait MeshTopology {
    /// How many vertices are stored.
    fn vertex_count(&self) -> usize;

    /// How many faces are stored.
    fn face_count(&self) -> usize;

    /// A mesh with no vertices or no faces encloses nothing.
    fn is_empty(&self) -> bool {
        self.vertex_count() == 0 || self.face_count() == 0
    }

    /// The vertex at `index`, if there is one.
    fn vertex(&self, index: usize) -> Option<&Vertex>;

    /// The face at `index`, if there is one.
    fn face(&self, index: usize) -> Option<&Face>;
}

/// Anything with an axis-aligned extent.
pub trait MeshBounds {
    /// Tight box around every vertex. Empty when there are no vertices.
    fn bounds(&self) -> Aabb;

    /// [`MeshBounds::bounds`], or `None` when it is empty.
    fn non_empty_bounds(&self) -> Option<Aabb> {
        Some(self.bounds()).filter(|b| !b.is_empty())
    }
}
