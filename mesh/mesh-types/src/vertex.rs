//! Mesh vertex.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A mesh vertex. Only the position is carried; normals, colours and
/// texture coordinates in source files are dropped on load.
///
/// ```
/// use mesh_types::{Point3, Vertex};
///
/// assert_eq!(Vertex::from_coords(1.0, 2.0, 3.0), Vertex::new(Point3::new(1.0, 2.0, 3.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// Position in model space.
    pub position: Point3<f64>,
}

impl Vertex {
    /// Vertex at `position`.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self { position }
    }

    /// Vertex at `(x, y, z)`.
    #[inline]
    #[must_use]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// False if any coordinate is NaN or infinite.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_check() {
        assert!(Vertex::from_coords(1.0, -2.0, 3.5).is_finite());
        assert!(!Vertex::from_coords(f64::NAN, 0.0, 0.0).is_finite());
        assert!(!Vertex::from_coords(0.0, f64::INFINITY, 0.0).is_finite());
    }
}
