//! Affine transforms as homogeneous 4x4 matrices.

use mesh_types::{IndexedMesh, Point3, Vertex};
use nalgebra::{Matrix4, Vector3};

/// An affine transform of 3D points.
///
/// Transforms compose left to right with [`Transform3D::then`]:
///
/// ```
/// use mesh_transform::Transform3D;
/// use mesh_types::Point3;
///
/// let t = Transform3D::translation(1.0, 0.0, 0.0).then(&Transform3D::uniform_scale(2.0));
/// assert_eq!(t.transform_point(&Point3::origin()), Point3::new(2.0, 0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
    matrix: Matrix4<f64>,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3D {
    /// The transform that leaves every point in place.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Shift by `(tx, ty, tz)`.
    #[must_use]
    pub fn translation(tx: f64, ty: f64, tz: f64) -> Self {
        Self::from_translation(Vector3::new(tx, ty, tz))
    }

    /// Shift by `offset`.
    #[must_use]
    pub fn from_translation(offset: Vector3<f64>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&offset),
        }
    }

    /// Scale by `factor` on every axis, about the origin.
    #[must_use]
    pub fn uniform_scale(factor: f64) -> Self {
        Self {
            matrix: Matrix4::new_scaling(factor),
        }
    }

    /// Homogeneous matrix, column-major.
    #[must_use]
    pub const fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// `self` followed by `next`.
    #[must_use]
    pub fn then(&self, next: &Self) -> Self {
        Self {
            matrix: next.matrix * self.matrix,
        }
    }

    /// Map a single point.
    #[must_use]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.matrix.transform_point(point)
    }

    /// Copy of `mesh` with every vertex mapped. Faces are untouched.
    #[must_use]
    pub fn apply_to_mesh(&self, mesh: &IndexedMesh) -> IndexedMesh {
        let vertices = mesh
            .vertices
            .iter()
            .map(|v| Vertex::new(self.transform_point(&v.position)))
            .collect();
        IndexedMesh::from_parts(vertices, mesh.faces.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_is_identity() {
        let p = Point3::new(1.0, -2.0, 3.0);
        assert_eq!(Transform3D::default().transform_point(&p), p);
        assert_eq!(*Transform3D::default().matrix(), Matrix4::identity());
    }

    #[test]
    fn translate_point() {
        let t = Transform3D::translation(10.0, 20.0, 30.0);
        assert_relative_eq!(
            t.transform_point(&Point3::new(1.0, 2.0, 3.0)),
            Point3::new(11.0, 22.0, 33.0)
        );
    }

    #[test]
    fn scale_about_origin() {
        let t = Transform3D::uniform_scale(2.5);
        assert_relative_eq!(
            t.transform_point(&Point3::new(1.0, -2.0, 4.0)),
            Point3::new(2.5, -5.0, 10.0)
        );
    }

    #[test]
    fn composition_order_matters() {
        let shift = Transform3D::translation(1.0, 0.0, 0.0);
        let double = Transform3D::uniform_scale(2.0);

        assert_relative_eq!(shift.then(&double).transform_point(&Point3::origin()).x, 2.0);
        assert_relative_eq!(double.then(&shift).transform_point(&Point3::origin()).x, 1.0);
    }

    #[test]
    fn mesh_copy_keeps_faces_and_source() {
        let mesh = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(1.0, 0.0, 0.0),
                Vertex::from_coords(0.0, 1.0, 0.0),
                Vertex::from_coords(0.0, 0.0, 1.0),
                Vertex::from_coords(1.0, 1.0, 1.0),
            ],
            vec![vec![0, 1, 3, 2].into()],
        );

        let moved = Transform3D::translation(10.0, 20.0, 30.0).apply_to_mesh(&mesh);

        assert_relative_eq!(moved.vertices[0].position, Point3::new(11.0, 20.0, 30.0));
        assert_relative_eq!(moved.vertices[3].position, Point3::new(11.0, 21.0, 31.0));
        assert_eq!(moved.faces, mesh.faces);
        assert_eq!(mesh.vertices[0].position, Point3::new(1.0, 0.0, 0.0));
    }
}
