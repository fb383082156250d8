//! Axis-aligned bounding box.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned box spanned by two corners.
///
/// Computed from a mesh's vertices when needed; meshes never cache one.
/// The default value is the inverted "empty" box, which any point expands.
///
/// ```
/// use mesh_types::{Aabb, Point3};
///
/// let aabb = Aabb::from_points([Point3::new(4.0, 0.0, 1.0), Point3::new(-2.0, 6.0, 1.0)].iter());
/// assert_eq!(aabb.size().x, 6.0);
/// assert_eq!(aabb.center(), Point3::new(1.0, 3.0, 1.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Lowest coordinate on each axis.
    pub min: Point3<f64>,
    /// Highest coordinate on each axis.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Box with corners `a` and `b`, in either order.
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// The inverted box: `min = +inf`, `max = -inf`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::from(Vector3::repeat(f64::INFINITY)),
            max: Point3::from(Vector3::repeat(f64::NEG_INFINITY)),
        }
    }

    /// Smallest box holding every point; [`Aabb::empty`] for no points.
    #[must_use]
    pub fn from_points<'a>(points: impl Iterator<Item = &'a Point3<f64>>) -> Self {
        points.fold(Self::empty(), |mut aabb, p| {
            aabb.expand_to_include(p);
            aabb
        })
    }

    /// True while some axis has `min > max`.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.iter().zip(self.max.iter()).any(|(lo, hi)| lo > hi)
    }

    /// Extent along X, Y and Z.
    #[inline]
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Midpoint of the two corners.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Grow to include `point`.
    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn corners_in_any_order() {
        let aabb = Aabb::new(Point3::new(1.0, 0.0, 5.0), Point3::new(0.0, 2.0, 3.0));
        assert_eq!(aabb.min, Point3::new(0.0, 0.0, 3.0));
        assert_eq!(aabb.max, Point3::new(1.0, 2.0, 5.0));
    }

    #[test]
    fn single_point_has_zero_size() {
        let mut aabb = Aabb::default();
        assert!(aabb.is_empty());

        aabb.expand_to_include(&Point3::new(1.0, 2.0, 3.0));
        assert!(!aabb.is_empty());
        assert_eq!(aabb.size(), Vector3::zeros());
    }

    #[test]
    fn no_points_is_empty() {
        assert!(Aabb::from_points(std::iter::empty()).is_empty());
    }

    #[test]
    fn center_of_offset_box() {
        let aabb = Aabb::new(Point3::new(-1.0, -2.0, -3.0), Point3::new(3.0, 2.0, 1.0));
        assert_relative_eq!(aabb.center(), Point3::new(1.0, 0.0, -1.0));
        assert_relative_eq!(aabb.size(), Vector3::new(4.0, 4.0, 4.0));
    }
}
