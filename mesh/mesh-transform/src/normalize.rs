//! Fitting a mesh into a voxel grid volume.
//!
//! The target volume spans `[0, W] x [0, H] x [0, D]`. A mesh is centred on
//! the volume centre and uniformly scaled so that its longest axis, relative
//! to the matching grid axis, fills `1 - padding` of that axis.

use mesh_types::{Aabb, IndexedMesh, MeshBounds, Point3, Vector3};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{TransformError, TransformResult};
use crate::grid::GridDims;
use crate::transform::Transform3D;

/// Axes with an extent at or below this are ignored when choosing the scale.
pub const DEGENERATE_EXTENT: f64 = 1e-12;

/// Fraction of each grid axis left empty by default.
pub const DEFAULT_PADDING: f64 = 0.1;

/// Parameters for [`normalize`].
///
/// # Example
///
/// ```
/// use mesh_transform::{GridDims, NormalizeParams};
///
/// let params = NormalizeParams::for_grid(GridDims::new(64, 32, 32)).with_padding(0.05);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NormalizeParams {
    /// Extent of the target volume along X, Y, Z.
    pub target: Vector3<f64>,

    /// Fraction of each axis left as margin, in `[0, 1)`.
    pub padding: f64,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self::for_grid(GridDims::default())
    }
}

impl NormalizeParams {
    /// Create parameters for an explicit target extent.
    #[must_use]
    pub const fn new(target: Vector3<f64>, padding: f64) -> Self {
        Self { target, padding }
    }

    /// Parameters targeting a voxel grid with the default padding.
    #[must_use]
    pub fn for_grid(dims: GridDims) -> Self {
        Self::new(dims.extent(), DEFAULT_PADDING)
    }

    /// Set the padding fraction.
    #[must_use]
    pub const fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Centre of the target volume.
    #[must_use]
    pub fn target_center(&self) -> Point3<f64> {
        Point3::from(self.target / 2.0)
    }

    /// Check that the target is finite and positive and that padding is in `[0, 1)`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidParams`] describing the first problem found.
    pub fn validate(&self) -> TransformResult<()> {
        for (axis, extent) in ["width", "height", "depth"].iter().zip(self.target.iter()) {
            if !extent.is_finite() || *extent <= 0.0 {
                return Err(TransformError::invalid_params(format!(
                    "target {axis} must be finite and positive, got {extent}"
                )));
            }
        }
        if !self.padding.is_finite() || !(0.0..1.0).contains(&self.padding) {
            return Err(TransformError::invalid_params(format!(
                "padding must be in [0, 1), got {}",
                self.padding
            )));
        }
        Ok(())
    }
}

/// Summary of a normalization, for logging and inspection.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NormalizeReport {
    /// Uniform scale factor that was applied.
    pub scale: f64,
    /// Bounding box of the input mesh.
    pub source_bounds: Aabb,
    /// Bounding box of the normalized mesh.
    pub result_bounds: Aabb,
}

/// Compute the transform that fits `mesh` into the target volume.
///
/// # Errors
///
/// - [`TransformError::InvalidParams`] if `params` fail validation
/// - [`TransformError::EmptyMesh`] if the mesh has no vertices
/// - [`TransformError::NonFiniteVertex`] if any coordinate is NaN or infinite
/// - [`TransformError::DegenerateGeometry`] if every axis extent is at most
///   [`DEGENERATE_EXTENT`]
pub fn fit_transform(
    mesh: &IndexedMesh,
    params: &NormalizeParams,
) -> TransformResult<(Transform3D, f64)> {
    params.validate()?;

    if mesh.vertices.is_empty() {
        return Err(TransformError::EmptyMesh);
    }
    if let Some(index) = mesh.vertices.iter().position(|v| !v.is_finite()) {
        return Err(TransformError::NonFiniteVertex { index });
    }

    let bounds = mesh.bounds();
    let extent = bounds.size();
    let usable = params.target * (1.0 - params.padding);

    let scale = extent
        .iter()
        .zip(usable.iter())
        .filter(|(e, _)| **e > DEGENERATE_EXTENT)
        .map(|(e, u)| u / e)
        .reduce(f64::min)
        .ok_or(TransformError::DegenerateGeometry {
            x: extent.x,
            y: extent.y,
            z: extent.z,
            threshold: DEGENERATE_EXTENT,
        })?;

    let transform = Transform3D::from_translation(-bounds.center().coords)
        .then(&Transform3D::uniform_scale(scale))
        .then(&Transform3D::from_translation(params.target_center().coords));

    Ok((transform, scale))
}

/// Centre and uniformly scale `mesh` into the target volume.
///
/// Returns a new mesh; the input is not modified and faces are copied as-is.
///
/// # Errors
///
/// See [`fit_transform`].
///
/// # Example
///
/// ```
/// use mesh_transform::{normalize, GridDims, NormalizeParams};
/// use mesh_types::{unit_cube, MeshBounds};
///
/// let params = NormalizeParams::for_grid(GridDims::cube(32));
/// let fitted = normalize(&unit_cube(), &params).unwrap();
///
/// let size = fitted.bounds().size();
/// assert!((size.x - 28.8).abs() < 1e-9);
/// ```
pub fn normalize(mesh: &IndexedMesh, params: &NormalizeParams) -> TransformResult<IndexedMesh> {
    normalize_with_report(mesh, params).map(|(mesh, _)| mesh)
}

/// Like [`normalize`], also returning a [`NormalizeReport`].
///
/// # Errors
///
/// See [`fit_transform`].
pub fn normalize_with_report(
    mesh: &IndexedMesh,
    params: &NormalizeParams,
) -> TransformResult<(IndexedMesh, NormalizeReport)> {
    let (transform, scale) = fit_transform(mesh, params)?;
    let fitted = transform.apply_to_mesh(mesh);

    let report = NormalizeReport {
        scale,
        source_bounds: mesh.bounds(),
        result_bounds: fitted.bounds(),
    };
    debug!(
        scale,
        vertices = fitted.vertices.len(),
        source_min = ?report.source_bounds.min,
        source_max = ?report.source_bounds.max,
        result_min = ?report.result_bounds.min,
        result_max = ?report.result_bounds.max,
        "Normalized mesh"
    );

    Ok((fitted, report))
}
