//! Affine transforms and grid fitting for polygon meshes.
//!
//! This crate provides:
//! - [`Transform3D`], a 4x4 affine transform built from translations and uniform scales
//! - [`GridDims`], the `WxHxD` resolution of a voxel grid
//! - [`normalize`], which centres and uniformly scales a mesh into a grid volume
//!
//! # Example
//!
//! ```
//! use mesh_transform::{normalize, GridDims, NormalizeParams};
//! use mesh_types::{unit_cube, MeshBounds};
//!
//! let params = NormalizeParams::for_grid(GridDims::new(32, 32, 32)).with_padding(0.1);
//! let fitted = normalize(&unit_cube(), &params).unwrap();
//!
//! let center = fitted.bounds().center();
//! assert!((center.x - 16.0).abs() < 1e-9);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod error;
mod grid;
mod normalize;
mod transform;

pub use error::{TransformError, TransformResult};
pub use grid::GridDims;
pub use normalize::{
    fit_transform, normalize, normalize_with_report, NormalizeParams, NormalizeReport,
    DEFAULT_PADDING, DEGENERATE_EXTENT,
};
pub use transform::Transform3D;
