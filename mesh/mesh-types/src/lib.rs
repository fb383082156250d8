//! Core mesh types for the mesh2voxel pipeline.
//!
//! This crate provides the in-memory surface representation shared by every
//! stage of the pipeline:
//!
//! - [`Vertex`]: a position
//! - [`Face`]: an ordered polygon of three or more vertex indices
//! - [`IndexedMesh`]: vertex and face lists
//! - [`Aabb`]: axis-aligned extent of a point set
//!
//! # Polygons, not triangles
//!
//! Faces keep whatever cardinality the source file declared. Nothing in this
//! crate triangulates, reorders, or repairs faces: a quad read from disk is
//! a quad when it is written back out.
//!
//! Coordinates are plain `f64` with no unit attached; the normalizer later
//! maps them into voxel-grid units.
//!
//! # Example
//!
//! ```
//! use mesh_types::{Face, IndexedMesh, MeshTopology, Vertex};
//!
//! let mut mesh = IndexedMesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
//! mesh.faces.push(Face::from([0, 1, 2, 3]));
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert!(mesh.validate().is_ok());
//! ```

#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod error;
mod face;
mod mesh;
mod traits;
mod vertex;

pub use bounds::Aabb;
pub use error::{MeshError, MeshResult};
pub use face::Face;
pub use mesh::{unit_cube, IndexedMesh};
pub use traits::{MeshBounds, MeshTopology};
pub use vertex::Vertex;

pub use nalgebra::{Point3, Vector3};
