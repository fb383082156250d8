//! Property-based tests for grid fitting.
//!
//! Run with: cargo test -p mesh-transform -- proptest

#![allow(clippy::unwrap_used, clippy::expect_used)]

use mesh_transform::{normalize_with_report, GridDims, NormalizeParams};
use mesh_types::{Face, IndexedMesh, MeshBounds, Vertex};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_vertex() -> impl Strategy<Value = Vertex> {
    prop::array::uniform3(-1000.0..1000.0f64).prop_map(|[x, y, z]| Vertex::from_coords(x, y, z))
}

/// A mesh of 3..40 vertices with one triangle fan, so every face is valid.
fn arb_mesh() -> impl Strategy<Value = IndexedMesh> {
    prop::collection::vec(arb_vertex(), 3..40).prop_map(|vertices| {
        let n = u32::try_from(vertices.len()).unwrap();
        let faces = (1..n - 1).map(|i| Face::triangle(0, i, i + 1)).collect();
        IndexedMesh::from_parts(vertices, faces)
    })
}

fn arb_params() -> impl Strategy<Value = NormalizeParams> {
    (1u32..256, 1u32..256, 1u32..256, 0.0..0.9f64).prop_map(|(w, h, d, padding)| {
        NormalizeParams::for_grid(GridDims::new(w, h, d)).with_padding(padding)
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// The fitted mesh never exceeds the padded target on any axis.
    #[test]
    fn fits_inside_padded_target(mesh in arb_mesh(), params in arb_params()) {
        let (fitted, _) = normalize_with_report(&mesh, &params).unwrap();
        let size = fitted.bounds().size();
        let usable = params.target * (1.0 - params.padding);

        for axis in 0..3 {
            prop_assert!(
                size[axis] <= usable[axis] * (1.0 + 1e-9),
                "axis {} extent {} exceeds {}", axis, size[axis], usable[axis]
            );
        }
    }

    /// The fitted bounding box is centred on the target centre.
    #[test]
    fn centred_on_target(mesh in arb_mesh(), params in arb_params()) {
        let (fitted, _) = normalize_with_report(&mesh, &params).unwrap();
        let offset = fitted.bounds().center() - params.target_center();
        let tolerance = 1e-9 * params.target.max();

        prop_assert!(offset.amax() <= tolerance, "centre offset {:?}", offset);
    }

    /// Coordinate deltas are scaled by one uniform factor.
    #[test]
    fn preserves_delta_ratios(mesh in arb_mesh(), params in arb_params()) {
        let (fitted, report) = normalize_with_report(&mesh, &params).unwrap();
        let origin = mesh.vertices[0].position;
        let fitted_origin = fitted.vertices[0].position;

        for (before, after) in mesh.vertices.iter().zip(&fitted.vertices) {
            let expected = (before.position - origin) * report.scale;
            let actual = after.position - fitted_origin;
            let tolerance = 1e-9 * (1.0 + expected.amax());
            prop_assert!((actual - expected).amax() <= tolerance);
        }
    }

    /// Topology passes through untouched.
    #[test]
    fn faces_unchanged(mesh in arb_mesh(), params in arb_params()) {
        let (fitted, _) = normalize_with_report(&mesh, &params).unwrap();
        prop_assert_eq!(&fitted.faces, &mesh.faces);
        prop_assert_eq!(fitted.vertices.len(), mesh.vertices.len());
    }
}
