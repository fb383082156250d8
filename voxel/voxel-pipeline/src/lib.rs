//! Mesh directory to voxel occupancy arrays.
//!
//! A run takes a directory of `.obj`/`.off` meshes through four external
//! stages and renames the extractor's positional results back to the source
//! names:
//!
//! 1. **Discover** the meshes and capture the [`Manifest`] (sorted by file name)
//! 2. **Convert** them to OFF (`<data root>/input_off`)
//! 3. **Normalize** each into the grid volume (`<data root>/input_scaled`)
//! 4. **Rasterize** all of them into one container (`<data root>/voxels.h5`)
//! 5. **Extract** per-mesh arrays `0.npy`, `1.npy`, ... into the output directory
//! 6. **Restore** names: position `i` becomes `<base name of manifest entry i>.npy`
//! 7. **Cleanup** the intermediates, unless disabled
//!
//! Stages are executed through the [`StageRunner`] trait. [`ProcessRunner`]
//! spawns real programs; the convert and normalize stages default to this
//! crate's own `mesh2voxel convert` / `mesh2voxel normalize` subcommands,
//! implemented in [`builtin`]. Library callers get `mesh2voxel` from `PATH`;
//! the binary binds them to itself with [`ToolSet::bind_builtin`].
//!
//! # Example
//!
//! ```no_run
//! use mesh_transform::GridDims;
//! use voxel_pipeline::{run_pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::new("data/meshes")
//!     .with_dims(GridDims::cube(64))
//!     .with_cleanup(false);
//! let report = run_pipeline(config)?;
//! for path in &report.outputs {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), voxel_pipeline::PipelineError>(())
//! ```

#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod builtin;
mod config;
mod error;
mod layout;
mod manifest;
mod pipeline;
mod runner;

pub use config::{PipelineConfig, ToolCommand, ToolSet, BUILTIN_PROGRAM, DEFAULT_ARRAY_EXTENSION};
pub use error::{PipelineError, PipelineResult};
pub use layout::{WorkLayout, CONTAINER_NAME, OFF_DIR_NAME, OUTPUT_DIR_NAME, SCALED_DIR_NAME};
pub use manifest::{Manifest, ManifestEntry};
pub use pipeline::{Phase, Pipeline, PipelineReport, PipelineState};
pub use runner::{ProcessRunner, Stage, StageInvocation, StageRunner, StageStatus};

/// Run the whole pipeline with real subprocesses.
///
/// # Errors
///
/// Returns the first fatal [`PipelineError`].
pub fn run_pipeline(config: PipelineConfig) -> PipelineResult<PipelineReport> {
    Pipeline::new(config, ProcessRunner::new()?)?.run()
}
