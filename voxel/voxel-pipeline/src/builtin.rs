//! In-process implementations of the convert and normalize stages.
//!
//! These back the `mesh2voxel convert` and `mesh2voxel normalize`
//! subcommands, which are the default tools for those stages.

use std::path::{Path, PathBuf};

use mesh_io::{load_mesh, save_off, IoError, MeshFormat};
use mesh_transform::{normalize_with_report, NormalizeParams};
use mesh_types::IndexedMesh;
use tracing::{debug, info};

use crate::error::{PipelineError, PipelineResult};
use crate::manifest::Manifest;

/// Create `dir` (and parents) if missing.
///
/// # Errors
///
/// Returns [`IoError::NotADirectory`] if something other than a directory
/// exists at `dir`; it is never replaced.
pub fn prepare_output_dir(dir: &Path) -> Result<(), IoError> {
    if dir.exists() && !dir.is_dir() {
        return Err(IoError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}

/// Convert every mesh under `input` to `<base>.off` in `output`.
///
/// `input` may be a directory of meshes or a single mesh file. Returns the
/// number of files written.
///
/// # Errors
///
/// Fails on the first mesh that cannot be read or written. Nothing is retried.
pub fn convert_path(input: &Path, output: &Path) -> PipelineResult<usize> {
    for_each_mesh(input, output, |_, mesh| Ok(mesh))
}

/// Fit every mesh under `input` into the grid volume, writing `<base>.off`
/// into `output`.
///
/// # Errors
///
/// Fails on the first mesh that cannot be read, fitted, or written.
pub fn normalize_path(input: &Path, output: &Path, params: &NormalizeParams) -> PipelineResult<usize> {
    params
        .validate()
        .map_err(|e| PipelineError::config(e.to_string()))?;

    for_each_mesh(input, output, |path, mesh| {
        let (fitted, report) =
            normalize_with_report(&mesh, params).map_err(|source| PipelineError::Normalization {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(file = %path.display(), scale = report.scale, "Fitted mesh");
        Ok(fitted)
    })
}

fn for_each_mesh<F>(input: &Path, output: &Path, mut map: F) -> PipelineResult<usize>
where
    F: FnMut(&Path, IndexedMesh) -> PipelineResult<IndexedMesh>,
{
    let manifest = if input.is_dir() {
        Manifest::discover(input)?
    } else {
        single_file(input)?
    };

    prepare_output_dir(output).map_err(|source| PipelineError::Codec {
        path: output.to_path_buf(),
        source,
    })?;

    for entry in &manifest {
        let codec_error =
            |path: PathBuf| move |source: IoError| PipelineError::Codec { path, source };

        let mesh = load_mesh(entry.path()).map_err(codec_error(entry.path().to_path_buf()))?;
        let mesh = map(entry.path(), mesh)?;

        let target = output.join(entry.interchange_name());
        save_off(&mesh, &target).map_err(codec_error(target.clone()))?;
        debug!(
            from = %entry.file_name(),
            to = %target.display(),
            vertices = mesh.vertices.len(),
            faces = mesh.faces.len(),
            "Wrote OFF"
        );
    }

    info!(count = manifest.len(), output = %output.display(), "Processed meshes");
    Ok(manifest.len())
}

fn single_file(path: &Path) -> PipelineResult<Manifest> {
    if !path.is_file() {
        return Err(PipelineError::discovery(path, "no such file or directory"));
    }
    if MeshFormat::from_path(path).is_none() {
        return Err(PipelineError::discovery(path, "not an .obj or .off file"));
    }
    let dir = path.parent().unwrap_or(path);
    Manifest::from_paths(dir, [path.to_path_buf()])
}
