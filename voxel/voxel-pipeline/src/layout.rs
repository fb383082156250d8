//! Where a run keeps its intermediates and results.

use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;

/// Converted OFF files, under the data root.
pub const OFF_DIR_NAME: &str = "input_off";
/// Normalized OFF files, under the data root.
pub const SCALED_DIR_NAME: &str = "input_scaled";
/// Occupancy container, under the data root.
pub const CONTAINER_NAME: &str = "voxels.h5";
/// Default output directory, under the data root.
pub const OUTPUT_DIR_NAME: &str = "output";

/// Every path a run touches, resolved once from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkLayout {
    /// Directory of source meshes.
    pub input: PathBuf,
    /// Parent of the intermediates.
    pub data_root: PathBuf,
    /// Converted OFF files.
    pub off_dir: PathBuf,
    /// Normalized OFF files.
    pub scaled_dir: PathBuf,
    /// Rasterizer output.
    pub container: PathBuf,
    /// Final per-mesh arrays.
    pub output_dir: PathBuf,
}

impl WorkLayout {
    /// Resolve paths for `config`.
    ///
    /// The data root is the configured work directory, or else the parent of
    /// the input directory (`.` if it has none).
    #[must_use]
    pub fn resolve(config: &PipelineConfig) -> Self {
        let data_root = config
            .work_dir
            .clone()
            .unwrap_or_else(|| parent_or_current(&config.input));
        let output_dir = config
            .output
            .clone()
            .unwrap_or_else(|| data_root.join(OUTPUT_DIR_NAME));

        Self {
            input: config.input.clone(),
            off_dir: data_root.join(OFF_DIR_NAME),
            scaled_dir: data_root.join(SCALED_DIR_NAME),
            container: data_root.join(CONTAINER_NAME),
            output_dir,
            data_root,
        }
    }

    /// The intermediates removed by cleanup.
    #[must_use]
    pub fn intermediates(&self) -> [&Path; 3] {
        [&self.off_dir, &self.scaled_dir, &self.container]
    }
}

fn parent_or_current(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_hang_off_input_parent() {
        let layout = WorkLayout::resolve(&PipelineConfig::new("/data/meshes/"));
        assert_eq!(layout.data_root, PathBuf::from("/data"));
        assert_eq!(layout.off_dir, PathBuf::from("/data/input_off"));
        assert_eq!(layout.scaled_dir, PathBuf::from("/data/input_scaled"));
        assert_eq!(layout.container, PathBuf::from("/data/voxels.h5"));
        assert_eq!(layout.output_dir, PathBuf::from("/data/output"));
    }

    #[test]
    fn bare_relative_input_uses_current_dir() {
        let layout = WorkLayout::resolve(&PipelineConfig::new("meshes"));
        assert_eq!(layout.data_root, PathBuf::from("."));
        assert_eq!(layout.off_dir, PathBuf::from("./input_off"));
    }

    #[test]
    fn explicit_dirs_win() {
        let config = PipelineConfig::new("/data/meshes")
            .with_work_dir("/scratch")
            .with_output("/results");
        let layout = WorkLayout::resolve(&config);
        assert_eq!(layout.container, PathBuf::from("/scratch/voxels.h5"));
        assert_eq!(layout.output_dir, PathBuf::from("/results"));
        assert_eq!(
            layout.intermediates(),
            [
                Path::new("/scratch/input_off"),
                Path::new("/scratch/input_scaled"),
                Path::new("/scratch/voxels.h5"),
            ]
        );
    }
}
