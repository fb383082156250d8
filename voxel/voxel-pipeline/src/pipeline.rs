//! The orchestrator: runs the stages in order and restores mesh identity.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::layout::WorkLayout;
use crate::manifest::Manifest;
use crate::runner::{Stage, StageRunner};

const STAGING_PREFIX: &str = ".mesh2voxel-staging-";

/// A step of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Capture the manifest.
    Discover,
    /// Run the convert stage.
    Convert,
    /// Run the normalize stage.
    Normalize,
    /// Run the rasterize stage.
    Rasterize,
    /// Run the extract stage.
    Extract,
    /// Rename positional results to source names.
    Restore,
    /// Remove intermediates.
    Cleanup,
}

impl Phase {
    /// Lower-case phase name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Discover => "discover",
            Self::Convert => "convert",
            Self::Normalize => "normalize",
            Self::Rasterize => "rasterize",
            Self::Extract => "extract",
            Self::Restore => "restore",
            Self::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a [`Pipeline`] is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Not started.
    Ready,
    /// Executing a phase.
    Running(Phase),
    /// Finished successfully.
    Done,
    /// Stopped by a fatal error during `at`.
    Aborted {
        /// The phase that failed.
        at: Phase,
    },
}

impl PipelineState {
    /// True for `Done` and `Aborted`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted { .. })
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// The meshes processed, in position order.
    pub manifest: Manifest,
    /// Final result files, in manifest order.
    pub outputs: Vec<PathBuf>,
    /// Intermediates that could not be removed.
    pub cleanup_warnings: Vec<String>,
}

/// Drives one run of the mesh-to-voxel pipeline.
///
/// # Example
///
/// ```no_run
/// use voxel_pipeline::{Pipeline, PipelineConfig, ProcessRunner};
///
/// let config = PipelineConfig::new("data/meshes");
/// let mut pipeline = Pipeline::new(config, ProcessRunner::new()?)?;
/// let report = pipeline.run()?;
/// println!("{} arrays written", report.outputs.len());
/// # Ok::<(), voxel_pipeline::PipelineError>(())
/// ```
#[derive(Debug)]
pub struct Pipeline<R> {
    config: PipelineConfig,
    layout: WorkLayout,
    runner: R,
    state: PipelineState,
}

impl<R: StageRunner> Pipeline<R> {
    /// Validate `config` and prepare a run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the configuration is invalid or
    /// the input or output directory coincides with an intermediate path.
    pub fn new(config: PipelineConfig, runner: R) -> PipelineResult<Self> {
        config.validate()?;
        let layout = WorkLayout::resolve(&config);
        for dir in [&layout.input, &layout.output_dir] {
            if layout.intermediates().contains(&dir.as_path()) {
                return Err(PipelineError::config(format!(
                    "{} is reserved for intermediates and would be removed",
                    dir.display()
                )));
            }
        }
        Ok(Self {
            config,
            layout,
            runner,
            state: PipelineState::Ready,
        })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Resolved paths for this run.
    #[must_use]
    pub const fn layout(&self) -> &WorkLayout {
        &self.layout
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every phase. Intermediates are left in place on failure.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; the state becomes
    /// [`PipelineState::Aborted`] with the failing phase.
    pub fn run(&mut self) -> PipelineResult<PipelineReport> {
        if self.state != PipelineState::Ready {
            return Err(PipelineError::config(
                "a pipeline runs once; create a new one to run again",
            ));
        }

        match self.run_phases() {
            Ok(report) => {
                self.state = PipelineState::Done;
                info!(
                    meshes = report.manifest.len(),
                    output = %self.layout.output_dir.display(),
                    "Pipeline complete"
                );
                Ok(report)
            }
            Err(err) => {
                let at = match self.state {
                    PipelineState::Running(phase) => phase,
                    _ => Phase::Discover,
                };
                self.state = PipelineState::Aborted { at };
                error!(phase = %at, error = %err, "Pipeline aborted; intermediates left in place");
                Err(err)
            }
        }
    }

    fn enter(&mut self, phase: Phase) {
        self.state = PipelineState::Running(phase);
        info!(%phase, "Entering phase");
    }

    fn run_phases(&mut self) -> PipelineResult<PipelineReport> {
        self.enter(Phase::Discover);
        let manifest = Manifest::discover(&self.layout.input)?;
        info!(count = manifest.len(), input = %self.layout.input.display(), "Captured manifest");
        for (index, entry) in manifest.iter().enumerate() {
            debug!(index, file = entry.file_name(), "Manifest entry");
        }

        self.enter(Phase::Convert);
        remove_stale(&self.layout.intermediates())?;
        let args = vec![path_arg(&self.layout.input), path_arg(&self.layout.off_dir)];
        self.run_stage(Stage::Convert, args)?;
        let mut expected = manifest.interchange_names();
        expected.sort();
        verify_listing(Stage::Convert, &self.layout.off_dir, &expected)?;

        self.enter(Phase::Normalize);
        let dims = self.config.dims;
        let mut args = vec![path_arg(&self.layout.off_dir), path_arg(&self.layout.scaled_dir)];
        args.extend(dim_args(dims.width, dims.height, dims.depth));
        args.extend(["--padding".to_string(), self.config.padding.to_string()]);
        self.run_stage(Stage::Normalize, args)?;
        // Sorted listing is the rasterizer's enumeration; it must match manifest order.
        verify_listing(Stage::Normalize, &self.layout.scaled_dir, &manifest.interchange_names())?;

        self.enter(Phase::Rasterize);
        let mut args = vec![
            "occ".to_string(),
            "--input".to_string(),
            path_arg(&self.layout.scaled_dir),
            "--output".to_string(),
            path_arg(&self.layout.container),
        ];
        args.extend(dim_args(dims.width, dims.height, dims.depth));
        self.run_stage(Stage::Rasterize, args)?;

        self.enter(Phase::Extract);
        std::fs::create_dir_all(&self.layout.output_dir)
            .map_err(|e| PipelineError::io(&self.layout.output_dir, e))?;
        let args = vec![path_arg(&self.layout.container), path_arg(&self.layout.output_dir)];
        self.run_stage(Stage::Extract, args)?;

        self.enter(Phase::Restore);
        let outputs = restore_names(&manifest, &self.layout.output_dir, &self.config.array_extension)?;

        self.enter(Phase::Cleanup);
        let cleanup_warnings = if self.config.cleanup {
            cleanup(&self.layout)
        } else {
            info!(root = %self.layout.data_root.display(), "Keeping intermediates");
            Vec::new()
        };

        Ok(PipelineReport {
            manifest,
            outputs,
            cleanup_warnings,
        })
    }

    fn run_stage(&mut self, stage: Stage, stage_args: Vec<String>) -> PipelineResult<()> {
        let invocation = self.config.tools.for_stage(stage).invocation(stage, stage_args);
        info!(%stage, command = %invocation, "Running stage");

        let status = self.runner.run(&invocation)?;
        if status.success() {
            Ok(())
        } else {
            Err(PipelineError::StageFailure {
                stage,
                command: invocation.command_line(),
                status,
            })
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn dim_args(width: u32, height: u32, depth: u32) -> [String; 6] {
    [
        "--width".to_string(),
        width.to_string(),
        "--height".to_string(),
        height.to_string(),
        "--depth".to_string(),
        depth.to_string(),
    ]
}

/// Remove leftovers of an earlier run so listings only show this run's files.
fn remove_stale(paths: &[&Path]) -> PipelineResult<()> {
    for path in paths {
        if path.exists() {
            info!(path = %path.display(), "Removing stale intermediate");
            remove_path(path).map_err(|e| PipelineError::io(*path, e))?;
        }
    }
    Ok(())
}

fn remove_path(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

/// Sorted names of the regular files directly in `dir`.
fn sorted_listing(dir: &Path) -> PipelineResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))? {
        let entry = entry.map_err(|e| PipelineError::io(dir, e))?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

fn verify_listing(stage: Stage, dir: &Path, expected: &[String]) -> PipelineResult<()> {
    let found = sorted_listing(dir)?;
    if found.len() != expected.len() {
        return Err(PipelineError::mismatch(
            stage,
            format!(
                "{} holds {} files, expected {}",
                dir.display(),
                found.len(),
                expected.len()
            ),
        ));
    }
    if let Some((index, (got, want))) = found
        .iter()
        .zip(expected)
        .enumerate()
        .find(|(_, (got, want))| got != want)
    {
        return Err(PipelineError::mismatch(
            stage,
            format!(
                "position {index} in {} is `{got}`, expected `{want}`",
                dir.display()
            ),
        ));
    }
    debug!(%stage, dir = %dir.display(), count = found.len(), "Listing matches manifest");
    Ok(())
}

/// Positional results `<index>.<ext>` in `dir`, keyed by index.
///
/// Only canonical decimal stems count: `7.npy` is position 7, `07.npy` is ignored.
fn positional_results(dir: &Path, extension: &str) -> PipelineResult<BTreeMap<usize, PathBuf>> {
    let mut results = BTreeMap::new();
    for entry in std::fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))? {
        let path = entry.map_err(|e| PipelineError::io(dir, e))?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Ok(index) = stem.parse::<usize>() {
            if index.to_string() == stem {
                results.insert(index, path);
            }
        }
    }
    Ok(results)
}

/// Rename `i.<ext>` to `<base name of manifest entry i>.<ext>` for every entry.
///
/// Nothing is renamed unless the results are exactly positions `0..N`.
/// Renames go through staging names so a base name that is itself a number
/// never overwrites a result that has not been renamed yet.
fn restore_names(manifest: &Manifest, dir: &Path, extension: &str) -> PipelineResult<Vec<PathBuf>> {
    let results = positional_results(dir, extension)?;

    if results.len() != manifest.len() {
        return Err(PipelineError::mismatch(
            Stage::Extract,
            format!(
                "found {} .{extension} results in {}, manifest has {} meshes",
                results.len(),
                dir.display(),
                manifest.len()
            ),
        ));
    }
    if let Some((expected, found)) = results
        .keys()
        .enumerate()
        .find(|(expected, found)| expected != *found)
    {
        return Err(PipelineError::mismatch(
            Stage::Extract,
            format!("result indices are not contiguous: expected {expected}, found {found}"),
        ));
    }

    let mut staged = Vec::with_capacity(results.len());
    for (index, path) in &results {
        let staging = staging_path(dir, *index, extension);
        if let Err(err) = rename(path, &staging) {
            roll_back(dir, extension, &staged);
            return Err(err);
        }
        staged.push(staging);
    }

    let mut outputs = Vec::with_capacity(staged.len());
    for ((index, staging), entry) in staged.iter().enumerate().zip(manifest) {
        let name = entry.result_name(extension);
        let target = dir.join(&name);
        if let Err(err) = rename(staging, &target) {
            let current: Vec<PathBuf> = outputs.iter().chain(&staged[index..]).cloned().collect();
            roll_back(dir, extension, &current);
            return Err(err);
        }
        info!("Renamed {index}.{extension} -> {name}");
        outputs.push(target);
    }
    Ok(outputs)
}

fn staging_path(dir: &Path, index: usize, extension: &str) -> PathBuf {
    dir.join(format!("{STAGING_PREFIX}{index}.{extension}"))
}

fn rename(from: &Path, to: &Path) -> PipelineResult<()> {
    std::fs::rename(from, to).map_err(|e| PipelineError::io(from, e))
}

/// Move result `i`, currently at `current[i]`, back to `i.<ext>`.
///
/// Goes through the staging names first so a restored name that is itself
/// a number cannot be overwritten. Anything that cannot be moved is logged
/// with the path it was left at.
fn roll_back(dir: &Path, extension: &str, current: &[PathBuf]) {
    warn!(count = current.len(), dir = %dir.display(), "Rolling back result renames");
    let parked: Vec<(usize, PathBuf)> = current
        .iter()
        .enumerate()
        .filter_map(|(index, path)| {
            let staging = staging_path(dir, index, extension);
            (*path == staging || put_back(path, &staging)).then_some((index, staging))
        })
        .collect();
    for (index, staging) in parked {
        put_back(&staging, &dir.join(format!("{index}.{extension}")));
    }
}

fn put_back(from: &Path, to: &Path) -> bool {
    match std::fs::rename(from, to) {
        Ok(()) => true,
        Err(e) => {
            error!(
                path = %from.display(),
                "Result left in place, could not move it to {}: {e}",
                to.display()
            );
            false
        }
    }
}

/// Remove intermediates, returning a warning per path that could not be removed.
fn cleanup(layout: &WorkLayout) -> Vec<String> {
    let mut warnings = Vec::new();
    for path in layout.intermediates() {
        match remove_path(path) {
            Ok(()) => debug!(path = %path.display(), "Removed intermediate"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                let message = format!("could not remove {}: {e}", path.display());
                warn!("{message}");
                warnings.push(message);
            }
        }
    }
    warnings
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn manifest_of(names: &[&str]) -> Manifest {
        Manifest::from_paths(
            Path::new("in"),
            names.iter().map(|n| PathBuf::from("in").join(n)),
        )
        .unwrap()
    }

    fn write_results(dir: &Path, count: usize) {
        for i in 0..count {
            std::fs::write(dir.join(format!("{i}.npy")), format!("result {i}")).unwrap();
        }
    }

    #[test]
    fn restore_maps_positions_to_sorted_names() {
        let dir = tempdir().unwrap();
        write_results(dir.path(), 2);

        let outputs = restore_names(&manifest_of(&["b.obj", "a.obj"]), dir.path(), "npy").unwrap();

        assert_eq!(outputs, [dir.path().join("a.npy"), dir.path().join("b.npy")]);
        assert_eq!(std::fs::read_to_string(dir.path().join("a.npy")).unwrap(), "result 0");
        assert_eq!(std::fs::read_to_string(dir.path().join("b.npy")).unwrap(), "result 1");
        assert!(!dir.path().join("0.npy").exists());
    }

    #[test]
    fn failed_rename_rolls_back_to_positions() {
        let dir = tempdir().unwrap();
        write_results(dir.path(), 3);
        let blocker = dir.path().join("b.npy");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep"), "").unwrap();

        let err = restore_names(&manifest_of(&["a.obj", "b.obj", "c.obj"]), dir.path(), "npy")
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }), "{err}");

        for i in 0..3 {
            let path = dir.path().join(format!("{i}.npy"));
            assert_eq!(std::fs::read_to_string(path).unwrap(), format!("result {i}"));
        }
        assert!(!dir.path().join("a.npy").exists());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(STAGING_PREFIX))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[test]
    fn numeric_base_names_do_not_clobber() {
        let dir = tempdir().unwrap();
        write_results(dir.path(), 3);

        // Sorted: "1.obj", "10.obj", "2.obj"
        let manifest = manifest_of(&["2.obj", "10.obj", "1.obj"]);
        restore_names(&manifest, dir.path(), "npy").unwrap();

        let read = |name: &str| std::fs::read_to_string(dir.path().join(name)).unwrap();
        assert_eq!(read("1.npy"), "result 0");
        assert_eq!(read("10.npy"), "result 1");
        assert_eq!(read("2.npy"), "result 2");
        assert!(!dir.path().join("0.npy").exists());
    }

    #[test]
    fn count_mismatch_renames_nothing() {
        let dir = tempdir().unwrap();
        write_results(dir.path(), 1);

        let err = restore_names(&manifest_of(&["a.obj", "b.obj"]), dir.path(), "npy").unwrap_err();
        assert!(matches!(err, PipelineError::IdentityMismatch { stage: Stage::Extract, .. }));
        assert!(dir.path().join("0.npy").exists());
        assert!(!dir.path().join("a.npy").exists());
    }

    #[test]
    fn gap_in_indices_renames_nothing() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("0.npy"), "").unwrap();
        std::fs::write(dir.path().join("2.npy"), "").unwrap();

        let err = restore_names(&manifest_of(&["a.obj", "b.obj"]), dir.path(), "npy").unwrap_err();
        assert!(err.to_string().contains("not contiguous"));
        assert!(dir.path().join("0.npy").exists());
        assert!(dir.path().join("2.npy").exists());
    }

    #[test]
    fn non_canonical_and_foreign_files_ignored() {
        let dir = tempdir().unwrap();
        write_results(dir.path(), 1);
        std::fs::write(dir.path().join("00.npy"), "").unwrap();
        std::fs::write(dir.path().join("1.txt"), "").unwrap();
        std::fs::write(dir.path().join("old.npy"), "").unwrap();

        let results = positional_results(dir.path(), "npy").unwrap();
        assert_eq!(results.keys().copied().collect::<Vec<_>>(), [0]);
    }

    #[test]
    fn listing_must_match_order() {
        let dir = tempdir().unwrap();
        for name in ["a.oc.off", "a.off"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        // Manifest order from "a.obj" < "a.oc.obj"
        let expected = manifest_of(&["a.obj", "a.oc.obj"]).interchange_names();

        let err = verify_listing(Stage::Normalize, dir.path(), &expected).unwrap_err();
        assert!(matches!(err, PipelineError::IdentityMismatch { stage: Stage::Normalize, .. }));
        assert!(err.to_string().contains("position 0"));
    }

    #[test]
    fn cleanup_ignores_missing_paths() {
        let dir = tempdir().unwrap();
        let layout = WorkLayout::resolve(
            &PipelineConfig::new(dir.path().join("in")).with_work_dir(dir.path()),
        );
        std::fs::create_dir_all(layout.off_dir.join("deep")).unwrap();
        std::fs::write(&layout.container, "h5").unwrap();

        assert!(cleanup(&layout).is_empty());
        assert!(!layout.off_dir.exists());
        assert!(!layout.container.exists());
    }

    #[test]
    fn state_helpers() {
        assert!(PipelineState::Done.is_terminal());
        assert!(PipelineState::Aborted { at: Phase::Extract }.is_terminal());
        assert!(!PipelineState::Running(Phase::Convert).is_terminal());
        assert_eq!(Phase::Restore.to_string(), "restore");
    }
}
