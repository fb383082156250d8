//! Pipeline configuration.

use std::path::{Path, PathBuf};

use mesh_transform::{GridDims, NormalizeParams, DEFAULT_PADDING};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::runner::{Stage, StageInvocation};

/// Default extension of the per-mesh arrays written by the extractor.
pub const DEFAULT_ARRAY_EXTENSION: &str = "npy";

/// Name of the binary whose subcommands provide the built-in stages.
///
/// Default configs refer to it by this bare name; the `mesh2voxel` binary
/// swaps in its own path with [`ToolSet::bind_builtin`].
pub const BUILTIN_PROGRAM: &str = "mesh2voxel";

/// A program plus leading arguments; stage arguments are appended after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    /// Program to execute, looked up on `PATH` if not a path.
    pub program: PathBuf,

    /// Arguments placed before the stage arguments.
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    /// A program with no leading arguments.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Set the leading arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Parse `PROGRAM [ARGS...]` from already-split words.
    ///
    /// Returns `None` for an empty list.
    #[must_use]
    pub fn from_words(words: &[String]) -> Option<Self> {
        let (program, args) = words.split_first()?;
        Some(Self::new(program).with_args(args.iter().cloned()))
    }

    /// A subcommand of `mesh2voxel`, looked up on `PATH` until bound.
    #[must_use]
    pub fn builtin(subcommand: &str) -> Self {
        Self::new(BUILTIN_PROGRAM).with_args([subcommand])
    }

    /// True if the program is the bare [`BUILTIN_PROGRAM`] name.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.program.as_os_str() == BUILTIN_PROGRAM
    }

    /// Resolve into an invocation with `stage_args` appended.
    #[must_use]
    pub fn invocation(&self, stage: Stage, stage_args: Vec<String>) -> StageInvocation {
        let mut args = self.args.clone();
        args.extend(stage_args);
        StageInvocation::new(stage, self.program.clone(), args)
    }
}

/// The program used for each stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSet {
    /// Source meshes to OFF. Defaults to `mesh2voxel convert`.
    pub converter: ToolCommand,
    /// OFF fitting. Defaults to `mesh2voxel normalize`.
    pub normalizer: ToolCommand,
    /// Occupancy rasterizer. Defaults to `voxelize` on `PATH`.
    pub voxelizer: ToolCommand,
    /// Container to arrays. Defaults to `python occ_to_np.py`.
    pub extractor: ToolCommand,
}

impl Default for ToolSet {
    fn default() -> Self {
        Self {
            converter: ToolCommand::builtin("convert"),
            normalizer: ToolCommand::builtin("normalize"),
            voxelizer: ToolCommand::new("voxelize"),
            extractor: ToolCommand::new("python").with_args(["occ_to_np.py"]),
        }
    }
}

impl ToolSet {
    /// Point every tool still named [`BUILTIN_PROGRAM`] at `executable`.
    ///
    /// Tools configured with any other program are left alone.
    pub fn bind_builtin(&mut self, executable: &Path) {
        let tools = [
            &mut self.converter,
            &mut self.normalizer,
            &mut self.voxelizer,
            &mut self.extractor,
        ];
        for tool in tools {
            if tool.is_builtin() {
                tool.program = executable.to_path_buf();
            }
        }
    }

    /// The tool configured for `stage`.
    #[must_use]
    pub const fn for_stage(&self, stage: Stage) -> &ToolCommand {
        match stage {
            Stage::Convert => &self.converter,
            Stage::Normalize => &self.normalizer,
            Stage::Rasterize => &self.voxelizer,
            Stage::Extract => &self.extractor,
        }
    }
}

/// Everything one pipeline run needs.
///
/// Built with [`PipelineConfig::new`] and `with_*` methods, or loaded from
/// JSON with [`PipelineConfig::from_json_file`]. Missing JSON fields take
/// their defaults.
///
/// # Example
///
/// ```
/// use mesh_transform::GridDims;
/// use voxel_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::new("data/meshes")
///     .with_dims(GridDims::cube(64))
///     .with_padding(0.05)
///     .with_cleanup(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory of source meshes.
    pub input: PathBuf,

    /// Directory for the final arrays. Defaults to `<data root>/output`.
    pub output: Option<PathBuf>,

    /// Directory that holds intermediates. Defaults to the parent of `input`.
    pub work_dir: Option<PathBuf>,

    /// Voxel grid resolution.
    pub dims: GridDims,

    /// Fraction of each grid axis left empty, in `[0, 1)`.
    pub padding: f64,

    /// Remove intermediates after a successful run.
    pub cleanup: bool,

    /// Extension of the extractor's per-mesh arrays, without the dot.
    pub array_extension: String,

    /// Stage programs.
    pub tools: ToolSet,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: None,
            work_dir: None,
            dims: GridDims::default(),
            padding: DEFAULT_PADDING,
            cleanup: true,
            array_extension: DEFAULT_ARRAY_EXTENSION.to_string(),
            tools: ToolSet::default(),
        }
    }
}

impl PipelineConfig {
    /// Default configuration for an input directory.
    #[must_use]
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if the file cannot be read and
    /// [`PipelineError::Config`] if it is not a valid configuration.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        Self::from_json(&text)
            .map_err(|e| PipelineError::config(format!("{}: {e}", path.display())))
    }

    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] on malformed JSON or unknown values.
    pub fn from_json(text: &str) -> PipelineResult<Self> {
        serde_json::from_str(text).map_err(|e| PipelineError::config(e.to_string()))
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if serialization fails.
    pub fn to_json(&self) -> PipelineResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PipelineError::config(e.to_string()))
    }

    /// Set the input directory.
    #[must_use]
    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = input.into();
        self
    }

    /// Set the output directory.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Set the directory that holds intermediates.
    #[must_use]
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(work_dir.into());
        self
    }

    /// Set the grid resolution.
    #[must_use]
    pub const fn with_dims(mut self, dims: GridDims) -> Self {
        self.dims = dims;
        self
    }

    /// Set the padding fraction.
    #[must_use]
    pub const fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Enable or disable removal of intermediates.
    #[must_use]
    pub const fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Set the array extension.
    #[must_use]
    pub fn with_array_extension(mut self, extension: impl Into<String>) -> Self {
        self.array_extension = extension.into();
        self
    }

    /// Replace the stage programs.
    #[must_use]
    pub fn with_tools(mut self, tools: ToolSet) -> Self {
        self.tools = tools;
        self
    }

    /// Normalization parameters derived from dims and padding.
    #[must_use]
    pub fn normalize_params(&self) -> NormalizeParams {
        NormalizeParams::for_grid(self.dims).with_padding(self.padding)
    }

    /// Check the configuration before running.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] naming the first invalid field.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.input.as_os_str().is_empty() {
            return Err(PipelineError::config("no input directory given"));
        }
        if !self.dims.is_valid() {
            return Err(PipelineError::config(format!(
                "grid dimensions {} must all be at least 1",
                self.dims
            )));
        }
        self.normalize_params()
            .validate()
            .map_err(|e| PipelineError::config(e.to_string()))?;

        let ext = self.array_extension.as_str();
        if ext.is_empty() || ext.contains(['.', '/', '\\']) {
            return Err(PipelineError::config(format!(
                "array extension `{ext}` must be a bare extension such as `npy`"
            )));
        }

        for stage in Stage::ALL {
            if self.tools.for_stage(stage).program.as_os_str().is_empty() {
                return Err(PipelineError::config(format!("no program set for the {stage} stage")));
            }
        }
        Ok(())
    }
}
