//! `mesh2voxel`: turn a directory of meshes into voxel occupancy arrays.
//!
//! # Commands
//!
//! - `mesh2voxel <INPUT>` - run the whole pipeline
//! - `mesh2voxel convert <INPUT> <OUTPUT>` - built-in convert stage
//! - `mesh2voxel normalize <INPUT> <OUTPUT> --width W --height H --depth D` - built-in normalize stage

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use mesh_transform::{GridDims, NormalizeParams, DEFAULT_PADDING};
use mesh_types::Vector3;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use voxel_pipeline::{
    builtin, Pipeline, PipelineConfig, PipelineState, ProcessRunner, ToolCommand,
};

/// Convert a directory of meshes into voxel occupancy arrays.
#[derive(Parser)]
#[command(name = "mesh2voxel", version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,

    /// More log output (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Args)]
struct RunArgs {
    /// Directory of input meshes (.obj, .off)
    input: Option<PathBuf>,

    /// Directory for the output arrays [default: <parent of INPUT>/output]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Grid dimensions as WxHxD [default: 32x32x32]
    #[arg(short, long, value_name = "WxHxD")]
    dims: Option<GridDims>,

    /// Fraction of each grid axis left empty [default: 0.1]
    #[arg(long)]
    padding: Option<f64>,

    /// Directory for intermediates [default: parent of INPUT]
    #[arg(long, value_name = "DIR")]
    work_dir: Option<PathBuf>,

    /// Keep converted and normalized meshes and the voxel container
    #[arg(long)]
    keep_intermediates: bool,

    /// JSON configuration file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Rasterizer program
    #[arg(long, value_name = "PATH")]
    voxelizer: Option<PathBuf>,

    /// Extractor program and leading arguments (place after INPUT)
    #[arg(long, value_name = "CMD", num_args = 1.., allow_hyphen_values = true)]
    extractor: Option<Vec<String>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert meshes to OFF files
    Convert {
        /// Mesh file or directory of meshes
        input: PathBuf,
        /// Directory for the OFF files
        output: PathBuf,
    },

    /// Centre and scale OFF meshes into a grid volume
    Normalize {
        /// Mesh file or directory of meshes
        input: PathBuf,
        /// Directory for the normalized OFF files
        output: PathBuf,
        /// Target extent along X
        #[arg(long)]
        width: f64,
        /// Target extent along Y
        #[arg(long)]
        height: f64,
        /// Target extent along Z
        #[arg(long)]
        depth: f64,
        /// Fraction of each axis left empty
        #[arg(long, default_value_t = DEFAULT_PADDING)]
        padding: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Convert { input, output }) => {
            builtin::convert_path(&input, &output)
                .with_context(|| format!("converting {}", input.display()))?;
            Ok(())
        }
        Some(Commands::Normalize {
            input,
            output,
            width,
            height,
            depth,
            padding,
        }) => {
            let params = NormalizeParams::new(Vector3::new(width, height, depth), padding);
            builtin::normalize_path(&input, &output, &params)
                .with_context(|| format!("normalizing {}", input.display()))?;
            Ok(())
        }
        None => run(cli.run),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(input) = args.input {
        config.input = input;
    }
    if config.input.as_os_str().is_empty() {
        bail!("no input directory given; pass <INPUT> or set `input` in --config");
    }
    if let Some(output) = args.output {
        config.output = Some(output);
    }
    if let Some(work_dir) = args.work_dir {
        config.work_dir = Some(work_dir);
    }
    if let Some(dims) = args.dims {
        config.dims = dims;
    }
    if let Some(padding) = args.padding {
        config.padding = padding;
    }
    if args.keep_intermediates {
        config.cleanup = false;
    }
    if let Some(program) = args.voxelizer {
        config.tools.voxelizer = ToolCommand::new(program);
    }
    if let Some(words) = args.extractor {
        config.tools.extractor =
            ToolCommand::from_words(&words).context("--extractor needs a program")?;
    }

    let executable = std::env::current_exe().context("locating the mesh2voxel executable")?;
    config.tools.bind_builtin(&executable);

    let runner = ProcessRunner::new().context("preparing to run stages")?;
    let mut pipeline = Pipeline::new(config, runner).context("invalid configuration")?;
    let report = pipeline.run().with_context(|| match pipeline.state() {
        PipelineState::Aborted { at } => format!("pipeline failed in {at}"),
        _ => "pipeline failed".to_owned(),
    })?;

    if !report.cleanup_warnings.is_empty() {
        warn!(
            count = report.cleanup_warnings.len(),
            "Some intermediates could not be removed"
        );
    }
    info!(
        arrays = report.outputs.len(),
        output = %pipeline.layout().output_dir.display(),
        "Done"
    );
    Ok(())
}
