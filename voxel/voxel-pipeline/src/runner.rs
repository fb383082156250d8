//! Running external pipeline stages.
//!
//! Each stage is an external program with a fixed command-line contract.
//! [`StageRunner`] is the seam between the orchestrator and the operating
//! system: [`ProcessRunner`] spawns real processes, tests substitute a fake.

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, warn};
use xshell::Shell;

use crate::error::{PipelineError, PipelineResult};

/// The externally executed stages, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Source meshes to interchange OFF files.
    Convert,
    /// OFF files fitted into the grid volume.
    Normalize,
    /// Normalized meshes to one occupancy container.
    Rasterize,
    /// Occupancy container to per-mesh arrays named by index.
    Extract,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ALL: [Self; 4] = [Self::Convert, Self::Normalize, Self::Rasterize, Self::Extract];

    /// Lower-case stage name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Convert => "convert",
            Self::Normalize => "normalize",
            Self::Rasterize => "rasterize",
            Self::Extract => "extract",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully resolved stage command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInvocation {
    /// Which stage this runs.
    pub stage: Stage,
    /// Program to execute.
    pub program: PathBuf,
    /// Arguments, tool prefix first, stage arguments after.
    pub args: Vec<String>,
}

impl StageInvocation {
    /// Create an invocation.
    #[must_use]
    pub fn new(stage: Stage, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            stage,
            program: program.into(),
            args,
        }
    }

    /// Shell-like rendering for logs and error messages.
    ///
    /// Arguments containing whitespace or quotes are single-quoted.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .map(|arg| quote(&arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for StageInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

fn quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// How a stage process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageStatus {
    /// Exit code, or `None` if the process did not exit normally.
    pub code: Option<i32>,
    /// Terminating signal on unix, if there was one.
    pub signal: Option<i32>,
}

impl StageStatus {
    /// Status of a process that exited with `code`.
    #[must_use]
    pub const fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    /// Status of a process terminated by `signal`.
    #[must_use]
    pub const fn killed(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    /// Status of a successful process.
    #[must_use]
    pub const fn ok() -> Self {
        Self::exited(0)
    }

    /// True iff the process exited with code 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

impl From<std::process::ExitStatus> for StageStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = std::os::unix::process::ExitStatusExt::signal(&status);
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {code}"),
            (None, Some(signal)) => write!(f, "killed by signal {signal}"),
            (None, None) => f.write_str("no exit code"),
        }
    }
}

/// Executes stage invocations.
pub trait StageRunner {
    /// Run `invocation` to completion and report how it ended.
    ///
    /// A non-success status is returned as `Ok`; the orchestrator decides
    /// what it means.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Spawn`] if the program could not be started.
    fn run(&mut self, invocation: &StageInvocation) -> PipelineResult<StageStatus>;
}

impl<R: StageRunner + ?Sized> StageRunner for &mut R {
    fn run(&mut self, invocation: &StageInvocation) -> PipelineResult<StageStatus> {
        (**self).run(invocation)
    }
}

/// Runs stages as blocking subprocesses.
///
/// The child's stdout and stderr are captured and forwarded line by line
/// into the log at `debug` level, or `warn` for stderr of a failed stage.
pub struct ProcessRunner {
    shell: Shell,
}

impl ProcessRunner {
    /// Create a runner in the current working directory.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the working directory is unavailable.
    pub fn new() -> PipelineResult<Self> {
        let shell = Shell::new()
            .map_err(|e| PipelineError::config(format!("cannot create process shell: {e}")))?;
        Ok(Self { shell })
    }
}

impl fmt::Debug for ProcessRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessRunner")
            .field("cwd", &self.shell.current_dir())
            .finish()
    }
}

impl StageRunner for ProcessRunner {
    fn run(&mut self, invocation: &StageInvocation) -> PipelineResult<StageStatus> {
        let stage = invocation.stage;
        debug!(%stage, command = %invocation, "Spawning stage");

        let output = self
            .shell
            .cmd(&invocation.program)
            .args(&invocation.args)
            .quiet()
            .ignore_status()
            .output()
            .map_err(|source| PipelineError::Spawn {
                stage,
                command: invocation.command_line(),
                source,
            })?;

        let status = StageStatus::from(output.status);

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!(%stage, "{line}");
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            if status.success() {
                debug!(%stage, "{line}");
            } else {
                warn!(%stage, "{line}");
            }
        }

        debug!(%stage, %status, "Stage finished");
        Ok(status)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn stage_names() {
        let names: Vec<String> = Stage::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["convert", "normalize", "rasterize", "extract"]);
    }

    #[test]
    fn command_line_quotes_awkward_arguments() {
        let inv = StageInvocation::new(
            Stage::Extract,
            "python",
            vec![
                "occ_to_np.py".to_string(),
                "/data/my meshes/voxels.h5".to_string(),
                String::new(),
                "it's".to_string(),
            ],
        );
        assert_eq!(
            inv.command_line(),
            r"python occ_to_np.py '/data/my meshes/voxels.h5' '' 'it'\''s'"
        );
        assert_eq!(inv.to_string(), inv.command_line());
    }

    #[test]
    fn status_success_only_for_zero() {
        assert!(StageStatus::ok().success());
        assert!(!StageStatus::exited(1).success());
        assert!(!StageStatus::killed(9).success());
        assert_eq!(StageStatus::exited(4).to_string(), "exit code 4");
        assert_eq!(StageStatus::killed(9).to_string(), "killed by signal 9");
    }

    #[cfg(unix)]
    #[test]
    fn process_runner_reports_signals() {
        let mut runner = ProcessRunner::new().unwrap();
        let killed = StageInvocation::new(
            Stage::Rasterize,
            "sh",
            vec!["-c".into(), "kill -KILL $$".into()],
        );
        assert_eq!(runner.run(&killed).unwrap(), StageStatus::killed(9));
    }

    #[cfg(unix)]
    #[test]
    fn process_runner_reports_exit_codes() {
        let mut runner = ProcessRunner::new().unwrap();

        let ok = StageInvocation::new(Stage::Convert, "sh", vec!["-c".into(), "echo hi".into()]);
        assert_eq!(runner.run(&ok).unwrap(), StageStatus::ok());

        let failing = StageInvocation::new(
            Stage::Rasterize,
            "sh",
            vec!["-c".into(), "echo broken >&2; exit 7".into()],
        );
        assert_eq!(runner.run(&failing).unwrap(), StageStatus::exited(7));
    }

    #[test]
    fn process_runner_reports_spawn_failure() {
        let mut runner = ProcessRunner::new().unwrap();
        let missing = StageInvocation::new(
            Stage::Extract,
            "/nonexistent/mesh2voxel-extractor",
            vec!["in.h5".into()],
        );
        let err = runner.run(&missing).unwrap_err();
        assert!(matches!(err, PipelineError::Spawn { stage: Stage::Extract, .. }));
    }
}
