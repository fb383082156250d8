//! Error types for the pipeline.

use std::path::PathBuf;

use mesh_io::IoError;
use mesh_transform::TransformError;
use thiserror::Error;

use crate::runner::{Stage, StageStatus};

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that abort a pipeline run.
///
/// Every variant is fatal. Cleanup failures are reported as warnings in
/// [`PipelineReport`](crate::PipelineReport) instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input directory could not be turned into a manifest.
    #[error("cannot discover meshes in {dir}: {reason}")]
    Discovery {
        /// The input directory.
        dir: PathBuf,
        /// What was wrong.
        reason: String,
    },

    /// A mesh file could not be read or written.
    #[error("mesh codec failed on {path}")]
    Codec {
        /// The file being read or written.
        path: PathBuf,
        /// Underlying I/O or parse error.
        #[source]
        source: IoError,
    },

    /// A mesh could not be fitted into the grid.
    #[error("cannot normalize {path}")]
    Normalization {
        /// The mesh file.
        path: PathBuf,
        /// Underlying transform error.
        #[source]
        source: TransformError,
    },

    /// A stage ran but reported failure.
    #[error("{stage} stage failed with {status}: {command}")]
    StageFailure {
        /// The failing stage.
        stage: Stage,
        /// The command line that was run.
        command: String,
        /// Its exit status.
        status: StageStatus,
    },

    /// A stage's program could not be started.
    #[error("cannot start {stage} stage: {command}")]
    Spawn {
        /// The stage.
        stage: Stage,
        /// The command line that was attempted.
        command: String,
        /// Why the process could not be started.
        #[source]
        source: xshell::Error,
    },

    /// Produced artifacts no longer line up with the manifest.
    #[error("identity mismatch after {stage} stage: {reason}")]
    IdentityMismatch {
        /// Stage whose output was checked.
        stage: Stage,
        /// What did not line up.
        reason: String,
    },

    /// The configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Filesystem operation failed.
    #[error("I/O error on {path}")]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Build a `Config` error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn discovery(dir: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Discovery {
            dir: dir.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(stage: Stage, reason: impl Into<String>) -> Self {
        Self::IdentityMismatch {
            stage,
            reason: reason.into(),
        }
    }

    /// The stage this error is attributed to, if any.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::StageFailure { stage, .. }
            | Self::Spawn { stage, .. }
            | Self::IdentityMismatch { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_failure_names_stage_and_status() {
        let err = PipelineError::StageFailure {
            stage: Stage::Rasterize,
            command: "voxelize occ --input in".to_string(),
            status: StageStatus::exited(3),
        };
        let message = err.to_string();
        assert!(message.starts_with("rasterize stage failed"));
        assert!(message.contains("exit code 3"));
        assert!(message.contains("voxelize occ"));
        assert_eq!(err.stage(), Some(Stage::Rasterize));
    }

    #[test]
    fn io_error_keeps_source() {
        let err = PipelineError::io(
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "I/O error on /tmp/x");
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.stage(), None);
    }
}
