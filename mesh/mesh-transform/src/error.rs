//! Error types for mesh transformation operations.

use thiserror::Error;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors that can occur while fitting a mesh into a grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// Normalization parameters are out of range.
    #[error("invalid normalization parameters: {reason}")]
    InvalidParams {
        /// What was wrong.
        reason: String,
    },

    /// A `WxHxD` grid specification could not be parsed.
    #[error("invalid grid dimensions `{input}`: {reason}")]
    InvalidDims {
        /// The text that was parsed.
        input: String,
        /// What was wrong.
        reason: String,
    },

    /// Empty mesh.
    #[error("mesh is empty")]
    EmptyMesh,

    /// A vertex has a NaN or infinite coordinate.
    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteVertex {
        /// Index of the offending vertex.
        index: usize,
    },

    /// Every axis of the bounding box is degenerate, so no scale can be derived.
    #[error(
        "degenerate geometry: bounding box extent ({x}, {y}, {z}) has no axis longer than {threshold}"
    )]
    DegenerateGeometry {
        /// Extent along X.
        x: f64,
        /// Extent along Y.
        y: f64,
        /// Extent along Z.
        z: f64,
        /// The degenerate-axis threshold in effect.
        threshold: f64,
    },
}

impl TransformError {
    pub(crate) fn invalid_params(reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            reason: reason.into(),
        }
    }
}
