//! Failures while reading or writing OBJ and OFF files.

use std::path::PathBuf;

use mesh_types::MeshError;
use thiserror::Error;

/// Shorthand for results carrying [`IoError`].
pub type IoResult<T> = Result<T, IoError>;

/// What can go wrong between a mesh file and an [`mesh_types::IndexedMesh`].
#[derive(Debug, Error)]
pub enum IoError {
    /// Nothing exists at the path.
    #[error("no such mesh file: {path}")]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The extension names neither OBJ nor OFF.
    #[error("unsupported mesh extension .{extension}")]
    UnknownFormat {
        /// Extension as found, or `(none)`.
        extension: String,
    },

    /// A line could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What the parser expected.
        message: String,
    },

    /// The file or mesh is unusable as a whole, for example non-UTF-8 text
    /// or a non-finite coordinate.
    #[error("malformed mesh data: {message}")]
    InvalidContent {
        /// Details.
        message: String,
    },

    /// `tobj` rejected the OBJ text.
    #[error("malformed OBJ: {0}")]
    Obj(#[from] tobj::LoadError),

    /// Face indices out of range or faces too small.
    #[error("invalid mesh: {0}")]
    InvalidMesh(#[from] MeshError),

    /// An output location exists but is not a directory.
    #[error("cannot write into {path}: path exists and is not a directory")]
    NotADirectory {
        /// The colliding path.
        path: PathBuf,
    },

    /// Underlying read or write failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// [`IoError::InvalidContent`] with `message`.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    /// [`IoError::Parse`] at 1-based `line`.
    #[must_use]
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Map an `open` failure, turning `NotFound` into [`IoError::FileNotFound`].
    pub(crate) fn from_open(err: std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io(err)
        }
    }
}
