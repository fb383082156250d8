//! Reading OBJ sources and reading or writing OFF, the interchange format
//! handed to the voxelizer.
//!
//! ```no_run
//! use mesh_io::{load_mesh, save_off};
//!
//! let mesh = load_mesh("chair.obj").unwrap();
//! save_off(&mesh, "chair.off").unwrap();
//! ```
//!
//! Every loader validates the face index invariant before returning, and
//! every writer validates it before writing, so a mesh that crosses this
//! crate in either direction has in-range indices and faces of at least
//! three vertices.

#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod obj;
mod off;

pub use error::{IoError, IoResult};
pub use obj::{load_obj, parse_obj};
pub use off::{decode_off, encode_off, load_off, parse_off, save_off, write_off, OFF_MARKER};

use std::path::Path;

use mesh_types::IndexedMesh;

/// Mesh formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// Wavefront OBJ. Read only.
    Obj,
    /// Object File Format, the interchange format.
    Off,
}

impl MeshFormat {
    /// Every format, in a stable order.
    pub const ALL: [Self; 2] = [Self::Obj, Self::Off];

    /// Format named by the path's extension, ignoring case.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "obj" => Some(Self::Obj),
            "off" => Some(Self::Off),
            _ => None,
        }
    }

    /// Lowercase extension, without the dot.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Obj => "obj",
            Self::Off => "off",
        }
    }
}

/// Read a mesh, choosing the parser from the path's extension.
///
/// # Errors
///
/// [`IoError::UnknownFormat`] for anything but `.obj` and `.off`, otherwise
/// whatever [`load_obj`] or [`load_off`] report.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    match MeshFormat::from_path(path) {
        Some(MeshFormat::Obj) => load_obj(path),
        Some(MeshFormat::Off) => load_off(path),
        None => Err(IoError::UnknownFormat {
            extension: path
                .extension()
                .map_or_else(|| "(none)".to_owned(), |e| e.to_string_lossy().into_owned()),
        }),
    }
}
