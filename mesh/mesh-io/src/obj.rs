//! Wavefront OBJ loading, on top of `tobj`.
//!
//! Only geometry is kept. Texture coordinates, normals and materials are
//! dropped, `mtllib` references are not followed, and point and line
//! elements are skipped. Faces are never triangulated: a quad in the file is
//! a quad in the mesh, with its winding intact.
//!
//! Every object and group in the file is merged into one mesh, in file order.
//! Within an object, vertices are numbered in the order faces first use them,
//! so vertices no face refers to do not appear in the result.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use mesh_types::{Face, IndexedMesh, Vertex};
use tracing::debug;

use crate::error::{IoError, IoResult};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: false,
        single_index: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Load a mesh from an OBJ file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist,
/// [`IoError::Obj`] for records `tobj` rejects (bad numbers, indices of
/// undefined vertices), and [`IoError::InvalidMesh`] if the merged
/// mesh breaks the face invariant.
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_obj;
///
/// let mesh = load_obj("chair.obj").unwrap();
/// println!("{} vertices, {} faces", mesh.vertices.len(), mesh.faces.len());
/// ```
pub fn load_obj<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::from_open(e, path))?;
    let mesh = parse_obj(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        "Loaded OBJ"
    );
    Ok(mesh)
}

/// Parse OBJ geometry from a buffered reader.
///
/// # Errors
///
/// See [`load_obj`].
pub fn parse_obj<R: BufRead>(mut reader: R) -> IoResult<IndexedMesh> {
    let (models, _materials) =
        tobj::load_obj_buf(&mut reader, &load_options(), |_| Ok(Default::default()))?;

    let mut mesh = IndexedMesh::new();
    for model in &models {
        append_model(&mut mesh, &model.mesh)?;
    }

    mesh.validate()?;
    Ok(mesh)
}

/// Append one `tobj` mesh, shifting its local indices past the vertices
/// already present.
fn append_model(mesh: &mut IndexedMesh, model: &tobj::Mesh) -> IoResult<()> {
    let base = u32::try_from(mesh.vertices.len())
        .map_err(|_| IoError::invalid_content("OBJ has more vertices than u32 indices can address"))?;

    mesh.vertices.extend(
        model
            .positions
            .chunks_exact(3)
            .map(|p| Vertex::from_coords(f64::from(p[0]), f64::from(p[1]), f64::from(p[2]))),
    );

    // tobj leaves `face_arities` empty when every face is a triangle.
    let arities: Vec<usize> = if model.face_arities.is_empty() {
        vec![3; model.indices.len() / 3]
    } else {
        model.face_arities.iter().map(|&n| n as usize).collect()
    };

    let mut start = 0;
    for arity in arities {
        let indices = model
            .indices
            .get(start..start + arity)
            .ok_or_else(|| IoError::invalid_content("OBJ face list ends inside a face"))?;
        mesh.faces.push(Face::new(indices.iter().map(|&i| base + i).collect()));
        start += arity;
    }
    Ok(())
}
