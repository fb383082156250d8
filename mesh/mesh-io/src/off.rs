//! OFF (Object File Format) interchange support.
//!
//! OFF is the plain-text format handed to the voxelizer. The writer is exact
//! and deliberately minimal:
//!
//! ```text
//! OFF
//! <vertex count> <face count> 0
//! x y z                    (one line per vertex)
//! n i0 i1 ... i(n-1)       (one line per face)
//! ```
//!
//! Coordinates use the shortest decimal text that parses back to the same
//! `f64`, so an encode/decode round trip is lossless. Faces keep their
//! cardinality, winding, and order; nothing is triangulated or repaired.
//!
//! The reader accepts what other tools commonly emit on top of that: `#`
//! comments, blank lines, counts on the marker line, and trailing per-vertex
//! or per-face colour values (ignored).

use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use mesh_types::{Face, IndexedMesh, Vertex};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// The marker on the first line of every OFF file.
pub const OFF_MARKER: &str = "OFF";

/// Upper bound on elements reserved up front from header counts.
const MAX_RESERVE: usize = 1 << 16;

/// Encode a mesh as OFF text.
///
/// # Errors
///
/// Returns [`IoError::InvalidMesh`] if a face index is out of range or a face
/// has fewer than three indices, and [`IoError::InvalidContent`] if a vertex
/// coordinate is not finite.
///
/// # Example
///
/// ```
/// use mesh_io::encode_off;
/// use mesh_types::IndexedMesh;
///
/// let mesh = IndexedMesh::from_raw(
///     &[[0.0, 0.0, 0.0], [1.5, 0.0, 0.0], [0.0, 1.0, 0.25]],
///     [[0, 1, 2]],
/// );
/// let text = encode_off(&mesh).unwrap();
/// assert_eq!(text, "OFF\n3 1 0\n0 0 0\n1.5 0 0\n0 1 0.25\n3 0 1 2\n");
/// ```
pub fn encode_off(mesh: &IndexedMesh) -> IoResult<String> {
    let mut buf = Vec::new();
    write_off(mesh, &mut buf)?;
    String::from_utf8(buf).map_err(|e| IoError::invalid_content(e.to_string()))
}

/// Write a mesh as OFF to any writer.
///
/// The mesh is validated before the first byte is written.
///
/// # Errors
///
/// See [`encode_off`]; additionally returns [`IoError::Io`] if the writer fails.
pub fn write_off<W: Write>(mesh: &IndexedMesh, mut writer: W) -> IoResult<()> {
    check_encodable(mesh)?;

    writeln!(writer, "{OFF_MARKER}")?;
    writeln!(writer, "{} {} 0", mesh.vertices.len(), mesh.faces.len())?;

    for vertex in &mesh.vertices {
        let p = &vertex.position;
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }

    for face in &mesh.faces {
        write!(writer, "{}", face.len())?;
        for index in face.iter() {
            write!(writer, " {index}")?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Save a mesh to an OFF file.
///
/// Nothing is created on disk if the mesh is invalid.
///
/// # Errors
///
/// See [`write_off`].
pub fn save_off<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    check_encodable(mesh)?;
    let file = File::create(path.as_ref())?;
    write_off(mesh, BufWriter::new(file))?;
    debug!(
        path = %path.as_ref().display(),
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        "Wrote OFF"
    );
    Ok(())
}

fn check_encodable(mesh: &IndexedMesh) -> IoResult<()> {
    mesh.validate()?;
    if let Some(index) = mesh.vertices.iter().position(|v| !v.is_finite()) {
        return Err(IoError::invalid_content(format!(
            "vertex {index} has a non-finite coordinate"
        )));
    }
    Ok(())
}

/// Load a mesh from an OFF file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist, a
/// [`IoError::Parse`] pointing at the offending line for malformed text, and
/// [`IoError::InvalidMesh`] if the parsed faces violate the index invariant.
pub fn load_off<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::from_open(e, path))?;
    parse_off(BufReader::new(file))
}

/// Decode OFF text held in memory.
///
/// # Errors
///
/// See [`parse_off`].
pub fn decode_off(text: &str) -> IoResult<IndexedMesh> {
    parse_off(text.as_bytes())
}

/// Parse OFF from a buffered reader.
///
/// # Errors
///
/// See [`load_off`].
pub fn parse_off<R: BufRead>(reader: R) -> IoResult<IndexedMesh> {
    let mut records = Records::new(reader);

    let (line, header) = records.require("the OFF marker")?;
    let mut tokens = header.split_whitespace();
    match tokens.next() {
        Some(OFF_MARKER) => {}
        other => {
            return Err(IoError::parse(
                line,
                format!("expected `{OFF_MARKER}`, found `{}`", other.unwrap_or_default()),
            ));
        }
    }
    let inline_counts: Vec<&str> = tokens.collect();
    let (count_line, counts) = if inline_counts.is_empty() {
        records.require("element counts")?
    } else {
        (line, inline_counts.join(" "))
    };

    let mut tokens = counts.split_whitespace();
    let vertex_count: usize = parse_token(tokens.next(), count_line, "vertex count")?;
    let face_count: usize = parse_token(tokens.next(), count_line, "face count")?;

    // Header counts are untrusted; short files fail on the first missing record.
    let mut mesh =
        IndexedMesh::with_capacity(vertex_count.min(MAX_RESERVE), face_count.min(MAX_RESERVE));

    for _ in 0..vertex_count {
        let (line, text) = records.require("a vertex")?;
        let mut tokens = text.split_whitespace();
        let x = parse_token(tokens.next(), line, "x coordinate")?;
        let y = parse_token(tokens.next(), line, "y coordinate")?;
        let z = parse_token(tokens.next(), line, "z coordinate")?;
        mesh.vertices.push(Vertex::from_coords(x, y, z));
    }

    for _ in 0..face_count {
        let (line, text) = records.require("a face")?;
        let mut tokens = text.split_whitespace();
        let n: usize = parse_token(tokens.next(), line, "face vertex count")?;
        let indices = (0..n)
            .map(|_| parse_token::<u32>(tokens.next(), line, "vertex index"))
            .collect::<IoResult<Vec<_>>>()?;
        mesh.faces.push(Face::new(indices));
    }

    mesh.validate()?;
    Ok(mesh)
}

/// Significant lines of a text mesh file, with comments and blanks removed.
struct Records<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> Records<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    /// Next non-empty line with its 1-based number.
    fn next_record(&mut self) -> IoResult<Option<(usize, String)>> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = line?;
            let content = line.find('#').map_or(line.as_str(), |i| &line[..i]).trim();
            if !content.is_empty() {
                return Ok(Some((self.line_no, content.to_string())));
            }
        }
        Ok(None)
    }

    fn require(&mut self, what: &str) -> IoResult<(usize, String)> {
        self.next_record()?.ok_or_else(|| {
            IoError::parse(self.line_no + 1, format!("unexpected end of file, expected {what}"))
        })
    }
}

fn parse_token<T>(token: Option<&str>, line: usize, what: &str) -> IoResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    let token = token.ok_or_else(|| IoError::parse(line, format!("missing {what}")))?;
    token
        .parse()
        .map_err(|e| IoError::parse(line, format!("invalid {what} `{token}`: {e}")))
}
