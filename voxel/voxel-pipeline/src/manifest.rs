//! The ordered list of input meshes that fixes each mesh's position.
//!
//! External stages report results by zero-based position only. The
//! manifest, captured once before any stage runs, is the single record of
//! which source file each position belongs to.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use mesh_io::MeshFormat;
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};

/// One discovered source mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    file_name: String,
    base_name: String,
    path: PathBuf,
}

impl ManifestEntry {
    /// File name including extension, e.g. `chair.obj`.
    #[must_use]
    #[inline]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File name without its final extension, e.g. `chair`.
    #[must_use]
    #[inline]
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Full path to the source file.
    #[must_use]
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of this mesh in the interchange directories, `<base>.off`.
    #[must_use]
    pub fn interchange_name(&self) -> String {
        format!("{}.{}", self.base_name, MeshFormat::Off.extension())
    }

    /// Final result name, `<base>.<extension>`.
    #[must_use]
    pub fn result_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.base_name)
    }
}

/// Source meshes sorted by file name.
///
/// Position `i` in the manifest is the identity of the `i`-th result
/// produced by the external stages. There is no way to mutate a manifest
/// once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// List the supported mesh files (`obj`, `off`, any case) directly in `dir`.
    ///
    /// Entries are sorted byte-wise by file name. Subdirectories and other
    /// files are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Discovery`] if `dir` cannot be read, holds no
    /// mesh files, has a non-UTF-8 mesh file name, or has two meshes with the
    /// same base name.
    pub fn discover<P: AsRef<Path>>(dir: P) -> PipelineResult<Self> {
        let dir = dir.as_ref();
        let read = std::fs::read_dir(dir)
            .map_err(|e| PipelineError::discovery(dir, format!("cannot read directory: {e}")))?;

        let mut paths = Vec::new();
        for entry in read {
            let entry = entry.map_err(|e| PipelineError::discovery(dir, e.to_string()))?;
            let path = entry.path();
            if path.is_file() && MeshFormat::from_path(&path).is_some() {
                paths.push(path);
            }
        }

        let manifest = Self::from_paths(dir, paths)?;
        if manifest.is_empty() {
            return Err(PipelineError::discovery(dir, "no .obj or .off files found"));
        }
        debug!(dir = %dir.display(), count = manifest.len(), "Discovered meshes");
        Ok(manifest)
    }

    /// Build a manifest from explicit file paths, sorting them by file name.
    ///
    /// `dir` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Discovery`] for a path without a UTF-8 file
    /// name or for duplicate base names.
    pub fn from_paths<I>(dir: &Path, paths: I) -> PipelineResult<Self>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut entries = paths
            .into_iter()
            .map(|path| {
                let name = |p: Option<&std::ffi::OsStr>| p.and_then(|s| s.to_str()).map(String::from);
                match (name(path.file_name()), name(path.file_stem())) {
                    (Some(file_name), Some(base_name)) => Ok(ManifestEntry {
                        file_name,
                        base_name,
                        path,
                    }),
                    _ => Err(PipelineError::discovery(
                        dir,
                        format!("unusable file name {}", path.display()),
                    )),
                }
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.base_name.as_str()) {
                return Err(PipelineError::discovery(
                    dir,
                    format!(
                        "more than one mesh has base name `{}`; results would be ambiguous",
                        entry.base_name
                    ),
                ));
            }
        }

        Ok(Self { entries })
    }

    /// Number of meshes.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no meshes.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at position `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ManifestEntry> {
        self.entries.get(index)
    }

    /// Entries in position order.
    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Iterate entries in position order.
    pub fn iter(&self) -> std::slice::Iter<'_, ManifestEntry> {
        self.entries.iter()
    }

    /// Interchange names in position order.
    #[must_use]
    pub fn interchange_names(&self) -> Vec<String> {
        self.entries.iter().map(ManifestEntry::interchange_name).collect()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "").unwrap();
    }

    fn names(manifest: &Manifest) -> Vec<&str> {
        manifest.iter().map(ManifestEntry::file_name).collect()
    }

    #[test]
    fn sorted_by_file_name() {
        let dir = tempdir().unwrap();
        for name in ["b.obj", "a.obj", "C.OBJ", "10.off", "2.off"] {
            touch(dir.path(), name);
        }

        let manifest = Manifest::discover(dir.path()).unwrap();
        assert_eq!(names(&manifest), ["10.off", "2.off", "C.OBJ", "a.obj", "b.obj"]);
        assert_eq!(manifest.get(2).unwrap().base_name(), "C");
        assert_eq!(
            manifest.interchange_names(),
            ["10.off", "2.off", "C.off", "a.off", "b.off"]
        );
    }

    #[test]
    fn skips_unsupported_files_and_dirs() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "mesh.obj");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "noext");
        std::fs::create_dir(dir.path().join("nested.obj")).unwrap();

        let manifest = Manifest::discover(dir.path()).unwrap();
        assert_eq!(names(&manifest), ["mesh.obj"]);
        assert_eq!(manifest.get(0).unwrap().path(), dir.path().join("mesh.obj"));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "readme.md");
        let err = Manifest::discover(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Discovery { .. }));
        assert!(err.to_string().contains("no .obj or .off files"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = Manifest::discover("/nonexistent/meshes").unwrap_err();
        assert!(matches!(err, PipelineError::Discovery { .. }));
    }

    #[test]
    fn duplicate_base_names_rejected() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "chair.obj");
        touch(dir.path(), "chair.off");
        let err = Manifest::discover(dir.path()).unwrap_err();
        assert!(err.to_string().contains("`chair`"));
    }

    #[test]
    fn result_names_use_base_name() {
        let manifest = Manifest::from_paths(
            Path::new("in"),
            [PathBuf::from("in/table.v2.obj")],
        )
        .unwrap();
        let entry = manifest.get(0).unwrap();
        assert_eq!(entry.base_name(), "table.v2");
        assert_eq!(entry.result_name("npy"), "table.v2.npy");
        assert_eq!(entry.interchange_name(), "table.v2.off");
    }
}
