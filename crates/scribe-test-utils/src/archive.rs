//! [`ArchiveBuilder`] for producing real extension packages in tests.
//!
//! The installer shells out to the system `tar`, so fixtures must be genuine
//! gzip-compressed tarballs, not mocks. The builder assembles one in memory
//! and writes it wherever the test wants it.

use std::fs::File;
use std::path::PathBuf;

use flate2::Compression;
use flate2::write::GzEncoder;

/// Builds a `.tar.gz` package from in-memory file contents.
///
/// # Example
///
/// ```rust,no_run
/// use scribe_test_utils::ArchiveBuilder;
///
/// let dir = tempfile::tempdir().unwrap();
/// let archive = ArchiveBuilder::new()
///     .file("manifest.json", r#"{"unique_name": "demo-ext"}"#)
///     .file("lib/extension.rb", "puts 'hello'\n")
///     .write_to(dir.path().join("demo.tar.gz"));
/// ```
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    files: Vec<(String, Vec<u8>)>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file entry. Nested paths are fine; `tar` creates the
    /// intermediate directories on extraction.
    pub fn file(mut self, path: impl Into<String>, contents: impl AsRef<[u8]>) -> Self {
        self.files.push((path.into(), contents.as_ref().to_vec()));
        self
    }

    /// Write the archive to `path` and return that path.
    ///
    /// # Panics
    /// Panics on any I/O failure; fixtures have no business failing quietly.
    pub fn write_to(self, path: impl Into<PathBuf>) -> PathBuf {
        let path = path.into();
        let file = File::create(&path)
            .unwrap_or_else(|e| panic!("ArchiveBuilder: create {}: {e}", path.display()));
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, contents) in &self.files {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, contents.as_slice())
                .unwrap_or_else(|e| panic!("ArchiveBuilder: append {name}: {e}"));
        }
        builder
            .into_inner()
            .and_then(|encoder| encoder.finish())
            .unwrap_or_else(|e| panic!("ArchiveBuilder: finish {}: {e}", path.display()));
        path
    }
}
