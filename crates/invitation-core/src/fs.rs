use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Filesystem collaborator used by the generator.
pub trait OutputSink {
    /// Creates `dir` and any missing parents.
    fn ensure_dir(&self, dir: &Path) -> io::Result<()>;

    /// Replaces the contents of `path`.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Writes documents to the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsSink;

impl OutputSink for FsSink {
    fn ensure_dir(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        write_atomic(path, contents)
    }
}

/// Stages `contents` beside `path` and renames the staged file into place, so
/// a reader never sees a half-written invitation. The parent directory must
/// already exist.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(contents.as_bytes())?;
    staged.as_file().sync_data()?;
    staged.persist(path)?;
    Ok(())
}
