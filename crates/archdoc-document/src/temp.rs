//! Registry of temporary image files awaiting deletion.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Temp files owned by one generation run.
///
/// Paths are removed by [`TempFiles::cleanup`] and, for anything still
/// registered, when the registry is dropped. Each path is deleted at most once.
#[derive(Debug, Default)]
pub struct TempFiles {
    paths: Vec<PathBuf>,
}

impl TempFiles {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a file for later deletion.
    pub fn register(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    /// Paths awaiting deletion, in registration order.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Delete every registered file and empty the registry.
    ///
    /// A file that is already gone counts as removed. Other failures are
    /// logged and skipped without retry. Returns the number of files removed.
    pub fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for path in self.paths.drain(..) {
            match remove(&path) {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not delete temp file");
                }
            }
        }
        removed
    }
}

fn remove(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        if !self.paths.is_empty() {
            self.cleanup();
        }
    }
}
