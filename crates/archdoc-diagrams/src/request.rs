//! Diagram render requests.

use std::path::{Path, PathBuf};

/// A diagram description plus the short name used for its temp file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramRequest {
    description: String,
    name: String,
}

impl DiagramRequest {
    /// Create a new request from Mermaid source and a file-name-safe identifier.
    pub fn new(description: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            name: name.into(),
        }
    }

    /// Mermaid source text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Identifier used for temp-file naming.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Temp image path inside `dir`: `temp_{name}.png`.
    #[must_use]
    pub fn temp_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("temp_{}.png", self.name))
    }
}
