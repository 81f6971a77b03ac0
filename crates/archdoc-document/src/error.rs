//! Document serialization errors.

use std::io;
use std::path::PathBuf;

/// Fatal error while writing the output document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// A figure's backing image disappeared before serialization.
    #[error("Figure image not found: {}", .0.display())]
    MissingImage(PathBuf),

    /// A figure's image could not be read or decoded.
    #[error("Cannot load image {}: {message}", path.display())]
    Image { path: PathBuf, message: String },

    /// PDF encoding failed.
    #[error("PDF encoding failed: {0}")]
    Pdf(String),

    /// The output file could not be written.
    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
