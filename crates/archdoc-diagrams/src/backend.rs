//! Rendering backend abstraction.

use crate::error::BackendError;
use crate::image::BackendKind;
use crate::request::DiagramRequest;

/// A strategy that turns a diagram description into encoded image bytes.
///
/// Backends never touch the filesystem; [`DiagramRenderer`](crate::DiagramRenderer)
/// validates the bytes and writes the temp file.
pub trait RenderBackend {
    /// Which kind of backend this is (used for logging and image origin).
    fn kind(&self) -> BackendKind;

    /// Render the diagram, returning PNG or JPEG bytes.
    fn render(&self, request: &DiagramRequest) -> Result<Vec<u8>, BackendError>;
}
