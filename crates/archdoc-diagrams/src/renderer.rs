//! Ordered backend fallback.
//!
//! [`DiagramRenderer`] tries each configured backend in turn and stops at the
//! first one whose output is a valid image. The winning bytes are written to
//! `temp_{name}.png` and ownership of that file passes to the caller.

use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::RenderBackend;
use crate::error::{BackendError, RenderError};
use crate::image::{BackendKind, ImageFormat, RenderedImage};
use crate::request::DiagramRequest;

/// Renders diagrams with an ordered list of backends.
///
/// The backend list is fixed at construction time, so a backend that was not
/// added (for example, the local browser when it is not compiled in) is never
/// attempted.
///
/// # Example
///
/// ```ignore
/// use archdoc_diagrams::{DiagramRenderer, DiagramRequest, RemoteBackend};
///
/// let renderer = DiagramRenderer::new(".").with_backend(RemoteBackend::new("https://mermaid.ink"));
/// let image = renderer.render(&DiagramRequest::new("graph LR\n A --> B", "flow"))?;
/// ```
pub struct DiagramRenderer {
    backends: Vec<Box<dyn RenderBackend>>,
    temp_dir: PathBuf,
}

impl DiagramRenderer {
    /// Create a renderer with no backends that writes images into `temp_dir`.
    #[must_use]
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            backends: Vec::new(),
            temp_dir: temp_dir.into(),
        }
    }

    /// Append a backend to the end of the preference order.
    #[must_use]
    pub fn with_backend(mut self, backend: impl RenderBackend + 'static) -> Self {
        self.backends.push(Box::new(backend));
        self
    }

    /// Backends in the order they will be tried.
    pub fn backend_kinds(&self) -> impl Iterator<Item = BackendKind> + '_ {
        self.backends.iter().map(|b| b.kind())
    }

    /// Directory temp images are written to.
    #[must_use]
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Render a diagram, falling back through the configured backends.
    ///
    /// On success exactly one non-empty image file exists at
    /// [`DiagramRequest::temp_path`]. On failure no file is left behind by
    /// this call.
    pub fn render(&self, request: &DiagramRequest) -> Result<RenderedImage, RenderError> {
        let path = request.temp_path(&self.temp_dir);
        let mut attempts = Vec::new();

        for backend in &self.backends {
            let kind = backend.kind();
            let outcome = backend
                .render(request)
                .and_then(|data| store_image(&path, &data, kind));

            match outcome {
                Ok(image) => {
                    tracing::debug!(
                        name = request.name(),
                        backend = %kind,
                        size = image.size(),
                        "diagram rendered"
                    );
                    return Ok(image);
                }
                Err(error) => {
                    tracing::warn!(
                        name = request.name(),
                        backend = %kind,
                        error = %error,
                        "diagram backend failed"
                    );
                    attempts.push((kind, error));
                }
            }
        }

        Err(RenderError {
            name: request.name().to_owned(),
            attempts,
        })
    }
}

/// Validate backend output and write it to `path`.
fn store_image(path: &Path, data: &[u8], origin: BackendKind) -> Result<RenderedImage, BackendError> {
    if data.is_empty() {
        return Err(BackendError::Empty);
    }
    let format = ImageFormat::detect(data).ok_or(BackendError::InvalidImage)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    if let Err(e) = fs::write(path, data) {
        let _ = fs::remove_file(path);
        return Err(e.into());
    }

    Ok(RenderedImage::new(
        path.to_path_buf(),
        data.len() as u64,
        origin,
        format,
    ))
}
