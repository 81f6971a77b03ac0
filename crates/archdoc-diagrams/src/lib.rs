//! Mermaid diagram rendering for archdoc.
//!
//! This crate turns Mermaid diagram descriptions into raster images on disk:
//! - [`DiagramRenderer`] tries an ordered list of backends and stops at the first success
//! - [`RemoteBackend`] fetches images from mermaid.ink over HTTP
//! - `ChromeBackend` (feature `chrome`) renders locally in headless Chrome
//!
//! # Architecture
//!
//! The crate is organized into modules:
//! - [`request`]: `DiagramRequest` (source text plus temp-file name)
//! - [`image`]: `RenderedImage` and format detection
//! - [`backend`]: the `RenderBackend` trait
//! - [`remote`]: mermaid.ink client
//! - `local`: headless Chrome client
//! - [`renderer`]: fallback and temp-file writing
//!
//! # Example
//!
//! ```ignore
//! use archdoc_diagrams::{DiagramRenderer, DiagramRequest, RemoteBackend};
//!
//! let renderer = DiagramRenderer::new(".")
//!     .with_backend(RemoteBackend::new("https://mermaid.ink"));
//!
//! match renderer.render(&DiagramRequest::new("graph LR\n A --> B", "flow")) {
//!     Ok(image) => println!("wrote {}", image.path().display()),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

mod backend;
mod consts;
mod error;
mod image;
#[cfg(feature = "chrome")]
mod local;
mod remote;
mod renderer;
mod request;

pub use backend::RenderBackend;
pub use error::{BackendError, RenderError};
pub use image::{BackendKind, ImageFormat, RenderedImage};
#[cfg(feature = "chrome")]
pub use local::ChromeBackend;
pub use remote::RemoteBackend;
pub use renderer::DiagramRenderer;
pub use request::DiagramRequest;
