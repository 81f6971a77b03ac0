//! Document assembly and PDF output for archdoc.
//!
//! A [`Generator`] collects [`ContentBlock`]s in visual order, renders
//! diagrams through an [`archdoc_diagrams::DiagramRenderer`], and writes the
//! finished document as a PDF. Rendered images are temp files owned by the
//! generator; they are deleted after the write whether or not it succeeds.
//!
//! # Architecture
//!
//! - [`block`]: content blocks and paragraph styles
//! - [`report`]: report scripts (title page plus ordered steps)
//! - [`generator`]: the append operations and `generate`
//! - [`markup`]: inline `<b>`/`<i>`/`<br/>` markup
//! - [`layout`]: line breaking and pagination into draw operations
//! - `pdf`: printpdf serialization
//! - [`theme`]: page geometry and colors
//!
//! # Example
//!
//! ```ignore
//! use archdoc_diagrams::{DiagramRenderer, RemoteBackend};
//! use archdoc_document::{Generator, Report};
//!
//! let renderer = DiagramRenderer::new(".").with_backend(RemoteBackend::new("https://mermaid.ink"));
//! let report = Report::new()
//!     .section("1. Overview", ["First paragraph.", "Second paragraph."])
//!     .diagram("graph LR\n A --> B", "Data Flow", "flow");
//!
//! let summary = Generator::new(renderer, "report.pdf").generate(&report)?;
//! println!("{} pages", summary.pages);
//! ```

pub mod block;
mod error;
pub mod generator;
pub mod layout;
pub mod markup;
mod metrics;
mod pdf;
pub mod report;
mod temp;
pub mod theme;

pub use block::{BlockCounts, ContentBlock, ParagraphStyle, TRUNCATION_MARKER, TitlePage};
pub use error::DocumentError;
pub use generator::{DiagramOutcome, GenerateSummary, Generator, MAX_CODE_LINES};
pub use metrics::Font;
pub use report::{Report, ReportStep, SectionContent};
pub use temp::TempFiles;
pub use theme::{Color, Theme};
