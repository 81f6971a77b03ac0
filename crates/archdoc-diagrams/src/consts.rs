//! Internal constants for diagram rendering.

use std::time::Duration;

/// Default HTTP timeout for remote rendering requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default wait for the local renderer to lay out a diagram (2 seconds).
#[cfg(feature = "chrome")]
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

/// Browser viewport used by the local renderer.
#[cfg(feature = "chrome")]
pub const VIEWPORT: (u32, u32) = (1920, 1080);

/// Mermaid script loaded by the local renderer.
#[cfg(feature = "chrome")]
pub const DEFAULT_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js";
