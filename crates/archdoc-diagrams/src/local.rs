//! Local rendering in a headless Chrome instance.
//!
//! Each call launches a fresh browser, loads a minimal page that runs the
//! Mermaid script over the diagram source, waits for the rendered `<svg>` to
//! appear, and screenshots the bounding box of the `#diagram` element. The
//! browser is torn down when the call returns.

use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions};

use crate::backend::RenderBackend;
use crate::consts::{DEFAULT_SCRIPT_URL, DEFAULT_SETTLE_TIMEOUT, VIEWPORT};
use crate::error::BackendError;
use crate::image::BackendKind;
use crate::request::DiagramRequest;

/// Backend that renders diagrams with Mermaid in headless Chrome.
pub struct ChromeBackend {
    script_url: String,
    settle_timeout: Duration,
}

impl Default for ChromeBackend {
    fn default() -> Self {
        Self {
            script_url: DEFAULT_SCRIPT_URL.to_owned(),
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
        }
    }
}

impl ChromeBackend {
    /// Create a backend with the default CDN script and a 2 second settle timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Mermaid script URL.
    #[must_use]
    pub fn script_url(mut self, url: impl Into<String>) -> Self {
        self.script_url = url.into();
        self
    }

    /// Set the maximum wait for the diagram to finish rendering.
    #[must_use]
    pub fn settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }

    fn capture(&self, request: &DiagramRequest) -> Result<Vec<u8>, BackendError> {
        let options = LaunchOptions::default_builder()
            .window_size(Some(VIEWPORT))
            .build()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        let browser = Browser::new(options).map_err(|e| BackendError::Unavailable(e.to_string()))?;

        let tab = browser.new_tab().map_err(browser_error)?;
        let html = diagram_page(&self.script_url, request.description());
        let url = format!("data:text/html;base64,{}", BASE64_STANDARD.encode(html));

        tab.navigate_to(&url)
            .map_err(browser_error)?
            .wait_until_navigated()
            .map_err(browser_error)?;

        // Mermaid replaces the element's text with an <svg> once layout is done
        tab.wait_for_element_with_custom_timeout("#diagram svg", self.settle_timeout)
            .map_err(browser_error)?;

        let element = tab.find_element("#diagram").map_err(browser_error)?;
        element
            .capture_screenshot(CaptureScreenshotFormatOption::Png)
            .map_err(browser_error)
    }
}

fn browser_error(error: impl std::fmt::Display) -> BackendError {
    BackendError::Browser(error.to_string())
}

impl RenderBackend for ChromeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn render(&self, request: &DiagramRequest) -> Result<Vec<u8>, BackendError> {
        tracing::debug!(name = request.name(), "rendering diagram in headless Chrome");
        self.capture(request)
    }
}

/// Minimal HTML page that renders one Mermaid diagram on a white background.
fn diagram_page(script_url: &str, description: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <script src="{script_url}"></script>
    <style>
        body {{
            background: white;
            display: flex;
            justify-content: center;
            align-items: center;
            margin: 40px;
        }}
        #diagram {{
            background: white;
        }}
    </style>
</head>
<body>
    <div id="diagram" class="mermaid">
{description}
    </div>
    <script>
        mermaid.initialize({{
            startOnLoad: true,
            theme: 'default',
            themeVariables: {{
                fontSize: '16px'
            }}
        }});
    </script>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagram_page_embeds_source_and_script() {
        let html = diagram_page("https://cdn.example.com/mermaid.js", "graph LR\n A --> B");
        assert!(html.contains(r#"<script src="https://cdn.example.com/mermaid.js"></script>"#));
        assert!(html.contains("<div id=\"diagram\" class=\"mermaid\">\ngraph LR\n A --> B\n"));
        assert!(html.contains("startOnLoad: true"));
    }

    #[test]
    fn test_builder() {
        let backend = ChromeBackend::new()
            .script_url("https://cdn.example.com/mermaid.js")
            .settle_timeout(Duration::from_secs(5));
        assert_eq!(backend.script_url, "https://cdn.example.com/mermaid.js");
        assert_eq!(backend.settle_timeout, Duration::from_secs(5));
        assert_eq!(backend.kind(), BackendKind::Local);
    }
}
