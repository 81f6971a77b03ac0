//! Remote rendering via the mermaid.ink service.
//!
//! The diagram source is encoded with URL-safe base64 and sent as a single
//! `GET {base_url}/img/{encoded}` request. Anything other than `200 OK` is a
//! failure.

use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_URL_SAFE;
use ureq::Agent;

use crate::backend::RenderBackend;
use crate::consts::DEFAULT_TIMEOUT;
use crate::error::BackendError;
use crate::image::BackendKind;
use crate::request::DiagramRequest;

/// Create HTTP agent with the specified timeout.
///
/// Status codes are returned as responses rather than errors so that the
/// caller can report the exact status.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Backend that fetches rendered images from mermaid.ink (or a compatible server).
pub struct RemoteBackend {
    base_url: String,
    agent: Agent,
}

impl RemoteBackend {
    /// Create a backend for the given service URL with the default 30 second timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            agent: create_agent(DEFAULT_TIMEOUT),
        }
    }

    /// Set the global request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    /// Image URL for a diagram description.
    #[must_use]
    pub fn image_url(&self, description: &str) -> String {
        let encoded = BASE64_URL_SAFE.encode(description.as_bytes());
        format!("{}/img/{encoded}", self.base_url)
    }
}

impl RenderBackend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn render(&self, request: &DiagramRequest) -> Result<Vec<u8>, BackendError> {
        let url = self.image_url(request.description());

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| BackendError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(BackendError::Status(status));
        }

        let mut body = response.into_body();
        body.read_to_vec()
            .map_err(|e| BackendError::Http(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serve exactly one HTTP response and report the requested path.
    fn serve_once(status_line: &'static str, body: &'static [u8]) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let path = request_line
                .split_whitespace()
                .nth(1)
                .unwrap_or_default()
                .to_owned();
            tx.send(path).unwrap();

            let mut stream = stream;
            write!(
                stream,
                "{status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            )
            .unwrap();
            stream.write_all(body).unwrap();
            stream.flush().unwrap();
        });

        (url, rx)
    }

    #[test]
    fn test_image_url_uses_url_safe_base64() {
        let backend = RemoteBackend::new("https://mermaid.ink/");
        let url = backend.image_url("graph TB\n A-->B?>");
        assert!(url.starts_with("https://mermaid.ink/img/"));
        let encoded = url.trim_start_matches("https://mermaid.ink/img/");
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert_eq!(
            BASE64_URL_SAFE.decode(encoded).unwrap(),
            b"graph TB\n A-->B?>".to_vec()
        );
    }

    #[test]
    fn test_render_success_returns_body() {
        let png = b"\x89PNG\r\n\x1a\nfake-image-data";
        let (url, rx) = serve_once("HTTP/1.1 200 OK", png);
        let backend = RemoteBackend::new(url).timeout(Duration::from_secs(5));
        let request = DiagramRequest::new("graph LR\n A --> B", "flow");

        let data = backend.render(&request).unwrap();

        assert_eq!(data, png.to_vec());
        let path = rx.recv().unwrap();
        assert_eq!(
            path,
            format!("/img/{}", BASE64_URL_SAFE.encode("graph LR\n A --> B"))
        );
    }

    #[test]
    fn test_render_server_error_is_failure() {
        let (url, _rx) = serve_once("HTTP/1.1 500 Internal Server Error", b"boom");
        let backend = RemoteBackend::new(url).timeout(Duration::from_secs(5));
        let request = DiagramRequest::new("graph LR\n A --> B", "flow");

        let err = backend.render(&request).unwrap_err();
        assert!(matches!(err, BackendError::Status(500)), "got {err:?}");
    }

    #[test]
    fn test_render_connection_refused_is_failure() {
        // Bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let backend =
            RemoteBackend::new(format!("http://127.0.0.1:{port}")).timeout(Duration::from_secs(5));
        let request = DiagramRequest::new("graph LR\n A --> B", "flow");

        let err = backend.render(&request).unwrap_err();
        assert!(matches!(err, BackendError::Http(_)), "got {err:?}");
    }
}
