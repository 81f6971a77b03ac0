//! Diagram rendering errors.

use crate::image::BackendKind;

/// Failure of a single rendering backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend cannot run in this environment.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// Headless browser failed (launch, script, timeout, capture).
    #[error("browser error: {0}")]
    Browser(String),
    /// Remote service answered with a non-success status.
    #[error("HTTP status {0}")]
    Status(u16),
    /// Network or protocol failure.
    #[error("HTTP error: {0}")]
    Http(String),
    /// Backend produced no bytes.
    #[error("empty image data")]
    Empty,
    /// Backend produced bytes that are neither PNG nor JPEG.
    #[error("unrecognized image data")]
    InvalidImage,
    /// Writing the image file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Every configured backend failed for one diagram.
#[derive(Debug, thiserror::Error)]
#[error("diagram '{name}': {}", describe_attempts(.attempts))]
pub struct RenderError {
    /// Name of the diagram that failed.
    pub name: String,
    /// Each backend tried, in order, with its failure.
    pub attempts: Vec<(BackendKind, BackendError)>,
}

fn describe_attempts(attempts: &[(BackendKind, BackendError)]) -> String {
    if attempts.is_empty() {
        return "no rendering backend configured".to_owned();
    }
    attempts
        .iter()
        .map(|(kind, error)| format!("{kind}: {error}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_lists_attempts() {
        let error = RenderError {
            name: "states".to_owned(),
            attempts: vec![
                (BackendKind::Local, BackendError::Browser("launch failed".to_owned())),
                (BackendKind::Remote, BackendError::Status(500)),
            ],
        };
        assert_eq!(
            error.to_string(),
            "diagram 'states': local: browser error: launch failed; remote: HTTP status 500"
        );
    }

    #[test]
    fn test_render_error_without_backends() {
        let error = RenderError {
            name: "states".to_owned(),
            attempts: Vec::new(),
        };
        assert!(error.to_string().contains("no rendering backend configured"));
    }
}
