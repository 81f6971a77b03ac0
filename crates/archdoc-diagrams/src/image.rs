//! Rendered diagram images and format sniffing.

use std::fmt;
use std::path::{Path, PathBuf};

/// Which backend produced an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Headless browser on this machine.
    Local,
    /// Remote rendering service.
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// Raster format of a rendered image.
///
/// The temp file is always named `*.png`, but mermaid.ink answers
/// `/img/` requests with JPEG, so the actual encoding is tracked here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Detect the format from the leading magic bytes.
    #[must_use]
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }
}

/// A diagram image written to disk by the renderer.
///
/// The caller owns the backing file from the moment this value is returned
/// and is responsible for deleting it.
#[derive(Debug, PartialEq, Eq)]
pub struct RenderedImage {
    path: PathBuf,
    size: u64,
    origin: BackendKind,
    format: ImageFormat,
}

impl RenderedImage {
    pub(crate) fn new(path: PathBuf, size: u64, origin: BackendKind, format: ImageFormat) -> Self {
        Self {
            path,
            size,
            origin,
            format,
        }
    }

    /// Location of the image file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the image file in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Backend that produced the image.
    #[must_use]
    pub fn origin(&self) -> BackendKind {
        self.origin
    }

    /// Encoding of the image data.
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_png() {
        let data = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        assert_eq!(ImageFormat::detect(&data), Some(ImageFormat::Png));
    }

    #[test]
    fn test_detect_jpeg() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert_eq!(ImageFormat::detect(&data), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn test_detect_invalid() {
        assert_eq!(ImageFormat::detect(b"<html>error</html>"), None);
        assert_eq!(ImageFormat::detect(b""), None);
    }

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::Local.to_string(), "local");
        assert_eq!(BackendKind::Remote.to_string(), "remote");
    }
}
