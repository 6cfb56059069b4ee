//! Error types for the backend layer.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Provides [`BackendError`]
//! that wraps lopdf, image, and subprocess failures and converts them to
//! [`SignError`].

use pdfsign_core::SignError;
use thiserror::Error;

/// Error type for backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading or embedding a font.
    #[error("font error: {0}")]
    Font(String),

    /// Error decoding or embedding an image.
    #[error("image error: {0}")]
    Image(String),

    /// The PDF rasterizer failed.
    #[error("rasterizer error: {0}")]
    Rasterizer(String),

    /// The OCR engine failed.
    #[error("OCR engine error: {0}")]
    Ocr(String),

    /// The output document could not be written.
    #[error("write error: {0}")]
    Write(String),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] SignError),
}

impl From<lopdf::Error> for BackendError {
    fn from(err: lopdf::Error) -> Self {
        BackendError::Parse(err.to_string())
    }
}

impl From<image::ImageError> for BackendError {
    fn from(err: image::ImageError) -> Self {
        BackendError::Image(err.to_string())
    }
}

impl From<BackendError> for SignError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => SignError::Parse(msg),
            BackendError::Io(e) => SignError::Io(e.to_string()),
            BackendError::Font(msg) => SignError::Other(format!("font error: {msg}")),
            BackendError::Image(msg) => SignError::Other(format!("image error: {msg}")),
            BackendError::Rasterizer(msg) => SignError::Rasterization(msg),
            BackendError::Ocr(msg) => SignError::Ocr(msg),
            BackendError::Write(msg) => SignError::OutputWrite(msg),
            BackendError::Core(e) => e,
        }
    }
}
