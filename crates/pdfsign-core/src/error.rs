//! Error and warning types for pdfsign.
//!
//! Provides [`SignError`] for fatal errors that stop a signing run,
//! [`SignWarning`] for non-fatal degradations (missing signature asset,
//! unusable custom font), and [`Reported`] for pairing a value with the
//! warnings collected while producing it.

use std::fmt;

/// Fatal error types for a signing run.
///
/// A missing anchor is not an error; see `SignOutcome::AnchorNotFound`
/// in the `pdfsign` crate.
#[derive(Debug, Clone, PartialEq)]
pub enum SignError {
    /// The rasterizer could not convert the document to page images.
    Rasterization(String),
    /// The OCR engine failed on a page image.
    Ocr(String),
    /// Error parsing PDF structure or syntax.
    Parse(String),
    /// I/O error reading inputs.
    Io(String),
    /// The output document could not be written.
    OutputWrite(String),
    /// A rasterized page image had a zero dimension.
    InvalidRaster {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },
    /// Any other error not covered by specific variants.
    Other(String),
}

impl fmt::Display for SignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignError::Rasterization(msg) => write!(f, "rasterization failed: {msg}"),
            SignError::Ocr(msg) => write!(f, "OCR failed: {msg}"),
            SignError::Parse(msg) => write!(f, "parse error: {msg}"),
            SignError::Io(msg) => write!(f, "I/O error: {msg}"),
            SignError::OutputWrite(msg) => write!(f, "failed to write output: {msg}"),
            SignError::InvalidRaster { width, height } => {
                write!(f, "rasterized page has invalid size {width}x{height}")
            }
            SignError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for SignError {}

impl From<std::io::Error> for SignError {
    fn from(err: std::io::Error) -> Self {
        SignError::Io(err.to_string())
    }
}

/// Machine-readable code for a non-fatal degradation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum SignWarningCode {
    /// The signature image was missing, unreadable, or not a PNG.
    SignatureAssetUnavailable,
    /// The configured TrueType font could not be used; the built-in font was.
    FontRegistrationFailure,
    /// Characters the active font cannot encode were replaced.
    UnencodableGlyph,
    /// Any other warning not covered by specific variants.
    Other(String),
}

impl SignWarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &str {
        match self {
            SignWarningCode::SignatureAssetUnavailable => "SIGNATURE_ASSET_UNAVAILABLE",
            SignWarningCode::FontRegistrationFailure => "FONT_REGISTRATION_FAILURE",
            SignWarningCode::UnencodableGlyph => "UNENCODABLE_GLYPH",
            SignWarningCode::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for SignWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal issue encountered while signing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignWarning {
    /// Machine-readable warning code.
    pub code: SignWarningCode,
    /// Human-readable description of the warning.
    pub description: String,
}

impl SignWarning {
    /// Create a warning with just a description.
    ///
    /// Uses [`SignWarningCode::Other`] as the code.
    pub fn new(description: impl Into<String>) -> Self {
        let desc = description.into();
        Self {
            code: SignWarningCode::Other(desc.clone()),
            description: desc,
        }
    }

    /// Create a warning with a specific code and description.
    pub fn with_code(code: SignWarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }
}

impl fmt::Display for SignWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)
    }
}

/// A value paired with the warnings collected while producing it.
#[derive(Debug, Clone)]
pub struct Reported<T> {
    /// The produced value.
    pub value: T,
    /// Warnings collected along the way.
    pub warnings: Vec<SignWarning>,
}

impl<T> Reported<T> {
    /// Create a result with no warnings.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Create a result with warnings.
    pub fn with_warnings(value: T, warnings: Vec<SignWarning>) -> Self {
        Self { value, warnings }
    }

    /// Returns true if there are no warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Transform the value while preserving warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reported<U> {
        Reported {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_error_display() {
        assert_eq!(
            SignError::Rasterization("pdftoppm exited with 1".to_string()).to_string(),
            "rasterization failed: pdftoppm exited with 1"
        );
        assert_eq!(
            SignError::Ocr("no language data".to_string()).to_string(),
            "OCR failed: no language data"
        );
        assert_eq!(
            SignError::OutputWrite("disk full".to_string()).to_string(),
            "failed to write output: disk full"
        );
        assert_eq!(
            SignError::InvalidRaster {
                width: 0,
                height: 3508
            }
            .to_string(),
            "rasterized page has invalid size 0x3508"
        );
        assert_eq!(SignError::Other("boom".to_string()).to_string(), "boom");
    }

    #[test]
    fn sign_error_implements_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(SignError::Parse("bad xref".to_string()));
        assert_eq!(err.to_string(), "parse error: bad xref");
    }

    #[test]
    fn sign_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err: SignError = io_err.into();
        assert!(matches!(err, SignError::Io(_)));
        assert!(err.to_string().contains("missing file"));
    }

    #[test]
    fn warning_display_includes_code() {
        let w = SignWarning::with_code(
            SignWarningCode::SignatureAssetUnavailable,
            "signature file not found: sig.png",
        );
        assert_eq!(
            w.to_string(),
            "[SIGNATURE_ASSET_UNAVAILABLE] signature file not found: sig.png"
        );
    }

    #[test]
    fn warning_new_defaults_to_other() {
        let w = SignWarning::new("something odd");
        assert_eq!(w.code.as_str(), "OTHER");
        assert_eq!(w.to_string(), "[OTHER] something odd");
    }

    #[test]
    fn reported_map_preserves_warnings() {
        let r = Reported::with_warnings(10, vec![SignWarning::new("x")]);
        assert!(!r.is_clean());
        let mapped = r.map(|v| v * 2);
        assert_eq!(mapped.value, 20);
        assert_eq!(mapped.warnings.len(), 1);
        assert!(Reported::ok(()).is_clean());
    }
}
