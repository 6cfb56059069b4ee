//! Signer configuration.
//!
//! Built once at startup and passed down explicitly. Library code never
//! reads the process environment; the CLI maps flags and environment
//! variables onto these fields.

use std::path::{Path, PathBuf};

use crate::layout::LayoutConfig;

/// Default TrueType font used for the inserted text.
pub const DEFAULT_FONT_PATH: &str = "assets/DejaVuSans.ttf";

/// Default OCR language set (Czech + English).
pub const DEFAULT_OCR_LANGUAGE: &str = "ces+eng";

/// Homebrew location of tesseract, preferred when present.
pub const HOMEBREW_TESSERACT: &str = "/opt/homebrew/bin/tesseract";

/// Default rasterizer executable.
pub const DEFAULT_PDFTOPPM: &str = "pdftoppm";

/// Tesseract executable to use when none is configured.
pub fn default_tesseract_binary() -> PathBuf {
    if Path::new(HOMEBREW_TESSERACT).exists() {
        PathBuf::from(HOMEBREW_TESSERACT)
    } else {
        PathBuf::from("tesseract")
    }
}

/// Configuration for a signing run.
#[derive(Debug, Clone, PartialEq)]
pub struct SignerConfig {
    /// Horizontal gap between the last glyph and the signature, in points.
    pub signature_gap_pt: f64,
    /// Vertical signature nudge in points (positive moves it up).
    pub signature_baseline_offset_pt: f64,
    /// TrueType font for the inserted text; Helvetica is used if unusable.
    pub font_path: Option<PathBuf>,
    /// OCR language string passed to the engine.
    pub ocr_language: String,
    /// OCR engine executable.
    pub ocr_engine_binary: PathBuf,
    /// PDF rasterizer executable.
    pub rasterizer_binary: PathBuf,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            signature_gap_pt: 40.0,
            signature_baseline_offset_pt: 0.0,
            font_path: Some(PathBuf::from(DEFAULT_FONT_PATH)),
            ocr_language: DEFAULT_OCR_LANGUAGE.to_string(),
            ocr_engine_binary: default_tesseract_binary(),
            rasterizer_binary: PathBuf::from(DEFAULT_PDFTOPPM),
        }
    }
}

impl SignerConfig {
    /// Layout parameters with this configuration's signature offsets applied.
    pub fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            signature_gap_pt: self.signature_gap_pt,
            signature_baseline_offset_pt: self.signature_baseline_offset_pt,
            ..LayoutConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SignerConfig::default();
        assert_eq!(cfg.signature_gap_pt, 40.0);
        assert_eq!(cfg.signature_baseline_offset_pt, 0.0);
        assert_eq!(cfg.font_path.as_deref(), Some(Path::new(DEFAULT_FONT_PATH)));
        assert_eq!(cfg.ocr_language, "ces+eng");
        assert_eq!(cfg.rasterizer_binary, PathBuf::from("pdftoppm"));
        let tess = cfg.ocr_engine_binary.to_string_lossy().into_owned();
        assert!(tess == "tesseract" || tess == HOMEBREW_TESSERACT);
    }

    #[test]
    fn layout_carries_signature_offsets() {
        let cfg = SignerConfig {
            signature_gap_pt: 12.5,
            signature_baseline_offset_pt: -3.0,
            ..SignerConfig::default()
        };
        let layout = cfg.layout();
        assert_eq!(layout.signature_gap_pt, 12.5);
        assert_eq!(layout.signature_baseline_offset_pt, -3.0);
        assert_eq!(layout.font_size_pt, 12.0);
    }
}
