//! The signing pipeline: locate, compose, merge.

use std::path::{Path, PathBuf};

use pdfsign_core::{
    ANCHOR_DEFAULT, AnchorHit, DEFAULT_DPI, LayoutConfig, SignError, SignWarning, SignerConfig,
};
use pdfsign_parse::{
    FontRegistry, OcrEngine, PdfDocument, PdftoppmRasterizer, Rasterizer, TesseractCli,
    merge_overlay,
};
use tracing::{info, warn};

use crate::composer::compose;
use crate::locator::locate;

/// One signing job.
#[derive(Debug, Clone, PartialEq)]
pub struct SignRequest {
    /// Source PDF.
    pub input: PathBuf,
    /// Where the signed PDF is written.
    pub output: PathBuf,
    /// Text inserted below the anchor.
    pub text: String,
    /// Signature PNG drawn after the text.
    pub signature: Option<PathBuf>,
    /// Phrase to search for.
    pub anchor: String,
    /// Rasterization resolution for OCR.
    pub dpi: u32,
}

impl SignRequest {
    /// A request using the default anchor and resolution, without signature.
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            text: text.into(),
            signature: None,
            anchor: ANCHOR_DEFAULT.to_string(),
            dpi: DEFAULT_DPI,
        }
    }

    pub fn with_signature(mut self, path: impl Into<PathBuf>) -> Self {
        self.signature = Some(path.into());
        self
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = anchor.into();
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }
}

/// Result of a signing job that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum SignOutcome {
    /// No page contains the anchor. Nothing was written.
    AnchorNotFound,
    /// The output was written with the overlay on `page_index`.
    Signed {
        page_index: usize,
        warnings: Vec<SignWarning>,
    },
}

impl SignOutcome {
    /// True when an output file was written.
    pub fn is_signed(&self) -> bool {
        matches!(self, SignOutcome::Signed { .. })
    }

    /// Non-fatal problems met while signing.
    pub fn warnings(&self) -> &[SignWarning] {
        match self {
            SignOutcome::Signed { warnings, .. } => warnings,
            SignOutcome::AnchorNotFound => &[],
        }
    }
}

/// Signs PDFs below an OCR-located anchor phrase.
///
/// The font is registered once at construction and shared by every job.
pub struct Signer {
    config: SignerConfig,
    layout: LayoutConfig,
    font: FontRegistry,
    font_warnings: Vec<SignWarning>,
    rasterizer: Box<dyn Rasterizer>,
    ocr: Box<dyn OcrEngine>,
}

impl Signer {
    /// A signer using `pdftoppm` and `tesseract` as configured.
    pub fn new(config: SignerConfig) -> Self {
        let rasterizer = Box::new(PdftoppmRasterizer::new(config.rasterizer_binary.clone()));
        let ocr = Box::new(TesseractCli::new(config.ocr_engine_binary.clone()));
        Self::with_backends(config, rasterizer, ocr)
    }

    /// A signer with caller-supplied rasterizer and OCR engine.
    pub fn with_backends(
        config: SignerConfig,
        rasterizer: Box<dyn Rasterizer>,
        ocr: Box<dyn OcrEngine>,
    ) -> Self {
        let font = FontRegistry::load(config.font_path.as_deref());
        Self {
            layout: config.layout(),
            config,
            font: font.value,
            font_warnings: font.warnings,
            rasterizer,
            ocr,
        }
    }

    /// Replace the layout parameters derived from the configuration.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn font(&self) -> &FontRegistry {
        &self.font
    }

    /// Find `anchor` in `pdf` without writing anything.
    pub fn locate(&self, pdf: &Path, anchor: &str, dpi: u32) -> Result<Option<AnchorHit>, SignError> {
        locate(
            pdf,
            anchor,
            dpi,
            &self.config.ocr_language,
            self.rasterizer.as_ref(),
            self.ocr.as_ref(),
        )
    }

    /// Run one signing job.
    ///
    /// Returns [`SignOutcome::AnchorNotFound`] without touching the output
    /// path when no page contains the anchor.
    pub fn sign(&self, request: &SignRequest) -> Result<SignOutcome, SignError> {
        let Some(hit) = self.locate(&request.input, &request.anchor, request.dpi)? else {
            return Ok(SignOutcome::AnchorNotFound);
        };

        let page = PdfDocument::open(&request.input)?.page_size(hit.page_index)?;
        let overlay = compose(
            page,
            &hit.bbox_px,
            hit.image_size_px,
            &request.text,
            request.signature.as_deref(),
            &self.layout,
            &self.font,
        )?;

        merge_overlay(&request.input, &overlay.value, hit.page_index, &request.output)?;

        let mut warnings = self.font_warnings.clone();
        warnings.extend(overlay.warnings);
        for warning in &warnings {
            warn!(%warning, "signed with warning");
        }
        info!(
            page = hit.page_index,
            output = %request.output.display(),
            "signed document"
        );
        Ok(SignOutcome::Signed {
            page_index: hit.page_index,
            warnings,
        })
    }
}
