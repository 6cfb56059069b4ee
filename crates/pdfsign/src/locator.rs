//! Anchor search across the pages of a document.

use std::path::Path;

use pdfsign_core::{AnchorHit, SignError, find_anchor_line};
use pdfsign_parse::{OcrEngine, Rasterizer};
use tracing::{debug, info};

/// Find the first line containing `anchor`, scanning pages in order.
///
/// Every page is rasterized at `dpi` into a scratch directory that is
/// removed when the search ends. `Ok(None)` means no page contains the
/// anchor; rasterizer and OCR failures are returned as errors.
pub fn locate(
    pdf: &Path,
    anchor: &str,
    dpi: u32,
    language: &str,
    rasterizer: &dyn Rasterizer,
    ocr: &dyn OcrEngine,
) -> Result<Option<AnchorHit>, SignError> {
    std::fs::metadata(pdf).map_err(|e| SignError::Io(format!("{}: {e}", pdf.display())))?;

    let workdir = tempfile::Builder::new().prefix("pdfsign-").tempdir()?;
    let pages = rasterizer.rasterize(pdf, dpi, workdir.path())?;

    for page in &pages {
        let words = ocr.recognize(page, language)?;
        debug!(page = page.index, words = words.len(), "searching page");
        if let Some(line) = find_anchor_line(&words, anchor) {
            info!(page = page.index, line = %line.text, "anchor found");
            return Ok(Some(AnchorHit {
                page_index: page.index,
                bbox_px: line.bbox,
                image_size_px: (page.width, page.height),
                dpi: page.dpi,
                line_text: line.text,
            }));
        }
    }

    info!(pages = pages.len(), anchor, "anchor not found");
    Ok(None)
}
