//! OCR engine seam and the Tesseract adapter.
//!
//! [`TesseractCli`] runs `tesseract IMAGE stdout -l LANG --dpi N tsv` and
//! parses the word rows of the TSV report. Column layout:
//!
//! ```text
//! level page_num block_num par_num line_num word_num left top width height conf text
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use pdfsign_core::{BBox, OcrWord};
use tracing::debug;

use crate::error::BackendError;
use crate::raster::RasterPage;

/// TSV `level` value of word rows.
const WORD_LEVEL: u32 = 5;
const TSV_COLUMNS: usize = 12;

/// Recognises words on a page image.
pub trait OcrEngine {
    /// Recognise all words on `page` using `language` (e.g. `ces+eng`).
    ///
    /// Words are returned in engine order, confidences as reported.
    fn recognize(&self, page: &RasterPage, language: &str) -> Result<Vec<OcrWord>, BackendError>;
}

/// [`OcrEngine`] backed by the `tesseract` command-line tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesseractCli {
    binary: PathBuf,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, page: &RasterPage, language: &str) -> Result<Vec<OcrWord>, BackendError> {
        let output = Command::new(&self.binary)
            .arg(&page.path)
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .arg("--dpi")
            .arg(page.dpi.to_string())
            .arg("tsv")
            .output()
            .map_err(|e| {
                BackendError::Ocr(format!(
                    "failed to run {} (is it installed?): {e}",
                    self.binary.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::Ocr(format!(
                "{} failed on page {}: {}",
                self.binary.display(),
                page.index + 1,
                stderr.trim()
            )));
        }

        let words = parse_tsv(&String::from_utf8_lossy(&output.stdout))?;
        debug!(page = page.index, words = words.len(), "recognized page");
        Ok(words)
    }
}

/// Parse a Tesseract TSV report into words.
///
/// Only level-5 (word) rows are kept. The header row and short rows are
/// skipped; a word row with unparsable numbers is an error.
pub fn parse_tsv(tsv: &str) -> Result<Vec<OcrWord>, BackendError> {
    let mut words = Vec::new();
    for (line_no, row) in tsv.lines().enumerate() {
        if line_no == 0 && row.starts_with("level") {
            continue;
        }
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < TSV_COLUMNS {
            continue;
        }
        if field::<u32>(&cols, 0, line_no)? != WORD_LEVEL {
            continue;
        }
        words.push(OcrWord {
            text: cols[11].to_string(),
            confidence: field(&cols, 10, line_no)?,
            bbox: BBox::from_xywh(
                field(&cols, 6, line_no)?,
                field(&cols, 7, line_no)?,
                field(&cols, 8, line_no)?,
                field(&cols, 9, line_no)?,
            ),
            block: field(&cols, 2, line_no)?,
            paragraph: field(&cols, 3, line_no)?,
            line: field(&cols, 4, line_no)?,
        });
    }
    Ok(words)
}

fn field<T: FromStr>(cols: &[&str], idx: usize, line_no: usize) -> Result<T, BackendError> {
    cols[idx].trim().parse().map_err(|_| {
        BackendError::Ocr(format!(
            "bad TSV value {:?} in column {idx} on line {}",
            cols[idx],
            line_no + 1
        ))
    })
}
