//! Page rasterization.
//!
//! The locator needs every page as a bitmap for OCR. [`Rasterizer`] is the
//! seam; [`PdftoppmRasterizer`] drives poppler's `pdftoppm` binary.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::BackendError;

/// One rasterized page image on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterPage {
    /// Zero-based page index.
    pub index: usize,
    /// PNG file holding the page image.
    pub path: PathBuf,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Resolution the page was rendered at.
    pub dpi: u32,
}

/// Converts a PDF into page images.
pub trait Rasterizer {
    /// Render every page of `pdf` at `dpi`, writing images under `workdir`.
    ///
    /// Pages are returned in document order.
    fn rasterize(&self, pdf: &Path, dpi: u32, workdir: &Path)
    -> Result<Vec<RasterPage>, BackendError>;
}

/// [`Rasterizer`] backed by the `pdftoppm` command-line tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdftoppmRasterizer {
    binary: PathBuf,
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

const PAGE_PREFIX: &str = "page";

impl PdftoppmRasterizer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn rasterize(
        &self,
        pdf: &Path,
        dpi: u32,
        workdir: &Path,
    ) -> Result<Vec<RasterPage>, BackendError> {
        let prefix = workdir.join(PAGE_PREFIX);
        let output = Command::new(&self.binary)
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-png")
            .arg(pdf)
            .arg(&prefix)
            .output()
            .map_err(|e| {
                BackendError::Rasterizer(format!(
                    "failed to run {} (is poppler installed?): {e}",
                    self.binary.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::Rasterizer(format!(
                "{} failed ({}): {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        let pages = collect_pages(workdir, dpi)?;
        if pages.is_empty() {
            return Err(BackendError::Rasterizer(format!(
                "{} produced no page images",
                self.binary.display()
            )));
        }
        debug!(pages = pages.len(), dpi, "rasterized document");
        Ok(pages)
    }
}

/// Page number encoded in a `pdftoppm` output name such as `page-07.png`.
fn page_number(file_name: &str) -> Option<usize> {
    let stem = file_name.strip_suffix(".png")?;
    let digits = stem.strip_prefix(PAGE_PREFIX)?.strip_prefix('-')?;
    digits.parse().ok()
}

/// Collect `page-N.png` images in `workdir`, ordered by page number.
fn collect_pages(workdir: &Path, dpi: u32) -> Result<Vec<RasterPage>, BackendError> {
    let mut numbered = Vec::new();
    for entry in std::fs::read_dir(workdir)? {
        let path = entry?.path();
        let Some(number) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(page_number)
        else {
            continue;
        };
        numbered.push((number, path));
    }
    numbered.sort_by_key(|(number, _)| *number);

    numbered
        .into_iter()
        .enumerate()
        .map(|(index, (_, path))| -> Result<RasterPage, BackendError> {
            let (width, height) = image::image_dimensions(&path)?;
            Ok(RasterPage {
                index,
                path,
                width,
                height,
                dpi,
            })
        })
        .collect()
}
