//! pdfsign: find an anchor phrase in a PDF by OCR and sign below it.
//!
//! This is the public API facade crate for pdfsign-rs. It re-exports types from
//! pdfsign-core and drives pdfsign-parse for rasterization, OCR, overlay
//! rendering, and page merging.
//!
//! # Architecture
//!
//! - **pdfsign-core**: Backend-independent data types and algorithms
//! - **pdfsign-parse**: lopdf backend, fonts, and external tool adapters
//! - **pdfsign** (this crate): [`Signer`], the locator, and the composer
//!
//! # Example
//!
//! ```ignore
//! let signer = Signer::new(SignerConfig::default());
//! let request = SignRequest::new("in.pdf", "out.pdf", "Souhlasím.")
//!     .with_signature("assets/signature.png");
//! match signer.sign(&request)? {
//!     SignOutcome::Signed { page_index, .. } => println!("signed page {}", page_index + 1),
//!     SignOutcome::AnchorNotFound => println!("ANCHOR_NOT_FOUND"),
//! }
//! ```

mod composer;
mod locator;
mod signer;

pub use composer::compose;
pub use locator::locate;
pub use signer::{SignOutcome, SignRequest, Signer};

pub use pdfsign_core;
pub use pdfsign_core::{
    ANCHOR_DEFAULT, AnchorHit, BBox, DEFAULT_DPI, LayoutConfig, OcrWord, PageSize, PixelToPoint,
    Reported, SignError, SignWarning, SignWarningCode, SignerConfig, pixel_to_point,
};
pub use pdfsign_parse;
pub use pdfsign_parse::{
    FontRegistry, OcrEngine, PdftoppmRasterizer, RasterPage, Rasterizer, TesseractCli,
    merge_overlay,
};
