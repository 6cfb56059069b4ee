//! Overlay composition: layout plus signature asset handling.

use std::path::Path;

use pdfsign_core::{
    BBox, LayoutConfig, PageSize, Reported, SignError, SignWarning, SignWarningCode, plan_overlay,
    signature_aspect,
};
use pdfsign_parse::{FontRegistry, SignatureImage, png_dimensions, render_overlay};
use tracing::warn;

/// Build the one-page overlay PDF for an anchor found at `anchor_bbox_px`.
///
/// Text is wrapped and drawn below the anchor with `font`. The signature at
/// `signature_path` is placed after the last line when it exists and its
/// content decodes as PNG, whatever the file name; otherwise the overlay is text-only and a
/// [`SignWarningCode::SignatureAssetUnavailable`] warning is returned.
pub fn compose(
    page: PageSize,
    anchor_bbox_px: &BBox,
    image_size_px: (u32, u32),
    text: &str,
    signature_path: Option<&Path>,
    layout: &LayoutConfig,
    font: &FontRegistry,
) -> Result<Reported<Vec<u8>>, SignError> {
    let mut warnings = Vec::new();
    let signature = signature_path.and_then(|path| usable_signature(path, &mut warnings));

    let plan = plan_overlay(
        page,
        anchor_bbox_px,
        image_size_px,
        text,
        signature.map(|(_, aspect)| aspect),
        layout,
        font,
    )?;

    let image = match (signature, plan.signature) {
        (Some((path, _)), Some(_)) => match SignatureImage::load(path) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping undecodable signature");
                warnings.push(SignWarning::with_code(
                    SignWarningCode::SignatureAssetUnavailable,
                    format!("cannot decode signature {}: {e}", path.display()),
                ));
                None
            }
        },
        _ => None,
    };

    let rendered = render_overlay(page, &plan, font, image.as_ref())?;
    warnings.extend(rendered.warnings);
    Ok(Reported::with_warnings(rendered.value, warnings))
}

/// The signature path and its aspect ratio, when the asset can be used.
///
/// The format is judged by content, not extension. An unreadable header
/// falls back to the default aspect; decoding is retried when the overlay
/// is drawn.
fn usable_signature<'a>(
    path: &'a Path,
    warnings: &mut Vec<SignWarning>,
) -> Option<(&'a Path, f64)> {
    if path.is_file() {
        return Some((path, signature_aspect(png_dimensions(path).ok())));
    }
    warn!(path = %path.display(), "signature does not exist, drawing text only");
    warnings.push(SignWarning::with_code(
        SignWarningCode::SignatureAssetUnavailable,
        format!("signature {} does not exist", path.display()),
    ));
    None
}
