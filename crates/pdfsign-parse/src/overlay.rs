//! Single-page overlay PDF writer.
//!
//! Turns an [`OverlayPlan`] into a standalone one-page PDF the size of the
//! target page: each wrapped line is a `Tj` at its baseline, and the
//! signature is an image XObject scaled into its placement rectangle. The
//! page is otherwise transparent so it can be stamped onto the original.

use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageReader};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat, dictionary};
use pdfsign_core::{OverlayPlan, PageSize, Reported, SignWarning, SignWarningCode};
use tracing::{debug, warn};

use crate::error::BackendError;
use crate::fonts::FontRegistry;
use crate::lopdf_backend::{flate_stream, real};

/// Resource name of the overlay text font.
const FONT_RESOURCE: &str = "F1";
/// Resource name of the signature image.
const SIGNATURE_RESOURCE: &str = "Sig1";

/// Read a PNG's pixel dimensions from its header without decoding it.
///
/// Fails when the file is unreadable or not a PNG.
pub fn png_dimensions(path: &Path) -> Result<(u32, u32), BackendError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    if reader.format() != Some(ImageFormat::Png) {
        return Err(BackendError::Image(format!(
            "{} is not a PNG image",
            path.display()
        )));
    }
    Ok(reader.into_dimensions()?)
}

/// A decoded signature image split into colour and alpha planes.
#[derive(Debug, Clone)]
pub struct SignatureImage {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

impl SignatureImage {
    /// Decode the PNG at `path`.
    pub fn load(path: &Path) -> Result<Self, BackendError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        if reader.format() != Some(ImageFormat::Png) {
            return Err(BackendError::Image(format!(
                "{} is not a PNG image",
                path.display()
            )));
        }
        Ok(Self::from_image(&reader.decode()?))
    }

    /// Split a decoded image. The alpha plane is kept only when the image
    /// has an alpha channel.
    pub fn from_image(img: &DynamicImage) -> Self {
        let has_alpha = img.color().has_alpha();
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = (width as usize) * (height as usize);
        let mut rgb = Vec::with_capacity(pixels * 3);
        let mut alpha = Vec::with_capacity(if has_alpha { pixels } else { 0 });
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            rgb.extend_from_slice(&[r, g, b]);
            if has_alpha {
                alpha.push(a);
            }
        }
        Self {
            width,
            height,
            rgb,
            alpha: has_alpha.then_some(alpha),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    /// Add the image (and its soft mask) to `doc`.
    fn add_to_document(&self, doc: &mut Document) -> Result<ObjectId, BackendError> {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(self.width),
            "Height" => i64::from(self.height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        };
        if let Some(alpha) = &self.alpha {
            let smask_id = doc.add_object(flate_stream(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(self.width),
                    "Height" => i64::from(self.height),
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                alpha,
            )?);
            dict.set("SMask", Object::Reference(smask_id));
        }
        Ok(doc.add_object(flate_stream(dict, &self.rgb)?))
    }
}

/// Render `plan` as a one-page PDF of size `page`.
///
/// The signature is drawn only when the plan places one and `signature`
/// supplies its pixels. Characters the font cannot encode are replaced with
/// `?` and reported as [`SignWarningCode::UnencodableGlyph`].
pub fn render_overlay(
    page: PageSize,
    plan: &OverlayPlan,
    font: &FontRegistry,
    signature: Option<&SignatureImage>,
) -> Result<Reported<Vec<u8>>, BackendError> {
    let mut doc = Document::with_version("1.5");
    let mut warnings = Vec::new();

    let encoded: Vec<_> = plan.lines.iter().map(|l| font.encode(l)).collect();
    let mut replaced: Vec<char> = encoded.iter().flat_map(|e| e.replaced.iter().copied()).collect();
    replaced.sort_unstable();
    replaced.dedup();
    if !replaced.is_empty() {
        let chars: String = replaced.iter().collect();
        warn!(font = font.base_font(), chars = %chars, "replacing unencodable characters");
        warnings.push(SignWarning::with_code(
            SignWarningCode::UnencodableGlyph,
            format!("font {} cannot draw {chars:?}; replaced with '?'", font.base_font()),
        ));
    }

    let mut operations = Vec::new();
    let mut resources = Dictionary::new();

    if !encoded.is_empty() {
        let font_id = font.add_to_document(&mut doc, &encoded)?;
        resources.set("Font", dictionary! { FONT_RESOURCE => font_id });
        for (text, baseline) in encoded.iter().zip(&plan.baselines) {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![FONT_RESOURCE.into(), real(plan.font_size)],
            ));
            operations.push(Operation::new(
                "Td",
                vec![real(plan.start_x), real(*baseline)],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(text.bytes.clone(), StringFormat::Hexadecimal)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
    }

    if let (Some(placement), Some(image)) = (plan.signature, signature) {
        let image_id = image.add_to_document(&mut doc)?;
        resources.set("XObject", dictionary! { SIGNATURE_RESOURCE => image_id });
        operations.push(Operation::new("q", vec![]));
        operations.push(Operation::new(
            "cm",
            vec![
                real(placement.width),
                0.into(),
                0.into(),
                real(placement.height),
                real(placement.x),
                real(placement.y),
            ],
        ));
        operations.push(Operation::new("Do", vec![SIGNATURE_RESOURCE.into()]));
        operations.push(Operation::new("Q", vec![]));
        debug!(
            x = placement.x,
            y = placement.y,
            width = placement.width,
            height = placement.height,
            "placed signature"
        );
    }

    let content = Content { operations }
        .encode()
        .map_err(|e| BackendError::Parse(format!("failed to encode overlay content: {e}")))?;
    let content_id = doc.add_object(flate_stream(Dictionary::new(), &content)?);

    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), real(page.width), real(page.height)],
        "Resources" => resources,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| BackendError::Write(format!("failed to serialize overlay: {e}")))?;
    Ok(Reported::with_warnings(buf, warnings))
}
