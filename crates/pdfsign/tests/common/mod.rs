//! Shared fixtures for the signing pipeline tests.
//!
//! PDFs are generated with lopdf; OCR output is scripted per page so the
//! tests never need poppler or tesseract installed.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use pdfsign::pdfsign_parse::BackendError;
use pdfsign::{BBox, OcrEngine, OcrWord, RasterPage, Rasterizer};

/// Raster size of an A4 page at 300 dpi.
pub const A4_PX: (u32, u32) = (2480, 3508);
pub const A4_PT: (i64, i64) = (595, 842);

/// An A4 document with one Helvetica line of text per page.
pub fn pdf_with_pages(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for line in lines {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), A4_PT.0.into(), A4_PT.1.into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Write an opaque-black RGBA PNG of the given size.
pub fn signature_png(dir: &Path, width: u32, height: u32) -> PathBuf {
    let path = dir.join("signature.png");
    image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 255]))
        .save(&path)
        .unwrap();
    path
}

/// Rasterizer that reports `pages` A4 pages without rendering anything.
pub struct FakeRasterizer {
    pub pages: usize,
}

impl Rasterizer for FakeRasterizer {
    fn rasterize(
        &self,
        _pdf: &Path,
        dpi: u32,
        workdir: &Path,
    ) -> Result<Vec<RasterPage>, BackendError> {
        Ok((0..self.pages)
            .map(|index| RasterPage {
                index,
                path: workdir.join(format!("page-{}.png", index + 1)),
                width: A4_PX.0,
                height: A4_PX.1,
                dpi,
            })
            .collect())
    }
}

/// OCR engine returning scripted words for each page index.
pub struct ScriptedOcr {
    pub pages: Vec<Vec<OcrWord>>,
}

impl OcrEngine for ScriptedOcr {
    fn recognize(&self, page: &RasterPage, _language: &str) -> Result<Vec<OcrWord>, BackendError> {
        Ok(self.pages.get(page.index).cloned().unwrap_or_default())
    }
}

/// One OCR line starting at `(left, top)` pixels, words 40 px apart.
pub fn ocr_line(text: &str, left: f64, top: f64, line: u32) -> Vec<OcrWord> {
    let mut x = left;
    text.split_whitespace()
        .map(|word| {
            let width = 30.0 * word.chars().count() as f64;
            let w = OcrWord {
                text: word.to_string(),
                confidence: 92.0,
                bbox: BBox::from_xywh(x, top, width, 60.0),
                block: 1,
                paragraph: 1,
                line,
            };
            x += width + 40.0;
            w
        })
        .collect()
}

/// Operations of the overlay form stamped on page `page_number` (1-based).
pub fn overlay_operations(doc: &Document, page_number: u32) -> Option<Vec<Operation>> {
    let page_id = *doc.get_pages().get(&page_number)?;
    let page = doc.get_dictionary(page_id).ok()?;
    let resources = page.get(b"Resources").ok()?.as_dict().ok()?;
    let xobjects = resources.get(b"XObject").ok()?.as_dict().ok()?;
    let form_id = xobjects.get(b"SigOvl").ok()?.as_reference().ok()?;
    let form = doc.get_object(form_id).ok()?.as_stream().ok()?;
    let content = form.decompressed_content().ok()?;
    Some(Content::decode(&content).ok()?.operations)
}

/// Text drawn by `Tj` operations, decoded as single-byte strings.
pub fn drawn_lines(ops: &[Operation]) -> Vec<String> {
    ops.iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first()?.as_str().ok())
        .map(|bytes| bytes.iter().map(|&b| char::from(b)).collect())
        .collect()
}

/// `(x, y)` operands of every `Td`.
pub fn text_origins(ops: &[Operation]) -> Vec<(f32, f32)> {
    ops.iter()
        .filter(|op| op.operator == "Td")
        .map(|op| {
            (
                op.operands[0].as_float().unwrap(),
                op.operands[1].as_float().unwrap(),
            )
        })
        .collect()
}

/// Replace the MediaBox of page `page_number` (1-based).
pub fn with_media_box(pdf: &[u8], page_number: u32, media_box: [i64; 4]) -> Vec<u8> {
    let mut doc = Document::load_mem(pdf).unwrap();
    let page_id = doc.get_pages()[&page_number];
    let corners: Vec<Object> = media_box.iter().map(|&v| Object::Integer(v)).collect();
    doc.get_object_mut(page_id)
        .unwrap()
        .as_dict_mut()
        .unwrap()
        .set("MediaBox", corners);
    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// `(e, f)` of the `cm` placed right before the overlay `Do` on a page.
pub fn overlay_shift(doc: &Document, page_number: u32) -> Option<(f32, f32)> {
    let page_id = *doc.get_pages().get(&page_number)?;
    let content = doc.get_page_content(page_id).ok()?;
    let ops = Content::decode(&content).ok()?.operations;
    let draw = ops.iter().rposition(|op| op.operator == "Do")?;
    let cm = ops[..draw].last().filter(|op| op.operator == "cm")?;
    Some((cm.operands[4].as_float().ok()?, cm.operands[5].as_float().ok()?))
}
