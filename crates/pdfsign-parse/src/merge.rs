//! Stamping the overlay onto the source document.
//!
//! The overlay page is imported as a Form XObject. The matched page's
//! existing content is wrapped in `q … Q` so a graphics state left unbalanced
//! by the original cannot shift the overlay, and the form is drawn last.
//! Other pages are not touched.

use std::collections::BTreeSet;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;

use crate::error::BackendError;
use crate::lopdf_backend::{PdfDocument, deref, flate_stream, resolve_inherited};

/// Base resource name of the imported overlay form.
pub const OVERLAY_RESOURCE: &str = "SigOvl";

/// Stamp `overlay` (a one-page PDF) onto page `page_index` of `input` and
/// write the result to `output`.
///
/// The output is written to a temporary file beside `output` and renamed
/// over it, so a failure never leaves a partial file behind.
pub fn merge_overlay(
    input: &Path,
    overlay: &[u8],
    page_index: usize,
    output: &Path,
) -> Result<(), BackendError> {
    let mut doc = PdfDocument::open(input)?;
    stamp_overlay(&mut doc, overlay, page_index)?;
    write_atomically(doc.inner_mut(), output)
}

/// Stamp `overlay` onto page `page_index` of `doc` in memory.
pub fn stamp_overlay(
    doc: &mut PdfDocument,
    overlay: &[u8],
    page_index: usize,
) -> Result<(), BackendError> {
    let page_id = doc.page_id(page_index)?;
    let [x0, y0, x1, y1] = doc.media_box(page_index)?;
    let origin = (x0.min(x1), y0.min(y1));
    let target = doc.inner_mut();

    let mut source = Document::load_mem(overlay)
        .map_err(|e| BackendError::Parse(format!("failed to parse overlay: {e}")))?;
    source.renumber_objects_with(target.max_id + 1);
    let form_id = import_as_form(target, source)?;

    let mut resources = page_resources(target, page_id)?;
    let mut xobjects = match resources.get(b"XObject") {
        Ok(obj) => deref(target, obj)?
            .as_dict()
            .map_err(|e| BackendError::Parse(format!("XObject resources are not a dictionary: {e}")))?
            .clone(),
        Err(_) => Dictionary::new(),
    };
    let name = free_resource_name(&xobjects, OVERLAY_RESOURCE);
    xobjects.set(name.as_str(), Object::Reference(form_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    let mut contents = existing_contents(target, page_id)?;
    let open_id = target.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    // leading newline keeps `Q` from fusing with the original's last token
    let draw = format!("\nQ\nq {}/{name} Do Q\n", origin_shift(origin));
    let draw_id = target.add_object(Stream::new(Dictionary::new(), draw.into_bytes()));
    contents.insert(0, Object::Reference(open_id));
    contents.push(Object::Reference(draw_id));

    let page = target
        .get_object_mut(page_id)
        .and_then(|o| o.as_dict_mut())
        .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;
    page.set("Resources", Object::Dictionary(resources));
    page.set("Contents", Object::Array(contents));

    debug!(page_index, resource = %name, "stamped overlay");
    Ok(())
}

/// Save `doc` to `output` through a temporary file in the same directory.
pub fn write_atomically(doc: &mut Document, output: &Path) -> Result<(), BackendError> {
    let write_err = |e: &dyn std::fmt::Display| {
        BackendError::Write(format!("{}: {e}", output.display()))
    };
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| write_err(&e))?;
    doc.save_to(&mut tmp).map_err(|e| write_err(&e))?;
    tmp.as_file().sync_all().map_err(|e| write_err(&e))?;
    tmp.persist(output).map_err(|e| write_err(&e.error))?;
    Ok(())
}

/// Move every object of the (already renumbered) overlay document into
/// `target` and wrap its first page as a Form XObject.
fn import_as_form(target: &mut Document, mut source: Document) -> Result<ObjectId, BackendError> {
    let overlay_page_id = source
        .get_pages()
        .values()
        .next()
        .copied()
        .ok_or_else(|| BackendError::Parse("overlay has no pages".to_string()))?;
    let content = source
        .get_page_content(overlay_page_id)
        .map_err(|e| BackendError::Parse(format!("failed to read overlay content: {e}")))?;
    let page = source
        .get_dictionary(overlay_page_id)
        .map_err(|e| BackendError::Parse(format!("failed to get overlay page: {e}")))?;
    let resources = match page.get(b"Resources") {
        Ok(obj) => deref(&source, obj)?.clone(),
        Err(_) => Object::Dictionary(Dictionary::new()),
    };
    let bbox = match resolve_inherited(&source, overlay_page_id, b"MediaBox")? {
        Some(obj) => deref(&source, obj)?.clone(),
        None => return Err(BackendError::Parse("overlay has no MediaBox".to_string())),
    };
    let skip: BTreeSet<ObjectId> = content_ids(&source, page);

    let mut max_id = target.max_id;
    for (id, object) in std::mem::take(&mut source.objects) {
        if skip.contains(&id) || is_structural(&object) {
            continue;
        }
        max_id = max_id.max(id.0);
        target.objects.insert(id, object);
    }
    target.max_id = max_id;

    let form = flate_stream(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => bbox,
            "Resources" => resources,
        },
        &content,
    )?;
    Ok(target.add_object(form))
}

/// Catalog, page tree nodes, and pages are rebuilt by the target.
fn is_structural(object: &Object) -> bool {
    let Ok(dict) = object.as_dict() else {
        return false;
    };
    matches!(
        dict.get(b"Type"),
        Ok(Object::Name(name)) if matches!(name.as_slice(), b"Catalog" | b"Pages" | b"Page")
    )
}

fn content_ids(doc: &Document, page: &Dictionary) -> BTreeSet<ObjectId> {
    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => {
                let mut ids: BTreeSet<ObjectId> =
                    items.iter().filter_map(|o| o.as_reference().ok()).collect();
                ids.insert(*id);
                ids
            }
            _ => BTreeSet::from([*id]),
        },
        Ok(Object::Array(items)) => items.iter().filter_map(|o| o.as_reference().ok()).collect(),
        _ => BTreeSet::new(),
    }
}

/// The page's effective resources (inherited ones included) as an owned
/// dictionary.
fn page_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary, BackendError> {
    match resolve_inherited(doc, page_id, b"Resources")? {
        Some(obj) => Ok(deref(doc, obj)?
            .as_dict()
            .map_err(|e| BackendError::Parse(format!("Resources is not a dictionary: {e}")))?
            .clone()),
        None => Ok(Dictionary::new()),
    }
}

/// The page's content streams as a flat list of references.
fn existing_contents(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>, BackendError> {
    let page = doc
        .get_dictionary(page_id)
        .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;
    let contents = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };
    Ok(contents)
}

fn free_resource_name(existing: &Dictionary, base: &str) -> String {
    if !existing.has(base.as_bytes()) {
        return base.to_string();
    }
    (1u32..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !existing.has(candidate.as_bytes()))
        .unwrap_or_else(|| base.to_string())
}

/// `cm` moving the overlay's (0,0) onto the MediaBox lower-left corner.
fn origin_shift((x, y): (f64, f64)) -> String {
    if x == 0.0 && y == 0.0 {
        String::new()
    } else {
        format!("1 0 0 1 {x} {y} cm ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lopdf_backend::test_pdfs::{simple, to_bytes};
    use lopdf::content::Content;

    /// A one-page overlay whose content draws a rectangle.
    fn overlay_bytes(width: i64, height: i64) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            b"0 0 1 rg 10 10 50 20 re f".to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Resources" => Dictionary::new(),
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
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        to_bytes(doc)
    }

    fn page_ops(doc: &Document, page_number: u32) -> Vec<String> {
        let page_id = doc.get_pages()[&page_number];
        let content = doc.get_page_content(page_id).unwrap();
        Content::decode(&content)
            .unwrap()
            .operations
            .into_iter()
            .map(|op| op.operator)
            .collect()
    }

    #[test]
    fn stamps_only_the_matched_page() {
        let mut doc = PdfDocument::from_bytes(&to_bytes(simple(3, 612, 792))).unwrap();
        let before_first = page_ops(doc.inner(), 1);
        stamp_overlay(&mut doc, &overlay_bytes(612, 792), 1).unwrap();

        let saved = to_bytes(doc.into_inner());
        let reloaded = Document::load_mem(&saved).unwrap();
        assert_eq!(reloaded.get_pages().len(), 3);
        assert_eq!(page_ops(&reloaded, 1), before_first);
        assert_eq!(page_ops(&reloaded, 3), vec!["BT", "Tf", "Td", "Tj", "ET"]);

        let ops = page_ops(&reloaded, 2);
        assert_eq!(ops.first().map(String::as_str), Some("q"));
        assert_eq!(&ops[ops.len() - 4..], ["Q", "q", "Do", "Q"]);
    }

    #[test]
    fn offset_media_box_translates_the_form() {
        let mut source = simple(1, 595, 842);
        let page_id = source.get_pages()[&1];
        source
            .get_object_mut(page_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set(
                "MediaBox",
                vec![
                    Object::Integer(200),
                    Object::Integer(200),
                    Object::Integer(795),
                    Object::Integer(1042),
                ],
            );
        let mut doc = PdfDocument::from_bytes(&to_bytes(source)).unwrap();
        stamp_overlay(&mut doc, &overlay_bytes(595, 842), 0).unwrap();

        let reloaded = Document::load_mem(&to_bytes(doc.into_inner())).unwrap();
        let page_id = reloaded.get_pages()[&1];
        let content = reloaded.get_page_content(page_id).unwrap();
        let ops = Content::decode(&content).unwrap().operations;
        let tail: Vec<&str> = ops[ops.len() - 4..].iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(tail, ["q", "cm", "Do", "Q"]);
        let shift: Vec<f32> = ops[ops.len() - 3]
            .operands
            .iter()
            .map(|o| o.as_float().unwrap())
            .collect();
        assert_eq!(shift, [1.0, 0.0, 0.0, 1.0, 200.0, 200.0]);
    }

    #[test]
    fn origin_shift_is_omitted_at_zero() {
        assert_eq!(origin_shift((0.0, 0.0)), "");
        assert_eq!(origin_shift((200.0, 12.5)), "1 0 0 1 200 12.5 cm ");
    }

    #[test]
    fn form_is_registered_in_page_resources() {
        let mut doc = PdfDocument::from_bytes(&to_bytes(simple(1, 612, 792))).unwrap();
        stamp_overlay(&mut doc, &overlay_bytes(612, 792), 0).unwrap();
        let inner = doc.inner();
        let page = inner.get_dictionary(doc.page_id(0).unwrap()).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        // original font resources survive
        assert!(resources.get(b"Font").is_ok());
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let form_id = xobjects.get(b"SigOvl").unwrap().as_reference().unwrap();
        let form = inner.get_object(form_id).unwrap().as_stream().unwrap();
        assert_eq!(
            form.dict.get(b"Subtype").unwrap(),
            &Object::Name(b"Form".to_vec())
        );
        let content = form.decompressed_content().unwrap();
        assert_eq!(content, b"0 0 1 rg 10 10 50 20 re f");
    }

    #[test]
    fn existing_resource_name_is_not_clobbered() {
        let mut existing = Dictionary::new();
        existing.set("SigOvl", Object::Null);
        existing.set("SigOvl1", Object::Null);
        assert_eq!(free_resource_name(&existing, "SigOvl"), "SigOvl2");
        assert_eq!(free_resource_name(&Dictionary::new(), "SigOvl"), "SigOvl");
    }

    #[test]
    fn out_of_range_page_is_an_error() {
        let mut doc = PdfDocument::from_bytes(&to_bytes(simple(1, 612, 792))).unwrap();
        assert!(stamp_overlay(&mut doc, &overlay_bytes(612, 792), 1).is_err());
    }

    #[test]
    fn garbage_overlay_is_a_parse_error() {
        let mut doc = PdfDocument::from_bytes(&to_bytes(simple(1, 612, 792))).unwrap();
        let err = stamp_overlay(&mut doc, b"junk", 0).unwrap_err();
        assert!(matches!(err, BackendError::Parse(_)));
    }

    #[test]
    fn merge_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        std::fs::write(&input, to_bytes(simple(2, 595, 842))).unwrap();

        merge_overlay(&input, &overlay_bytes(595, 842), 0, &output).unwrap();

        let merged = PdfDocument::open(&output).unwrap();
        assert_eq!(merged.page_count(), 2);
        // only the output file and the input remain; no stray temp files
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn unwritable_output_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        std::fs::write(&input, to_bytes(simple(1, 595, 842))).unwrap();
        let output = dir.path().join("missing-dir").join("out.pdf");

        let err = merge_overlay(&input, &overlay_bytes(595, 842), 0, &output).unwrap_err();
        assert!(matches!(err, BackendError::Write(_)));
        assert!(!output.exists());
    }
}
