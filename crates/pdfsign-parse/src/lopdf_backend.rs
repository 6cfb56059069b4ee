//! lopdf-based document access.
//!
//! Wraps [`lopdf::Document`] with the handful of queries the signer needs:
//! page enumeration, inherited page attributes, and page size.

use std::path::Path;

use pdfsign_core::PageSize;

use crate::error::BackendError;

/// A parsed PDF document backed by lopdf.
pub struct PdfDocument {
    inner: lopdf::Document,
    /// Cached ordered list of page ObjectIds (indexed by 0-based page number).
    page_ids: Vec<lopdf::ObjectId>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

impl PdfDocument {
    /// Read and parse a PDF file.
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Parse a PDF from memory.
    ///
    /// Encrypted documents are rejected; the signer has no password input.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BackendError> {
        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;
        Self::from_document(inner)
    }

    /// Wrap an already loaded lopdf document.
    pub fn from_document(inner: lopdf::Document) -> Result<Self, BackendError> {
        if inner.is_encrypted() {
            return Err(BackendError::Parse(
                "encrypted PDFs are not supported".to_string(),
            ));
        }
        // get_pages returns BTreeMap<u32, ObjectId> keyed by 1-based page number
        let page_ids = inner.get_pages().values().copied().collect();
        Ok(Self { inner, page_ids })
    }

    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    /// Mutable access to the underlying lopdf document.
    pub fn inner_mut(&mut self) -> &mut lopdf::Document {
        &mut self.inner
    }

    /// Consume the wrapper, returning the lopdf document.
    pub fn into_inner(self) -> lopdf::Document {
        self.inner
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Object id of the page at `index`.
    pub fn page_id(&self, index: usize) -> Result<lopdf::ObjectId, BackendError> {
        self.page_ids.get(index).copied().ok_or_else(|| {
            BackendError::Parse(format!(
                "page index {index} out of range (0..{})",
                self.page_ids.len()
            ))
        })
    }

    /// MediaBox of the page at `index` as `[x0, y0, x1, y1]`.
    pub fn media_box(&self, index: usize) -> Result<[f64; 4], BackendError> {
        let page_id = self.page_id(index)?;
        let obj = resolve_inherited(&self.inner, page_id, b"MediaBox")?
            .ok_or_else(|| BackendError::Parse("MediaBox not found on page or ancestors".into()))?;
        let obj = deref(&self.inner, obj)?;
        let array = obj
            .as_array()
            .map_err(|e| BackendError::Parse(format!("MediaBox is not an array: {e}")))?;
        extract_box_from_array(&self.inner, array)
    }

    /// Page size in points, taken from the MediaBox.
    pub fn page_size(&self, index: usize) -> Result<PageSize, BackendError> {
        let [x0, y0, x1, y1] = self.media_box(index)?;
        Ok(PageSize::new((x1 - x0).abs(), (y1 - y0).abs()))
    }
}

/// Build a FlateDecode stream from raw bytes.
pub(crate) fn flate_stream(
    mut dict: lopdf::Dictionary,
    data: &[u8],
) -> Result<lopdf::Stream, BackendError> {
    use std::io::Write;

    let mut encoder =
        flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;
    let compressed = encoder.finish()?;
    dict.set("Filter", "FlateDecode");
    Ok(lopdf::Stream::new(dict, compressed))
}

/// PDF real number from an f64 coordinate.
pub(crate) fn real(v: f64) -> lopdf::Object {
    lopdf::Object::Real(v as f32)
}

/// Follow a reference to the object it points at; other objects pass through.
pub(crate) fn deref<'a>(
    doc: &'a lopdf::Document,
    obj: &'a lopdf::Object,
) -> Result<&'a lopdf::Object, BackendError> {
    match obj {
        lopdf::Object::Reference(id) => doc
            .get_object(*id)
            .map_err(|e| BackendError::Parse(format!("dangling reference {id:?}: {e}"))),
        other => Ok(other),
    }
}

/// Extract `[x0, y0, x1, y1]` from a lopdf array of 4 numbers.
fn extract_box_from_array(
    doc: &lopdf::Document,
    array: &[lopdf::Object],
) -> Result<[f64; 4], BackendError> {
    if array.len() != 4 {
        return Err(BackendError::Parse(format!(
            "expected 4-element array for box, got {}",
            array.len()
        )));
    }
    let mut out = [0.0; 4];
    for (slot, obj) in out.iter_mut().zip(array) {
        *slot = object_to_f64(deref(doc, obj)?)?;
    }
    Ok(out)
}

/// Convert a lopdf numeric object (Integer or Real) to f64.
pub(crate) fn object_to_f64(obj: &lopdf::Object) -> Result<f64, BackendError> {
    match obj {
        lopdf::Object::Integer(i) => Ok(*i as f64),
        lopdf::Object::Real(f) => Ok(f64::from(*f)),
        _ => Err(BackendError::Parse(format!("expected number, got {obj:?}"))),
    }
}

/// Look up a key in the page dictionary, walking up the page tree
/// (via /Parent) if the key is not found on the page itself.
///
/// Returns `None` if the key is not found anywhere in the tree.
pub(crate) fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: lopdf::ObjectId,
    key: &[u8],
) -> Result<Option<&'a lopdf::Object>, BackendError> {
    let mut current_id = page_id;
    // bounded walk guards against /Parent cycles
    for _ in 0..64 {
        let dict = doc
            .get_object(current_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }

        match dict.get(b"Parent") {
            Ok(parent_obj) => {
                current_id = parent_obj
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
    Err(BackendError::Parse("page tree too deep".to_string()))
}
