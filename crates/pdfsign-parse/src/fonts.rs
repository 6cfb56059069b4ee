//! Font registration, text encoding, and font embedding.
//!
//! A [`FontRegistry`] is loaded once from the configured TrueType file and
//! passed to everything that measures or draws text. When the file is
//! missing or unparsable it falls back to the standard Helvetica font, which
//! needs no embedding but only covers WinAnsiEncoding.
//!
//! TrueType text is written with `Identity-H`: each glyph is a two-byte
//! glyph id, and the descendant `CIDFontType2` maps CIDs to glyph ids
//! one-to-one. A `ToUnicode` CMap keeps the text extractable.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Object, ObjectId, dictionary};
use pdfsign_core::{Reported, SignWarning, SignWarningCode, TextMeasure, win_ansi_encode};
use tracing::{debug, warn};

use crate::error::BackendError;
use crate::lopdf_backend::{flate_stream, real};
use crate::standard_fonts::{HELVETICA_BBOX, HELVETICA_NAME, helvetica_string_width};

/// Text encoded for the active font, ready for a `Tj` operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    /// String bytes in the font's encoding.
    pub bytes: Vec<u8>,
    /// Glyph ids used, with the character each one draws. Empty for
    /// Helvetica, whose codes are WinAnsi bytes.
    pub glyphs: Vec<(u16, char)>,
    /// Characters the font could not draw; each was replaced with `?`.
    pub replaced: Vec<char>,
}

struct TrueTypeFont {
    base_font: String,
    data: Vec<u8>,
    font: fontdue::Font,
}

impl TrueTypeFont {
    fn glyph_for(&self, ch: char) -> Option<u16> {
        match self.font.lookup_glyph_index(ch) {
            0 => None,
            gid => Some(gid),
        }
    }

    /// Advance width in 1/1000 em.
    fn advance(&self, gid: u16) -> f64 {
        f64::from(self.font.metrics_indexed(gid, 1000.0).advance_width)
    }

    fn encode(&self, text: &str) -> EncodedText {
        let fallback = self.glyph_for('?').unwrap_or(0);
        let mut out = EncodedText {
            bytes: Vec::with_capacity(text.len() * 2),
            glyphs: Vec::new(),
            replaced: Vec::new(),
        };
        for ch in text.chars() {
            let (gid, drawn) = match self.glyph_for(ch) {
                Some(gid) => (gid, ch),
                None => {
                    out.replaced.push(ch);
                    (fallback, '?')
                }
            };
            out.bytes.extend_from_slice(&gid.to_be_bytes());
            out.glyphs.push((gid, drawn));
        }
        out
    }
}

enum ActiveFont {
    Helvetica,
    TrueType(Box<TrueTypeFont>),
}

/// The font used for overlay text.
pub struct FontRegistry {
    active: ActiveFont,
}

impl std::fmt::Debug for FontRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontRegistry")
            .field("base_font", &self.base_font())
            .field("embedded", &self.is_embedded())
            .finish()
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::helvetica()
    }
}

impl FontRegistry {
    /// The built-in Helvetica fallback.
    pub fn helvetica() -> Self {
        Self {
            active: ActiveFont::Helvetica,
        }
    }

    /// Load the TrueType font at `path`, falling back to Helvetica.
    ///
    /// Never fails: an unusable configured font yields a
    /// [`SignWarningCode::FontRegistrationFailure`] warning instead.
    pub fn load(path: Option<&Path>) -> Reported<Self> {
        let Some(path) = path else {
            return Reported::ok(Self::helvetica());
        };
        let attempt = std::fs::read(path)
            .map_err(BackendError::from)
            .and_then(|data| Self::from_ttf_bytes(&font_name_from_path(path), data));
        match attempt {
            Ok(registry) => {
                debug!(path = %path.display(), "registered TrueType font");
                Reported::ok(registry)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "falling back to Helvetica");
                Reported::with_warnings(
                    Self::helvetica(),
                    vec![SignWarning::with_code(
                        SignWarningCode::FontRegistrationFailure,
                        format!("cannot use font {}: {e}", path.display()),
                    )],
                )
            }
        }
    }

    /// Parse TrueType font data.
    pub fn from_ttf_bytes(name: &str, data: Vec<u8>) -> Result<Self, BackendError> {
        let font = fontdue::Font::from_bytes(data.as_slice(), fontdue::FontSettings::default())
            .map_err(|e| BackendError::Font(e.to_string()))?;
        Ok(Self {
            active: ActiveFont::TrueType(Box::new(TrueTypeFont {
                base_font: sanitize_font_name(name),
                data,
                font,
            })),
        })
    }

    /// True when text is drawn with an embedded TrueType font.
    pub fn is_embedded(&self) -> bool {
        matches!(self.active, ActiveFont::TrueType(_))
    }

    /// PDF `/BaseFont` name.
    pub fn base_font(&self) -> &str {
        match &self.active {
            ActiveFont::Helvetica => HELVETICA_NAME,
            ActiveFont::TrueType(tt) => &tt.base_font,
        }
    }

    /// Encode `text` for a `Tj` operand.
    pub fn encode(&self, text: &str) -> EncodedText {
        match &self.active {
            ActiveFont::Helvetica => {
                let enc = win_ansi_encode(text);
                EncodedText {
                    bytes: enc.bytes,
                    glyphs: Vec::new(),
                    replaced: enc.replaced,
                }
            }
            ActiveFont::TrueType(tt) => tt.encode(text),
        }
    }

    /// Advance width of `text` in points at `font_size`, as it will be drawn.
    pub fn string_width(&self, text: &str, font_size: f64) -> f64 {
        match &self.active {
            ActiveFont::Helvetica => helvetica_string_width(&win_ansi_encode(text).bytes, font_size),
            ActiveFont::TrueType(tt) => {
                let units: f64 = tt
                    .encode(text)
                    .glyphs
                    .iter()
                    .map(|&(gid, _)| tt.advance(gid))
                    .sum();
                units * font_size / 1000.0
            }
        }
    }

    /// Add the font dictionary to `doc`, returning its object id.
    ///
    /// `texts` lists every string drawn with the font; a TrueType font gets
    /// `/W` widths and `ToUnicode` entries for exactly those glyphs.
    pub fn add_to_document(
        &self,
        doc: &mut lopdf::Document,
        texts: &[EncodedText],
    ) -> Result<ObjectId, BackendError> {
        match &self.active {
            ActiveFont::Helvetica => Ok(doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => HELVETICA_NAME,
                "Encoding" => "WinAnsiEncoding",
            })),
            ActiveFont::TrueType(tt) => embed_truetype(doc, tt, texts),
        }
    }
}

impl TextMeasure for FontRegistry {
    fn string_width(&self, text: &str, font_size: f64) -> f64 {
        FontRegistry::string_width(self, text, font_size)
    }
}

fn embed_truetype(
    doc: &mut lopdf::Document,
    tt: &TrueTypeFont,
    texts: &[EncodedText],
) -> Result<ObjectId, BackendError> {
    let glyph_map: BTreeMap<u16, char> = texts
        .iter()
        .flat_map(|t| t.glyphs.iter().copied())
        .collect();

    let mut file_dict = Dictionary::new();
    file_dict.set("Length1", tt.data.len() as i64);
    let font_file_id = doc.add_object(flate_stream(file_dict, &tt.data)?);

    let (ascent, descent) = tt
        .font
        .horizontal_line_metrics(1000.0)
        .map(|m| (f64::from(m.ascent), f64::from(m.descent)))
        .unwrap_or((f64::from(HELVETICA_BBOX[3]), f64::from(HELVETICA_BBOX[1])));
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => tt.base_font.as_str(),
        "Flags" => 32,
        "FontBBox" => vec![0.into(), real(descent), 1000.into(), real(ascent)],
        "ItalicAngle" => 0,
        "Ascent" => real(ascent),
        "Descent" => real(descent),
        "CapHeight" => real(ascent),
        "StemV" => 80,
        "FontFile2" => font_file_id,
    });

    let mut widths = Vec::with_capacity(glyph_map.len() * 2);
    for &gid in glyph_map.keys() {
        widths.push(Object::Integer(i64::from(gid)));
        widths.push(Object::Array(vec![real(tt.advance(gid))]));
    }
    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => tt.base_font.as_str(),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor_id,
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });

    let to_unicode_id = doc.add_object(flate_stream(
        Dictionary::new(),
        to_unicode_cmap(&glyph_map).as_bytes(),
    )?);

    Ok(doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => tt.base_font.as_str(),
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_font_id)],
        "ToUnicode" => to_unicode_id,
    }))
}

/// `ToUnicode` CMap for an Identity-H font.
fn to_unicode_cmap(glyph_map: &BTreeMap<u16, char>) -> String {
    let mut out = String::new();
    out.push_str("/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n");
    out.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
    out.push_str("/CMapName /Adobe-Identity-UCS def\n/CMapType 2 def\n");
    out.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

    let entries: Vec<(&u16, &char)> = glyph_map.iter().collect();
    // bfchar blocks hold at most 100 entries
    for chunk in entries.chunks(100) {
        out.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, ch) in chunk {
            let mut units = [0u16; 2];
            let hex: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{u:04X}"))
                .collect();
            out.push_str(&format!("<{gid:04X}> <{hex}>\n"));
        }
        out.push_str("endbfchar\n");
    }

    out.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    out
}

fn font_name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "EmbeddedFont".to_string())
}

/// Keep only characters that are safe in a PDF name.
fn sanitize_font_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        cleaned
    }
}
