//! OCR word model, line grouping, and anchor matching.
//!
//! An OCR engine reports words tagged with a `(block, paragraph, line)`
//! key. Words sharing a key form one recognised line; the anchor phrase is
//! searched for as a normalized substring of each line's text.

use crate::geometry::BBox;

/// A single word recognised by an OCR engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OcrWord {
    /// Recognised text (may be blank).
    pub text: String,
    /// Engine confidence. Negative values mark non-word layout rows.
    pub confidence: f64,
    /// Word box in raster pixels.
    pub bbox: BBox,
    /// Block number within the page.
    pub block: u32,
    /// Paragraph number within the block.
    pub paragraph: u32,
    /// Line number within the paragraph.
    pub line: u32,
}

impl OcrWord {
    /// The line this word belongs to.
    pub fn line_key(&self) -> LineKey {
        LineKey {
            block: self.block,
            paragraph: self.paragraph,
            line: self.line,
        }
    }

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Identity of a recognised line: `(block, paragraph, line)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineKey {
    pub block: u32,
    pub paragraph: u32,
    pub line: u32,
}

/// Words sharing one [`LineKey`], in engine order.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrLine {
    pub key: LineKey,
    pub words: Vec<OcrWord>,
}

impl OcrLine {
    /// Non-blank word texts joined by single spaces.
    ///
    /// Returns `None` when every word is blank.
    pub fn text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .words
            .iter()
            .filter(|w| !w.is_blank())
            .map(|w| w.text.as_str())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Union of all word boxes in the line, blank words included.
    pub fn bbox(&self) -> Option<BBox> {
        let mut iter = self.words.iter().map(|w| w.bbox);
        let first = iter.next()?;
        Some(iter.fold(first, |acc, b| acc.union(&b)))
    }
}

/// Lower-case, collapse whitespace runs to one space, and trim.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Group words into lines.
///
/// Words with negative confidence are dropped. Lines appear in the order
/// their key was first seen; words keep engine order within a line.
pub fn group_lines(words: &[OcrWord]) -> Vec<OcrLine> {
    let mut lines: Vec<OcrLine> = Vec::new();
    for word in words.iter().filter(|w| w.confidence >= 0.0) {
        let key = word.line_key();
        match lines.iter_mut().find(|l| l.key == key) {
            Some(line) => line.words.push(word.clone()),
            None => lines.push(OcrLine {
                key,
                words: vec![word.clone()],
            }),
        }
    }
    lines
}

/// A line whose normalized text contains the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct LineMatch {
    /// Recognised line text (non-blank words joined by spaces).
    pub text: String,
    /// Union of the line's word boxes.
    pub bbox: BBox,
}

/// Find the first line on a page whose normalized text contains the
/// normalized `anchor`.
pub fn find_anchor_line(words: &[OcrWord], anchor: &str) -> Option<LineMatch> {
    let needle = normalize(anchor);
    group_lines(words).into_iter().find_map(|line| {
        let text = line.text()?;
        if normalize(&text).contains(&needle) {
            Some(LineMatch {
                bbox: line.bbox()?,
                text,
            })
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, conf: f64, left: f64, key: (u32, u32, u32)) -> OcrWord {
        OcrWord {
            text: text.to_string(),
            confidence: conf,
            bbox: BBox::from_xywh(left, 100.0, 50.0, 20.0),
            block: key.0,
            paragraph: key.1,
            line: key.2,
        }
    }

    #[test]
    fn normalize_is_case_and_space_insensitive() {
        assert_eq!(
            normalize("  Stanovisko\t ODBORNÉHO\n\n útvaru "),
            "stanovisko odborného útvaru"
        );
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for s in ["A  b", "\tX\nY ", "Útvar", "already normal"] {
            assert_eq!(normalize(&normalize(s)), normalize(s));
        }
    }

    #[test]
    fn grouping_preserves_first_appearance_order() {
        let words = vec![
            word("b1", 90.0, 0.0, (1, 1, 2)),
            word("a1", 90.0, 0.0, (1, 1, 1)),
            word("b2", 90.0, 60.0, (1, 1, 2)),
        ];
        let lines = group_lines(&words);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].key.line, 2);
        assert_eq!(lines[0].text().as_deref(), Some("b1 b2"));
        assert_eq!(lines[1].text().as_deref(), Some("a1"));
    }

    #[test]
    fn negative_confidence_words_are_dropped() {
        let words = vec![
            word("", -1.0, 0.0, (1, 0, 0)),
            word("hello", 95.0, 0.0, (1, 1, 1)),
            word("ghost", -1.0, 500.0, (1, 1, 1)),
        ];
        let lines = group_lines(&words);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].words.len(), 1);
        assert_eq!(lines[0].bbox().unwrap().x1, 50.0);
    }

    #[test]
    fn blank_words_widen_bbox_but_not_text() {
        let line = OcrLine {
            key: LineKey {
                block: 1,
                paragraph: 1,
                line: 1,
            },
            words: vec![word("x", 50.0, 0.0, (1, 1, 1)), word(" ", 50.0, 300.0, (1, 1, 1))],
        };
        assert_eq!(line.text().as_deref(), Some("x"));
        assert_eq!(line.bbox().unwrap().x1, 350.0);
    }

    #[test]
    fn all_blank_line_is_skipped() {
        let words = vec![
            word(" ", 10.0, 0.0, (1, 1, 1)),
            word("Stanovisko", 90.0, 0.0, (2, 1, 1)),
        ];
        let hit = find_anchor_line(&words, "stanovisko").unwrap();
        assert_eq!(hit.text, "Stanovisko");
    }

    #[test]
    fn anchor_match_spans_words_and_unions_boxes() {
        let words = vec![
            word("Intro", 96.0, 0.0, (1, 1, 1)),
            word("Stanovisko", 96.0, 100.0, (2, 1, 1)),
            word("odborného", 91.0, 200.0, (2, 1, 1)),
            word("útvaru:", 88.0, 300.0, (2, 1, 1)),
        ];
        let hit = find_anchor_line(&words, "Stanovisko odborného útvaru").unwrap();
        assert_eq!(hit.text, "Stanovisko odborného útvaru:");
        assert_eq!(hit.bbox.to_xywh(), (100.0, 100.0, 250.0, 20.0));
    }

    #[test]
    fn anchor_across_lines_does_not_match() {
        let words = vec![
            word("Stanovisko", 96.0, 0.0, (1, 1, 1)),
            word("odborného", 96.0, 0.0, (1, 1, 2)),
        ];
        assert!(find_anchor_line(&words, "stanovisko odborného").is_none());
    }

    #[test]
    fn first_matching_line_wins() {
        let words = vec![
            word("anchor", 96.0, 10.0, (3, 1, 1)),
            word("anchor", 96.0, 20.0, (1, 1, 1)),
        ];
        let hit = find_anchor_line(&words, "ANCHOR").unwrap();
        assert_eq!(hit.bbox.x0, 10.0);
    }

    #[test]
    fn empty_page_has_no_match() {
        assert!(find_anchor_line(&[], "anything").is_none());
    }
}
