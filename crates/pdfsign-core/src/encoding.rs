//! WinAnsiEncoding for the built-in Helvetica fallback font.
//!
//! Text drawn with a standard-14 font is written as single-byte codes, so
//! every character must be mapped onto the Windows-1252 superset the PDF
//! format calls WinAnsiEncoding. Characters outside it are reported to the
//! caller, which replaces them and emits a warning.

/// Windows-1252 extensions in 0x80–0x9F. Codes 0x81, 0x8D, 0x8F, 0x90 and
/// 0x9D are undefined.
static WIN_ANSI_HIGH: [(u8, char); 27] = [
    (0x80, '\u{20AC}'), // Euro sign
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'), // Horizontal ellipsis
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'), // S with caron
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'), // Z with caron
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'), // Bullet
    (0x96, '\u{2013}'), // En dash
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'), // s with caron
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'), // z with caron
    (0x9F, '\u{0178}'),
];

/// Map a Unicode character to its WinAnsiEncoding byte.
///
/// Returns `None` for characters with no code, including C0 controls.
pub fn win_ansi_encode_char(ch: char) -> Option<u8> {
    let cp = ch as u32;
    match cp {
        0x20..=0x7E | 0xA0..=0xFF => Some(cp as u8),
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(_, c)| *c == ch)
            .map(|(code, _)| *code),
    }
}

/// Map a WinAnsiEncoding byte back to Unicode.
pub fn win_ansi_decode(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(char::from(code)),
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, ch)| *ch),
    }
}

/// Result of encoding a string to WinAnsi bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinAnsiText {
    /// Encoded bytes, one per input character.
    pub bytes: Vec<u8>,
    /// Characters that had no code and were replaced with `?`.
    pub replaced: Vec<char>,
}

/// Encode `text` to WinAnsi bytes, replacing unencodable characters with `?`.
pub fn win_ansi_encode(text: &str) -> WinAnsiText {
    let mut bytes = Vec::with_capacity(text.len());
    let mut replaced = Vec::new();
    for ch in text.chars() {
        match win_ansi_encode_char(ch) {
            Some(b) => bytes.push(b),
            None => {
                bytes.push(b'?');
                replaced.push(ch);
            }
        }
    }
    WinAnsiText { bytes, replaced }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_maps_to_itself() {
        let enc = win_ansi_encode("Hello, world!");
        assert_eq!(enc.bytes, b"Hello, world!");
        assert!(enc.replaced.is_empty());
    }

    #[test]
    fn latin1_upper_half_is_identity() {
        assert_eq!(win_ansi_encode_char('é'), Some(0xE9));
        assert_eq!(win_ansi_encode_char('Ú'), Some(0xDA));
        assert_eq!(win_ansi_encode_char('\u{00A0}'), Some(0xA0));
    }

    #[test]
    fn windows_1252_extensions() {
        assert_eq!(win_ansi_encode_char('€'), Some(0x80));
        assert_eq!(win_ansi_encode_char('š'), Some(0x9A));
        assert_eq!(win_ansi_encode_char('Ž'), Some(0x8E));
        assert_eq!(win_ansi_encode_char('–'), Some(0x96));
    }

    #[test]
    fn czech_letters_outside_cp1252_are_replaced() {
        // ř, č and ů have no WinAnsi code; á and ú do.
        let enc = win_ansi_encode("přání účtů");
        assert_eq!(enc.bytes.len(), "přání účtů".chars().count());
        assert_eq!(enc.replaced, vec!['ř', 'č', 'ů']);
        assert_eq!(enc.bytes[1], b'?');
        assert_eq!(enc.bytes[2], 0xE1);
    }

    #[test]
    fn control_characters_are_unencodable() {
        assert_eq!(win_ansi_encode_char('\n'), None);
        assert_eq!(win_ansi_encode_char('\u{7F}'), None);
    }

    #[test]
    fn decode_inverts_encode() {
        for code in 0u8..=255 {
            if let Some(ch) = win_ansi_decode(code) {
                assert_eq!(win_ansi_encode_char(ch), Some(code), "code {code:#04x}");
            }
        }
        assert_eq!(win_ansi_decode(0x81), None);
        assert_eq!(win_ansi_decode(0x80), Some('€'));
    }
}
