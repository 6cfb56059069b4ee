//! Adobe Helvetica metrics for the built-in fallback font.
//!
//! Widths are in 1/1000 em-square units, taken from the Helvetica AFM and
//! indexed by WinAnsiEncoding code.

/// Base font name of the fallback font.
pub const HELVETICA_NAME: &str = "Helvetica";

/// Font bounding box [llx, lly, urx, ury] in 1/1000 em-square units.
pub const HELVETICA_BBOX: [i16; 4] = [-166, -225, 1000, 931];

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 0,
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

/// Advance width of a WinAnsi code in 1/1000 em.
pub fn helvetica_width(code: u8) -> u16 {
    HELVETICA_WIDTHS[usize::from(code)]
}

/// Advance width of WinAnsi-encoded bytes at `font_size`, in points.
pub fn helvetica_string_width(bytes: &[u8], font_size: f64) -> f64 {
    let units: u32 = bytes.iter().map(|&b| u32::from(helvetica_width(b))).sum();
    f64::from(units) * font_size / 1000.0
}
