//! Helvetica (standard Type 1 font) metrics and WinAnsi text encoding.
//!
//! Documents use the built-in Helvetica font so no font program has to be
//! embedded. Text is encoded to WinAnsiEncoding, which covers ASCII,
//! Latin-1 and a handful of typographic punctuation marks; anything else
//! prints as `?`.

/// Byte used for characters WinAnsiEncoding cannot represent.
pub const REPLACEMENT: u8 = b'?';

/// Advance widths (1/1000 em) for 0x20..=0x7E.
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Advance widths (1/1000 em) for 0xA0..=0xFF.
const LATIN1_WIDTHS: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0
];

/// Encode one character to its WinAnsiEncoding byte.
pub fn encode_char(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '\t' | '\n' | '\r' => b' ',
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        _ => REPLACEMENT,
    }
}

/// Encode a string to WinAnsiEncoding bytes.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

/// Decode WinAnsiEncoding bytes back to a string (ASCII and Latin-1 only;
/// the 0x80..=0x9F punctuation block decodes to `?`).
#[cfg(test)]
pub fn decode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x20..=0x7e | 0xa0..=0xff => b as char,
            _ => '?',
        })
        .collect()
}

/// Advance width of an encoded byte in 1/1000 em.
pub fn advance(byte: u8) -> u16 {
    match byte {
        0x20..=0x7e => ASCII_WIDTHS[(byte - 0x20) as usize],
        0xa0..=0xff => LATIN1_WIDTHS[(byte - 0xa0) as usize],
        0x82 | 0x91 | 0x92 => 222,
        0x84 | 0x88 | 0x8b | 0x93 | 0x94 | 0x98 | 0x9b => 333,
        0x85 | 0x89 | 0x8c | 0x97 | 0x99 => 1000,
        0x8a | 0x9f => 667,
        0x8e => 611,
        0x95 => 350,
        0x9a | 0x9e => 500,
        0x9c => 944,
        _ => 556,
    }
}

/// Width in points of encoded `text` at `size` points.
pub fn text_width(text: &[u8], size: f32) -> f32 {
    let units: u32 = text.iter().map(|&b| u32::from(advance(b))).sum();
    units as f32 * size / 1000.0
}

/// Escape encoded text for a PDF literal string `( ... )`.
pub fn escape_literal(text: &[u8], out: &mut Vec<u8>) {
    for &b in text {
        match b {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(b);
            }
            _ => out.push(b),
        }
    }
}
