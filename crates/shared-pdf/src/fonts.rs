//! Standard 14 font metrics
//!
//! Only Helvetica is needed for stamped text. Widths are the Adobe AFM
//! advance widths in 1/1000 em for every code WinAnsiEncoding defines.

/// Advance widths for codes 0x20..=0xFF; zero marks codes WinAnsi leaves undefined
const HELVETICA_WIDTHS: [u16; 224] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, 0, // '{'..0x7F
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0, // 0x80..0x8F
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667, // 0x90..0x9F
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0..0xAF
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0..0xBF
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0..0xCF
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0..0xDF
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0..0xEF
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0..0xFF
];

/// WinAnsi codes in 0x80..=0x9F, which differ from Latin-1
fn win_ansi_special(c: char) -> Option<u8> {
    let code = match c {
        '\u{20AC}' => 0x80, // euro
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85, // ellipsis
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91, // quotes
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96, // dashes
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(code)
}

/// Fonts every conforming PDF reader provides without embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StandardFont {
    #[default]
    Helvetica,
}

impl StandardFont {
    /// Value for the font dictionary's `/BaseFont`
    pub fn base_font_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
        }
    }

    /// Value for the font dictionary's `/Encoding`
    pub fn encoding_name(&self) -> &'static str {
        "WinAnsiEncoding"
    }

    /// Advance width of one encoded byte in 1/1000 em
    fn glyph_width(&self, byte: u8) -> u16 {
        match self {
            StandardFont::Helvetica => match byte {
                0x20..=0xFF => HELVETICA_WIDTHS[(byte - 0x20) as usize],
                _ => 0,
            },
        }
    }

    /// Width of `text` in points when set at `size`
    pub fn text_width(&self, text: &str, size: f64) -> f64 {
        let units: u32 = self
            .encode(text)
            .iter()
            .map(|b| u32::from(self.glyph_width(*b)))
            .sum();
        f64::from(units) * size / 1000.0
    }

    /// Encode text for a content-stream string.
    ///
    /// Text is mapped to WinAnsiEncoding. Control characters become spaces
    /// and characters WinAnsi cannot represent become `?`, so measured and
    /// drawn text always agree.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .map(|c| match c {
                c if c.is_control() => b' ',
                ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
                c => win_ansi_special(c).unwrap_or(b'?'),
            })
            .collect()
    }
}
