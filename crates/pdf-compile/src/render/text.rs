//! Text measuring and shaping for the built-in Helvetica fonts

use crate::constants::mm_to_pt;

/// Which of the two standard fonts a run of text uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Regular,
    Bold,
}

impl FontWeight {
    /// Resource name of the font in every page's /Font dictionary
    pub fn resource_name(self) -> &'static str {
        match self {
            FontWeight::Regular => "F1",
            FontWeight::Bold => "F2",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            FontWeight::Regular => "Helvetica",
            FontWeight::Bold => "Helvetica-Bold",
        }
    }
}

/// Advance widths (1/1000 em) for printable ASCII, space through tilde
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// WinAnsi characters in 0x80-0x9F: character, byte, Helvetica and Helvetica-Bold widths
#[rustfmt::skip]
const WIN_ANSI_EXTRAS: [(char, u8, u16, u16); 27] = [
    ('\u{20AC}', 0x80, 556, 556),  // €
    ('\u{201A}', 0x82, 222, 278),  // ‚
    ('\u{0192}', 0x83, 556, 556),  // ƒ
    ('\u{201E}', 0x84, 333, 500),  // „
    ('\u{2026}', 0x85, 1000, 1000), // …
    ('\u{2020}', 0x86, 556, 556),  // †
    ('\u{2021}', 0x87, 556, 556),  // ‡
    ('\u{02C6}', 0x88, 333, 333),  // ˆ
    ('\u{2030}', 0x89, 1000, 1000), // ‰
    ('\u{0160}', 0x8A, 667, 667),  // Š
    ('\u{2039}', 0x8B, 333, 333),  // ‹
    ('\u{0152}', 0x8C, 1000, 1000), // Œ
    ('\u{017D}', 0x8E, 611, 611),  // Ž
    ('\u{2018}', 0x91, 222, 278),  // ‘
    ('\u{2019}', 0x92, 222, 278),  // ’
    ('\u{201C}', 0x93, 333, 500),  // “
    ('\u{201D}', 0x94, 333, 500),  // ”
    ('\u{2022}', 0x95, 350, 350),  // •
    ('\u{2013}', 0x96, 556, 556),  // –
    ('\u{2014}', 0x97, 1000, 1000), // —
    ('\u{02DC}', 0x98, 333, 333),  // ˜
    ('\u{2122}', 0x99, 1000, 1000), // ™
    ('\u{0161}', 0x9A, 500, 556),  // š
    ('\u{203A}', 0x9B, 333, 333),  // ›
    ('\u{0153}', 0x9C, 944, 944),  // œ
    ('\u{017E}', 0x9E, 500, 500),  // ž
    ('\u{0178}', 0x9F, 667, 667),  // Ÿ
];

/// Width used for characters without a table entry
const FALLBACK_WIDTH: u16 = 556;

fn win_ansi_extra(c: char) -> Option<&'static (char, u8, u16, u16)> {
    WIN_ANSI_EXTRAS.iter().find(|(extra, ..)| *extra == c)
}

/// WinAnsi byte for `c`, if the encoding has one
pub fn win_ansi_byte(c: char) -> Option<u8> {
    match c as u32 {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => Some(code as u8),
        _ => win_ansi_extra(c).map(|&(_, byte, ..)| byte),
    }
}

fn char_width(c: char, weight: FontWeight) -> u16 {
    let table = match weight {
        FontWeight::Regular => &HELVETICA_WIDTHS,
        FontWeight::Bold => &HELVETICA_BOLD_WIDTHS,
    };
    match c as u32 {
        code @ 32..=126 => table[(code - 32) as usize],
        _ => match (win_ansi_extra(c), weight) {
            (Some(&(_, _, regular, _)), FontWeight::Regular) => regular,
            (Some(&(_, _, _, bold)), FontWeight::Bold) => bold,
            (None, _) => FALLBACK_WIDTH,
        },
    }
}

/// Shorten `text` to `max_chars` characters followed by "..." when longer
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Rendered width of `text` in millimeters
pub fn text_width_mm(text: &str, font_size_pt: f32, weight: FontWeight) -> f32 {
    let units: u32 = text.chars().map(|c| char_width(c, weight) as u32).sum();
    let width_pt = units as f32 * font_size_pt / 1000.0;
    width_pt / mm_to_pt(1.0)
}

/// Greedy word wrap to lines no wider than `max_width_mm`.
///
/// Words wider than the limit are put on a line of their own.
pub fn wrap_text(text: &str, font_size_pt: f32, weight: FontWeight, max_width_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", current, word);
        if text_width_mm(&candidate, font_size_pt, weight) <= max_width_mm {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Encode text as a PDF literal string body in WinAnsi.
///
/// Delimiters and backslashes are escaped; characters WinAnsi cannot encode become '?'.
pub fn encode_literal(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            '\n' | '\r' | '\t' => out.push(b' '),
            c if (c as u32) < 0x20 => {}
            c => out.push(win_ansi_byte(c).unwrap_or(b'?')),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_appends_ellipsis_only_when_longer() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("abcdefghijk", 10), "abcdefghij...");
        assert_eq!(truncate("", 5), "");
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        assert_eq!(truncate("ééééé", 3), "ééé...");
    }

    #[test]
    fn test_bold_is_wider_than_regular() {
        let regular = text_width_mm("Table of Contents", 10.0, FontWeight::Regular);
        let bold = text_width_mm("Table of Contents", 10.0, FontWeight::Bold);
        assert!(bold > regular);
        // 10 digits at 556 units, 10 pt
        let digits = text_width_mm("0123456789", 10.0, FontWeight::Regular);
        assert!((digits - 55.6 / mm_to_pt(1.0)).abs() < 1e-3);
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap_text("A fairly long project name that will not fit", 32.0, FontWeight::Bold, 100.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, 32.0, FontWeight::Bold) <= 100.0 || !line.contains(' '));
        }
        assert_eq!(lines.join(" "), "A fairly long project name that will not fit");
    }

    #[test]
    fn test_wrap_empty_text_yields_one_line() {
        assert_eq!(wrap_text("   ", 12.0, FontWeight::Regular, 50.0), vec![String::new()]);
    }

    #[test]
    fn test_encode_literal_escapes() {
        assert_eq!(encode_literal("a(b)c\\"), b"a\\(b\\)c\\\\".to_vec());
        assert_eq!(encode_literal("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_literal("日本"), b"??".to_vec());
    }

    #[test]
    fn test_encode_literal_maps_typographic_punctuation() {
        assert_eq!(
            encode_literal("Rust\u{2019}s \u{2014} \u{201C}Guide\u{201D}\u{2026}"),
            b"Rust\x92s \x97 \x93Guide\x94\x85".to_vec()
        );
        assert_eq!(encode_literal("\u{20AC}5 \u{2022} \u{2122}"), b"\x805 \x95 \x99".to_vec());
        // C1 controls have no glyph in WinAnsi
        assert_eq!(encode_literal("\u{0085}"), b"?".to_vec());
    }

    #[test]
    fn test_typographic_widths_come_from_font_metrics() {
        let em_dash = text_width_mm("\u{2014}", 10.0, FontWeight::Regular);
        assert!((em_dash - 10.0 / mm_to_pt(1.0)).abs() < 1e-3);
        let quote = text_width_mm("\u{2019}", 10.0, FontWeight::Regular);
        let bold_quote = text_width_mm("\u{2019}", 10.0, FontWeight::Bold);
        assert!((quote - 2.22 / mm_to_pt(1.0)).abs() < 1e-3);
        assert!(bold_quote > quote);
    }
}
