//! Glyph metrics for the PDF standard fonts.
//!
//! Widths are in 1/1000 em for printable ASCII (32..=126), taken from the
//! Adobe Core 14 AFM files. Oblique variants share the upright widths.

/// Standard PDF fonts used by the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    Courier,
}

impl Font {
    /// Pick the Helvetica variant for the given weight and slant.
    #[must_use]
    pub fn helvetica(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Self::Helvetica,
            (true, false) => Self::HelveticaBold,
            (false, true) => Self::HelveticaOblique,
            (true, true) => Self::HelveticaBoldOblique,
        }
    }

    fn glyph_width(self, c: char) -> u16 {
        let table = match self {
            Self::Courier => return 600,
            Self::Helvetica | Self::HelveticaOblique => &HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &HELVETICA_BOLD,
        };
        let code = c as u32;
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else {
            556
        }
    }

    /// Width of `text` in points at `size`.
    #[must_use]
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.glyph_width(c))).sum();
        units as f32 * size / 1000.0
    }
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Replace characters the standard fonts cannot show with ASCII stand-ins.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' '..='~' => out.push(c),
            '\t' => out.push_str("    "),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{2022}' => out.push('*'),
            '\u{00A0}' => out.push(' '),
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_courier_is_monospaced() {
        assert!((Font::Courier.text_width("iiii", 10.0) - 24.0).abs() < 1e-4);
        assert!((Font::Courier.text_width("WWWW", 10.0) - 24.0).abs() < 1e-4);
    }

    #[test]
    fn test_helvetica_widths() {
        // "A" = 667, "i" = 222
        assert!((Font::Helvetica.text_width("Ai", 1000.0) - 889.0).abs() < 1e-2);
        // Bold is wider than regular for lowercase
        assert!(
            Font::HelveticaBold.text_width("architecture", 11.0)
                > Font::Helvetica.text_width("architecture", 11.0)
        );
    }

    #[test]
    fn test_oblique_matches_upright() {
        let text = "Platform Detection";
        assert!(
            (Font::HelveticaOblique.text_width(text, 11.0) - Font::Helvetica.text_width(text, 11.0))
                .abs()
                < 1e-4
        );
    }

    #[test]
    fn test_helvetica_variant_selection() {
        assert_eq!(Font::helvetica(false, false), Font::Helvetica);
        assert_eq!(Font::helvetica(true, false), Font::HelveticaBold);
        assert_eq!(Font::helvetica(false, true), Font::HelveticaOblique);
        assert_eq!(Font::helvetica(true, true), Font::HelveticaBoldOblique);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("plain ascii"), "plain ascii");
        assert_eq!(sanitize("\u{201C}quoted\u{201D} \u{2014} done\u{2026}"), "\"quoted\" - done...");
        assert_eq!(sanitize("emoji \u{1F4C4}"), "emoji ?");
    }
}
