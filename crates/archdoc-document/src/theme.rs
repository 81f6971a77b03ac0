//! Page geometry and brand colors.

/// An RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` string.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Channels scaled to `0.0..=1.0`.
    #[must_use]
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

/// Page geometry and brand colors for one document.
///
/// All lengths are in PDF points (1/72 in).
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub title_color: Color,
    pub heading2_color: Color,
    pub heading3_color: Color,
    pub code_text_color: Color,
    pub code_background_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin: 72.0,
            title_color: Color::rgb(0x4C, 0xAF, 0x50),
            heading2_color: Color::rgb(0x21, 0x96, 0xF3),
            heading3_color: Color::rgb(0xFF, 0x98, 0x00),
            code_text_color: Color::rgb(0x26, 0x32, 0x38),
            code_background_color: Color::rgb(0xF5, 0xF5, 0xF5),
        }
    }
}

impl Theme {
    /// Width available between the left and right margins.
    #[must_use]
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Height available between the top and bottom margins.
    #[must_use]
    pub fn content_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin
    }
}
