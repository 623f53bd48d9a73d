//! Text measurement

use typst::text::Font;

use crate::render::RenderError;
use crate::world::global_font_cache;

/// Advance width used for characters the font has no glyph for, in em.
const MISSING_GLYPH_EM: f64 = 0.5;

/// Width of a single line of text.
pub trait TextMetrics: Send + Sync {
    fn text_width(&self, text: &str, size: f64, bold: bool) -> f64;
}

/// Measures with the advance widths of an embedded font family, the same
/// faces the renderer compiles with.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    family: String,
    regular: Font,
    bold: Font,
}

impl FontMetrics {
    pub fn new(family: &str) -> Result<Self, RenderError> {
        let cache = global_font_cache();
        let regular = cache
            .find_font(family, false)
            .ok_or_else(|| RenderError::FontNotFound(family.to_string()))?;
        let bold = cache.find_font(family, true).unwrap_or_else(|| regular.clone());
        Ok(Self {
            family: family.to_string(),
            regular,
            bold,
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    fn char_em(font: &Font, c: char) -> f64 {
        font.ttf()
            .glyph_index(c)
            .and_then(|glyph| font.advance(glyph.0))
            .map(|em| em.get())
            .unwrap_or(MISSING_GLYPH_EM)
    }
}

impl TextMetrics for FontMetrics {
    fn text_width(&self, text: &str, size: f64, bold: bool) -> f64 {
        let font = if bold { &self.bold } else { &self.regular };
        text.chars().map(|c| Self::char_em(font, c)).sum::<f64>() * size
    }
}

/// Every character is `em` wide. Used where exact glyph widths do not matter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedWidthMetrics {
    pub em: f64,
}

impl Default for FixedWidthMetrics {
    fn default() -> Self {
        Self { em: 0.5 }
    }
}

impl TextMetrics for FixedWidthMetrics {
    fn text_width(&self, text: &str, size: f64, _bold: bool) -> f64 {
        text.chars().count() as f64 * self.em * size
    }
}
