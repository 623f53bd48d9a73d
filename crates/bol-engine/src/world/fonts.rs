//! Font loading and caching
//!
//! Fonts come from `typst-assets` only, so layout measurements and the
//! compiled PDF use the same glyph data on every machine.

use std::sync::OnceLock;

use typst::foundations::Bytes;
use typst::text::{Font, FontBook, FontStyle};
use typst::utils::LazyHash;

/// Family used for every Bill of Lading.
pub const DEFAULT_FAMILY: &str = "Libertinus Serif";

static FONT_CACHE: OnceLock<FontCache> = OnceLock::new();

/// Get the global font cache, initializing it if necessary
pub fn global_font_cache() -> &'static FontCache {
    FONT_CACHE.get_or_init(FontCache::new)
}

/// Fonts available to layout and compilation
pub struct FontCache {
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
}

impl FontCache {
    pub fn new() -> Self {
        let mut book = FontBook::new();
        let mut fonts = Vec::new();

        for data in typst_assets::fonts() {
            let buffer = Bytes::from_static(data);
            for font in Font::iter(buffer) {
                book.push(font.info().clone());
                fonts.push(font);
            }
        }

        tracing::info!("Font cache initialized with {} fonts", fonts.len());

        Self {
            book: LazyHash::new(book),
            fonts,
        }
    }

    pub fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    /// Get a font by index
    pub fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// All family names, sorted and deduplicated
    pub fn families(&self) -> Vec<String> {
        let mut families: Vec<String> = self
            .book
            .families()
            .map(|(name, _)| name.to_string())
            .collect();
        families.sort();
        families.dedup();
        families
    }

    /// Upright face of `family` whose weight is closest to regular or bold.
    pub fn find_font(&self, family: &str, bold: bool) -> Option<Font> {
        let target: i32 = if bold { 700 } else { 400 };
        self.fonts
            .iter()
            .filter(|font| {
                let info = font.info();
                info.family.eq_ignore_ascii_case(family) && info.variant.style == FontStyle::Normal
            })
            .min_by_key(|font| (i32::from(font.info().variant.weight.to_number()) - target).abs())
            .cloned()
    }
}

impl std::fmt::Debug for FontCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontCache")
            .field("fonts", &self.fonts.len())
            .finish()
    }
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new()
    }
}
