//! Fixed page geometry
//!
//! All lengths are PDF points measured from the top-left corner of the page.

use serde::{Deserialize, Serialize};

/// A4 width in points.
pub const A4_WIDTH: f64 = 595.28;
/// A4 height in points.
pub const A4_HEIGHT: f64 = 841.89;

const MM: f64 = 72.0 / 25.4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    /// Reserved bottom margin while many cargo rows remain
    pub bottom_margin: f64,
    /// Reserved bottom margin once the remaining rows likely fit on this page
    pub final_bottom_margin: f64,
    pub table_header_height: f64,
    /// Lines of text per cargo row; the row height is derived from it
    pub cargo_row_lines: usize,
    /// Remaining-row count at or below which the final margin applies
    pub last_page_threshold: usize,
    /// Smallest batch worth starting on a partly filled page
    pub min_rows_per_page: usize,
    pub cell_padding: f64,
    pub section_gap: f64,
    pub fonts: FontSizes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSizes {
    pub title: f64,
    pub heading: f64,
    pub body: f64,
    pub label: f64,
    pub small: f64,
    /// Line advance as a multiple of the font size
    pub line_spacing: f64,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title: 11.0,
            heading: 8.0,
            body: 7.0,
            label: 6.0,
            small: 5.5,
            line_spacing: 1.2,
        }
    }
}

impl FontSizes {
    pub fn line_height(&self, size: f64) -> f64 {
        size * self.line_spacing
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margin_left: 10.0 * MM,
            margin_right: 10.0 * MM,
            margin_top: 15.0 * MM,
            bottom_margin: 15.0 * MM,
            final_bottom_margin: 15.0 * MM + 220.0,
            table_header_height: 18.0,
            cargo_row_lines: 3,
            last_page_threshold: 10,
            min_rows_per_page: 5,
            cell_padding: 3.0,
            section_gap: 4.0,
            fonts: FontSizes::default(),
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f64 {
        self.width - self.margin_left - self.margin_right
    }

    /// Fixed height of one cargo row.
    pub fn row_height(&self) -> f64 {
        self.cargo_row_lines as f64 * self.fonts.line_height(self.fonts.body)
            + 2.0 * self.cell_padding
    }

    /// Lowest y a block may reach while the bottom margin is `margin`.
    pub fn limit(&self, margin: f64) -> f64 {
        self.height - margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_defaults() {
        let g = PageGeometry::default();
        assert!((g.margin_left - 28.35).abs() < 0.01);
        assert!((g.margin_top - 42.52).abs() < 0.01);
        assert!((g.content_width() - 538.58).abs() < 0.02);
        assert!(g.final_bottom_margin > g.bottom_margin);
    }

    #[test]
    fn test_row_height_follows_lines() {
        let mut g = PageGeometry::default();
        let three = g.row_height();
        g.cargo_row_lines = 4;
        assert!((g.row_height() - three - g.fonts.line_height(g.fonts.body)).abs() < 1e-9);
    }
}
