//! Render tree: positioned blocks on pages

use serde::{Deserialize, Serialize};

use super::geometry::PageGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const HEADER_FILL: Color = Color::luma(240);
    pub const ALT_ROW_FILL: Color = Color::luma(248);
    pub const DANGER: Color = Color::rgb(255, 0, 0);
    pub const DANGER_FILL: Color = Color::rgb(255, 245, 245);
    pub const DANGER_TEXT: Color = Color::rgb(204, 0, 0);
    pub const WARNING: Color = Color::rgb(255, 204, 0);
    pub const MUTED: Color = Color::luma(96);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn luma(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    /// One line of text; `y` is the top of the line box.
    Text {
        x: f64,
        y: f64,
        size: f64,
        bold: bool,
        italic: bool,
        color: Color,
        content: String,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        stroke: Option<Color>,
        fill: Option<Color>,
    },
}

impl Element {
    fn translate(&mut self, dy: f64) {
        match self {
            Element::Text { y, .. } | Element::Rect { y, .. } => *y += dy,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Element::Text { content, .. } => Some(content),
            Element::Rect { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockKind {
    Header,
    ContinuationHeader,
    Tracking,
    Parties,
    Transport,
    DangerousGoods,
    CargoDisclaimer,
    CargoTableHeader,
    CargoRow { index: usize },
    Totals,
    Commercial,
    LegalText,
    Signature,
    IssueDates,
    FinalNotice,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub rect: Rect,
    pub elements: Vec<Element>,
}

impl Block {
    pub fn height(&self) -> f64 {
        self.rect.height
    }

    /// Move the block and everything in it down by `dy`.
    pub fn translate(&mut self, dy: f64) {
        self.rect.y += dy;
        for element in &mut self.elements {
            element.translate(dy);
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(Element::text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    First,
    Rider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageModel {
    /// 1-based
    pub number: usize,
    pub kind: PageKind,
    pub blocks: Vec<Block>,
}

impl PageModel {
    pub fn blocks_of(&self, kind: BlockKind) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.kind == kind)
    }
}

/// Layout output consumed by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderTree {
    pub title: String,
    pub font_family: String,
    pub geometry: PageGeometry,
    pub rider_pages: u32,
    pub pages: Vec<PageModel>,
}

impl RenderTree {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.pages.iter().flat_map(|p| p.blocks.iter())
    }

    /// Cargo row indices in render order.
    pub fn cargo_rows(&self) -> Vec<usize> {
        self.blocks()
            .filter_map(|b| match b.kind {
                BlockKind::CargoRow { index } => Some(index),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_moves_everything() {
        let mut block = Block {
            kind: BlockKind::Totals,
            rect: Rect {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 5.0,
            },
            elements: vec![
                Element::Rect {
                    x: 0.0,
                    y: 0.0,
                    width: 10.0,
                    height: 5.0,
                    stroke: Some(Color::BLACK),
                    fill: None,
                },
                Element::Text {
                    x: 1.0,
                    y: 1.0,
                    size: 7.0,
                    bold: false,
                    italic: false,
                    color: Color::BLACK,
                    content: "Total:".into(),
                },
            ],
        };
        block.translate(100.0);
        assert_eq!(block.rect.y, 100.0);
        assert_eq!(block.rect.bottom(), 105.0);
        assert!(matches!(block.elements[0], Element::Rect { y, .. } if y == 100.0));
        assert!(matches!(block.elements[1], Element::Text { y, .. } if y == 101.0));
        assert_eq!(block.texts().collect::<Vec<_>>(), vec!["Total:"]);
    }
}
