//! Typst markup generation
//!
//! Every element of the render tree becomes one absolutely placed call, so
//! Typst does no layout of its own beyond shaping single lines.

use std::fmt::Write;

use crate::layout::{Color, Element, RenderTree};

const STROKE_WIDTH: &str = "0.5pt";

const PREAMBLE: &str = r#"#let bol-text(x, y, size, weight, style, fill, body) = place(top + left, dx: x, dy: y, text(size: size, weight: weight, style: style, fill: fill, body))
#let bol-box(x, y, w, h, stroke, fill) = place(top + left, dx: x, dy: y, rect(width: w, height: h, stroke: stroke, fill: fill))
"#;

/// Quote `text` as a Typst string literal. Control characters are dropped.
pub fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn pt(value: f64) -> String {
    format!("{:.2}pt", value)
}

fn color(c: Color) -> String {
    format!("rgb({}, {}, {})", c.r, c.g, c.b)
}

fn stroke(c: Option<Color>) -> String {
    c.map_or_else(|| "none".to_string(), |c| format!("{} + {}", STROKE_WIDTH, color(c)))
}

fn fill(c: Option<Color>) -> String {
    c.map_or_else(|| "none".to_string(), color)
}

fn write_element(out: &mut String, element: &Element) {
    // Writing to a String cannot fail.
    let _ = match element {
        Element::Text {
            x,
            y,
            size,
            bold,
            italic,
            color: ink,
            content,
        } => writeln!(
            out,
            "  bol-text({}, {}, {}, {}, {}, {}, {})",
            pt(*x),
            pt(*y),
            pt(*size),
            if *bold { "\"bold\"" } else { "\"regular\"" },
            if *italic { "\"italic\"" } else { "\"normal\"" },
            color(*ink),
            escape_string(content),
        ),
        Element::Rect {
            x,
            y,
            width,
            height,
            stroke: line,
            fill: paint,
        } => writeln!(
            out,
            "  bol-box({}, {}, {}, {}, {}, {})",
            pt(*x),
            pt(*y),
            pt(*width),
            pt(*height),
            stroke(*line),
            fill(*paint),
        ),
    };
}

/// Complete Typst source for the tree, one page per [`crate::layout::PageModel`].
pub fn to_markup(tree: &RenderTree) -> String {
    let g = &tree.geometry;
    let mut out = String::new();
    let _ = writeln!(out, "#set document(title: {})", escape_string(&tree.title));
    let _ = writeln!(
        out,
        "#set page(width: {}, height: {}, margin: 0pt)",
        pt(g.width),
        pt(g.height)
    );
    let _ = writeln!(
        out,
        "#set text(font: {}, size: {})",
        escape_string(&tree.font_family),
        pt(g.fonts.body)
    );
    out.push_str(PREAMBLE);
    out.push_str("#{\n");
    for (i, page) in tree.pages.iter().enumerate() {
        if i > 0 {
            out.push_str("  pagebreak()\n");
        }
        for block in &page.blocks {
            for element in &block.elements {
                write_element(&mut out, element);
            }
        }
    }
    out.push_str("}\n");
    out
}
