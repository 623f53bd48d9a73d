//! Word wrapping with a line budget

use super::metrics::TextMetrics;

pub const ELLIPSIS: &str = "...";

/// Font size and weight of a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub bold: bool,
}

impl TextStyle {
    pub fn regular(size: f64) -> Self {
        Self { size, bold: false }
    }

    pub fn bold(size: f64) -> Self {
        Self { size, bold: true }
    }
}

struct Measure<'a> {
    metrics: &'a dyn TextMetrics,
    style: TextStyle,
}

impl Measure<'_> {
    fn width(&self, text: &str) -> f64 {
        self.metrics.text_width(text, self.style.size, self.style.bold)
    }
}

/// Wrap `text` to `width`, honouring explicit newlines.
///
/// Words wider than the column are broken between characters.
pub fn wrap_text(text: &str, width: f64, style: TextStyle, metrics: &dyn TextMetrics) -> Vec<String> {
    let measure = Measure { metrics, style };
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        wrap_paragraph(paragraph, width, &measure, &mut lines);
    }
    lines
}

fn wrap_paragraph(paragraph: &str, width: f64, measure: &Measure<'_>, lines: &mut Vec<String>) {
    let mut current = String::new();
    for word in paragraph.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if measure.width(&candidate) <= width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if measure.width(word) <= width {
            current = word.to_string();
        } else {
            current = break_word(word, width, measure, lines);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
}

/// Push full-width chunks of `word`; return the unfinished tail.
fn break_word(word: &str, width: f64, measure: &Measure<'_>, lines: &mut Vec<String>) -> String {
    let mut chunk = String::new();
    for c in word.chars() {
        chunk.push(c);
        if measure.width(&chunk) > width && chunk.chars().count() > 1 {
            chunk.pop();
            lines.push(std::mem::take(&mut chunk));
            chunk.push(c);
        }
    }
    chunk
}

/// Wrap into at most `max_lines` lines.
///
/// When the text does not fit, the last kept line is shortened until it
/// plus an ellipsis fits the width.
pub fn fit_text(
    text: &str,
    width: f64,
    max_lines: usize,
    style: TextStyle,
    metrics: &dyn TextMetrics,
) -> Vec<String> {
    if max_lines == 0 {
        return Vec::new();
    }
    let mut lines = wrap_text(text, width, style, metrics);
    if lines.len() <= max_lines {
        return lines;
    }

    lines.truncate(max_lines);
    let measure = Measure { metrics, style };
    let mut last = lines.pop().unwrap_or_default();
    loop {
        let candidate = format!("{}{}", last.trim_end(), ELLIPSIS);
        if measure.width(&candidate) <= width || last.is_empty() {
            lines.push(candidate);
            break;
        }
        last.pop();
    }
    lines
}

/// Single-line convenience wrapper around [`fit_text`].
pub fn fit_line(text: &str, width: f64, style: TextStyle, metrics: &dyn TextMetrics) -> String {
    fit_text(text, width, 1, style, metrics)
        .into_iter()
        .next()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::metrics::FixedWidthMetrics;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    // 10pt at 0.5em: 5pt per character.
    const STYLE: TextStyle = TextStyle {
        size: 10.0,
        bold: false,
    };

    fn metrics() -> FixedWidthMetrics {
        FixedWidthMetrics::default()
    }

    #[test]
    fn test_wrap_words() {
        let lines = wrap_text("the quick brown fox", 50.0, STYLE, &metrics());
        assert_eq!(lines, vec!["the quick", "brown fox"]);
    }

    #[test]
    fn test_explicit_newlines() {
        let lines = wrap_text("CONTAINER\nSeal: 42", 200.0, STYLE, &metrics());
        assert_eq!(lines, vec!["CONTAINER", "Seal: 42"]);
    }

    #[test]
    fn test_long_word_is_broken() {
        let lines = wrap_text("MSCU12345678901", 25.0, STYLE, &metrics());
        assert_eq!(lines, vec!["MSCU1", "23456", "78901"]);
    }

    #[test]
    fn test_fits_untouched() {
        let lines = fit_text("short text", 100.0, 2, STYLE, &metrics());
        assert_eq!(lines, vec!["short text"]);
    }

    #[test]
    fn test_long_description_truncates_with_ellipsis() {
        let description: String = (0..100).map(|i| format!("w{:03}", i)).collect::<Vec<_>>().join(" ");
        assert_eq!(description.len(), 499);
        let description = format!("{description}x");
        let width = 120.0;
        let lines = fit_text(&description, width, 2, STYLE, &metrics());
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with(ELLIPSIS));
        for line in &lines {
            assert!(metrics().text_width(line, STYLE.size, STYLE.bold) <= width);
        }
    }

    #[test]
    fn test_fit_line() {
        assert_eq!(fit_line("abcdefghij", 30.0, STYLE, &metrics()), "abc...");
        assert_eq!(fit_line("", 30.0, STYLE, &metrics()), "");
    }

    #[test]
    fn test_zero_lines() {
        assert!(fit_text("anything", 100.0, 0, STYLE, &metrics()).is_empty());
    }

    proptest! {
        #[test]
        fn prop_fit_respects_budget(
            text in "[a-zA-Z0-9 ,.\n-]{0,600}",
            width in 20.0f64..300.0,
            max_lines in 1usize..6,
        ) {
            let m = metrics();
            let lines = fit_text(&text, width, max_lines, STYLE, &m);
            prop_assert!(lines.len() <= max_lines);
            for line in &lines {
                prop_assert!(m.text_width(line, STYLE.size, false) <= width);
            }
        }
    }
}
