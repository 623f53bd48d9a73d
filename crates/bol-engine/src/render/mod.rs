//! Typst rendering of a laid-out Bill of Lading
//!
//! The render tree is turned into Typst markup, compiled in an in-memory
//! world with the embedded fonts, and exported to PDF.

pub mod errors;
pub mod markup;
pub mod output;

pub use errors::{CompileDiagnostic, RenderError, Severity};
pub use markup::{escape_string, to_markup};
pub use output::{OutputFormat, RenderOutput};

use chrono::Utc;
use tracing::{debug, info, warn};
use typst::diag::SourceDiagnostic;
use typst::model::Document;

use crate::layout::RenderTree;
use crate::world::VirtualWorld;

/// Memoization entries older than this many compilations are evicted.
const CACHE_MAX_AGE: usize = 10;

/// Render the tree to PDF bytes.
pub fn render(tree: &RenderTree) -> Result<Vec<u8>, RenderError> {
    render_as(tree, OutputFormat::Pdf).map(|output| output.bytes)
}

/// Render the tree in the requested format.
pub fn render_as(tree: &RenderTree, format: OutputFormat) -> Result<RenderOutput, RenderError> {
    let markup = to_markup(tree);
    debug!(bytes = markup.len(), pages = tree.page_count(), "Generated Typst markup");

    match format {
        OutputFormat::Typst => Ok(RenderOutput {
            bytes: markup.into_bytes(),
            format,
            page_count: tree.page_count(),
            warnings: Vec::new(),
        }),
        OutputFormat::Pdf => {
            let (document, warnings) = compile(markup)?;
            let result = export(&document, tree.page_count());
            comemo::evict(CACHE_MAX_AGE);
            let bytes = result?;
            info!(
                pages = document.pages.len(),
                bytes = bytes.len(),
                warnings = warnings.len(),
                "Rendered PDF"
            );
            Ok(RenderOutput {
                bytes,
                format,
                page_count: document.pages.len(),
                warnings,
            })
        }
    }
}

fn compile(markup: String) -> Result<(Document, Vec<CompileDiagnostic>), RenderError> {
    let world = VirtualWorld::new(markup, Utc::now());
    let warned = typst::compile(&world);
    let (_, warnings) = categorize_diagnostics(&warned.warnings);
    for warning in &warnings {
        warn!(warning = %warning, "Typst warning");
    }

    match warned.output {
        Ok(document) => Ok((document, warnings)),
        Err(diagnostics) => {
            let (mut errors, _) = categorize_diagnostics(&diagnostics);
            if errors.is_empty() {
                errors.push(CompileDiagnostic::new("Compilation failed with unknown error"));
            }
            Err(RenderError::Compile(errors))
        }
    }
}

fn export(document: &Document, expected_pages: usize) -> Result<Vec<u8>, RenderError> {
    let actual = document.pages.len();
    if actual != expected_pages {
        return Err(RenderError::PageCountMismatch {
            expected: expected_pages,
            actual,
        });
    }
    typst_pdf::pdf(document, &typst_pdf::PdfOptions::default())
        .map_err(|e| RenderError::Export(format!("{:?}", e)))
}

/// Split diagnostics into errors and warnings
fn categorize_diagnostics(
    diagnostics: &[SourceDiagnostic],
) -> (Vec<CompileDiagnostic>, Vec<CompileDiagnostic>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for diag in diagnostics {
        let mut diagnostic = CompileDiagnostic::new(diag.message.to_string());
        if !diag.hints.is_empty() {
            let hint = diag
                .hints
                .iter()
                .map(|h| h.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            diagnostic = diagnostic.with_hint(hint);
        }

        match diag.severity {
            typst::diag::Severity::Error => errors.push(diagnostic),
            typst::diag::Severity::Warning => warnings.push(diagnostic.as_warning()),
        }
    }

    (errors, warnings)
}

/// Render on the blocking pool, giving up after `timeout_ms`.
#[cfg(feature = "server")]
pub async fn render_with_timeout(
    tree: RenderTree,
    format: OutputFormat,
    timeout_ms: u64,
) -> Result<RenderOutput, RenderError> {
    use std::time::Duration;

    let result = tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        tokio::task::spawn_blocking(move || render_as(&tree, format)),
    )
    .await;

    match result {
        Ok(Ok(output)) => output,
        Ok(Err(join_error)) => Err(RenderError::TaskFailed(join_error.to_string())),
        Err(_timeout) => Err(RenderError::Timeout(timeout_ms)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::fixtures::{context, dangerous, document};
    use crate::layout::{layout, FontMetrics, PageGeometry};
    use crate::world::DEFAULT_FAMILY;

    fn tree(rows: usize) -> RenderTree {
        let metrics = FontMetrics::new(DEFAULT_FAMILY).unwrap();
        layout(&document(rows), &context(), &PageGeometry::default(), &metrics)
    }

    #[test]
    fn test_render_single_page_pdf() {
        let bytes = render(&tree(3)).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_rendered_pages_match_layout() {
        let tree = tree(45);
        assert!(tree.page_count() > 1);
        let output = render_as(&tree, OutputFormat::Pdf).unwrap();
        assert_eq!(output.page_count, tree.page_count());
        assert_eq!(output.format.mime_type(), "application/pdf");
    }

    #[test]
    fn test_render_dangerous_goods() {
        let metrics = FontMetrics::new(DEFAULT_FAMILY).unwrap();
        let tree = layout(&dangerous(3), &context(), &PageGeometry::default(), &metrics);
        assert!(render(&tree).is_ok());
    }

    #[test]
    fn test_markup_output_skips_compilation() {
        let tree = tree(1);
        let output = render_as(&tree, OutputFormat::Typst).unwrap();
        let text = String::from_utf8(output.bytes).unwrap();
        assert!(text.contains("bol-text("));
        assert_eq!(output.page_count, 1);
    }

    #[test]
    fn test_page_count_mismatch_is_an_error() {
        let mut tree = tree(1);
        let extra = tree.pages[0].clone();
        tree.pages.push(extra);
        let markup = to_markup(&tree);
        let (document, _) = compile(markup).unwrap();
        assert!(matches!(
            export(&document, 1),
            Err(RenderError::PageCountMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_bad_markup_reports_diagnostics() {
        match compile("#let x = ".to_string()) {
            Err(RenderError::Compile(errors)) => assert!(!errors.is_empty()),
            other => panic!("expected compile error, got {:?}", other.map(|_| ())),
        }
    }

    #[cfg(feature = "server")]
    #[tokio::test]
    async fn test_render_with_timeout() {
        let output = render_with_timeout(tree(5), OutputFormat::Pdf, 30_000)
            .await
            .unwrap();
        assert!(output.bytes.starts_with(b"%PDF-"));
    }
}
