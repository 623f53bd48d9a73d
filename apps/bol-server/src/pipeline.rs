//! End-to-end Bill of Lading generation
//!
//! OCR, page splitting, structured extraction, layout and rendering run in
//! sequence under one deadline. Any failure fails the whole request.

use std::sync::Arc;
use std::time::Duration;

use bol_engine::layout::TextMetrics;
use bol_engine::{layout, render_with_timeout, LayoutContext, OutputFormat, PageGeometry, RenderError};
use bol_extract::{
    classify, document_text, split, DocumentSide, ExtractionAdapter, ExtractionError,
    TextExtractor, UploadedDocument,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

/// How the shipping documents were uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadMode {
    #[default]
    Separate,
    Combined,
    Dangerous,
}

impl UploadMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "separate" => Some(UploadMode::Separate),
            "combined" => Some(UploadMode::Combined),
            "dangerous" => Some(UploadMode::Dangerous),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadMode::Separate => "separate",
            UploadMode::Combined => "combined",
            UploadMode::Dangerous => "dangerous",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Documents {
    Separate {
        packing_list: UploadedDocument,
        invoice: UploadedDocument,
    },
    Combined(UploadedDocument),
    Dangerous {
        packing_list: UploadedDocument,
        invoice: UploadedDocument,
        dangerous_goods: UploadedDocument,
    },
}

impl Documents {
    pub fn mode(&self) -> UploadMode {
        match self {
            Documents::Separate { .. } => UploadMode::Separate,
            Documents::Combined(_) => UploadMode::Combined,
            Documents::Dangerous { .. } => UploadMode::Dangerous,
        }
    }
}

/// A validated generation request.
#[derive(Debug, Clone)]
pub struct BolRequest {
    pub documents: Documents,
    pub bol_number: Option<String>,
    pub booking_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeneratedBol {
    pub pdf: Vec<u8>,
    pub filename: String,
    pub bol_number: String,
    pub page_count: usize,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Processing timed out after {0}ms")]
    Timeout(u64),
}

/// `BOL-` followed by the last 8 digits of the epoch milliseconds.
pub fn generate_bol_number(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().rem_euclid(100_000_000);
    format!("BOL-{:08}", millis)
}

/// Download filename: the ISO-8601 timestamp with `:` and `.` replaced.
pub fn filename(now: DateTime<Utc>) -> String {
    format!("bill-of-lading-{}.pdf", now.format("%Y-%m-%dT%H-%M-%S-%3fZ"))
}

/// Shipping texts ready for structured extraction.
#[derive(Debug)]
struct ExtractedTexts {
    packing_list: String,
    invoice: String,
    dangerous_goods: Option<String>,
}

#[derive(Clone)]
pub struct Pipeline {
    ocr: Arc<dyn TextExtractor>,
    adapter: ExtractionAdapter,
    metrics: Arc<dyn TextMetrics>,
    geometry: PageGeometry,
    timeout_ms: u64,
}

impl Pipeline {
    pub fn new(
        ocr: Arc<dyn TextExtractor>,
        adapter: ExtractionAdapter,
        metrics: Arc<dyn TextMetrics>,
        geometry: PageGeometry,
        timeout_ms: u64,
    ) -> Self {
        Self {
            ocr,
            adapter,
            metrics,
            geometry,
            timeout_ms,
        }
    }

    /// Run the whole pipeline under the configured deadline.
    pub async fn run(
        &self,
        request: BolRequest,
        now: DateTime<Utc>,
    ) -> Result<GeneratedBol, PipelineError> {
        match tokio::time::timeout(
            Duration::from_millis(self.timeout_ms),
            self.generate(request, now),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Timeout(self.timeout_ms)),
        }
    }

    async fn generate(
        &self,
        request: BolRequest,
        now: DateTime<Utc>,
    ) -> Result<GeneratedBol, PipelineError> {
        let mode = request.documents.mode();
        let texts = self.extract_texts(&request.documents).await?;
        info!(
            mode = mode.as_str(),
            packing_len = texts.packing_list.len(),
            invoice_len = texts.invoice.len(),
            dangerous_len = texts.dangerous_goods.as_ref().map_or(0, String::len),
            "Document text ready"
        );

        let bol = self
            .adapter
            .extract(
                &texts.packing_list,
                &texts.invoice,
                texts.dangerous_goods.as_deref(),
            )
            .await?;

        let bol_number = request
            .bol_number
            .unwrap_or_else(|| generate_bol_number(now));
        let ctx = LayoutContext::new(bol_number.clone(), request.booking_number, now.date_naive());
        let tree = layout(&bol, &ctx, &self.geometry, self.metrics.as_ref());
        let page_count = tree.page_count();

        let output = render_with_timeout(tree, OutputFormat::Pdf, self.timeout_ms).await?;
        if output.bytes.is_empty() {
            return Err(RenderError::Export("Renderer produced an empty document".into()).into());
        }
        info!(
            bol_number = %bol_number,
            pages = page_count,
            bytes = output.bytes.len(),
            "Bill of Lading generated"
        );

        Ok(GeneratedBol {
            pdf: output.bytes,
            filename: filename(now),
            bol_number,
            page_count,
        })
    }

    async fn extract_texts(&self, documents: &Documents) -> Result<ExtractedTexts, ExtractionError> {
        match documents {
            Documents::Combined(document) => {
                let pages = self.ocr.extract_text(document).await?;
                debug!(pages = pages.len(), "Classifying combined document");
                let parts = split(&classify(&pages))?;
                Ok(ExtractedTexts {
                    packing_list: parts.packing_list_text,
                    invoice: parts.invoice_text,
                    dangerous_goods: None,
                })
            }
            Documents::Separate {
                packing_list,
                invoice,
            } => {
                let (packing_pages, invoice_pages) = tokio::try_join!(
                    self.ocr.extract_text(packing_list),
                    self.ocr.extract_text(invoice),
                )?;
                Ok(ExtractedTexts {
                    packing_list: document_text(&packing_pages, DocumentSide::PackingList)?,
                    invoice: document_text(&invoice_pages, DocumentSide::Invoice)?,
                    dangerous_goods: None,
                })
            }
            Documents::Dangerous {
                packing_list,
                invoice,
                dangerous_goods,
            } => {
                let (packing_pages, invoice_pages, dangerous_pages) = tokio::try_join!(
                    self.ocr.extract_text(packing_list),
                    self.ocr.extract_text(invoice),
                    self.ocr.extract_text(dangerous_goods),
                )?;
                Ok(ExtractedTexts {
                    packing_list: document_text(&packing_pages, DocumentSide::PackingList)?,
                    invoice: document_text(&invoice_pages, DocumentSide::Invoice)?,
                    dangerous_goods: Some(document_text(
                        &dangerous_pages,
                        DocumentSide::DangerousGoods,
                    )?),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fakes::{FakeLlm, FakeOcr};
    use bol_engine::layout::FixedWidthMetrics;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 5, 14, 7, 9).unwrap() + chrono::Duration::milliseconds(42)
    }

    fn pipeline(ocr: FakeOcr, llm: FakeLlm, timeout_ms: u64) -> Pipeline {
        Pipeline::new(
            Arc::new(ocr),
            ExtractionAdapter::new(Arc::new(llm)),
            Arc::new(FixedWidthMetrics::default()),
            PageGeometry::default(),
            timeout_ms,
        )
    }

    fn pdf(name: &str) -> UploadedDocument {
        UploadedDocument::new(name, "application/pdf", b"%PDF-1.7".to_vec())
    }

    #[test]
    fn test_upload_mode_parse() {
        assert_eq!(UploadMode::parse("combined"), Some(UploadMode::Combined));
        assert_eq!(UploadMode::parse(" dangerous "), Some(UploadMode::Dangerous));
        assert_eq!(UploadMode::parse("zip"), None);
        assert_eq!(UploadMode::default(), UploadMode::Separate);
    }

    #[test]
    fn test_generated_bol_number() {
        assert_eq!(generate_bol_number(fixed_now()), "BOL-83629042");
        let millis = fixed_now().timestamp_millis() % 100_000_000;
        assert_eq!(generate_bol_number(fixed_now()), format!("BOL-{:08}", millis));
        assert_eq!(generate_bol_number(fixed_now()).len(), 12);
    }

    #[test]
    fn test_filename_has_no_colons_or_dots_in_timestamp() {
        assert_eq!(
            filename(fixed_now()),
            "bill-of-lading-2025-03-05T14-07-09-042Z.pdf"
        );
    }

    #[tokio::test]
    async fn test_combined_mode_splits_pages() {
        let ocr = FakeOcr::pages(&[
            "PACKING LIST\nCarton 1-10 cotton shirts",
            "COMMERCIAL INVOICE\nTotal USD 1000",
        ]);
        let llm = FakeLlm::valid();
        let seen = llm.requests();
        let p = pipeline(ocr, llm, 60_000);

        let texts = p
            .extract_texts(&Documents::Combined(pdf("combined.pdf")))
            .await
            .unwrap();
        assert!(texts.packing_list.contains("Carton 1-10"));
        assert!(!texts.packing_list.contains("Total USD"));
        assert!(texts.invoice.contains("--- PAGE 2 ---"));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_combined_mode_all_invoice_pages_fails() {
        let ocr = FakeOcr::pages(&[
            "COMMERCIAL INVOICE page one",
            "COMMERCIAL INVOICE page two",
            "COMMERCIAL INVOICE page three",
        ]);
        let p = pipeline(ocr, FakeLlm::valid(), 60_000);

        let err = p
            .extract_texts(&Documents::Combined(pdf("combined.pdf")))
            .await
            .unwrap_err();
        assert_eq!(err, ExtractionError::SplitEmpty(DocumentSide::PackingList));
    }

    #[tokio::test]
    async fn test_dangerous_mode_passes_declaration_text() {
        let ocr = FakeOcr::by_filename(&[
            ("packing.pdf", "PACKING LIST cartons"),
            ("invoice.pdf", "COMMERCIAL INVOICE total"),
            ("dg.pdf", "DANGEROUS GOODS DECLARATION UN1263 Paint"),
        ]);
        let llm = FakeLlm::valid();
        let seen = llm.requests();
        let p = pipeline(ocr, llm, 60_000);

        let request = BolRequest {
            documents: Documents::Dangerous {
                packing_list: pdf("packing.pdf"),
                invoice: pdf("invoice.pdf"),
                dangerous_goods: pdf("dg.pdf"),
            },
            bol_number: Some("BOL-CUSTOM".into()),
            booking_number: None,
        };
        let generated = p.run(request, fixed_now()).await.unwrap();

        assert_eq!(generated.bol_number, "BOL-CUSTOM");
        assert!(generated.pdf.starts_with(b"%PDF"));
        let requests = seen.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].user_prompt.contains("UN1263 Paint"));
    }

    #[tokio::test]
    async fn test_generated_number_used_without_custom() {
        let ocr = FakeOcr::by_filename(&[
            ("packing.pdf", "PACKING LIST cartons"),
            ("invoice.pdf", "COMMERCIAL INVOICE total"),
        ]);
        let p = pipeline(ocr, FakeLlm::valid(), 60_000);
        let request = BolRequest {
            documents: Documents::Separate {
                packing_list: pdf("packing.pdf"),
                invoice: pdf("invoice.pdf"),
            },
            bol_number: None,
            booking_number: Some("BK-9".into()),
        };

        let generated = p.run(request, fixed_now()).await.unwrap();
        assert_eq!(generated.bol_number, generate_bol_number(fixed_now()));
        assert_eq!(generated.filename, filename(fixed_now()));
        assert_eq!(generated.page_count, 1);
    }

    #[tokio::test]
    async fn test_deadline_covers_external_calls() {
        let ocr = FakeOcr::pages(&["PACKING LIST cartons"]).with_delay(Duration::from_millis(500));
        let p = pipeline(ocr, FakeLlm::valid(), 20);
        let request = BolRequest {
            documents: Documents::Combined(pdf("combined.pdf")),
            bol_number: None,
            booking_number: None,
        };

        let err = p.run(request, fixed_now()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Timeout(20)));
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let ocr = FakeOcr::by_filename(&[
            ("packing.pdf", "PACKING LIST cartons"),
            ("invoice.pdf", "COMMERCIAL INVOICE total"),
        ]);
        let p = pipeline(ocr, FakeLlm::responding("not json at all"), 60_000);
        let request = BolRequest {
            documents: Documents::Separate {
                packing_list: pdf("packing.pdf"),
                invoice: pdf("invoice.pdf"),
            },
            bol_number: None,
            booking_number: None,
        };

        let err = p.run(request, fixed_now()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Extraction(ExtractionError::InvalidJson(_))
        ));
    }
}
