//! Keyword classification of combined-document pages

use bol_types::{ClassifiedPage, DocumentType, Page};
use tracing::debug;

pub const PACKING_LIST_MARKER: &str = "packing list";
pub const INVOICE_MARKER: &str = "commercial invoice";

/// Score one page: each marker phrase contributes at most 1.
pub fn score_page(text: &str) -> (u32, u32) {
    let lower = text.to_lowercase();
    let packing = u32::from(lower.contains(PACKING_LIST_MARKER));
    let invoice = u32::from(lower.contains(INVOICE_MARKER));
    (packing, invoice)
}

/// Classify each page independently.
///
/// The higher score wins. On a tie, including when neither phrase appears,
/// page 1 is a packing list and any other page is an invoice.
pub fn classify(pages: &[Page]) -> Vec<ClassifiedPage> {
    pages
        .iter()
        .map(|page| {
            let (packing_score, invoice_score) = score_page(&page.text);
            let document_type = if packing_score > invoice_score {
                DocumentType::Packing
            } else if invoice_score > packing_score {
                DocumentType::Invoice
            } else if page.page_number == 1 {
                DocumentType::Packing
            } else {
                DocumentType::Invoice
            };
            debug!(
                page = page.page_number,
                packing_score,
                invoice_score,
                ?document_type,
                "Classified page"
            );
            ClassifiedPage {
                page: page.clone(),
                document_type,
                packing_score,
                invoice_score,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn types(pages: &[ClassifiedPage]) -> Vec<DocumentType> {
        pages.iter().map(|p| p.document_type).collect()
    }

    #[test]
    fn test_tie_break_uses_position() {
        let pages = vec![
            Page::new(1, "Shipper: Acme\nItems: 40 cartons"),
            Page::new(2, "COMMERCIAL INVOICE\nTotal USD 4,000"),
        ];
        let classified = classify(&pages);
        assert_eq!(
            types(&classified),
            vec![DocumentType::Packing, DocumentType::Invoice]
        );
        assert_eq!(classified[1].invoice_score, 1);
    }

    #[test]
    fn test_presence_not_frequency() {
        let text = "Packing List ... packing list ... PACKING LIST ... Commercial Invoice";
        assert_eq!(score_page(text), (1, 1));
    }

    #[test]
    fn test_higher_score_wins_anywhere() {
        let pages = vec![
            Page::new(1, "Commercial Invoice No. 77"),
            Page::new(2, "Packing List"),
        ];
        assert_eq!(
            types(&classify(&pages)),
            vec![DocumentType::Invoice, DocumentType::Packing]
        );
    }

    #[test]
    fn test_both_markers_tie() {
        let pages = vec![
            Page::new(1, "packing list / commercial invoice"),
            Page::new(3, "packing list and commercial invoice"),
        ];
        assert_eq!(
            types(&classify(&pages)),
            vec![DocumentType::Packing, DocumentType::Invoice]
        );
    }

    proptest! {
        #[test]
        fn prop_classify_is_deterministic(texts in proptest::collection::vec(".{0,80}", 0..8)) {
            let pages: Vec<Page> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| Page::new(i as u32 + 1, t.clone()))
                .collect();
            prop_assert_eq!(classify(&pages), classify(&pages));
        }

        #[test]
        fn prop_never_unknown(texts in proptest::collection::vec(".{0,80}", 0..8)) {
            let pages: Vec<Page> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| Page::new(i as u32 + 1, t.clone()))
                .collect();
            for page in classify(&pages) {
                prop_assert_ne!(page.document_type, DocumentType::Unknown);
            }
        }
    }
}
