//! Splitting a combined document into packing list and invoice text

use bol_types::page::join_pages;
use bol_types::{ClassifiedPage, DocumentType, Page};
use tracing::{debug, info};

use crate::error::{DocumentSide, ExtractionError};

/// Minimum trimmed length for a text blob to count as content.
pub const MIN_TEXT_LENGTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDocument {
    pub packing_list_text: String,
    pub invoice_text: String,
}

/// Pages assigned to each side before joining.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Partition<'a> {
    pub packing: Vec<&'a Page>,
    pub invoice: Vec<&'a Page>,
}

/// Assign pages to the two sides, inferring an empty side from the
/// boundary of the other one.
pub fn partition(classified: &[ClassifiedPage]) -> Partition<'_> {
    let mut packing: Vec<&Page> = Vec::new();
    let mut invoice: Vec<&Page> = Vec::new();
    for page in classified {
        match page.document_type {
            DocumentType::Packing => packing.push(&page.page),
            DocumentType::Invoice => invoice.push(&page.page),
            DocumentType::Unknown => {}
        }
    }

    match (packing.is_empty(), invoice.is_empty()) {
        (true, true) => {
            let mut all: Vec<&Page> = classified.iter().map(|c| &c.page).collect();
            all.sort_by_key(|p| p.page_number);
            let mid = all.len().div_ceil(2);
            let second = all.split_off(mid);
            debug!(pages = all.len() + second.len(), mid, "No page signal, splitting at midpoint");
            packing = all;
            invoice = second;
        }
        (true, false) => {
            let first_invoice = invoice.iter().map(|p| p.page_number).min().unwrap_or(0);
            packing = classified
                .iter()
                .map(|c| &c.page)
                .filter(|p| p.page_number < first_invoice)
                .collect();
            debug!(first_invoice, inferred = packing.len(), "Inferred packing list pages");
        }
        (false, true) => {
            let last_packing = packing.iter().map(|p| p.page_number).max().unwrap_or(0);
            invoice = classified
                .iter()
                .map(|c| &c.page)
                .filter(|p| p.page_number > last_packing)
                .collect();
            debug!(last_packing, inferred = invoice.len(), "Inferred invoice pages");
        }
        (false, false) => {}
    }

    packing.sort_by_key(|p| p.page_number);
    invoice.sort_by_key(|p| p.page_number);
    Partition { packing, invoice }
}

/// Split classified pages into two page-marked text blobs.
pub fn split(classified: &[ClassifiedPage]) -> Result<SplitDocument, ExtractionError> {
    let parts = partition(classified);
    let packing_list_text = join_pages(parts.packing.iter().copied());
    let invoice_text = join_pages(parts.invoice.iter().copied());

    if packing_list_text.trim().len() < MIN_TEXT_LENGTH {
        return Err(ExtractionError::SplitEmpty(DocumentSide::PackingList));
    }
    if invoice_text.trim().len() < MIN_TEXT_LENGTH {
        return Err(ExtractionError::SplitEmpty(DocumentSide::Invoice));
    }

    info!(
        packing_pages = parts.packing.len(),
        invoice_pages = parts.invoice.len(),
        packing_len = packing_list_text.len(),
        invoice_len = invoice_text.len(),
        "Split combined document"
    );

    Ok(SplitDocument {
        packing_list_text,
        invoice_text,
    })
}

/// Join the pages of a separately uploaded document and require content.
pub fn document_text(pages: &[Page], side: DocumentSide) -> Result<String, ExtractionError> {
    let text = join_pages(pages);
    if text.trim().len() < MIN_TEXT_LENGTH {
        return Err(ExtractionError::InsufficientText(side));
    }
    debug!(side = side.label(), pages = pages.len(), len = text.len(), "Joined document pages");
    Ok(text)
}
