/// One page of OCR output.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Page {
    pub page_number: u32, // 1-based
    pub text: String,     // Markdown-ish OCR text
}

impl Page {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Packing,
    Invoice,
    Unknown,
}

/// A page together with the keyword scores that decided its type.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClassifiedPage {
    pub page: Page,
    pub document_type: DocumentType,
    pub packing_score: u32,
    pub invoice_score: u32,
}

impl ClassifiedPage {
    pub fn page_number(&self) -> u32 {
        self.page.page_number
    }

    pub fn text(&self) -> &str {
        &self.page.text
    }
}

/// Header inserted before each page when pages are joined into one blob.
pub fn page_marker(page_number: u32) -> String {
    format!("--- PAGE {page_number} ---")
}

/// Join pages into one text blob, ascending by page number, each prefixed
/// with its page marker.
pub fn join_pages<'a, I>(pages: I) -> String
where
    I: IntoIterator<Item = &'a Page>,
{
    let mut sorted: Vec<&Page> = pages.into_iter().collect();
    sorted.sort_by_key(|p| p.page_number);
    sorted
        .iter()
        .map(|p| format!("\n\n{}\n\n{}", page_marker(p.page_number), p.text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_sorts_and_marks() {
        let pages = vec![Page::new(2, "second"), Page::new(1, "first")];
        let joined = join_pages(&pages);
        let first = joined.find("--- PAGE 1 ---").unwrap();
        let second = joined.find("--- PAGE 2 ---").unwrap();
        assert!(first < second);
        assert!(joined.contains("--- PAGE 1 ---\n\nfirst"));
    }

    #[test]
    fn test_join_empty() {
        assert_eq!(join_pages(&[]), "");
    }

    #[test]
    fn test_document_type_serializes_snake_case() {
        let json = serde_json::to_string(&DocumentType::Packing).unwrap();
        assert_eq!(json, "\"packing\"");
    }
}
