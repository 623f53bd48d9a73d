//! Output format handling (PDF, Typst markup)

use serde::{Deserialize, Serialize};

/// Output format for rendered documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pdf,
    /// Generated markup, not compiled
    Typst,
}

impl OutputFormat {
    /// Get the MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Typst => "text/plain; charset=utf-8",
        }
    }

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Typst => "typ",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Pdf => write!(f, "pdf"),
            OutputFormat::Typst => write!(f, "typst"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "typst" | "typ" => Ok(OutputFormat::Typst),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Rendered document bytes
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub page_count: usize,
    pub warnings: Vec<super::CompileDiagnostic>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert_eq!("PDF".parse::<OutputFormat>(), Ok(OutputFormat::Pdf));
        assert_eq!("typ".parse::<OutputFormat>(), Ok(OutputFormat::Typst));
        assert!("png".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Typst.to_string(), "typst");
        assert_eq!(OutputFormat::default().extension(), "pdf");
    }
}
