//! Capabilities the pipeline borrows from the outside world
//!
//! OCR and the language model are network services; the pipeline only sees
//! them through these traits so that classification, splitting, repair and
//! layout can be exercised with fixtures.

use async_trait::async_trait;
use base64::Engine;
use bol_types::Page;

use crate::error::ServiceError;

/// An uploaded file as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// `data:<mime>;base64,<payload>` form accepted by the OCR service.
    pub fn data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.mime_type, encoded)
    }
}

/// A chat-style request for a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub json_response: bool,
}

/// Turns a document into page-structured text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, document: &UploadedDocument) -> Result<Vec<Page>, ServiceError>;
}

/// Runs a structured extraction request and returns the raw model output.
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    async fn extract_structured(&self, request: &ExtractionRequest) -> Result<String, ServiceError>;
}
