//! Mistral OCR client

use async_trait::async_trait;
use bol_extract::{ServiceError, TextExtractor, UploadedDocument};
use bol_types::Page;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{http_client, read_body};

pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";
pub const DEFAULT_MODEL: &str = "mistral-ocr-latest";

#[derive(Debug, Clone)]
pub struct MistralOcrClient {
    api_key: String,
    model: String,
    base_url: String,
    http_client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct OcrRequest<'a> {
    model: &'a str,
    document: DocumentSource,
    include_image_base64: bool,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DocumentSource {
    DocumentUrl { document_url: String },
    ImageUrl { image_url: String },
}

impl DocumentSource {
    fn for_document(document: &UploadedDocument) -> Self {
        let url = document.data_url();
        if document.is_image() {
            DocumentSource::ImageUrl { image_url: url }
        } else {
            DocumentSource::DocumentUrl { document_url: url }
        }
    }
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    pages: Vec<OcrPage>,
}

#[derive(Debug, Deserialize)]
struct OcrPage {
    #[serde(default)]
    markdown: String,
}

impl MistralOcrClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: http_client()?,
        })
    }
}

#[async_trait]
impl TextExtractor for MistralOcrClient {
    async fn extract_text(&self, document: &UploadedDocument) -> Result<Vec<Page>, ServiceError> {
        debug!(
            filename = %document.filename,
            mime = %document.mime_type,
            bytes = document.size(),
            "Sending document to OCR"
        );

        let request = OcrRequest {
            model: &self.model,
            document: DocumentSource::for_document(document),
            include_image_base64: false,
        };

        let response = self
            .http_client
            .post(format!("{}/ocr", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::Request(format!("OCR request failed: {}", e)))?;

        let body = read_body("mistral", response).await?;
        let parsed: OcrResponse =
            serde_json::from_str(&body).map_err(|e| ServiceError::Decode(e.to_string()))?;
        if parsed.pages.is_empty() {
            return Err(ServiceError::EmptyResponse);
        }

        let pages: Vec<Page> = parsed
            .pages
            .into_iter()
            .enumerate()
            .map(|(i, page)| Page::new(i as u32 + 1, page.markdown))
            .collect();

        info!(
            filename = %document.filename,
            pages = pages.len(),
            chars = pages.iter().map(|p| p.text.len()).sum::<usize>(),
            "OCR complete"
        );
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    #[test]
    fn test_document_source_by_mime() {
        let pdf = UploadedDocument::new("a.pdf", "application/pdf", b"x".to_vec());
        let png = UploadedDocument::new("a.png", "image/png", b"x".to_vec());
        assert!(matches!(
            DocumentSource::for_document(&pdf),
            DocumentSource::DocumentUrl { .. }
        ));
        assert_eq!(
            serde_json::to_value(DocumentSource::for_document(&png)).unwrap(),
            json!({ "type": "image_url", "image_url": "data:image/png;base64,eA==" })
        );
    }

    #[tokio::test]
    async fn test_pages_numbered_in_response_order() {
        let router = Router::new().route(
            "/ocr",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "mistral-ocr-latest");
                assert_eq!(body["include_image_base64"], false);
                assert_eq!(body["document"]["type"], "document_url");
                Json(json!({
                    "pages": [
                        { "index": 0, "markdown": "# PACKING LIST" },
                        { "index": 1, "markdown": "# COMMERCIAL INVOICE" }
                    ]
                }))
            }),
        );
        let base = mock::serve(router).await;
        let client = MistralOcrClient::new("key", DEFAULT_MODEL, base).unwrap();
        let doc = UploadedDocument::new("combined.pdf", "application/pdf", b"%PDF".to_vec());

        let pages = client.extract_text(&doc).await.unwrap();
        assert_eq!(
            pages,
            vec![
                Page::new(1, "# PACKING LIST"),
                Page::new(2, "# COMMERCIAL INVOICE")
            ]
        );
    }

    #[tokio::test]
    async fn test_rate_limit_status() {
        let router = Router::new().route(
            "/ocr",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base = mock::serve(router).await;
        let client = MistralOcrClient::new("key", DEFAULT_MODEL, base).unwrap();
        let doc = UploadedDocument::new("a.pdf", "application/pdf", b"%PDF".to_vec());

        let err = client.extract_text(&doc).await.unwrap_err();
        assert_eq!(err, ServiceError::RateLimited("slow down".into()));
        assert!(err.is_capacity());
    }

    #[tokio::test]
    async fn test_no_pages_is_empty_response() {
        let router = Router::new().route("/ocr", post(|| async { Json(json!({ "pages": [] })) }));
        let base = mock::serve(router).await;
        let client = MistralOcrClient::new("key", DEFAULT_MODEL, base).unwrap();
        let doc = UploadedDocument::new("a.pdf", "application/pdf", b"%PDF".to_vec());

        assert_eq!(
            client.extract_text(&doc).await.unwrap_err(),
            ServiceError::EmptyResponse
        );
    }
}
