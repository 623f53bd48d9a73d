//! Error types for the BOL server

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bol_engine::RenderError;
use bol_extract::ExtractionError;
use serde::Serialize;
use thiserror::Error;

use crate::pipeline::PipelineError;

const EXTRACTION_FAILED: &str = "Failed to process shipping information. Please check that your documents contain complete shipping details.";
const PROCESSING_FAILED: &str =
    "An unexpected error occurred while generating the Bill of Lading. Please try again.";
const TIMEOUT: &str =
    "Processing timeout. Please try again with smaller files or simpler documents.";
const RATE_LIMITED: &str = "Rate limit exceeded. Please try again later.";
const UNAVAILABLE: &str =
    "Service temporarily unavailable due to high demand. Please try again later.";

/// Request failures, each with a stable client-facing message
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad input; the message is safe to show
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Documents did not yield usable content
    #[error("Extraction failed: {message}")]
    Extraction { message: String, detail: String },

    #[error("Processing failed: {0}")]
    Processing(String),

    #[error("Processing timeout after {0}ms")]
    Timeout(u64),

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Upstream quota or rate limit
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: &'static str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Extraction { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Extraction { .. } => "EXTRACTION_ERROR",
            ApiError::Processing(_) => "PROCESSING_ERROR",
            ApiError::Timeout(_) => "TIMEOUT",
            ApiError::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::Validation(message) => message.clone(),
            ApiError::Extraction { message, .. } => message.clone(),
            ApiError::Processing(_) => PROCESSING_FAILED.to_string(),
            ApiError::Timeout(_) => TIMEOUT.to_string(),
            ApiError::RateLimited { .. } => RATE_LIMITED.to_string(),
            ApiError::ServiceUnavailable(_) => UNAVAILABLE.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Validation(_) | ApiError::RateLimited { .. } => {
                tracing::warn!(code = self.code(), "{}", self)
            }
            ApiError::Extraction { detail, .. } => {
                tracing::error!(code = self.code(), %detail, "{}", self)
            }
            _ => tracing::error!(code = self.code(), "{}", self),
        }

        let status = self.status();
        let body = ErrorResponse {
            success: false,
            error: self.public_message(),
            code: self.code(),
        };
        let mut response = (status, Json(body)).into_response();
        if let ApiError::RateLimited { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Service(service) if service.is_capacity() => {
                ApiError::ServiceUnavailable(service.to_string())
            }
            ExtractionError::Service(service) => ApiError::Processing(service.to_string()),
            ExtractionError::SplitEmpty(_)
            | ExtractionError::InsufficientText(_)
            | ExtractionError::MissingFields(_) => ApiError::Extraction {
                message: err.to_string(),
                detail: format!("{:?}", err),
            },
            other => ApiError::Extraction {
                message: EXTRACTION_FAILED.to_string(),
                detail: other.to_string(),
            },
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Timeout(ms) => ApiError::Timeout(ms),
            other => ApiError::Processing(other.to_string()),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Extraction(e) => e.into(),
            PipelineError::Render(e) => e.into(),
            PipelineError::Timeout(ms) => ApiError::Timeout(ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bol_extract::{DocumentSide, ServiceError};
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited {
            retry_after_secs: 1200,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "1200");
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "RATE_LIMIT_EXCEEDED");
    }

    #[tokio::test]
    async fn test_processing_detail_is_not_exposed() {
        let response = ApiError::Processing("openai: 401 invalid key sk-123".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], PROCESSING_FAILED);
        assert!(!body.to_string().contains("sk-123"));
    }

    #[test]
    fn test_extraction_mapping() {
        let err: ApiError = ExtractionError::SplitEmpty(DocumentSide::PackingList).into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.public_message(),
            "Could not identify packing list content in the combined document"
        );

        let err: ApiError = ExtractionError::Schema("invalid type".into()).into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.public_message(), EXTRACTION_FAILED);
    }

    #[test]
    fn test_service_mapping() {
        let err: ApiError = ExtractionError::Service(ServiceError::Status {
            status: 429,
            message: "quota".into(),
        })
        .into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err: ApiError = ExtractionError::Service(ServiceError::Request("reset".into())).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_render_timeout_mapping() {
        let err: ApiError = RenderError::Timeout(500).into();
        assert_eq!(err.status(), StatusCode::REQUEST_TIMEOUT);
        let err: ApiError = RenderError::PageCountMismatch {
            expected: 2,
            actual: 3,
        }
        .into();
        assert_eq!(err.code(), "PROCESSING_ERROR");
    }
}
