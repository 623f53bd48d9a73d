//! API handlers for the BOL server
//!
//! - `GET /health`
//! - `POST /api/generate-bol`: multipart upload in, PDF out

use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::pipeline::GeneratedBol;
use crate::rate_limit::client_key;
use crate::upload::UploadForm;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "bol-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: POST /api/generate-bol
///
/// The rate limit is checked before the body is read.
pub async fn handle_generate_bol(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();
    let client = client_key(&headers);
    let span = info_span!("generate_bol", %request_id, %client);
    generate_bol(state, client, multipart).instrument(span).await
}

async fn generate_bol(
    state: AppState,
    client: String,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let admission = state.rate_limiter.check(&client);
    if !admission.is_allowed() {
        let retry_after = admission.retry_after().unwrap_or_default();
        return Err(ApiError::RateLimited {
            retry_after_secs: retry_after_secs(retry_after),
        });
    }

    let form = UploadForm::read(multipart).await?;
    let request = form.validate(state.max_upload_bytes)?;
    info!(mode = request.documents.mode().as_str(), "Starting BOL generation");

    let generated = state.pipeline.run(request, Utc::now()).await?;
    info!(
        bol_number = %generated.bol_number,
        pages = generated.page_count,
        bytes = generated.pdf.len(),
        "Returning Bill of Lading"
    );
    Ok(pdf_response(generated))
}

/// Whole seconds, rounded up, never zero.
fn retry_after_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    secs.max(1)
}

fn pdf_response(generated: GeneratedBol) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", generated.filename);
    let mut response = (StatusCode::OK, generated.pdf).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::X_XSS_PROTECTION,
        HeaderValue::from_static("1; mode=block"),
    );
    response
}
