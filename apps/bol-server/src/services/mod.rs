//! HTTP clients for the OCR and language-model services

pub mod mistral;
pub mod openai;

pub use mistral::MistralOcrClient;
pub use openai::OpenAiClient;

use std::time::Duration;

use bol_extract::ServiceError;

/// Per-call timeout for upstream requests; the pipeline deadline still applies.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(240);

pub(crate) fn http_client() -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .timeout(UPSTREAM_TIMEOUT)
        .build()
        .map_err(|e| ServiceError::Request(format!("Failed to create HTTP client: {}", e)))
}

/// Read a response body, turning non-success statuses into errors.
pub(crate) async fn read_body(
    service: &str,
    response: reqwest::Response,
) -> Result<String, ServiceError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ServiceError::Request(format!("Failed to read {} response: {}", service, e)))?;

    if status.is_success() {
        return Ok(body);
    }

    let message = truncate(&body, 300);
    tracing::warn!(service, status = status.as_u16(), %message, "Upstream request failed");
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        Err(ServiceError::RateLimited(message))
    } else {
        Err(ServiceError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Minimal upstream stand-in for client tests.
#[cfg(test)]
pub(crate) mod mock {
    use axum::Router;

    /// Serve `router` on an ephemeral local port and return its base URL.
    pub async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }
}
