use thiserror::Error;

/// Failure of an external capability (OCR or language model).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Upstream returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Upstream rate limit or quota exceeded: {0}")]
    RateLimited(String),

    #[error("Upstream returned an empty response")]
    EmptyResponse,

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// True when the upstream refused for capacity reasons rather than
    /// because of the request itself.
    pub fn is_capacity(&self) -> bool {
        match self {
            ServiceError::RateLimited(_) => true,
            ServiceError::Status { status, .. } => *status == 429 || *status == 503,
            _ => false,
        }
    }
}

/// Which side of the document pair a failure concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSide {
    PackingList,
    Invoice,
    DangerousGoods,
}

impl DocumentSide {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentSide::PackingList => "packing list",
            DocumentSide::Invoice => "commercial invoice",
            DocumentSide::DangerousGoods => "dangerous goods declaration",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("Could not identify {} content in the combined document", .0.label())]
    SplitEmpty(DocumentSide),

    #[error("Could not extract meaningful text from {}", .0.label())]
    InsufficientText(DocumentSide),

    #[error("Model response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Model response is not a JSON object")]
    NotAnObject,

    #[error("Missing required BOL information: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Model response does not match the BOL model: {0}")]
    Schema(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ExtractionError {
    /// Failures caused by unusable document content, as opposed to a
    /// failing external service.
    pub fn is_content(&self) -> bool {
        !matches!(self, ExtractionError::Service(_))
    }
}
