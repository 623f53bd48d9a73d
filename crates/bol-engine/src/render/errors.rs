//! Error types for rendering

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A Typst diagnostic raised while compiling generated markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileDiagnostic {
    pub message: String,
    /// Helpful hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl CompileDiagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: None,
            severity: Severity::Error,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn as_warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }
}

impl std::fmt::Display for CompileDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.hint {
            Some(hint) => write!(f, "{} (hint: {})", self.message, hint),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Compilation failed: {}", first_message(.0))]
    Compile(Vec<CompileDiagnostic>),

    #[error("PDF export failed: {0}")]
    Export(String),

    #[error("Rendered {actual} pages but the layout has {expected}")]
    PageCountMismatch { expected: usize, actual: usize },

    #[error("Rendering timeout after {0}ms")]
    Timeout(u64),

    #[error("Render task failed: {0}")]
    TaskFailed(String),
}

fn first_message(diagnostics: &[CompileDiagnostic]) -> String {
    diagnostics
        .first()
        .map_or_else(|| "unknown error".to_string(), ToString::to_string)
}
