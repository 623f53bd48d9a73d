//! Multipart form parsing and input validation
//!
//! Everything here runs before any external call is made.

use std::collections::HashMap;

use axum::extract::Multipart;
use bol_extract::UploadedDocument;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ApiError;
use crate::pipeline::{BolRequest, Documents, UploadMode};

pub const ALLOWED_MIME_TYPES: [&str; 5] = [
    "application/pdf",
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
];

const PACKING_LIST: (&str, &str) = ("packingList", "Packing List");
const INVOICE: (&str, &str) = ("invoice", "Commercial Invoice");
const COMBINED: (&str, &str) = ("combinedDocument", "Combined Document");
const DANGEROUS_GOODS: (&str, &str) = ("dangerousGoods", "Dangerous Goods Declaration");

lazy_static! {
    static ref IDENTIFIER_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{3,50}$").unwrap();
}

/// Form contents before validation.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub upload_mode: Option<String>,
    pub bol_number: Option<String>,
    pub booking_number: Option<String>,
    pub files: HashMap<String, UploadedDocument>,
}

impl UploadForm {
    /// Drain a multipart body. Unknown fields are ignored.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                "uploadMode" => form.upload_mode = Some(field.text().await.map_err(invalid_form)?),
                "bolNumber" => form.bol_number = Some(field.text().await.map_err(invalid_form)?),
                "bookingNumber" => {
                    form.booking_number = Some(field.text().await.map_err(invalid_form)?)
                }
                "packingList" | "invoice" | "combinedDocument" | "dangerousGoods" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let mime_type = field.content_type().unwrap_or_default().to_string();
                    let bytes = field.bytes().await.map_err(invalid_form)?;
                    form.files.insert(
                        name,
                        UploadedDocument::new(filename, mime_type, bytes.to_vec()),
                    );
                }
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }
        Ok(form)
    }

    /// Check every field and assemble the pipeline request.
    pub fn validate(mut self, max_bytes: usize) -> Result<BolRequest, ApiError> {
        let mode = match self.upload_mode.as_deref().map(str::trim) {
            None | Some("") => UploadMode::default(),
            Some(value) => UploadMode::parse(value)
                .ok_or_else(|| ApiError::Validation(format!("Unknown upload mode: {}", value)))?,
        };

        let bol_number = identifier(self.bol_number.take(), "BOL number")?;
        let booking_number = identifier(self.booking_number.take(), "Booking number")?;

        let documents = match mode {
            UploadMode::Combined => Documents::Combined(self.take_file(COMBINED, max_bytes)?),
            UploadMode::Separate => Documents::Separate {
                packing_list: self.take_file(PACKING_LIST, max_bytes)?,
                invoice: self.take_file(INVOICE, max_bytes)?,
            },
            UploadMode::Dangerous => Documents::Dangerous {
                packing_list: self.take_file(PACKING_LIST, max_bytes)?,
                invoice: self.take_file(INVOICE, max_bytes)?,
                dangerous_goods: self.take_file(DANGEROUS_GOODS, max_bytes)?,
            },
        };

        Ok(BolRequest {
            documents,
            bol_number,
            booking_number,
        })
    }

    fn take_file(
        &mut self,
        (key, label): (&str, &str),
        max_bytes: usize,
    ) -> Result<UploadedDocument, ApiError> {
        let document = self
            .files
            .remove(key)
            .ok_or_else(|| ApiError::Validation(format!("{} is required", label)))?;
        validate_file(&document, label, max_bytes)?;
        Ok(document)
    }
}

fn invalid_form(err: axum::extract::multipart::MultipartError) -> ApiError {
    tracing::warn!(error = %err, "Failed to read multipart body");
    ApiError::Validation("Invalid form data or request too large".to_string())
}

/// Blank means absent; anything else must match the identifier pattern.
fn identifier(value: Option<String>, label: &str) -> Result<Option<String>, ApiError> {
    let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if IDENTIFIER_RE.is_match(&value) {
        Ok(Some(value))
    } else {
        Err(ApiError::Validation(format!(
            "{} must be 3-50 characters using letters, numbers, hyphens or underscores",
            label
        )))
    }
}

pub fn validate_file(
    document: &UploadedDocument,
    label: &str,
    max_bytes: usize,
) -> Result<(), ApiError> {
    if document.filename.is_empty() || document.bytes.is_empty() {
        return Err(ApiError::Validation(format!("{} is required", label)));
    }
    if document.size() > max_bytes {
        return Err(ApiError::Validation(format!(
            "{} exceeds maximum size of {}MB",
            label,
            max_bytes / (1024 * 1024)
        )));
    }
    if !ALLOWED_MIME_TYPES.contains(&document.mime_type.as_str()) {
        return Err(ApiError::Validation(format!(
            "{} must be PDF, JPG, PNG, or WebP format",
            label
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const MB: usize = 1024 * 1024;

    fn pdf(name: &str) -> UploadedDocument {
        UploadedDocument::new(name, "application/pdf", b"%PDF-1.7".to_vec())
    }

    fn form(mode: Option<&str>, files: &[(&str, UploadedDocument)]) -> UploadForm {
        UploadForm {
            upload_mode: mode.map(str::to_string),
            files: files
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            ..UploadForm::default()
        }
    }

    fn message(err: ApiError) -> String {
        match err {
            ApiError::Validation(message) => message,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_mode_is_separate() {
        let request = form(
            None,
            &[("packingList", pdf("p.pdf")), ("invoice", pdf("i.pdf"))],
        )
        .validate(50 * MB)
        .unwrap();
        assert!(matches!(request.documents, Documents::Separate { .. }));
        assert_eq!(request.bol_number, None);
    }

    #[test]
    fn test_missing_invoice() {
        let err = form(Some("separate"), &[("packingList", pdf("p.pdf"))])
            .validate(50 * MB)
            .unwrap_err();
        assert_eq!(message(err), "Commercial Invoice is required");
    }

    #[test]
    fn test_combined_needs_combined_document() {
        let err = form(Some("combined"), &[("packingList", pdf("p.pdf"))])
            .validate(50 * MB)
            .unwrap_err();
        assert_eq!(message(err), "Combined Document is required");
    }

    #[test]
    fn test_dangerous_mode_needs_declaration() {
        let err = form(
            Some("dangerous"),
            &[("packingList", pdf("p.pdf")), ("invoice", pdf("i.pdf"))],
        )
        .validate(50 * MB)
        .unwrap_err();
        assert_eq!(message(err), "Dangerous Goods Declaration is required");
    }

    #[test]
    fn test_oversized_file() {
        let big = UploadedDocument::new("big.pdf", "application/pdf", vec![0; 2 * MB + 1]);
        let err = validate_file(&big, "Packing List", 2 * MB).unwrap_err();
        assert_eq!(message(err), "Packing List exceeds maximum size of 2MB");
    }

    #[test]
    fn test_unsupported_type() {
        let doc = UploadedDocument::new("a.docx", "application/msword", b"x".to_vec());
        let err = validate_file(&doc, "Commercial Invoice", MB).unwrap_err();
        assert_eq!(
            message(err),
            "Commercial Invoice must be PDF, JPG, PNG, or WebP format"
        );
    }

    #[test]
    fn test_empty_file_counts_as_missing() {
        let doc = UploadedDocument::new("a.pdf", "application/pdf", Vec::new());
        let err = validate_file(&doc, "Packing List", MB).unwrap_err();
        assert_eq!(message(err), "Packing List is required");
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(identifier(None, "BOL number").unwrap(), None);
        assert_eq!(identifier(Some("  ".into()), "BOL number").unwrap(), None);
        assert_eq!(
            identifier(Some("BOL_2025-01".into()), "BOL number").unwrap(),
            Some("BOL_2025-01".into())
        );
        assert!(identifier(Some("AB".into()), "BOL number").is_err());
        assert!(identifier(Some("BOL 123".into()), "BOL number").is_err());
        assert!(identifier(Some("X".repeat(51)), "BOL number").is_err());
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let err = form(Some("zip"), &[]).validate(MB).unwrap_err();
        assert_eq!(message(err), "Unknown upload mode: zip");
    }

    proptest! {
        #[test]
        fn prop_valid_identifiers_accepted(value in "[A-Za-z0-9_-]{3,50}") {
            prop_assert_eq!(identifier(Some(value.clone()), "BOL number").unwrap(), Some(value));
        }

        #[test]
        fn prop_identifiers_with_other_chars_rejected(
            prefix in "[A-Za-z0-9]{1,10}",
            bad in "[ ./:;!@#]",
            suffix in "[A-Za-z0-9]{1,10}",
        ) {
            let value = format!("{}{}{}", prefix, bad, suffix);
            prop_assert!(identifier(Some(value), "BOL number").is_err());
        }
    }
}
