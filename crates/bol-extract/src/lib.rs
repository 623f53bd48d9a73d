//! Document understanding for the Bill of Lading pipeline
//!
//! - [`classify`]: keyword page classification of combined documents
//! - [`split`]: reassembly of classified pages into packing list and invoice text
//! - [`adapter`]: structured extraction through an injected language model,
//!   with repair of the returned JSON into [`bol_types::BolData`]
//! - [`capability`]: the OCR and language-model seams

pub mod adapter;
pub mod capability;
pub mod classify;
pub mod error;
pub mod normalize;
pub mod prompt;
pub mod split;

pub use adapter::{parse_response, ExtractionAdapter};
pub use capability::{ExtractionRequest, StructuredExtractor, TextExtractor, UploadedDocument};
pub use classify::classify;
pub use error::{DocumentSide, ExtractionError, ServiceError};
pub use split::{document_text, split, SplitDocument, MIN_TEXT_LENGTH};
