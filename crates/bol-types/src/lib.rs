//! Shared types for the Bill of Lading pipeline
//!
//! - [`BolData`]: the canonical Bill of Lading document model
//! - [`Page`] / [`ClassifiedPage`]: OCR output and classifier output
//! - [`lenient`]: serde helpers that accept the loosely-typed values a
//!   language model produces

pub mod lenient;
pub mod page;
pub mod types;

pub use page::{ClassifiedPage, DocumentType, Page};
pub use types::{
    BolData, CargoItem, Consignee, DangerousGoods, InvoiceDetails, NotifyParty, PackingGroup,
    Party, Ports, Totals, TransportType, VesselDetails, DEFAULT_BL_SEQUENCE, TO_BE_NAMED,
};
