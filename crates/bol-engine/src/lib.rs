//! Bill of Lading layout and rendering
//!
//! This crate turns extracted [`bol_types::BolData`] into a PDF:
//! - Layout: fixed A4 geometry, fitted text, cargo rows paginated onto
//!   rider pages, two-pass rider page count
//! - Rendering: Typst markup compiled in memory with embedded fonts
//!
//! # Feature Flags
//!
//! - `server` (default): Enables async `render_with_timeout` (requires tokio)

pub mod layout;
pub mod render;
pub mod world;

pub use layout::{layout, layout_pass, FontMetrics, LayoutContext, PageGeometry, RenderTree};
pub use render::{render, render_as, OutputFormat, RenderError, RenderOutput};

#[cfg(feature = "server")]
pub use render::render_with_timeout;
