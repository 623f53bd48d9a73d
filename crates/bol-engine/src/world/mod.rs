//! Typst World trait implementation for in-memory compilation

pub mod fonts;
pub mod virtual_world;

pub use fonts::{global_font_cache, FontCache, DEFAULT_FAMILY};
pub use virtual_world::VirtualWorld;
