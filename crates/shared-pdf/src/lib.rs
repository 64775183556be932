//! Shared PDF handling utilities
//!
//! This crate provides the page geometry, document loading, and standard
//! font metrics used by the compositor.

pub mod coords;
pub mod fonts;
pub mod parser;

pub use coords::{to_document_box, DocumentBox, PageSize};
pub use fonts::StandardFont;
pub use parser::{PdfDocument, PdfError};
