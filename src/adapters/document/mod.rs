//! Document adapters - Printable exam rendering.
//!
//! This module provides the adapter for the `DocumentRenderer` port:
//! - `PdfDocumentRenderer` - Streams a PDF built from the fixed exam template
//! - `DocumentTemplate` - Institutional header lines printed on every copy

mod helvetica;
mod layout;
mod pdf_renderer;
mod template;

pub use pdf_renderer::PdfDocumentRenderer;
pub use template::DocumentTemplate;
