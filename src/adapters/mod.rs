//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `archive` - Streaming ZIP composer and its output channel
//! - `document` - PDF rendering of the exam template
//! - `http` - Axum endpoints
//! - `memory` - In-memory exam store
//! - `postgres` - PostgreSQL exam store

pub mod archive;
pub mod document;
pub mod http;
pub mod memory;
pub mod postgres;

pub use archive::{output_channel, OutputChannel, ZipArchiveComposer};
pub use document::{DocumentTemplate, PdfDocumentRenderer};
pub use memory::InMemoryExamReader;
pub use postgres::PostgresExamReader;
