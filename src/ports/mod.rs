//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application layer and the outside world. Adapters implement these
//! ports.
//!
//! - `ExamReader` - Read-only exam lookup (exam-management subsystem)
//! - `DocumentRenderer` - Exam snapshot to lazily produced printable bytes
//! - `ArchiveComposer` - Ordered, incremental bundling of rendered documents

mod archive_composer;
mod document_renderer;
mod exam_reader;

pub use archive_composer::{ArchiveComposer, ArchiveError};
pub use document_renderer::{
    DocumentChunk, DocumentRenderer, ExportFormat, GeneratedDocument, RenderError,
};
pub use exam_reader::ExamReader;
