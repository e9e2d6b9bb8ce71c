//! Document Renderer Port - Printable exam rendering interface.
//!
//! This port defines the contract for turning an exam snapshot into a
//! printable document. The application layer depends on this trait, while
//! adapters (like `PdfDocumentRenderer`) provide the implementation.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::exam::{CopyLabel, Exam};

/// Port for rendering one printable copy of an exam.
///
/// # Contract
///
/// Implementations must:
/// - Be pure: identical `(exam, label)` inputs yield byte-identical output
/// - Treat `label` as display-only (never select or reorder questions)
/// - Produce bytes lazily; nothing is rendered until the stream is polled
/// - Report failures through the stream, since they may occur mid-document
///
/// # Usage
///
/// ```rust,ignore
/// let renderer: Arc<dyn DocumentRenderer> = get_renderer();
/// let document = renderer.render(exam.clone(), CopyLabel::UNLABELLED);
/// let body = Body::from_stream(document);
/// ```
pub trait DocumentRenderer: Send + Sync {
    /// Render `exam` with the given copy label.
    fn render(&self, exam: Arc<Exam>, label: CopyLabel) -> GeneratedDocument;

    /// Check that `exam` can be laid out under `label`, without producing
    /// any bytes. Callers run this before committing response headers.
    fn preflight(&self, _exam: &Exam, _label: CopyLabel) -> Result<(), RenderError> {
        Ok(())
    }

    /// Format of the documents this renderer produces.
    fn format(&self) -> ExportFormat;
}

/// One chunk of a document being produced.
pub type DocumentChunk = Result<Vec<u8>, RenderError>;

/// An in-flight, single-pass byte producer for one rendered document.
///
/// Consumed exactly once, either by an HTTP response body or by an archive
/// composer. Dropping it abandons any remaining rendering work.
pub struct GeneratedDocument {
    chunks: BoxStream<'static, DocumentChunk>,
}

impl GeneratedDocument {
    /// Wrap an arbitrary chunk stream.
    pub fn from_stream<S>(chunks: S) -> Self
    where
        S: Stream<Item = DocumentChunk> + Send + 'static,
    {
        Self {
            chunks: chunks.boxed(),
        }
    }

    /// Wrap a lazy iterator of chunks.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = DocumentChunk>,
        I::IntoIter: Send + 'static,
    {
        Self::from_stream(stream::iter(chunks))
    }
}

impl Stream for GeneratedDocument {
    type Item = DocumentChunk;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().chunks.poll_next_unpin(cx)
    }
}

impl fmt::Debug for GeneratedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedDocument").finish_non_exhaustive()
    }
}

/// Download formats produced by the export pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Single printable document.
    Pdf,
    /// Compressed bundle of documents.
    Zip,
}

impl ExportFormat {
    /// Get the MIME content type for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Zip => "application/zip",
        }
    }

    /// Get the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Zip => "zip",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Errors that can occur while composing document content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The exam snapshot cannot be rendered.
    #[error("Invalid exam for rendering: {0}")]
    InvalidExam(String),

    /// The document would exceed the page ceiling.
    #[error("Document needs {pages} pages, more than the limit of {max}")]
    PageLimitExceeded { pages: usize, max: usize },

    /// Internal rendering error.
    #[error("Rendering failed: {0}")]
    Internal(String),
}

impl RenderError {
    /// Creates an invalid exam error.
    pub fn invalid_exam(reason: impl Into<String>) -> Self {
        Self::InvalidExam(reason.into())
    }

    /// Creates an internal error.
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal(reason.into())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════
