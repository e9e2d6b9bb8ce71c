//! Archive Composer Port - Incremental bundling of rendered documents.
//!
//! A composer is bound to one output channel for the lifetime of a single
//! batch export. It receives documents one at a time and writes the
//! compressed container to the channel as bytes become available.

use async_trait::async_trait;
use thiserror::Error;

use super::document_renderer::{GeneratedDocument, RenderError};

/// Port for assembling named documents into one compressed container stream.
///
/// # Contract
///
/// Implementations must:
/// - Write entries in `append` call order
/// - Fully drain each document before `append` returns
/// - Reject duplicate entry names instead of overwriting
/// - Never buffer the whole archive; forward bytes as they are produced
/// - Treat any failure as fatal: further appends fail, no trailer is written
///
/// `finalize` and `abort` consume the composer, so finalizing twice or
/// appending after finalize is ruled out at compile time.
#[async_trait]
pub trait ArchiveComposer: Send {
    /// Append `document` as a new entry named `entry_name`.
    ///
    /// # Errors
    ///
    /// - `ArchiveError::DuplicateEntry` if the name was already appended
    /// - `ArchiveError::Poisoned` if an earlier operation failed
    /// - `ArchiveError::Render` if the document fails while being drained
    /// - `ArchiveError::ChannelClosed` if the consumer went away
    async fn append(
        &mut self,
        entry_name: &str,
        document: GeneratedDocument,
    ) -> Result<(), ArchiveError>;

    /// Write the closing index and signal end-of-stream.
    ///
    /// Returns the total number of bytes sent to the output channel.
    async fn finalize(self: Box<Self>) -> Result<u64, ArchiveError>;

    /// Tear the output down so the consumer observes a failed transfer.
    async fn abort(self: Box<Self>, reason: &str);
}

/// Errors that can occur while writing the compressed container.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Entry name appended twice.
    #[error("Duplicate archive entry: {0}")]
    DuplicateEntry(String),

    /// An earlier append failed; the archive can no longer be completed.
    #[error("Archive is unusable after an earlier failure")]
    Poisoned,

    /// The document being appended failed mid-stream.
    #[error("Document failed while archiving: {0}")]
    Render(#[from] RenderError),

    /// The container encoder failed.
    #[error("Archive encoding failed: {0}")]
    Encoding(String),

    /// The consumer of the output channel is gone (client disconnected).
    #[error("Output channel closed by consumer")]
    ChannelClosed,
}

impl ArchiveError {
    /// Creates an encoding error.
    pub fn encoding(reason: impl std::fmt::Display) -> Self {
        Self::Encoding(reason.to_string())
    }

    /// Whether this failure was caused by the consumer disconnecting.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, ArchiveError::ChannelClosed)
    }
}
