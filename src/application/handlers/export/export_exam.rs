//! ExportExamHandler - Prepares and drives printable exam exports.
//!
//! Every check that can fail with a structured error (quantity, exam lookup,
//! empty exam) happens in `prepare_*`, before the HTTP layer commits to a
//! status code. What comes back is a ready-to-stream export whose metadata
//! is already fixed.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::domain::exam::file_names::{
    archive_entry_name, archive_file_name, content_disposition, document_file_name,
};
use crate::domain::exam::{BatchQuantity, CopyLabel, Exam, QuantityError};
use crate::domain::foundation::{DomainError, ExamId};
use crate::ports::{
    ArchiveComposer, ArchiveError, DocumentRenderer, ExamReader, ExportFormat, GeneratedDocument,
    RenderError,
};

/// Command to export one unlabelled document.
#[derive(Debug, Clone)]
pub struct ExportSingleCommand {
    /// Raw exam identifier from the request path.
    pub exam_id: String,
}

/// Command to export `quantity` labelled copies as one archive.
#[derive(Debug, Clone)]
pub struct ExportBatchCommand {
    /// Raw exam identifier from the request path.
    pub exam_id: String,
    /// Raw `quantity` query value, if present.
    pub quantity: Option<String>,
}

/// Response metadata fixed before any body byte is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMetadata {
    pub format: ExportFormat,
    pub file_name: String,
    pub content_disposition: String,
}

impl ResponseMetadata {
    fn new(format: ExportFormat, file_name: String) -> Self {
        let content_disposition = content_disposition(&file_name);
        Self {
            format,
            file_name,
            content_disposition,
        }
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// A validated single-document export, ready to stream.
#[derive(Debug)]
pub struct SingleExport {
    pub metadata: ResponseMetadata,
    pub document: GeneratedDocument,
}

/// A validated batch export. Nothing is rendered until [`BatchExport::write_to`].
pub struct BatchExport {
    pub metadata: ResponseMetadata,
    exam: Arc<Exam>,
    quantity: BatchQuantity,
    renderer: Arc<dyn DocumentRenderer>,
}

/// Outcome of a completed batch export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub copies: u32,
    pub bytes_sent: u64,
}

/// Lifecycle of a batch export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    Validating,
    Rejected,
    Rendering,
    Finalizing,
    Completed,
    Aborted,
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportPhase::Validating => "validating",
            ExportPhase::Rejected => "rejected",
            ExportPhase::Rendering => "rendering",
            ExportPhase::Finalizing => "finalizing",
            ExportPhase::Completed => "completed",
            ExportPhase::Aborted => "aborted",
        };
        write!(f, "{}", s)
    }
}

fn enter(phase: ExportPhase) {
    debug!(%phase, "Export phase changed");
}

/// Error type for exam exports.
#[derive(Debug, Error)]
pub enum ExportExamError {
    /// No exam with this id.
    #[error("Exam not found: {0}")]
    NotFound(String),

    /// The exam has no questions.
    #[error("Exam {0} has no questions")]
    EmptyExam(ExamId),

    /// Quantity missing, non-numeric or not positive.
    #[error("Invalid quantity")]
    InvalidQuantity,

    /// Quantity above the configured ceiling.
    #[error("Quantity {requested} exceeds the maximum of {max}")]
    QuantityTooLarge { requested: u64, max: u32 },

    /// The exam store could not be queried.
    #[error("Exam lookup failed: {0}")]
    Lookup(DomainError),

    /// A document failed to render.
    #[error("{0}")]
    Render(RenderError),

    /// The archive could not be written.
    #[error("{0}")]
    Archive(ArchiveError),
}

impl ExportExamError {
    /// Whether the export ended because the client went away.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, ExportExamError::Archive(err) if err.is_disconnect())
    }
}

impl From<DomainError> for ExportExamError {
    fn from(err: DomainError) -> Self {
        ExportExamError::Lookup(err)
    }
}

impl From<QuantityError> for ExportExamError {
    fn from(err: QuantityError) -> Self {
        match err {
            QuantityError::Invalid => ExportExamError::InvalidQuantity,
            QuantityError::TooLarge { requested, max } => {
                ExportExamError::QuantityTooLarge { requested, max }
            }
        }
    }
}

impl From<RenderError> for ExportExamError {
    fn from(err: RenderError) -> Self {
        ExportExamError::Render(err)
    }
}

impl From<ArchiveError> for ExportExamError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::Render(render) => ExportExamError::Render(render),
            other => ExportExamError::Archive(other),
        }
    }
}

/// Handler for exam exports.
///
/// # Dependencies
///
/// - `ExamReader`: Resolve the exam snapshot
/// - `DocumentRenderer`: Produce each printable copy
///
/// # Usage
///
/// ```rust,ignore
/// let handler = ExportExamHandler::new(reader, renderer, 50);
/// let export = handler.prepare_batch(cmd).await?;
/// let summary = export.write_to(Box::new(ZipArchiveComposer::new(channel))).await?;
/// ```
pub struct ExportExamHandler {
    exam_reader: Arc<dyn ExamReader>,
    renderer: Arc<dyn DocumentRenderer>,
    max_copies: u32,
}

impl ExportExamHandler {
    pub fn new(
        exam_reader: Arc<dyn ExamReader>,
        renderer: Arc<dyn DocumentRenderer>,
        max_copies: u32,
    ) -> Self {
        Self {
            exam_reader,
            renderer,
            max_copies,
        }
    }

    pub fn max_copies(&self) -> u32 {
        self.max_copies
    }

    /// Validate a single export and start its (lazy) rendering.
    pub async fn prepare_single(
        &self,
        cmd: ExportSingleCommand,
    ) -> Result<SingleExport, ExportExamError> {
        let exam = self.load_printable(&cmd.exam_id).await?;
        self.renderer.preflight(&exam, CopyLabel::UNLABELLED)?;

        let metadata =
            ResponseMetadata::new(self.renderer.format(), document_file_name(exam.title()));
        let document = self.renderer.render(exam, CopyLabel::UNLABELLED);

        Ok(SingleExport { metadata, document })
    }

    /// Validate a batch export. Quantity is checked before the exam is
    /// looked up.
    pub async fn prepare_batch(
        &self,
        cmd: ExportBatchCommand,
    ) -> Result<BatchExport, ExportExamError> {
        enter(ExportPhase::Validating);

        let result = self.validate_batch(cmd).await;
        if let Err(err) = &result {
            enter(ExportPhase::Rejected);
            debug!(error = %err, "Batch export rejected");
        }
        result
    }

    async fn validate_batch(
        &self,
        cmd: ExportBatchCommand,
    ) -> Result<BatchExport, ExportExamError> {
        let quantity = BatchQuantity::parse(cmd.quantity.as_deref(), self.max_copies)?;
        let exam = self.load_printable(&cmd.exam_id).await?;
        // the widest label is the one most likely to push layout over a limit
        self.renderer
            .preflight(&exam, CopyLabel::from(quantity.get()))?;

        let metadata = ResponseMetadata::new(
            ExportFormat::Zip,
            archive_file_name(exam.title(), quantity.get()),
        );

        Ok(BatchExport {
            metadata,
            exam,
            quantity,
            renderer: Arc::clone(&self.renderer),
        })
    }

    async fn load_printable(&self, raw_id: &str) -> Result<Arc<Exam>, ExportExamError> {
        // an id that cannot be valid cannot name an existing exam
        let exam_id =
            ExamId::new(raw_id).map_err(|_| ExportExamError::NotFound(raw_id.to_string()))?;

        let exam = self
            .exam_reader
            .find_by_id(&exam_id)
            .await?
            .ok_or_else(|| ExportExamError::NotFound(raw_id.to_string()))?;

        if exam.is_empty() {
            return Err(ExportExamError::EmptyExam(exam_id));
        }
        Ok(Arc::new(exam))
    }
}

impl BatchExport {
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Render copies `1..=quantity` in order into `composer`, then finalize.
    ///
    /// Any failure aborts the composer, so the consumer never receives a
    /// complete-looking archive.
    pub async fn write_to(
        self,
        mut composer: Box<dyn ArchiveComposer>,
    ) -> Result<BatchSummary, ExportExamError> {
        enter(ExportPhase::Rendering);

        for label in self.quantity.labels() {
            let entry_name = archive_entry_name(self.exam.title(), label);
            let document = self.renderer.render(Arc::clone(&self.exam), label);

            if let Err(err) = composer.append(&entry_name, document).await {
                enter(ExportPhase::Aborted);
                composer.abort(&err.to_string()).await;
                return Err(err.into());
            }
            debug!(entry = %entry_name, copy = %label, "Archive entry appended");
        }

        enter(ExportPhase::Finalizing);
        match composer.finalize().await {
            Ok(bytes_sent) => {
                enter(ExportPhase::Completed);
                Ok(BatchSummary {
                    copies: self.quantity.get(),
                    bytes_sent,
                })
            }
            Err(err) => {
                enter(ExportPhase::Aborted);
                Err(err.into())
            }
        }
    }
}

impl fmt::Debug for BatchExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchExport")
            .field("metadata", &self.metadata)
            .field("exam_id", self.exam.id())
            .field("quantity", &self.quantity.get())
            .finish_non_exhaustive()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════
