//! Exam Reader Port - Read-only access to exams.
//!
//! Exams are owned and mutated by the exam-management subsystem. The export
//! pipeline only ever reads one snapshot per request through this port.

use async_trait::async_trait;

use crate::domain::exam::Exam;
use crate::domain::foundation::{DomainError, ExamId};

/// Port for resolving an exam identifier to its printable content.
///
/// # Contract
///
/// Implementations must:
/// - Return `Ok(None)` for an unknown id (not an error)
/// - Return questions in their authored order
/// - Never mutate the exam
///
/// # Usage
///
/// ```rust,ignore
/// let reader: Arc<dyn ExamReader> = get_reader();
/// match reader.find_by_id(&exam_id).await? {
///     Some(exam) => render(exam),
///     None => not_found(),
/// }
/// ```
#[async_trait]
pub trait ExamReader: Send + Sync {
    /// Look up an exam snapshot by id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` when the backing store cannot be queried.
    async fn find_by_id(&self, id: &ExamId) -> Result<Option<Exam>, DomainError>;
}
