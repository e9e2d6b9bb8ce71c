//! Exam snapshot read from the exam-management subsystem.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ExamId, ValidationError};

/// A named, ordered collection of question prompts to be printed.
///
/// This is a read-only snapshot: the export pipeline never mutates it, and
/// it is shared across the copies of a batch behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    id: ExamId,
    title: String,
    questions: Vec<String>,
}

impl Exam {
    /// Creates an exam snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyField` if the title is blank. An exam
    /// without questions is a valid snapshot; refusing to export it is the
    /// caller's decision.
    pub fn new(
        id: ExamId,
        title: impl Into<String>,
        questions: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        Ok(Self {
            id,
            title,
            questions,
        })
    }

    pub fn id(&self) -> &ExamId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Question prompts in their original order.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
