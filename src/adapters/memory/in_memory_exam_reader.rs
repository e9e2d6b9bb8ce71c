//! In-memory implementation of `ExamReader`.
//!
//! Backs tests and local runs without a database. Exams are inserted up
//! front and handed out as clones, so callers never observe each other's
//! snapshots.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::exam::Exam;
use crate::domain::foundation::{DomainError, ErrorCode, ExamId};
use crate::ports::ExamReader;

/// Exam store keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryExamReader {
    exams: RwLock<HashMap<ExamId, Exam>>,
}

impl InMemoryExamReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reader pre-loaded with `exams`.
    pub fn with_exams(exams: impl IntoIterator<Item = Exam>) -> Self {
        let map = exams
            .into_iter()
            .map(|exam| (exam.id().clone(), exam))
            .collect();
        Self {
            exams: RwLock::new(map),
        }
    }

    /// Adds or replaces an exam.
    pub fn insert(&self, exam: Exam) -> Result<(), DomainError> {
        let mut exams = self
            .exams
            .write()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "Exam store lock poisoned"))?;
        exams.insert(exam.id().clone(), exam);
        Ok(())
    }
}

#[async_trait]
impl ExamReader for InMemoryExamReader {
    async fn find_by_id(&self, id: &ExamId) -> Result<Option<Exam>, DomainError> {
        let exams = self
            .exams
            .read()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "Exam store lock poisoned"))?;
        Ok(exams.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exam(id: &str, questions: &[&str]) -> Exam {
        Exam::new(
            ExamId::new(id).unwrap(),
            "Prova",
            questions.iter().map(|q| q.to_string()).collect(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn finds_inserted_exam() {
        let reader = InMemoryExamReader::with_exams([exam("exam-1", &["Q1", "Q2"])]);

        let found = reader
            .find_by_id(&ExamId::new("exam-1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.questions(), &["Q1".to_string(), "Q2".to_string()]);
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let reader = InMemoryExamReader::new();
        let found = reader.find_by_id(&ExamId::new("missing").unwrap()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn insert_replaces_existing_exam() {
        let reader = InMemoryExamReader::with_exams([exam("exam-1", &["old"])]);
        reader.insert(exam("exam-1", &["new"])).unwrap();

        let found = reader
            .find_by_id(&ExamId::new("exam-1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.questions(), &["new".to_string()]);
    }
}
