//! PostgreSQL implementation of ExamReader.
//!
//! The exam header and its questions are read inside one read-only
//! `REPEATABLE READ` transaction, so both queries see the same snapshot.
//! Questions are returned ordered by their authored position.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::exam::Exam;
use crate::domain::foundation::{DomainError, ErrorCode, ExamId};
use crate::ports::ExamReader;

/// PostgreSQL implementation of the ExamReader port.
///
/// # Schema
///
/// - `exams(id TEXT PRIMARY KEY, title TEXT)`
/// - `exam_questions(exam_id TEXT, position INT, prompt TEXT)`
#[derive(Clone)]
pub struct PostgresExamReader {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresExamReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresExamReader")
            .field("pool", &"PgPool")
            .finish()
    }
}

impl PostgresExamReader {
    /// Creates a new reader instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ExamRow {
    id: String,
    title: String,
}

#[derive(Debug, sqlx::FromRow)]
struct QuestionRow {
    prompt: String,
}

#[async_trait]
impl ExamReader for PostgresExamReader {
    async fn find_by_id(&self, id: &ExamId) -> Result<Option<Exam>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("Failed to start transaction: {}", e)))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::database(format!("Failed to set isolation: {}", e)))?;

        let row = sqlx::query_as::<_, ExamRow>(
            r#"
            SELECT id, title
            FROM exams
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Database error: {}", e)))?;

        let row = match row {
            Some(r) => r,
            None => return Ok(None),
        };

        let questions = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT prompt
            FROM exam_questions
            WHERE exam_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(&row.id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Database error: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database(format!("Failed to commit transaction: {}", e)))?;

        exam_from_rows(row, questions).map(Some)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Row mapping
// ════════════════════════════════════════════════════════════════════════════════

fn exam_from_rows(row: ExamRow, questions: Vec<QuestionRow>) -> Result<Exam, DomainError> {
    let exam_id = ExamId::new(row.id.as_str()).map_err(|e| {
        DomainError::new(ErrorCode::ValidationFailed, format!("Invalid exam id: {}", e))
    })?;

    Exam::new(
        exam_id,
        row.title,
        questions.into_iter().map(|q| q.prompt).collect(),
    )
    .map_err(|e| {
        DomainError::new(ErrorCode::ValidationFailed, format!("Stored exam is invalid: {}", e))
            .with_detail("exam_id", row.id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, title: &str) -> ExamRow {
        ExamRow {
            id: id.to_string(),
            title: title.to_string(),
        }
    }

    fn questions(prompts: &[&str]) -> Vec<QuestionRow> {
        prompts
            .iter()
            .map(|p| QuestionRow {
                prompt: p.to_string(),
            })
            .collect()
    }

    #[test]
    fn rows_map_to_exam_keeping_question_order() {
        let exam = exam_from_rows(
            row("exam-id-123", "Prova1_ESS"),
            questions(&["Second authored", "First authored"]),
        )
        .unwrap();

        assert_eq!(exam.id().as_str(), "exam-id-123");
        assert_eq!(exam.title(), "Prova1_ESS");
        assert_eq!(
            exam.questions(),
            &["Second authored".to_string(), "First authored".to_string()]
        );
    }

    #[test]
    fn exam_without_question_rows_maps_to_empty_exam() {
        let exam = exam_from_rows(row("exam-final-vazia", "Prova Final"), Vec::new()).unwrap();
        assert!(exam.questions().is_empty());
    }

    #[test]
    fn blank_stored_id_is_a_validation_failure() {
        let err = exam_from_rows(row("  ", "Prova"), Vec::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn blank_stored_title_is_a_validation_failure() {
        let err = exam_from_rows(row("exam-1", "   "), questions(&["Q"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.get("exam_id").map(String::as_str), Some("exam-1"));
    }
}
