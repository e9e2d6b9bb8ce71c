//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Upper bound on identifier length accepted from the outside world.
pub const MAX_EXAM_ID_LEN: usize = 128;

/// Identifier of an exam owned by the exam-management subsystem.
///
/// Exam identifiers are opaque strings (for example `"exam-id-123"`); this
/// crate never interprets their structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExamId(String);

impl ExamId {
    /// Creates a new ExamId, returning error if empty or oversized.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("exam_id"));
        }
        let len = id.chars().count();
        if len > MAX_EXAM_ID_LEN {
            return Err(ValidationError::too_long("exam_id", MAX_EXAM_ID_LEN, len));
        }
        if id.chars().any(char::is_control) {
            return Err(ValidationError::invalid_format(
                "exam_id",
                "control characters are not allowed",
            ));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExamId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ExamId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExamId> for String {
    fn from(id: ExamId) -> Self {
        id.0
    }
}
