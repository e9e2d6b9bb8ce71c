//! Data Transfer Objects for export endpoints.

use serde::{Deserialize, Serialize};

/// Query string of `GET /:exam_id/zip`.
///
/// `quantity` stays a raw string so malformed values reach the handler and
/// get the export's own error body instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub quantity: Option<String>,
}

/// Error body returned before any document byte is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Liveness probe body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_serializes_to_single_field() {
        let json = serde_json::to_string(&ErrorResponse::new("Exam not found.")).unwrap();
        assert_eq!(json, r#"{"error":"Exam not found."}"#);
    }

    #[test]
    fn export_query_keeps_raw_quantity() {
        let query: ExportQuery = serde_json::from_str(r#"{"quantity": "abc"}"#).unwrap();
        assert_eq!(query.quantity.as_deref(), Some("abc"));

        let query: ExportQuery = serde_json::from_str("{}").unwrap();
        assert!(query.quantity.is_none());
    }
}
