//! HTTP handlers for export endpoints.
//!
//! Both handlers finish every fallible check before building the response.
//! Once headers are out, failures can only be reported by cutting the body
//! short, so they are logged here and surface to the client as an aborted
//! transfer.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Json, Path, Query, State};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use tracing::Instrument;
use uuid::Uuid;

use crate::adapters::archive::{output_channel, ZipArchiveComposer};
use crate::application::handlers::export::{
    ExportBatchCommand, ExportExamError, ExportExamHandler, ExportSingleCommand, ResponseMetadata,
};
use crate::config::ExportConfig;
use crate::ports::{DocumentRenderer, ExamReader};

use super::dto::{ErrorResponse, ExportQuery, HealthResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
#[derive(Clone)]
pub struct ExportAppState {
    pub exam_reader: Arc<dyn ExamReader>,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub max_copies: u32,
    pub channel_capacity: usize,
}

impl ExportAppState {
    pub fn new(
        exam_reader: Arc<dyn ExamReader>,
        renderer: Arc<dyn DocumentRenderer>,
        config: &ExportConfig,
    ) -> Self {
        Self {
            exam_reader,
            renderer,
            max_copies: config.max_copies,
            channel_capacity: config.channel_capacity,
        }
    }

    pub fn export_handler(&self) -> ExportExamHandler {
        ExportExamHandler::new(
            self.exam_reader.clone(),
            self.renderer.clone(),
            self.max_copies,
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Export Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /:exam_id/pdf - Stream one unlabelled document
pub async fn export_pdf(
    State(state): State<ExportAppState>,
    Path(exam_id): Path<String>,
) -> Result<Response, ExportApiError> {
    let export_id = Uuid::new_v4();
    let span = tracing::info_span!("export", %export_id, %exam_id, mode = "single");

    let handler = state.export_handler();
    let cmd = ExportSingleCommand { exam_id };
    let export = handler.prepare_single(cmd).instrument(span).await?;

    let headers = download_headers(&export.metadata)?;
    let document = export.document.inspect_err(move |err| {
        tracing::error!(%export_id, error = %err, "Document stream failed");
    });

    Ok((StatusCode::OK, headers, Body::from_stream(document)).into_response())
}

/// GET /:exam_id/zip?quantity=N - Stream N labelled copies as one archive
pub async fn export_zip(
    State(state): State<ExportAppState>,
    Path(exam_id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ExportApiError> {
    let export_id = Uuid::new_v4();
    let span = tracing::info_span!("export", %export_id, %exam_id, mode = "batch");

    let handler = state.export_handler();
    let cmd = ExportBatchCommand {
        exam_id,
        quantity: query.quantity,
    };
    let export = handler.prepare_batch(cmd).instrument(span.clone()).await?;

    let headers = download_headers(&export.metadata)?;
    let (channel, body) = output_channel(state.channel_capacity);
    let composer = Box::new(ZipArchiveComposer::new(channel));

    tokio::spawn(
        async move {
            match export.write_to(composer).await {
                Ok(summary) => tracing::info!(
                    copies = summary.copies,
                    bytes = summary.bytes_sent,
                    "Batch export completed"
                ),
                Err(err) if err.is_disconnect() => {
                    tracing::warn!("Client disconnected during batch export")
                }
                Err(err) => tracing::error!(error = %err, "Batch export aborted"),
            }
        }
        .instrument(span),
    );

    Ok((StatusCode::OK, headers, Body::from_stream(body)).into_response())
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::ok())
}

fn download_headers(metadata: &ResponseMetadata) -> Result<HeaderMap, ExportApiError> {
    let disposition = HeaderValue::from_str(&metadata.content_disposition).map_err(|e| {
        ExportApiError::Internal(format!("Invalid Content-Disposition value: {}", e))
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(metadata.content_type()),
    );
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(headers)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts export errors to HTTP responses.
#[derive(Debug)]
pub enum ExportApiError {
    NotFound,
    EmptyExam,
    InvalidQuantity,
    QuantityTooLarge { max: u32 },
    Internal(String),
}

impl From<ExportExamError> for ExportApiError {
    fn from(err: ExportExamError) -> Self {
        match err {
            ExportExamError::NotFound(_) => ExportApiError::NotFound,
            ExportExamError::EmptyExam(_) => ExportApiError::EmptyExam,
            ExportExamError::InvalidQuantity => ExportApiError::InvalidQuantity,
            ExportExamError::QuantityTooLarge { max, .. } => {
                ExportApiError::QuantityTooLarge { max }
            }
            other => ExportApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ExportApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ExportApiError::NotFound => (StatusCode::NOT_FOUND, "Exam not found.".to_string()),
            ExportApiError::EmptyExam => (
                StatusCode::BAD_REQUEST,
                "Cannot export an empty exam.".to_string(),
            ),
            ExportApiError::InvalidQuantity => {
                (StatusCode::BAD_REQUEST, "Invalid quantity.".to_string())
            }
            ExportApiError::QuantityTooLarge { max } => (
                StatusCode::BAD_REQUEST,
                format!("Quantity exceeds the maximum of {} versions.", max),
            ),
            ExportApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Export failed before streaming");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error.".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::DomainError;
    use crate::ports::RenderError;

    #[test]
    fn not_found_maps_to_404() {
        let err: ExportApiError = ExportExamError::NotFound("x".to_string()).into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn quantity_errors_map_to_400() {
        let err: ExportApiError = ExportExamError::InvalidQuantity.into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err: ExportApiError = ExportExamError::QuantityTooLarge {
            requested: 900,
            max: 50,
        }
        .into();
        assert!(matches!(err, ExportApiError::QuantityTooLarge { max: 50 }));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn collaborator_failures_map_to_500() {
        let err: ExportApiError =
            ExportExamError::Lookup(DomainError::database("connection refused")).into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: ExportApiError = ExportExamError::Render(RenderError::internal("boom")).into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn download_headers_are_fixed_from_metadata() {
        let metadata = ResponseMetadata {
            format: crate::ports::ExportFormat::Zip,
            file_name: "Prova_2_versions.zip".to_string(),
            content_disposition: "attachment; filename=\"Prova_2_versions.zip\"".to_string(),
        };
        let headers = download_headers(&metadata).unwrap();

        assert_eq!(headers[header::CONTENT_TYPE], "application/zip");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Prova_2_versions.zip\""
        );
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    }
}
