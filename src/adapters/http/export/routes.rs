//! Route configuration for export endpoints.

use axum::routing::get;
use axum::Router;

use super::handlers::{export_pdf, export_zip, health, ExportAppState};

/// Creates the export router.
///
/// Routes:
/// - `GET /:exam_id/pdf` - Single unlabelled document
/// - `GET /:exam_id/zip?quantity=N` - Archive of N labelled copies
pub fn export_router() -> Router<ExportAppState> {
    Router::new()
        .route("/:exam_id/pdf", get(export_pdf))
        .route("/:exam_id/zip", get(export_zip))
}

/// Creates the liveness router (`GET /health`).
pub fn health_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
