//! Export HTTP adapter - download endpoints for printable exams.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, ExportQuery, HealthResponse};
pub use handlers::{export_pdf, export_zip, health, ExportAppState, ExportApiError};
pub use routes::{export_router, health_router};
