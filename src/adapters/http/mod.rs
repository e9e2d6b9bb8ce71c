//! HTTP adapters - REST API implementations.
//!
//! - `export` - Download endpoints for single documents and copy archives

pub mod export;

pub use export::{export_router, health_router, ExportAppState};

use std::time::Duration;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Full application router: export endpoints, liveness probe, request
/// tracing and the pre-header timeout.
///
/// The timeout only bounds the time until response headers are produced;
/// a streaming body may outlive it.
pub fn app_router(state: ExportAppState, request_timeout: Duration) -> Router {
    export_router()
        .merge(health_router())
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
