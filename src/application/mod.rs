//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::export::{
    BatchExport, BatchSummary, ExportBatchCommand, ExportExamError, ExportExamHandler,
    ExportPhase, ExportSingleCommand, ResponseMetadata, SingleExport,
};
