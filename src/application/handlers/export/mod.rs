//! Export handlers - single document and multi-copy archive exports.

mod export_exam;

pub use export_exam::{
    BatchExport, BatchSummary, ExportBatchCommand, ExportExamError, ExportExamHandler,
    ExportPhase, ExportSingleCommand, ResponseMetadata, SingleExport,
};
