//! PostgreSQL adapters - Database implementations of read ports.
//!
//! - `PostgresExamReader` - Exam and question lookup

mod exam_reader;

pub use exam_reader::PostgresExamReader;
