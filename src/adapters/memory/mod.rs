//! In-memory adapters for tests and database-less runs.

mod in_memory_exam_reader;

pub use in_memory_exam_reader::InMemoryExamReader;
