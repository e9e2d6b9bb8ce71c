//! Domain layer - Exam snapshots, copy labels and shared primitives.
//!
//! Pure types with no I/O. Everything that talks to a database, renders
//! bytes or speaks HTTP lives behind the ports in `crate::ports`.

pub mod exam;
pub mod foundation;
