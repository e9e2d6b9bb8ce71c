//! Exam Export - Streaming printable-exam downloads
//!
//! This crate renders an exam as a printable PDF, either as a single
//! unlabelled document or as a ZIP archive of numbered copies, and streams
//! the result to HTTP clients without buffering whole files.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
