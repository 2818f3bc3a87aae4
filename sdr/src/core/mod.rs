//! Deterministic, pure logic shared by the pipeline.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests.

pub mod address;
pub mod campaign;
pub mod cleanup;
pub mod spec;
pub mod types;
