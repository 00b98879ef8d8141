//! Readers and writers for the file formats a benchmark run consumes.
//!
//! Every reader reports failures through its own error type; the engine wraps them into
//! [`crate::engine::error::BenchError`].

pub mod domains;
pub mod pdb;
pub mod prediction;
