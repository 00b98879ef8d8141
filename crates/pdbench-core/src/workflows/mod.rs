//! # Workflows Module
//!
//! End-to-end procedures behind each `pdbench` command. Every workflow validates its
//! inputs before doing any work, reports progress through an
//! [`crate::engine::progress::ProgressReporter`], and returns a plain result value that
//! the caller renders.
//!
//! - **Set check** ([`check_set`]) - leakage between a training list and a benchmark list.
//! - **Comparison** ([`compare`]) - scores a directory of model predictions, picks the
//!   models to compare and writes the report artifacts.
//! - **EvoEF2 runs** ([`evoef2`]) - designs a sequence for every benchmark chain with an
//!   external EvoEF2 executable, in parallel.

pub mod check_set;
pub mod compare;
pub mod evoef2;
