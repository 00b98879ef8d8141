//! # Engine Module
//!
//! The benchmark logic proper: leakage detection between chain sets, the model pool,
//! accuracy scoring, and ranked selection of models for comparison.
//!
//! - **Leakage** ([`overlap`]) - Overlap between training and testing chain lists
//! - **Model Pool** ([`pool`]) - Named prediction matrices loaded from a model directory
//! - **Scoring** ([`scoring`]) - Per-model accuracy against ground-truth sequences
//! - **Selection** ([`selection`]) - Ranking under the comparison cap with caller overrides
//! - **Configuration** ([`config`]) - Inputs for a comparison run
//! - **Progress Monitoring** ([`progress`]) - Progress events for front-ends
//! - **Error Handling** ([`error`]) - Engine-wide error type

pub mod config;
pub mod error;
pub mod overlap;
pub mod pool;
pub mod progress;
pub mod scoring;
pub mod selection;
