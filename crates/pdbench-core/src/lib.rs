//! # PDBench Core Library
//!
//! Benchmarks protein sequence-design models against a held-out set of PDB chains.
//!
//! ## Architectural Philosophy
//!
//! The library follows the same three-layer split as its CLI expects:
//!
//! - **[`core`]: The Foundation.** Chain identifiers, the amino-acid alphabet, backbone
//!   geometry, and the file readers for chain lists, PDB structures, prediction matrices
//!   and domain boundaries.
//!
//! - **[`engine`]: The Logic Core.** Leakage detection between training and testing sets,
//!   the model pool, accuracy scoring, and ranked model selection under the comparison cap.
//!
//! - **[`visualization`]: The Reporting Layer.** Plans which artifacts each model receives
//!   and writes them through a [`visualization::sink::VisualizationSink`].
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures backing each CLI command.

pub mod core;
pub mod engine;
pub mod visualization;
pub mod workflows;
