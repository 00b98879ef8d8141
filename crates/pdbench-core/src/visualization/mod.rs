//! # Visualization Module
//!
//! Decides which report artifacts each model receives and hands them to a sink.
//!
//! - **Planning** ([`requests`]) - Which summaries, structure views and torsion tables to produce
//! - **Rendering** ([`sink`]) - The [`sink::VisualizationSink`] seam and the file-based writer

pub mod requests;
pub mod sink;
