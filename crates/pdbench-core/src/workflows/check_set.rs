use crate::core::chains::{ListKind, read_chain_list};
use crate::engine::config::require_existing;
use crate::engine::error::BenchError;
use crate::engine::overlap::{OverlapReport, resolve};
use std::path::Path;
use tracing::{info, instrument};

/// Compares a benchmark list with a training list and returns the leakage report.
///
/// The training list may start with a PISCES-style header line; the benchmark list is
/// read verbatim.
#[instrument(skip_all, name = "check_set_workflow")]
pub fn run(dataset: &Path, training_set: &Path) -> Result<OverlapReport, BenchError> {
    require_existing("dataset", dataset)?;
    require_existing("training_set", training_set)?;

    let training = read_chain_list(training_set, ListKind::HeaderDetect)?;
    let testing = read_chain_list(dataset, ListKind::Plain)?;
    info!(
        training = training.len(),
        testing = testing.len(),
        "Loaded chain lists."
    );

    let report = resolve(&training, &testing);
    info!(
        overlap = report.overlap.len(),
        clean = report.clean.len(),
        "Overlap check finished."
    );
    Ok(report)
}
