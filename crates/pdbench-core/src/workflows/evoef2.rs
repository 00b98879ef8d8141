use crate::core::chains::{ChainId, ListKind, read_chain_list};
use crate::engine::config::EvoEf2Config;
use crate::engine::error::BenchError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, error, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const TOOL_NAME: &str = "EvoEF2";
/// File EvoEF2 writes the lowest-energy designed sequence to.
pub const DESIGN_OUTPUT_FILE: &str = "bestseq.txt";

/// Outcome of an EvoEF2 batch. Failed chains carry the reason they failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvoEf2Summary {
    pub designed: Vec<ChainId>,
    pub failed: Vec<(ChainId, String)>,
}

impl EvoEf2Summary {
    pub fn total(&self) -> usize {
        self.designed.len() + self.failed.len()
    }
}

/// Biological assembly for a PDB code: `<code>.pdb1`, or `<code>.pdb` when no assembly
/// file exists.
pub fn assembly_path(assemblies_dir: &Path, pdb_code: &str) -> Option<PathBuf> {
    [
        assemblies_dir.join(format!("{}.pdb1", pdb_code)),
        assemblies_dir.join(format!("{}.pdb", pdb_code)),
    ]
    .into_iter()
    .find(|path| path.is_file())
}

fn external(message: String) -> BenchError {
    BenchError::External {
        tool: TOOL_NAME.to_string(),
        message,
    }
}

/// Runs one design job in `<working_dir>/<ChainId>/` and copies the designed sequence to
/// `<working_dir>/<ChainId>.txt`.
fn design_chain(config: &EvoEf2Config, chain: &ChainId) -> Result<PathBuf, BenchError> {
    let (code, letter) = chain.split()?;
    let assembly = assembly_path(&config.assemblies_dir, &code)
        .ok_or_else(|| external(format!("no assembly file found for '{}'", code)))?;

    let job_dir = config.working_dir.join(chain.as_str());
    fs::create_dir_all(&job_dir)?;

    debug!(chain = %chain, assembly = ?assembly, "Launching design job.");
    let output = Command::new(&config.executable)
        .arg("--command=ProteinDesign")
        .arg("--monomer")
        .arg(format!("--design_chains={}", letter))
        .arg(format!("--pdb={}", assembly.display()))
        .current_dir(&job_dir)
        .output()
        .map_err(|e| external(format!("failed to launch '{}': {}", config.executable.display(), e)))?;
    fs::write(job_dir.join(format!("{}.log", chain)), &output.stdout)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(external(format!(
            "exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let designed = job_dir.join(DESIGN_OUTPUT_FILE);
    if !designed.is_file() {
        return Err(external(format!(
            "finished without writing {}",
            DESIGN_OUTPUT_FILE
        )));
    }
    let target = config.working_dir.join(format!("{}.txt", chain));
    fs::copy(&designed, &target)?;
    Ok(target)
}

fn run_job(
    config: &EvoEf2Config,
    chain: &ChainId,
    reporter: &ProgressReporter,
) -> (ChainId, Result<PathBuf, BenchError>) {
    let result = design_chain(config, chain);
    reporter.increment(chain.as_str());
    (chain.clone(), result)
}

#[cfg(feature = "parallel")]
fn run_jobs(
    config: &EvoEf2Config,
    chains: &[ChainId],
    reporter: &ProgressReporter,
) -> Result<Vec<(ChainId, Result<PathBuf, BenchError>)>, BenchError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_processes)
        .build()
        .map_err(|e| BenchError::Internal(format!("failed to start worker pool: {}", e)))?;
    Ok(pool.install(|| {
        chains
            .par_iter()
            .map(|chain| run_job(config, chain, reporter))
            .collect()
    }))
}

#[cfg(not(feature = "parallel"))]
fn run_jobs(
    config: &EvoEf2Config,
    chains: &[ChainId],
    reporter: &ProgressReporter,
) -> Result<Vec<(ChainId, Result<PathBuf, BenchError>)>, BenchError> {
    Ok(chains
        .iter()
        .map(|chain| run_job(config, chain, reporter))
        .collect())
}

/// Designs a sequence for every chain of the dataset with at most `max_processes` EvoEF2
/// processes at a time.
///
/// A failing job is logged and recorded in the summary; it never stops the other jobs.
#[instrument(skip_all, name = "evoef2_workflow")]
pub fn run(config: &EvoEf2Config, reporter: &ProgressReporter) -> Result<EvoEf2Summary, BenchError> {
    config.validate()?;
    let dataset = read_chain_list(&config.dataset, ListKind::Plain)?;

    let mut seen = HashSet::new();
    let chains: Vec<ChainId> = dataset
        .iter()
        .filter(|chain| {
            let first = seen.insert((*chain).clone());
            if !first {
                warn!(chain = %chain, "Duplicate chain in dataset, designing it once.");
            }
            first
        })
        .cloned()
        .collect();

    fs::create_dir_all(&config.working_dir)?;
    info!(
        chains = chains.len(),
        workers = config.max_processes,
        "Starting EvoEF2 design runs."
    );

    reporter.report(Progress::PhaseStart {
        name: "EvoEF2 design",
    });
    reporter.report(Progress::TaskStart {
        total_steps: chains.len() as u64,
    });
    let results = run_jobs(config, &chains, reporter)?;
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let mut summary = EvoEf2Summary::default();
    for (chain, result) in results {
        match result {
            Ok(path) => {
                debug!(chain = %chain, output = ?path, "Design finished.");
                summary.designed.push(chain);
            }
            Err(e) => {
                error!(chain = %chain, error = %e, "Design failed.");
                summary.failed.push((chain, e.to_string()));
            }
        }
    }

    info!(
        designed = summary.designed.len(),
        failed = summary.failed.len(),
        "EvoEF2 runs finished."
    );
    Ok(summary)
}
