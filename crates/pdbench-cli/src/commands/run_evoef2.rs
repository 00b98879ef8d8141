use crate::cli::RunEvoef2Args;
use crate::config::PartialConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use pdbench::{engine::progress::ProgressReporter, workflows};
use tracing::{info, warn};

pub fn run(args: RunEvoef2Args, progress_handler: CliProgressHandler) -> Result<()> {
    let partial_config = PartialConfig::load(args.config.as_deref())?;
    let config = partial_config.merge_evoef2(&args)?;
    info!(
        "Running EvoEF2 from {:?} with up to {} processes",
        &config.executable, config.max_processes
    );

    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let summary = workflows::evoef2::run(&config, &reporter)?;

    println!(
        "✓ Designed {} of {} chain(s); sequences written to: {}",
        summary.designed.len(),
        summary.total(),
        config.working_dir.display()
    );
    if !summary.failed.is_empty() {
        warn!("{} EvoEF2 run(s) failed.", summary.failed.len());
        println!("Failed chains:");
        for (chain, reason) in &summary.failed {
            println!("  {}: {}", chain, reason);
        }
    }
    Ok(())
}
