use crate::cli::CompareArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use pdbench::{
    engine::progress::ProgressReporter, visualization::sink::ReportWriter, workflows,
};
use tracing::{info, warn};

pub fn run(args: CompareArgs, progress_handler: CliProgressHandler) -> Result<()> {
    let partial_config = PartialConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_compare(&args)?;

    let mut writer = ReportWriter::new(
        config.output_dir.clone(),
        config.inputs.pdb_dir.clone(),
        config.inputs.assemblies_dir.clone(),
    );
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Benchmarking models in {}...", config.inputs.models_dir.display());
    let report = workflows::compare::run(&config, &mut writer, &reporter)?;

    if report.ranking.is_empty() {
        warn!("No models were scored.");
        println!("Warning: no models were found to score.");
        return Ok(());
    }

    println!("\n{:<4} {:<32} {:>8}", "Rank", "Model", "Accuracy");
    for (i, record) in report.ranking.iter().enumerate() {
        let marker = if report.selected.contains(&record.model) {
            "*"
        } else {
            " "
        };
        println!(
            "{:<4} {:<32} {:>7.2}%{}",
            i + 1,
            record.model.as_str(),
            record.accuracy * 100.0,
            marker
        );
    }
    println!(
        "\n✓ {} model(s) compared, {} artifact(s) written to: {}",
        report.selected.len(),
        report.artifacts,
        writer.output_dir().display()
    );
    Ok(())
}
