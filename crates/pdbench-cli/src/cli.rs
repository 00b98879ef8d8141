use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Wells Wood Lab",
    version,
    about = "PDBench CLI - Benchmark protein sequence design models against a curated set of PDB chains.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a benchmark set for chains that also appear in a training set.
    CheckSet(CheckSetArgs),
    /// Score every model in a directory and write the comparison report.
    Compare(CompareArgs),
    /// Design a sequence for every benchmark chain with EvoEF2.
    #[command(name = "run-evoef2")]
    RunEvoef2(RunEvoef2Args),
}

/// Arguments for the `check-set` subcommand.
#[derive(Args, Debug)]
pub struct CheckSetArgs {
    /// Benchmark chain list, one PDB code + chain per line (e.g. 1a2bA).
    #[arg(long, required = true, value_name = "PATH")]
    pub dataset: PathBuf,

    /// Training chain list; a PISCES-style header line is skipped.
    #[arg(long, required = true, value_name = "PATH")]
    pub training_set: PathBuf,
}

/// Arguments for the `compare` subcommand.
#[derive(Args, Debug)]
pub struct CompareArgs {
    // --- Inputs ---
    /// Benchmark chain list, one PDB code + chain per line (e.g. 1a2bA).
    #[arg(long, required = true, value_name = "PATH")]
    pub dataset: PathBuf,

    /// Directory with the benchmark PDB files (<code>.pdb).
    #[arg(long, required = true, value_name = "DIR")]
    pub path_to_pdb: PathBuf,

    /// Directory with the biological assemblies (<code>.pdb1).
    #[arg(long, required = true, value_name = "DIR")]
    pub path_to_assemblies: PathBuf,

    /// Directory with one prediction CSV per model.
    #[arg(long, required = true, value_name = "DIR")]
    pub path_to_models: PathBuf,

    /// Chain order and lengths of the rows in every prediction CSV.
    #[arg(long, required = true, value_name = "PATH")]
    pub path_to_dataset_map: PathBuf,

    /// Directory with EvoEF2 designed sequences; adds EvoEF2 to the comparison.
    #[arg(long, value_name = "DIR")]
    pub path_to_evoef: Option<PathBuf>,

    /// Models to force into the comparison, one name per line (at most 8).
    #[arg(long, value_name = "PATH")]
    pub include: Option<PathBuf>,

    /// Structures to render per model: `<model> <pdb> [<pdb> ...]` per line.
    #[arg(long, value_name = "PATH")]
    pub pdbs: Option<PathBuf>,

    // --- Scoring Overrides ---
    /// Score whole chains instead of their structural domains.
    #[arg(long)]
    pub by_chain: bool,

    /// Leave uncommon residues out of the accuracy.
    #[arg(long)]
    pub ignore_uncommon: bool,

    /// Domain boundary file used for per-domain scoring.
    #[arg(long, value_name = "PATH")]
    pub domain_file: Option<PathBuf>,

    // --- Output ---
    /// Also write per-residue backbone torsion tables.
    #[arg(long)]
    pub torsions: bool,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `run-evoef2` subcommand.
#[derive(Args, Debug)]
pub struct RunEvoef2Args {
    /// Benchmark chain list, one PDB code + chain per line (e.g. 1a2bA).
    #[arg(long, required = true, value_name = "PATH")]
    pub dataset: PathBuf,

    /// Directory with the biological assemblies (<code>.pdb1).
    #[arg(long, required = true, value_name = "DIR")]
    pub path_to_assemblies: PathBuf,

    /// Directory where designed sequences are stored.
    #[arg(long, required = true, value_name = "DIR")]
    pub working_dir: PathBuf,

    /// Path to the EvoEF2 executable.
    #[arg(long, value_name = "PATH")]
    pub path_to_evoef2: Option<PathBuf>,

    /// Maximum number of EvoEF2 processes running at once [default: 8].
    #[arg(long, value_name = "NUM")]
    pub max_processes: Option<usize>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::parse_from([
            "pdbench",
            "check-set",
            "--dataset",
            "set.txt",
            "--training-set",
            "train.txt",
            "-vv",
            "--log-file",
            "run.log",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_file, Some(PathBuf::from("run.log")));
        assert!(matches!(cli.command, Commands::CheckSet(_)));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["pdbench", "-q", "-v", "check-set", "--dataset", "a", "--training-set", "b"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_evoef2_uses_kebab_case_name() {
        let cli = Cli::parse_from([
            "pdbench",
            "run-evoef2",
            "--dataset",
            "set.txt",
            "--path-to-assemblies",
            "assemblies",
            "--working-dir",
            "work",
            "--max-processes",
            "4",
        ]);
        let Commands::RunEvoef2(args) = cli.command else {
            panic!("Expected 'run-evoef2' subcommand");
        };
        assert_eq!(args.max_processes, Some(4));
        assert_eq!(args.path_to_evoef2, None);
    }
}
