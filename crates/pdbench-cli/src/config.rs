use crate::cli::{CompareArgs, RunEvoef2Args};
use crate::error::{CliError, Result};
use pdbench::engine::config::{
    self as core_config, CompareConfig, CompareConfigBuilder, EvoEf2Config, ScoringMode,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialScoringConfig {
    #[serde(rename = "by-chain")]
    by_chain: Option<bool>,
    #[serde(rename = "ignore-uncommon")]
    ignore_uncommon: Option<bool>,
    #[serde(rename = "domain-file")]
    domain_file: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputConfig {
    torsions: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialEvoEf2Config {
    #[serde(rename = "max-processes")]
    max_processes: Option<usize>,
    executable: Option<PathBuf>,
}

/// Settings read from a TOML file. Every key is optional; command-line flags win.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    scoring: Option<PartialScoringConfig>,
    output: Option<PartialOutputConfig>,
    evoef2: Option<PartialEvoEf2Config>,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads `path` when given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_compare(self, args: &CompareArgs) -> Result<CompareConfig> {
        let scoring = self.scoring.unwrap_or_default();
        let output = self.output.unwrap_or_default();

        let by_chain = args.by_chain || scoring.by_chain.unwrap_or(false);
        let mode = if by_chain {
            ScoringMode::ByChain
        } else {
            ScoringMode::ByFragment
        };

        CompareConfigBuilder::new()
            .dataset(args.dataset.clone())
            .pdb_dir(args.path_to_pdb.clone())
            .assemblies_dir(args.path_to_assemblies.clone())
            .models_dir(args.path_to_models.clone())
            .dataset_map(args.path_to_dataset_map.clone())
            .reference_dir(args.path_to_evoef.clone())
            .include_file(args.include.clone())
            .structures_file(args.pdbs.clone())
            .domain_file(args.domain_file.clone().or(scoring.domain_file))
            .scoring_mode(mode)
            .ignore_uncommon(args.ignore_uncommon || scoring.ignore_uncommon.unwrap_or(false))
            .torsions(args.torsions || output.torsions.unwrap_or(false))
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn merge_evoef2(self, args: &RunEvoef2Args) -> Result<EvoEf2Config> {
        let evoef2 = self.evoef2.unwrap_or_default();

        let executable = args
            .path_to_evoef2
            .clone()
            .or(evoef2.executable)
            .ok_or_else(|| {
                CliError::Config(
                    "A value for 'path-to-evoef2' is required either in the config file or via CLI argument."
                        .to_string(),
                )
            })?;
        let max_processes = args
            .max_processes
            .or(evoef2.max_processes)
            .unwrap_or(core_config::DEFAULT_MAX_PROCESSES);

        let config = EvoEf2Config {
            dataset: args.dataset.clone(),
            assemblies_dir: args.path_to_assemblies.clone(),
            working_dir: args.working_dir.clone(),
            executable,
            max_processes,
        };
        config
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;
        Ok(config)
    }
}
