use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the directory, inside the model directory, that receives report artifacts.
pub const REPORT_DIR_NAME: &str = "report";
pub const DEFAULT_MAX_PROCESSES: usize = 8;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Path given for '{parameter}' does not exist: {path}", path = path.display())]
    PathNotFound {
        parameter: &'static str,
        path: PathBuf,
    },

    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// Fails unless `path` exists on disk.
pub fn require_existing(parameter: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        Ok(())
    } else {
        Err(ConfigError::PathNotFound {
            parameter,
            path: path.to_path_buf(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringMode {
    /// Score every residue of each chain.
    ByChain,
    /// Score only residues inside the chain's structural domains.
    #[default]
    ByFragment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub mode: ScoringMode,
    pub ignore_uncommon: bool,
    pub domain_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompareInputs {
    pub dataset: PathBuf,
    pub pdb_dir: PathBuf,
    pub assemblies_dir: PathBuf,
    pub models_dir: PathBuf,
    pub dataset_map: PathBuf,
    pub reference_dir: Option<PathBuf>,
    pub include_file: Option<PathBuf>,
    pub structures_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompareConfig {
    pub inputs: CompareInputs,
    pub scoring: ScoringConfig,
    pub torsions: bool,
    pub output_dir: PathBuf,
}

#[derive(Default)]
pub struct CompareConfigBuilder {
    dataset: Option<PathBuf>,
    pdb_dir: Option<PathBuf>,
    assemblies_dir: Option<PathBuf>,
    models_dir: Option<PathBuf>,
    dataset_map: Option<PathBuf>,
    reference_dir: Option<PathBuf>,
    include_file: Option<PathBuf>,
    structures_file: Option<PathBuf>,
    domain_file: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    mode: Option<ScoringMode>,
    ignore_uncommon: bool,
    torsions: bool,
}

impl CompareConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dataset(mut self, path: PathBuf) -> Self {
        self.dataset = Some(path);
        self
    }
    pub fn pdb_dir(mut self, path: PathBuf) -> Self {
        self.pdb_dir = Some(path);
        self
    }
    pub fn assemblies_dir(mut self, path: PathBuf) -> Self {
        self.assemblies_dir = Some(path);
        self
    }
    pub fn models_dir(mut self, path: PathBuf) -> Self {
        self.models_dir = Some(path);
        self
    }
    pub fn dataset_map(mut self, path: PathBuf) -> Self {
        self.dataset_map = Some(path);
        self
    }
    pub fn reference_dir(mut self, path: Option<PathBuf>) -> Self {
        self.reference_dir = path;
        self
    }
    pub fn include_file(mut self, path: Option<PathBuf>) -> Self {
        self.include_file = path;
        self
    }
    pub fn structures_file(mut self, path: Option<PathBuf>) -> Self {
        self.structures_file = path;
        self
    }
    pub fn domain_file(mut self, path: Option<PathBuf>) -> Self {
        self.domain_file = path;
        self
    }
    pub fn output_dir(mut self, path: Option<PathBuf>) -> Self {
        self.output_dir = path;
        self
    }
    pub fn scoring_mode(mut self, mode: ScoringMode) -> Self {
        self.mode = Some(mode);
        self
    }
    pub fn ignore_uncommon(mut self, ignore: bool) -> Self {
        self.ignore_uncommon = ignore;
        self
    }
    pub fn torsions(mut self, enabled: bool) -> Self {
        self.torsions = enabled;
        self
    }

    /// Assembles the configuration, checking that every supplied input path exists.
    pub fn build(self) -> Result<CompareConfig, ConfigError> {
        let required = |value: Option<PathBuf>, parameter: &'static str| {
            let path = value.ok_or(ConfigError::MissingParameter(parameter))?;
            require_existing(parameter, &path)?;
            Ok::<_, ConfigError>(path)
        };
        let optional = |value: Option<PathBuf>, parameter: &'static str| {
            if let Some(path) = &value {
                require_existing(parameter, path)?;
            }
            Ok::<_, ConfigError>(value)
        };

        let inputs = CompareInputs {
            dataset: required(self.dataset, "dataset")?,
            pdb_dir: required(self.pdb_dir, "path_to_pdb")?,
            assemblies_dir: required(self.assemblies_dir, "path_to_assemblies")?,
            models_dir: required(self.models_dir, "path_to_models")?,
            dataset_map: required(self.dataset_map, "path_to_dataset_map")?,
            reference_dir: optional(self.reference_dir, "path_to_evoef")?,
            include_file: optional(self.include_file, "include")?,
            structures_file: optional(self.structures_file, "pdbs")?,
        };
        let scoring = ScoringConfig {
            mode: self.mode.unwrap_or_default(),
            ignore_uncommon: self.ignore_uncommon,
            domain_file: optional(self.domain_file, "domain_file")?,
        };
        let output_dir = self
            .output_dir
            .unwrap_or_else(|| inputs.models_dir.join(REPORT_DIR_NAME));

        Ok(CompareConfig {
            inputs,
            scoring,
            torsions: self.torsions,
            output_dir,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvoEf2Config {
    pub dataset: PathBuf,
    pub assemblies_dir: PathBuf,
    pub working_dir: PathBuf,
    pub executable: PathBuf,
    pub max_processes: usize,
}

impl EvoEf2Config {
    /// Checks the inputs that must already exist; the working directory is created on demand.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_existing("dataset", &self.dataset)?;
        require_existing("path_to_assemblies", &self.assemblies_dir)?;
        require_existing("path_to_evoef2", &self.executable)?;
        if self.max_processes == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "max_processes",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn populated_builder(dir: &TempDir) -> CompareConfigBuilder {
        let root = dir.path();
        fs::write(root.join("dataset.txt"), "1abcA\n").unwrap();
        fs::write(root.join("map.txt"), "1abcA 1\n").unwrap();
        for sub in ["pdb", "assemblies", "models"] {
            fs::create_dir_all(root.join(sub)).unwrap();
        }
        CompareConfigBuilder::new()
            .dataset(root.join("dataset.txt"))
            .pdb_dir(root.join("pdb"))
            .assemblies_dir(root.join("assemblies"))
            .models_dir(root.join("models"))
            .dataset_map(root.join("map.txt"))
    }

    #[test]
    fn build_applies_defaults() {
        let dir = tempdir().unwrap();
        let config = populated_builder(&dir).build().unwrap();

        assert_eq!(config.scoring.mode, ScoringMode::ByFragment);
        assert!(!config.scoring.ignore_uncommon);
        assert!(!config.torsions);
        assert_eq!(
            config.output_dir,
            dir.path().join("models").join(REPORT_DIR_NAME)
        );
    }

    #[test]
    fn build_fails_on_missing_required_parameter() {
        let result = CompareConfigBuilder::new().build();
        assert_eq!(result, Err(ConfigError::MissingParameter("dataset")));
    }

    #[test]
    fn build_fails_on_nonexistent_required_path() {
        let dir = tempdir().unwrap();
        let result = populated_builder(&dir)
            .pdb_dir(dir.path().join("nowhere"))
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::PathNotFound {
                parameter: "path_to_pdb",
                ..
            })
        ));
    }

    #[test]
    fn build_fails_on_nonexistent_optional_path() {
        let dir = tempdir().unwrap();
        let result = populated_builder(&dir)
            .include_file(Some(dir.path().join("include.txt")))
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::PathNotFound {
                parameter: "include",
                ..
            })
        ));
    }

    #[test]
    fn evoef2_config_rejects_zero_processes() {
        let dir = tempdir().unwrap();
        let dataset = dir.path().join("dataset.txt");
        fs::write(&dataset, "1abcA\n").unwrap();
        let config = EvoEf2Config {
            dataset,
            assemblies_dir: dir.path().to_path_buf(),
            working_dir: dir.path().join("work"),
            executable: dir.path().to_path_buf(),
            max_processes: 0,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                parameter: "max_processes",
                ..
            })
        ));
    }
}
