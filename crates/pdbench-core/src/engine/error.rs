use thiserror::Error;

use super::config::ConfigError;
use super::selection::SelectionError;
use crate::core::chains::ChainListError;
use crate::core::io::domains::DomainError;
use crate::core::io::pdb::PdbError;
use crate::core::io::prediction::PredictionError;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Chain list error: {0}")]
    ChainList(#[from] ChainListError),

    #[error("Structure error for '{path}': {source}", path = path.display())]
    Structure {
        path: PathBuf,
        #[source]
        source: PdbError,
    },

    #[error("Prediction error: {0}")]
    Prediction(#[from] PredictionError),

    #[error("Domain boundary error: {0}")]
    Domain(#[from] DomainError),

    #[error("Model selection failed: {0}")]
    Selection(#[from] SelectionError),

    #[error("Failed to write artifact '{path}': {message}", path = path.display())]
    Artifact { path: PathBuf, message: String },

    #[error("External tool '{tool}' failed: {message}")]
    External { tool: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
