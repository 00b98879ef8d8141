use crate::core::io::prediction::{DatasetMap, PredictionError, PredictionMatrix};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extension of the files that make up a model pool.
pub const MODEL_FILE_EXTENSION: &str = "csv";

/// Label of a candidate model: the stem of its prediction file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelName(String);

impl ModelName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .map(|stem| Self(stem.to_string()))
    }

    /// Name as written in an include or structure list. Entries may carry the prediction
    /// file's `.csv` extension, which is dropped.
    pub fn from_listing(entry: &str) -> Self {
        let suffix = format!(".{}", MODEL_FILE_EXTENSION);
        let name = entry.strip_suffix(suffix.as_str()).unwrap_or(entry);
        Self(name.to_string())
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl Borrow<str> for ModelName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Candidate models keyed by name, iterated in name order.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPool<M = PredictionMatrix> {
    models: BTreeMap<ModelName, M>,
}

impl<M> Default for ModelPool<M> {
    fn default() -> Self {
        Self {
            models: BTreeMap::new(),
        }
    }
}

impl<M> ModelPool<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: ModelName, model: M) -> Option<M> {
        self.models.insert(name, model)
    }

    pub fn get(&self, name: &str) -> Option<&M> {
        self.models.get(name)
    }

    pub fn get_key_value(&self, name: &str) -> Option<(&ModelName, &M)> {
        self.models.get_key_value(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &ModelName> {
        self.models.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModelName, &M)> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl<M> FromIterator<(ModelName, M)> for ModelPool<M> {
    fn from_iter<I: IntoIterator<Item = (ModelName, M)>>(iter: I) -> Self {
        Self {
            models: iter.into_iter().collect(),
        }
    }
}

/// Files directly inside `dir` whose extension marks them as prediction files, sorted.
pub fn model_files(dir: &Path) -> Result<Vec<PathBuf>, PredictionError> {
    let io_err = |e| PredictionError::Io {
        path: dir.to_path_buf(),
        source: e,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_model = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == MODEL_FILE_EXTENSION);
        if is_model {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

impl ModelPool<PredictionMatrix> {
    /// Loads every prediction file in `dir`, laid out according to `map`.
    pub fn load_dir(dir: &Path, map: &DatasetMap) -> Result<Self, PredictionError> {
        let mut pool = Self::new();
        for path in model_files(dir)? {
            let Some(name) = ModelName::from_path(&path) else {
                debug!(path = ?path, "Skipping model file with a non UTF-8 name.");
                continue;
            };
            let matrix = PredictionMatrix::load_csv(&path, map)?;
            pool.insert(name, matrix);
        }
        info!(dir = ?dir, models = pool.len(), "Loaded model pool.");
        Ok(pool)
    }
}
