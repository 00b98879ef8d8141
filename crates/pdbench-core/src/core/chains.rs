use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Length of a canonical identifier: four-character PDB code plus one chain letter.
pub const CHAIN_ID_LEN: usize = 5;

#[derive(Debug, Error)]
pub enum ChainListError {
    #[error("Failed to read chain list '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed chain identifier '{0}': expected a 4-character PDB code and a chain letter")]
    Malformed(String),
}

/// A PDB chain identifier such as `1A2BA`, uppercase-normalized.
///
/// Identifiers are compared by exact string equality after normalization. Construction
/// does not enforce the canonical length; use [`ChainId::is_canonical`] or
/// [`ChainId::split`] where a well-formed identifier is required.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim_end_matches(['\r', '\n']).to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_canonical(&self) -> bool {
        self.0.chars().count() == CHAIN_ID_LEN
    }

    /// Splits the identifier into its lowercase PDB code and chain letter.
    pub fn split(&self) -> Result<(String, char), ChainListError> {
        if !self.is_canonical() || !self.0.is_ascii() {
            return Err(ChainListError::Malformed(self.0.clone()));
        }
        let (code, chain) = self.0.split_at(CHAIN_ID_LEN - 1);
        let chain = chain
            .chars()
            .next()
            .ok_or_else(|| ChainListError::Malformed(self.0.clone()))?;
        Ok((code.to_lowercase(), chain))
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// An ordered list of chain identifiers.
///
/// Insertion order and duplicates are kept as read from the source, so the same value
/// serves both as a report and as a membership-testable collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainSet {
    chains: Vec<ChainId>,
}

impl ChainSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chain: ChainId) {
        self.chains.push(chain);
    }

    pub fn contains(&self, chain: &ChainId) -> bool {
        self.chains.contains(chain)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChainId> {
        self.chains.iter()
    }

    pub fn as_slice(&self) -> &[ChainId] {
        &self.chains
    }
}

impl FromIterator<ChainId> for ChainSet {
    fn from_iter<I: IntoIterator<Item = ChainId>>(iter: I) -> Self {
        Self {
            chains: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ChainSet {
    type Item = &'a ChainId;
    type IntoIter = std::slice::Iter<'a, ChainId>;

    fn into_iter(self) -> Self::IntoIter {
        self.chains.iter()
    }
}

impl IntoIterator for ChainSet {
    type Item = ChainId;
    type IntoIter = std::vec::IntoIter<ChainId>;

    fn into_iter(self) -> Self::IntoIter {
        self.chains.into_iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// One identifier per line, every record is data.
    Plain,
    /// The first record is a column header (PISCES-style) when its token is not
    /// exactly [`CHAIN_ID_LEN`] characters long.
    HeaderDetect,
}

/// Extracts the identifier from one line of a chain list.
///
/// Only the first whitespace-delimited token is used; blank lines yield `None`.
pub fn normalize_line(line: &str) -> Option<ChainId> {
    line.split_whitespace().next().map(ChainId::new)
}

pub fn parse_chain_list(text: &str, kind: ListKind) -> ChainSet {
    let mut chains: Vec<ChainId> = text.lines().filter_map(normalize_line).collect();

    if kind == ListKind::HeaderDetect {
        if let Some(first) = chains.first() {
            if first.as_str().chars().count() != CHAIN_ID_LEN {
                debug!(header = %first, "Discarding header record from chain list.");
                chains.remove(0);
            }
        }
    }

    ChainSet { chains }
}

pub fn read_chain_list(path: &Path, kind: ListKind) -> Result<ChainSet, ChainListError> {
    let content = fs::read_to_string(path).map_err(|e| ChainListError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let chains = parse_chain_list(&content, kind);
    debug!(path = ?path, count = chains.len(), "Loaded chain list.");
    Ok(chains)
}
