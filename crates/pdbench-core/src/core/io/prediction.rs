use crate::core::chains::ChainId;
use crate::core::residues::{ALPHABET, UNCOMMON, alphabet_index};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// One residue's probability over [`ALPHABET`].
pub type ProbabilityRow = [f64; 20];

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("File I/O error for '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}", path = path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("Invalid dataset map entry on line {line}: '{content}'")]
    InvalidMapEntry { line: usize, content: String },
    #[error("Row {row} of '{path}' has {found} columns, expected 20", path = path.display())]
    ColumnCount {
        path: PathBuf,
        row: usize,
        found: usize,
    },
    #[error("Row {row} of '{path}' has a non-numeric value '{value}'", path = path.display())]
    InvalidProbability {
        path: PathBuf,
        row: usize,
        value: String,
    },
    #[error("'{path}' has {found} rows but the dataset map describes {expected}", path = path.display())]
    RowCount {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
}

/// Row layout shared by every prediction file: chains in order with their residue counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetMap {
    entries: Vec<(ChainId, usize)>,
}

impl DatasetMap {
    pub fn parse(text: &str) -> Result<Self, PredictionError> {
        let mut entries = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let mut tokens = line.split_whitespace();
            let Some(chain) = tokens.next() else {
                continue;
            };
            let length = tokens
                .next()
                .and_then(|t| t.parse::<usize>().ok())
                .ok_or_else(|| PredictionError::InvalidMapEntry {
                    line: idx + 1,
                    content: line.to_string(),
                })?;
            entries.push((ChainId::new(chain), length));
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self, PredictionError> {
        let content = fs::read_to_string(path).map_err(|e| PredictionError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    pub fn entries(&self) -> &[(ChainId, usize)] {
        &self.entries
    }

    pub fn total_rows(&self) -> usize {
        self.entries.iter().map(|(_, len)| len).sum()
    }
}

/// Per-chain residue probabilities predicted by one model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionMatrix {
    chains: BTreeMap<ChainId, Vec<ProbabilityRow>>,
}

impl PredictionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, chain: ChainId, rows: Vec<ProbabilityRow>) {
        self.chains.insert(chain, rows);
    }

    pub fn chain(&self, chain: &ChainId) -> Option<&[ProbabilityRow]> {
        self.chains.get(chain).map(Vec::as_slice)
    }

    pub fn chains(&self) -> impl Iterator<Item = &ChainId> {
        self.chains.keys()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Most likely residue per row; rows with no positive probability yield `X`.
    pub fn most_likely_sequence(&self, chain: &ChainId) -> Option<String> {
        self.chain(chain)
            .map(|rows| rows.iter().map(most_likely_residue).collect())
    }

    /// Reads a headerless CSV whose rows follow the order of `map`.
    pub fn load_csv(path: &Path, map: &DatasetMap) -> Result<Self, PredictionError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| PredictionError::Csv {
                path: path.to_path_buf(),
                source: e,
            })?;

        let mut rows = Vec::with_capacity(map.total_rows());
        for (row_idx, result) in reader.records().enumerate() {
            let record = result.map_err(|e| PredictionError::Csv {
                path: path.to_path_buf(),
                source: e,
            })?;
            if record.len() != ALPHABET.len() {
                return Err(PredictionError::ColumnCount {
                    path: path.to_path_buf(),
                    row: row_idx + 1,
                    found: record.len(),
                });
            }
            let mut row: ProbabilityRow = [0.0; 20];
            for (slot, field) in row.iter_mut().zip(record.iter()) {
                *slot = field
                    .parse()
                    .map_err(|_| PredictionError::InvalidProbability {
                        path: path.to_path_buf(),
                        row: row_idx + 1,
                        value: field.to_string(),
                    })?;
            }
            rows.push(row);
        }

        if rows.len() != map.total_rows() {
            return Err(PredictionError::RowCount {
                path: path.to_path_buf(),
                expected: map.total_rows(),
                found: rows.len(),
            });
        }

        let mut matrix = Self::new();
        let mut remaining = rows.into_iter();
        for (chain, length) in map.entries() {
            matrix.insert(chain.clone(), remaining.by_ref().take(*length).collect());
        }
        debug!(path = ?path, chains = matrix.len(), "Loaded prediction matrix.");
        Ok(matrix)
    }

    /// Builds a one-hot matrix from designed sequences stored as `<ChainId>.txt` files.
    ///
    /// Chains without a sequence file are skipped with a warning.
    pub fn load_sequences<'a>(
        dir: &Path,
        chains: impl IntoIterator<Item = &'a ChainId>,
    ) -> Result<Self, PredictionError> {
        let mut matrix = Self::new();
        for chain in chains {
            let path = dir.join(format!("{}.txt", chain));
            if !path.is_file() {
                warn!(chain = %chain, path = ?path, "No designed sequence found for chain, skipping.");
                continue;
            }
            let content = fs::read_to_string(&path).map_err(|e| PredictionError::Io {
                path: path.clone(),
                source: e,
            })?;
            let sequence = content
                .lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .unwrap_or("");
            matrix.insert(chain.clone(), sequence.chars().map(one_hot).collect());
        }
        Ok(matrix)
    }
}

fn one_hot(code: char) -> ProbabilityRow {
    let mut row = [0.0; 20];
    if let Some(idx) = alphabet_index(code) {
        row[idx] = 1.0;
    }
    row
}

/// Residue with the highest probability in `row`. Ties go to the earliest residue in
/// alphabet order; an all-zero row is uncommon.
pub fn most_likely_residue(row: &ProbabilityRow) -> char {
    row.iter()
        .enumerate()
        .filter(|(_, p)| **p > 0.0)
        .fold(None::<(usize, f64)>, |best, (idx, &p)| match best {
            Some((_, best_p)) if p.total_cmp(&best_p).is_le() => best,
            _ => Some((idx, p)),
        })
        .map(|(idx, _)| ALPHABET[idx])
        .unwrap_or(UNCOMMON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row_for(code: char) -> String {
        let mut values = vec!["0.0"; 20];
        values[alphabet_index(code).unwrap()] = "0.9";
        values.join(",")
    }

    #[test]
    fn dataset_map_parses_entries_and_skips_blank_lines() {
        let map = DatasetMap::parse("1abcA 3\n\n2defB 2\n").unwrap();
        assert_eq!(map.entries().len(), 2);
        assert_eq!(map.entries()[0], (ChainId::new("1ABCA"), 3));
        assert_eq!(map.total_rows(), 5);
    }

    #[test]
    fn dataset_map_rejects_missing_length() {
        let result = DatasetMap::parse("1abcA\n");
        assert!(matches!(
            result,
            Err(PredictionError::InvalidMapEntry { line: 1, .. })
        ));
    }

    #[test]
    fn load_csv_splits_rows_by_dataset_map() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.csv");
        let content = [row_for('M'), row_for('K'), row_for('W')].join("\n");
        fs::write(&path, content).unwrap();

        let map = DatasetMap::parse("1abcA 2\n2defB 1\n").unwrap();
        let matrix = PredictionMatrix::load_csv(&path, &map).unwrap();

        assert_eq!(
            matrix.most_likely_sequence(&ChainId::new("1ABCA")).unwrap(),
            "MK"
        );
        assert_eq!(
            matrix.most_likely_sequence(&ChainId::new("2DEFB")).unwrap(),
            "W"
        );
    }

    #[test]
    fn load_csv_rejects_row_count_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.csv");
        fs::write(&path, row_for('A')).unwrap();

        let map = DatasetMap::parse("1abcA 2\n").unwrap();
        let result = PredictionMatrix::load_csv(&path, &map);
        assert!(matches!(
            result,
            Err(PredictionError::RowCount {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn load_csv_rejects_wrong_column_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.csv");
        fs::write(&path, "0.1,0.2,0.7\n").unwrap();

        let map = DatasetMap::parse("1abcA 1\n").unwrap();
        let result = PredictionMatrix::load_csv(&path, &map);
        assert!(matches!(
            result,
            Err(PredictionError::ColumnCount { found: 3, .. })
        ));
    }

    #[test]
    fn load_sequences_builds_one_hot_rows_and_skips_missing_chains() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("1ABCA.txt"), "\nMKX\n").unwrap();
        let chains = [ChainId::new("1ABCA"), ChainId::new("2DEFB")];

        let matrix = PredictionMatrix::load_sequences(dir.path(), &chains).unwrap();

        assert_eq!(matrix.len(), 1);
        assert_eq!(
            matrix.most_likely_sequence(&chains[0]).unwrap(),
            "MKX"
        );
    }

    #[test]
    fn most_likely_residue_picks_highest_probability() {
        let mut row = [0.01; 20];
        row[alphabet_index('Y').unwrap()] = 0.5;
        assert_eq!(most_likely_residue(&row), 'Y');
        assert_eq!(most_likely_residue(&[0.0; 20]), UNCOMMON);
    }

    #[test]
    fn most_likely_residue_breaks_ties_towards_first_residue() {
        assert_eq!(most_likely_residue(&[0.05; 20]), 'A');

        let mut row = [0.0; 20];
        row[alphabet_index('K').unwrap()] = 0.4;
        row[alphabet_index('W').unwrap()] = 0.4;
        assert_eq!(most_likely_residue(&row), 'K');
    }
}
