use crate::core::chains::{CHAIN_ID_LEN, ChainId};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Failed to read domain file '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid domain record on line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },
}

/// Residue-number segments of structural domains, grouped by chain.
///
/// Each record reads `<domain id> <start>-<end>[,<start>-<end>...]`, where the first five
/// characters of the domain id (e.g. `1a2bA01`) name the chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainBoundaries {
    segments: HashMap<ChainId, Vec<(isize, isize)>>,
}

fn parse_segment(segment: &str) -> Option<(isize, isize)> {
    let split_at = segment.get(1..)?.find('-')? + 1;
    let (start, end) = segment.split_at(split_at);
    let start: isize = start.trim().parse().ok()?;
    let end: isize = end.get(1..)?.trim().parse().ok()?;
    (start <= end).then_some((start, end))
}

impl DomainBoundaries {
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let mut boundaries = Self::default();
        for (idx, line) in text.lines().enumerate() {
            let line_num = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let mut tokens = trimmed.split_whitespace();
            let domain_id = tokens.next().unwrap_or_default();
            let chain = domain_id
                .get(..CHAIN_ID_LEN)
                .map(ChainId::new)
                .ok_or_else(|| DomainError::InvalidRecord {
                    line: line_num,
                    reason: format!("domain id '{}' is shorter than a chain id", domain_id),
                })?;
            let ranges = tokens.next().ok_or_else(|| DomainError::InvalidRecord {
                line: line_num,
                reason: "missing segment list".to_string(),
            })?;

            let entry = boundaries.segments.entry(chain).or_default();
            for segment in ranges.split(',') {
                let parsed = parse_segment(segment).ok_or_else(|| DomainError::InvalidRecord {
                    line: line_num,
                    reason: format!("invalid segment '{}'", segment),
                })?;
                entry.push(parsed);
            }
        }
        Ok(boundaries)
    }

    pub fn load(path: &Path) -> Result<Self, DomainError> {
        let content = fs::read_to_string(path).map_err(|e| DomainError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let boundaries = Self::parse(&content)?;
        debug!(path = ?path, chains = boundaries.segments.len(), "Loaded domain boundaries.");
        Ok(boundaries)
    }

    pub fn has_chain(&self, chain: &ChainId) -> bool {
        self.segments.contains_key(chain)
    }

    pub fn contains(&self, chain: &ChainId, residue_number: isize) -> bool {
        self.segments.get(chain).is_some_and(|segments| {
            segments
                .iter()
                .any(|&(start, end)| (start..=end).contains(&residue_number))
        })
    }
}
