use crate::core::chains::{ChainId, ChainSet};
use std::collections::HashSet;
use std::fmt;

/// Leakage between a training list and a testing list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapReport {
    /// Testing entries also present in training, in testing order, duplicates kept.
    pub overlap: ChainSet,
    /// Testing entries with every overlapping value removed.
    pub clean: ChainSet,
}

impl OverlapReport {
    pub fn has_overlap(&self) -> bool {
        !self.overlap.is_empty()
    }
}

impl fmt::Display for OverlapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_overlap() {
            return writeln!(f, "There is no overlap between sets.");
        }
        writeln!(f, "{} chains are in both sets:", self.overlap.len())?;
        for chain in &self.overlap {
            writeln!(f, "{}", chain)?;
        }
        writeln!(f, "\n")?;
        writeln!(f, "New benchmarking set:")?;
        for chain in &self.clean {
            writeln!(f, "{}", chain)?;
        }
        Ok(())
    }
}

pub fn resolve(training: &ChainSet, testing: &ChainSet) -> OverlapReport {
    let training_ids: HashSet<&ChainId> = training.iter().collect();

    let overlap: ChainSet = testing
        .iter()
        .filter(|chain| training_ids.contains(chain))
        .cloned()
        .collect();

    let overlap_ids: HashSet<&ChainId> = overlap.iter().collect();
    let clean: ChainSet = testing
        .iter()
        .filter(|chain| !overlap_ids.contains(chain))
        .cloned()
        .collect();

    OverlapReport { overlap, clean }
}
