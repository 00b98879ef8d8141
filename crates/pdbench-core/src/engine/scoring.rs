use super::config::{ScoringConfig, ScoringMode};
use super::error::BenchError;
use crate::core::chains::{ChainId, ChainSet};
use crate::core::io::domains::DomainBoundaries;
use crate::core::io::pdb::{PdbResidue, PdbStructure, ResidueKey};
use crate::core::io::prediction::{PredictionMatrix, most_likely_residue};
use crate::core::residues::{ALPHABET, UNCOMMON};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Native residues of one benchmark chain and which of them count towards accuracy.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainTruth {
    pub residues: Vec<PdbResidue>,
    pub scored: Vec<bool>,
}

/// Ground-truth sequences for every chain of the benchmark set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundTruth {
    chains: BTreeMap<ChainId, ChainTruth>,
}

impl GroundTruth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, chain: ChainId, truth: ChainTruth) {
        self.chains.insert(chain, truth);
    }

    pub fn chain(&self, chain: &ChainId) -> Option<&ChainTruth> {
        self.chains.get(chain)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChainId, &ChainTruth)> {
        self.chains.iter()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Reads `<pdb_dir>/<code>.pdb` for every chain of `dataset`.
    ///
    /// In fragment mode only residues inside the chain's domains are scored; chains
    /// absent from the domain file are kept but contribute nothing.
    #[instrument(skip_all, name = "ground_truth_loading")]
    pub fn load(
        dataset: &ChainSet,
        pdb_dir: &Path,
        mode: ScoringMode,
        domains: Option<&DomainBoundaries>,
    ) -> Result<Self, BenchError> {
        let domains = match (mode, domains) {
            (ScoringMode::ByFragment, Some(domains)) => Some(domains),
            (ScoringMode::ByFragment, None) => {
                warn!("Fragment scoring requested without a domain file; scoring full chains.");
                None
            }
            (ScoringMode::ByChain, _) => None,
        };

        let mut structures: HashMap<String, PdbStructure> = HashMap::new();
        let mut truth = Self::new();

        for chain_id in dataset {
            let (code, chain_letter) = chain_id.split()?;
            let path = pdb_dir.join(format!("{}.pdb", code));
            let structure = match structures.entry(code) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let structure = PdbStructure::read_from_path(&path).map_err(|source| {
                        BenchError::Structure {
                            path: path.clone(),
                            source,
                        }
                    })?;
                    entry.insert(structure)
                }
            };
            let residues = structure
                .chain(chain_letter)
                .map_err(|source| BenchError::Structure { path, source })?
                .to_vec();

            let scored = match domains {
                Some(domains) => {
                    if !domains.has_chain(chain_id) {
                        warn!(chain = %chain_id, "Chain has no domain boundaries; excluded from scoring.");
                    }
                    residues
                        .iter()
                        .map(|r| domains.contains(chain_id, r.number))
                        .collect()
                }
                None => vec![true; residues.len()],
            };
            debug!(chain = %chain_id, residues = residues.len(), "Loaded ground truth.");
            truth.insert(chain_id.clone(), ChainTruth { residues, scored });
        }

        info!(chains = truth.len(), "Ground truth ready.");
        Ok(truth)
    }
}

/// Outcome of one scored residue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidueOutcome {
    pub key: ResidueKey,
    pub native: char,
    pub predicted: char,
}

impl ResidueOutcome {
    pub fn is_correct(&self) -> bool {
        self.native == self.predicted
    }
}

/// Correct/total counts, overall and per native amino acid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelScore {
    pub correct: usize,
    pub total: usize,
    pub per_residue: BTreeMap<char, (usize, usize)>,
}

impl ModelScore {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    /// Recall for each letter of the alphabet; letters never seen natively give `None`.
    pub fn recall_by_residue(&self) -> Vec<(char, Option<f64>)> {
        ALPHABET
            .iter()
            .map(|code| {
                let recall = self
                    .per_residue
                    .get(code)
                    .filter(|(_, total)| *total > 0)
                    .map(|(correct, total)| *correct as f64 / *total as f64);
                (*code, recall)
            })
            .collect()
    }

    fn record(&mut self, outcome: &ResidueOutcome) {
        let counts = self.per_residue.entry(outcome.native).or_default();
        counts.1 += 1;
        self.total += 1;
        if outcome.is_correct() {
            counts.0 += 1;
            self.correct += 1;
        }
    }
}

/// Scores prediction matrices against a [`GroundTruth`].
pub struct AccuracyScorer<'a> {
    truth: &'a GroundTruth,
    ignore_uncommon: bool,
}

impl<'a> AccuracyScorer<'a> {
    pub fn new(truth: &'a GroundTruth, ignore_uncommon: bool) -> Self {
        Self {
            truth,
            ignore_uncommon,
        }
    }

    pub fn from_config(truth: &'a GroundTruth, config: &ScoringConfig) -> Self {
        Self::new(truth, config.ignore_uncommon)
    }

    pub fn with_ignore_uncommon(&self, ignore_uncommon: bool) -> Self {
        Self::new(self.truth, ignore_uncommon)
    }

    pub fn truth(&self) -> &'a GroundTruth {
        self.truth
    }

    /// Per-residue outcomes of the scored residues of one chain.
    ///
    /// Returns an empty list when the model has no prediction for the chain.
    pub fn chain_outcomes(
        &self,
        prediction: &PredictionMatrix,
        chain: &ChainId,
    ) -> Vec<ResidueOutcome> {
        let (Some(truth), Some(rows)) = (self.truth.chain(chain), prediction.chain(chain)) else {
            return Vec::new();
        };
        if rows.len() != truth.residues.len() {
            warn!(
                chain = %chain,
                predicted = rows.len(),
                native = truth.residues.len(),
                "Prediction length differs from structure; scoring the common prefix."
            );
        }

        truth
            .residues
            .iter()
            .zip(truth.scored.iter())
            .zip(rows.iter())
            .filter(|((_, scored), _)| **scored)
            .filter(|((residue, _), _)| !(self.ignore_uncommon && residue.code == UNCOMMON))
            .map(|((residue, _), row)| ResidueOutcome {
                key: residue.key(),
                native: residue.code,
                predicted: most_likely_residue(row),
            })
            .collect()
    }

    pub fn score(&self, prediction: &PredictionMatrix) -> ModelScore {
        let mut score = ModelScore::default();
        for (chain, _) in self.truth.iter() {
            if prediction.chain(chain).is_none() {
                debug!(chain = %chain, "No prediction for chain.");
                continue;
            }
            for outcome in self.chain_outcomes(prediction, chain) {
                score.record(&outcome);
            }
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::BackboneAtoms;
    use crate::core::io::prediction::ProbabilityRow;
    use crate::core::residues::alphabet_index;
    use std::fs;
    use tempfile::tempdir;

    fn residue(number: isize, code: char) -> PdbResidue {
        PdbResidue {
            number,
            insertion_code: ' ',
            name: String::new(),
            code,
            backbone: BackboneAtoms::default(),
        }
    }

    fn row(code: char) -> ProbabilityRow {
        let mut row = [0.0; 20];
        if let Some(idx) = alphabet_index(code) {
            row[idx] = 1.0;
        }
        row
    }

    fn truth_for(sequence: &str, scored: Vec<bool>) -> GroundTruth {
        let mut truth = GroundTruth::new();
        truth.insert(
            ChainId::new("1ABCA"),
            ChainTruth {
                residues: sequence
                    .chars()
                    .enumerate()
                    .map(|(i, c)| residue(i as isize + 1, c))
                    .collect(),
                scored,
            },
        );
        truth
    }

    fn prediction_for(sequence: &str) -> PredictionMatrix {
        let mut matrix = PredictionMatrix::new();
        matrix.insert(ChainId::new("1ABCA"), sequence.chars().map(row).collect());
        matrix
    }

    #[test]
    fn score_counts_matching_residues() {
        let truth = truth_for("MKVL", vec![true; 4]);
        let score = AccuracyScorer::new(&truth, false).score(&prediction_for("MKAA"));
        assert_eq!(score.correct, 2);
        assert_eq!(score.total, 4);
        assert!((score.accuracy() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn score_respects_fragment_mask() {
        let truth = truth_for("MKVL", vec![true, true, false, false]);
        let score = AccuracyScorer::new(&truth, false).score(&prediction_for("MKAA"));
        assert_eq!(score.total, 2);
        assert!((score.accuracy() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ignore_uncommon_removes_nonstandard_residues_from_denominator() {
        let truth = truth_for("MXK", vec![true; 3]);
        let prediction = prediction_for("MAK");

        let strict = AccuracyScorer::new(&truth, false).score(&prediction);
        let lenient = AccuracyScorer::new(&truth, true).score(&prediction);

        assert_eq!(strict.total, 3);
        assert_eq!(lenient.total, 2);
        assert!((lenient.accuracy() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_chain_prediction_contributes_nothing() {
        let truth = truth_for("MK", vec![true; 2]);
        let score = AccuracyScorer::new(&truth, false).score(&PredictionMatrix::new());
        assert_eq!(score.total, 0);
        assert_eq!(score.accuracy(), 0.0);
    }

    #[test]
    fn recall_by_residue_reports_every_letter() {
        let truth = truth_for("MMK", vec![true; 3]);
        let score = AccuracyScorer::new(&truth, false).score(&prediction_for("MAK"));
        let recall: BTreeMap<char, Option<f64>> = score.recall_by_residue().into_iter().collect();

        assert_eq!(recall.len(), 20);
        assert_eq!(recall[&'M'], Some(0.5));
        assert_eq!(recall[&'K'], Some(1.0));
        assert_eq!(recall[&'W'], None);
    }

    #[test]
    fn chain_outcomes_carry_residue_keys() {
        let truth = truth_for("MK", vec![true; 2]);
        let outcomes = AccuracyScorer::new(&truth, false)
            .chain_outcomes(&prediction_for("MA"), &ChainId::new("1ABCA"));
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].key, (2, ' '));
        assert!(outcomes[0].is_correct());
        assert!(!outcomes[1].is_correct());
    }

    #[test]
    fn load_reads_structures_and_applies_domains() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("1abc.pdb"),
            "\
ATOM      1  CA  MET A   1       0.000   0.000   0.000  1.00  0.00           C
ATOM      2  CA  LYS A   2       3.800   0.000   0.000  1.00  0.00           C
ATOM      3  CA  VAL A   3       7.600   0.000   0.000  1.00  0.00           C
",
        )
        .unwrap();
        let dataset: ChainSet = [ChainId::new("1abcA")].into_iter().collect();
        let domains = DomainBoundaries::parse("1abcA01 2-3\n").unwrap();

        let by_fragment =
            GroundTruth::load(&dataset, dir.path(), ScoringMode::ByFragment, Some(&domains))
                .unwrap();
        let by_chain =
            GroundTruth::load(&dataset, dir.path(), ScoringMode::ByChain, Some(&domains)).unwrap();

        let chain = ChainId::new("1ABCA");
        assert_eq!(
            by_fragment.chain(&chain).unwrap().scored,
            vec![false, true, true]
        );
        assert_eq!(by_chain.chain(&chain).unwrap().scored, vec![true; 3]);
    }

    #[test]
    fn load_fails_when_structure_is_missing() {
        let dir = tempdir().unwrap();
        let dataset: ChainSet = [ChainId::new("9zzzA")].into_iter().collect();
        let result = GroundTruth::load(&dataset, dir.path(), ScoringMode::ByChain, None);
        assert!(matches!(result, Err(BenchError::Structure { .. })));
    }
}
