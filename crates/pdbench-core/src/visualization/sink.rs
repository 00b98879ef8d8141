use crate::core::chains::ChainId;
use crate::core::geometry::phi_psi;
use crate::core::io::pdb::{PdbResidue, PdbStructure, ResidueKey};
use crate::core::residues::ALPHABET;
use crate::engine::error::BenchError;
use crate::engine::pool::ModelName;
use crate::engine::scoring::{ModelScore, ResidueOutcome};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Scored residues of one chain, as handed to structure and torsion renderers.
pub type ChainOutcomes = (ChainId, Vec<ResidueOutcome>);

/// Receives rendering requests for a comparison run.
pub trait VisualizationSink {
    fn summary(&mut self, model: &ModelName, score: &ModelScore) -> Result<(), BenchError>;

    fn structure(
        &mut self,
        model: &ModelName,
        pdb_code: &str,
        outcomes: &[ChainOutcomes],
    ) -> Result<(), BenchError>;

    fn torsions(&mut self, model: &ModelName, outcomes: &[ChainOutcomes])
    -> Result<(), BenchError>;

    fn comparison(&mut self, models: &[(ModelName, ModelScore)]) -> Result<(), BenchError>;
}

#[derive(Debug, Serialize)]
struct SummaryRow {
    residue: String,
    correct: usize,
    total: usize,
    recall: Option<f64>,
}

#[derive(Debug, Serialize)]
struct TorsionRow {
    chain: String,
    residue_number: isize,
    native: char,
    predicted: char,
    phi: Option<f64>,
    psi: Option<f64>,
}

/// Writes every artifact as a file under one output directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    pdb_dir: PathBuf,
    assemblies_dir: PathBuf,
}

fn artifact_error(path: &Path, err: impl ToString) -> BenchError {
    BenchError::Artifact {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

impl ReportWriter {
    pub fn new(output_dir: PathBuf, pdb_dir: PathBuf, assemblies_dir: PathBuf) -> Self {
        Self {
            output_dir,
            pdb_dir,
            assemblies_dir,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn prepare(&self, file_name: String) -> Result<PathBuf, BenchError> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(self.output_dir.join(file_name))
    }

    fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), BenchError> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| artifact_error(path, e))?;
        for row in rows {
            writer.serialize(row).map_err(|e| artifact_error(path, e))?;
        }
        writer.flush().map_err(|e| artifact_error(path, e))?;
        Ok(())
    }

    /// Backbone source for torsions: the biological assembly if present, else the PDB entry.
    fn torsion_structure(&self, pdb_code: &str) -> Result<PdbStructure, BenchError> {
        let assembly = self.assemblies_dir.join(format!("{}.pdb1", pdb_code));
        let candidates = [
            assembly,
            self.assemblies_dir.join(format!("{}.pdb", pdb_code)),
            self.pdb_dir.join(format!("{}.pdb", pdb_code)),
        ];
        let path = candidates
            .iter()
            .find(|p| p.is_file())
            .ok_or_else(|| BenchError::Structure {
                path: candidates[0].clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound).into(),
            })?;
        debug!(path = ?path, "Reading backbone for torsion angles.");
        PdbStructure::read_from_path(path).map_err(|source| BenchError::Structure {
            path: path.clone(),
            source,
        })
    }
}

fn torsion_rows(
    chain: &ChainId,
    residues: &[PdbResidue],
    outcomes: &[ResidueOutcome],
) -> Vec<TorsionRow> {
    let by_key: HashMap<ResidueKey, &ResidueOutcome> =
        outcomes.iter().map(|o| (o.key, o)).collect();
    let backbone: Vec<_> = residues.iter().map(|r| r.backbone).collect();

    residues
        .iter()
        .zip(phi_psi(&backbone))
        .filter_map(|(residue, (phi, psi))| {
            by_key.get(&residue.key()).map(|outcome| TorsionRow {
                chain: chain.to_string(),
                residue_number: residue.number,
                native: outcome.native,
                predicted: outcome.predicted,
                phi,
                psi,
            })
        })
        .collect()
}

impl VisualizationSink for ReportWriter {
    fn summary(&mut self, model: &ModelName, score: &ModelScore) -> Result<(), BenchError> {
        let path = self.prepare(format!("{}_summary.csv", model))?;
        let mut rows: Vec<SummaryRow> = score
            .recall_by_residue()
            .into_iter()
            .map(|(code, recall)| {
                let (correct, total) = score.per_residue.get(&code).copied().unwrap_or((0, 0));
                SummaryRow {
                    residue: code.to_string(),
                    correct,
                    total,
                    recall,
                }
            })
            .collect();
        rows.push(SummaryRow {
            residue: "overall".to_string(),
            correct: score.correct,
            total: score.total,
            recall: Some(score.accuracy()),
        });
        Self::write_rows(&path, &rows)?;
        info!(model = %model, path = ?path, "Wrote model summary.");
        Ok(())
    }

    fn structure(
        &mut self,
        model: &ModelName,
        pdb_code: &str,
        outcomes: &[ChainOutcomes],
    ) -> Result<(), BenchError> {
        let source = self.pdb_dir.join(format!("{}.pdb", pdb_code));
        let structure =
            PdbStructure::read_from_path(&source).map_err(|e| BenchError::Structure {
                path: source.clone(),
                source: e,
            })?;

        let mut values = HashMap::new();
        for (chain, chain_outcomes) in outcomes {
            let (_, letter) = chain.split()?;
            for outcome in chain_outcomes {
                let value = if outcome.is_correct() { 1.0 } else { 0.0 };
                values.insert((letter, outcome.key), value);
            }
        }
        if values.is_empty() {
            warn!(model = %model, pdb = pdb_code, "No scored residues for structure; all B-factors are zero.");
        }

        let path = self.prepare(format!("{}_{}.pdb", model, pdb_code))?;
        fs::write(&path, structure.render_with_bfactors(&values))
            .map_err(|e| artifact_error(&path, e))?;
        info!(model = %model, path = ?path, "Wrote accuracy-coloured structure.");
        Ok(())
    }

    fn torsions(
        &mut self,
        model: &ModelName,
        outcomes: &[ChainOutcomes],
    ) -> Result<(), BenchError> {
        let mut structures: HashMap<String, PdbStructure> = HashMap::new();
        let mut rows = Vec::new();

        for (chain, chain_outcomes) in outcomes {
            let (code, letter) = chain.split()?;
            if !structures.contains_key(&code) {
                let structure = self.torsion_structure(&code)?;
                structures.insert(code.clone(), structure);
            }
            let residues = match structures.get(&code).map(|s| s.chain(letter)) {
                Some(Ok(residues)) => residues,
                _ => {
                    warn!(chain = %chain, "Chain missing from torsion source structure, skipping.");
                    continue;
                }
            };
            rows.extend(torsion_rows(chain, residues, chain_outcomes));
        }

        let path = self.prepare(format!("{}_torsions.csv", model))?;
        Self::write_rows(&path, &rows)?;
        info!(model = %model, rows = rows.len(), path = ?path, "Wrote torsion table.");
        Ok(())
    }

    fn comparison(&mut self, models: &[(ModelName, ModelScore)]) -> Result<(), BenchError> {
        let path = self.prepare("comparison.csv".to_string())?;
        let mut writer = csv::Writer::from_path(&path).map_err(|e| artifact_error(&path, e))?;

        let mut header = vec!["model".to_string(), "accuracy".to_string()];
        header.extend(ALPHABET.iter().map(|c| c.to_string()));
        writer
            .write_record(&header)
            .map_err(|e| artifact_error(&path, e))?;

        for (model, score) in models {
            let mut record = vec![model.to_string(), format!("{:.4}", score.accuracy())];
            record.extend(
                score
                    .recall_by_residue()
                    .into_iter()
                    .map(|(_, recall)| recall.map(|r| format!("{:.4}", r)).unwrap_or_default()),
            );
            writer
                .write_record(&record)
                .map_err(|e| artifact_error(&path, e))?;
        }
        writer.flush().map_err(|e| artifact_error(&path, e))?;
        info!(models = models.len(), path = ?path, "Wrote model comparison.");
        Ok(())
    }
}
