use crate::core::chains::{ChainId, ListKind, read_chain_list};
use crate::core::io::domains::DomainBoundaries;
use crate::core::io::prediction::{DatasetMap, PredictionMatrix};
use crate::engine::config::{CompareConfig, ConfigError};
use crate::engine::error::BenchError;
use crate::engine::pool::{ModelName, ModelPool};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::scoring::{AccuracyScorer, GroundTruth, ModelScore};
use crate::engine::selection::{AccuracyRecord, rank, select};
use crate::visualization::requests::{VisualizationRequest, parse_structure_map, plan_requests};
use crate::visualization::sink::{ChainOutcomes, VisualizationSink};
use std::collections::BTreeMap;
use std::fs;
use tracing::{debug, info, instrument, warn};

/// Name under which reference sequences appear in every report.
pub const REFERENCE_MODEL_NAME: &str = "EvoEF2";

#[derive(Debug, Clone, PartialEq)]
pub struct CompareReport {
    /// Every scored model, best first, reference included.
    pub ranking: Vec<AccuracyRecord>,
    /// Models shown in the comparison, in report order.
    pub selected: Vec<ModelName>,
    pub artifacts: usize,
}

struct ScoredModel<'a> {
    matrix: &'a PredictionMatrix,
    score: ModelScore,
    ignore_uncommon: bool,
}

/// Parses a must-include list: one model name or prediction file name per line, blank
/// lines skipped.
pub fn parse_model_list(text: &str) -> Vec<ModelName> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ModelName::from_listing)
        .collect()
}

fn outcomes_for<'c>(
    scorer: &AccuracyScorer<'_>,
    matrix: &PredictionMatrix,
    chains: impl Iterator<Item = &'c ChainId>,
) -> Vec<ChainOutcomes> {
    chains
        .map(|chain| (chain.clone(), scorer.chain_outcomes(matrix, chain)))
        .collect()
}

/// Scores every model of the pool, selects the models to compare and renders the report.
///
/// Selection happens before anything is written, so an invalid must-include list leaves
/// the output directory untouched.
#[instrument(skip_all, name = "compare_workflow")]
pub fn run<S: VisualizationSink>(
    config: &CompareConfig,
    sink: &mut S,
    reporter: &ProgressReporter,
) -> Result<CompareReport, BenchError> {
    let inputs = &config.inputs;

    // === Phase 1: Inputs ===
    reporter.report(Progress::PhaseStart {
        name: "Loading inputs",
    });
    let dataset = read_chain_list(&inputs.dataset, ListKind::Plain)?;
    let map = DatasetMap::load(&inputs.dataset_map)?;
    let domains = config
        .scoring
        .domain_file
        .as_deref()
        .map(DomainBoundaries::load)
        .transpose()?;
    let must_include = inputs
        .include_file
        .as_deref()
        .map(|path| fs::read_to_string(path).map(|text| parse_model_list(&text)))
        .transpose()?;
    let structures = inputs
        .structures_file
        .as_deref()
        .map(|path| fs::read_to_string(path).map(|text| parse_structure_map(&text)))
        .transpose()?;

    let truth = GroundTruth::load(
        &dataset,
        &inputs.pdb_dir,
        config.scoring.mode,
        domains.as_ref(),
    )?;
    let pool = ModelPool::<PredictionMatrix>::load_dir(&inputs.models_dir, &map)?;
    if pool.is_empty() {
        warn!(dir = ?inputs.models_dir, "No model files found; the report will be empty.");
    }

    let reference = match inputs.reference_dir.as_deref() {
        Some(dir) => {
            if pool.contains(REFERENCE_MODEL_NAME) {
                return Err(ConfigError::InvalidValue {
                    parameter: "path_to_evoef",
                    reason: format!(
                        "the model directory already holds a model named '{}'",
                        REFERENCE_MODEL_NAME
                    ),
                }
                .into());
            }
            let chains = map.entries().iter().map(|(chain, _)| chain);
            Some(PredictionMatrix::load_sequences(dir, chains)?)
        }
        None => None,
    };
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Scoring ===
    reporter.report(Progress::PhaseStart { name: "Scoring" });
    let scorer = AccuracyScorer::from_config(&truth, &config.scoring);
    let total_models = pool.len() + usize::from(reference.is_some());
    reporter.report(Progress::TaskStart {
        total_steps: total_models as u64,
    });

    let mut scored: BTreeMap<ModelName, ScoredModel<'_>> = BTreeMap::new();
    let mut records = Vec::with_capacity(pool.len());
    for (name, matrix) in pool.iter() {
        let score = scorer.score(matrix);
        debug!(model = %name, accuracy = score.accuracy(), "Scored model.");
        records.push(AccuracyRecord::new(score.accuracy(), name.clone()));
        scored.insert(
            name.clone(),
            ScoredModel {
                matrix,
                score,
                ignore_uncommon: config.scoring.ignore_uncommon,
            },
        );
        reporter.increment(name.as_str());
    }

    let reference_name = ModelName::from(REFERENCE_MODEL_NAME);
    let mut ranking = records.clone();
    if let Some(matrix) = &reference {
        // Designed sequences never contain uncommon residues.
        let score = scorer.with_ignore_uncommon(true).score(matrix);
        debug!(accuracy = score.accuracy(), "Scored reference model.");
        ranking.push(AccuracyRecord::new(score.accuracy(), reference_name.clone()));
        scored.insert(
            reference_name.clone(),
            ScoredModel {
                matrix,
                score,
                ignore_uncommon: true,
            },
        );
        reporter.increment(REFERENCE_MODEL_NAME);
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Selection ===
    let selection = select(
        &pool,
        &records,
        reference.as_ref().map(|matrix| (reference_name.clone(), matrix)),
        must_include.as_deref(),
    )?;

    // === Phase 4: Reporting ===
    let requests = plan_requests(
        pool.names(),
        structures.as_ref(),
        config.torsions,
        reference.as_ref().map(|_| &reference_name),
    );
    reporter.report(Progress::PhaseStart { name: "Reporting" });
    reporter.report(Progress::TaskStart {
        total_steps: requests.len() as u64 + 1,
    });

    for request in &requests {
        let model = scored.get(request.model()).ok_or_else(|| {
            BenchError::Internal(format!("no score recorded for '{}'", request.model()))
        })?;
        let model_scorer = scorer.with_ignore_uncommon(model.ignore_uncommon);
        match request {
            VisualizationRequest::Summary { model: name } => sink.summary(name, &model.score)?,
            VisualizationRequest::Structure {
                model: name,
                pdb_code,
            } => {
                let chains = truth.iter().map(|(chain, _)| chain).filter(|chain| {
                    chain
                        .split()
                        .is_ok_and(|(code, _)| code.as_str() == pdb_code.as_str())
                });
                let outcomes = outcomes_for(&model_scorer, model.matrix, chains);
                sink.structure(name, pdb_code, &outcomes)?
            }
            VisualizationRequest::Torsions { model: name } => {
                let chains = truth.iter().map(|(chain, _)| chain);
                let outcomes = outcomes_for(&model_scorer, model.matrix, chains);
                sink.torsions(name, &outcomes)?
            }
        }
        reporter.increment(request.to_string());
    }

    let comparison = selection
        .iter()
        .map(|entry| {
            scored
                .get(&entry.name)
                .map(|model| (entry.name.clone(), model.score.clone()))
                .ok_or_else(|| {
                    BenchError::Internal(format!("selected model '{}' was never scored", entry.name))
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    sink.comparison(&comparison)?;
    reporter.increment("comparison");
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let ranking = rank(&ranking).into_iter().rev().cloned().collect();
    let selected = selection.iter().map(|entry| entry.name.clone()).collect();
    info!(
        models = pool.len(),
        artifacts = requests.len() + 1,
        "Comparison finished."
    );

    Ok(CompareReport {
        ranking,
        selected,
        artifacts: requests.len() + 1,
    })
}
