use super::pool::{ModelName, ModelPool};
use thiserror::Error;
use tracing::{debug, info};

/// Hard limit on how many models a comparison report can show.
pub const MAX_COMPARED_MODELS: usize = 8;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SelectionError {
    #[error(
        "Too many models are given to plot ({count}), select no more than {max} models.",
        max = MAX_COMPARED_MODELS
    )]
    TooManyModels { count: usize },

    #[error("Model '{0}' requested for comparison is not in the model pool")]
    UnknownModel(ModelName),
}

/// Overall accuracy of one model.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyRecord {
    pub accuracy: f64,
    pub model: ModelName,
}

impl AccuracyRecord {
    pub fn new(accuracy: f64, model: ModelName) -> Self {
        Self { accuracy, model }
    }
}

/// Returns the records sorted ascending by accuracy, ties broken by model name.
pub fn rank(records: &[AccuracyRecord]) -> Vec<&AccuracyRecord> {
    let mut ranked: Vec<&AccuracyRecord> = records.iter().collect();
    ranked.sort_by(|a, b| {
        a.accuracy
            .total_cmp(&b.accuracy)
            .then_with(|| a.model.cmp(&b.model))
    });
    ranked
}

#[derive(Debug, PartialEq)]
pub struct SelectedModel<'a, M> {
    pub name: ModelName,
    pub model: &'a M,
}

impl<M> Clone for SelectedModel<'_, M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            model: self.model,
        }
    }
}

/// The ordered, capped set of models handed to the comparison report.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSet<'a, M> {
    entries: Vec<SelectedModel<'a, M>>,
}

impl<'a, M> SelectionSet<'a, M> {
    pub fn iter(&self) -> std::slice::Iter<'_, SelectedModel<'a, M>> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[SelectedModel<'a, M>] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&ModelName> {
        self.entries.iter().map(|e| &e.name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position_of(&self, name: &ModelName) -> Option<usize> {
        self.entries.iter().position(|e| &e.name == name)
    }
}

/// Picks the models to compare.
///
/// The best-scoring models fill the selection, best first, up to [`MAX_COMPARED_MODELS`]
/// (one slot fewer when a `reference` is given, which is then appended as the last entry
/// whatever its accuracy). Each name in `must_include` that is not already selected
/// replaces the entry at its own index in the list, reference included.
pub fn select<'a, M>(
    pool: &'a ModelPool<M>,
    scores: &[AccuracyRecord],
    reference: Option<(ModelName, &'a M)>,
    must_include: Option<&[ModelName]>,
) -> Result<SelectionSet<'a, M>, SelectionError> {
    let cap = if reference.is_some() {
        MAX_COMPARED_MODELS - 1
    } else {
        MAX_COMPARED_MODELS
    };

    let ranked = rank(scores);
    let mut entries: Vec<SelectedModel<'a, M>> = ranked
        .iter()
        .rev()
        .filter_map(|record| {
            let found = pool.get_key_value(record.model.as_str());
            if found.is_none() {
                debug!(model = %record.model, "Scored model is not in the pool, skipping.");
            }
            found
        })
        .take(cap)
        .map(|(name, model)| SelectedModel {
            name: name.clone(),
            model,
        })
        .collect();

    if let Some((name, model)) = reference {
        entries.push(SelectedModel { name, model });
    }
    let mut selection = SelectionSet { entries };

    if let Some(names) = must_include {
        if names.len() > MAX_COMPARED_MODELS {
            return Err(SelectionError::TooManyModels { count: names.len() });
        }
        for (index, name) in names.iter().enumerate() {
            if selection.position_of(name).is_some() {
                continue;
            }
            let (key, model) = pool
                .get_key_value(name.as_str())
                .ok_or_else(|| SelectionError::UnknownModel(name.clone()))?;
            let entry = SelectedModel {
                name: key.clone(),
                model,
            };
            match selection.entries.get_mut(index) {
                Some(slot) => {
                    debug!(model = %name, replaced = %slot.name, index, "Forcing model into comparison.");
                    *slot = entry;
                }
                None => selection.entries.push(entry),
            }
        }
    }

    info!(
        selected = selection.len(),
        models = ?selection.names(),
        "Selected models for comparison."
    );
    Ok(selection)
}
