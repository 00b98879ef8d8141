use crate::engine::pool::ModelName;
use std::collections::BTreeMap;
use std::fmt;

/// Structures to render per model, as listed in a `<model> <pdb> [<pdb> ...]` file.
pub type StructureMap = BTreeMap<ModelName, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualizationRequest {
    Summary { model: ModelName },
    Structure { model: ModelName, pdb_code: String },
    Torsions { model: ModelName },
}

impl VisualizationRequest {
    pub fn model(&self) -> &ModelName {
        match self {
            Self::Summary { model } | Self::Structure { model, .. } | Self::Torsions { model } => {
                model
            }
        }
    }
}

impl fmt::Display for VisualizationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summary { model } => write!(f, "{} summary", model),
            Self::Structure { model, pdb_code } => write!(f, "{} on {}", model, pdb_code),
            Self::Torsions { model } => write!(f, "{} torsions", model),
        }
    }
}

pub fn parse_structure_map(text: &str) -> StructureMap {
    let mut map = StructureMap::new();
    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        let Some(model) = tokens.next() else {
            continue;
        };
        map.insert(
            ModelName::from_listing(model),
            tokens.map(|code| code.to_lowercase()).collect(),
        );
    }
    map
}

/// Lists the artifacts to render for a comparison run.
///
/// Every pool model gets its structure views (if listed in `structures`), one summary, and
/// one torsion table when `torsions` is set. The reference model is handled after the
/// pool and never receives structure views.
pub fn plan_requests<'a>(
    pool_models: impl IntoIterator<Item = &'a ModelName>,
    structures: Option<&StructureMap>,
    torsions: bool,
    reference: Option<&ModelName>,
) -> Vec<VisualizationRequest> {
    let mut requests = Vec::new();

    for model in pool_models {
        if let Some(codes) = structures.and_then(|map| map.get(model)) {
            requests.extend(codes.iter().map(|code| VisualizationRequest::Structure {
                model: model.clone(),
                pdb_code: code.clone(),
            }));
        }
        requests.push(VisualizationRequest::Summary {
            model: model.clone(),
        });
        if torsions {
            requests.push(VisualizationRequest::Torsions {
                model: model.clone(),
            });
        }
    }

    if let Some(model) = reference {
        requests.push(VisualizationRequest::Summary {
            model: model.clone(),
        });
        if torsions {
            requests.push(VisualizationRequest::Torsions {
                model: model.clone(),
            });
        }
    }

    requests
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models(names: &[&str]) -> Vec<ModelName> {
        names.iter().map(|n| ModelName::from(*n)).collect()
    }

    fn count(requests: &[VisualizationRequest], pred: impl Fn(&VisualizationRequest) -> bool) -> usize {
        requests.iter().filter(|r| pred(r)).count()
    }

    #[test]
    fn every_pool_model_gets_exactly_one_summary() {
        let pool = models(&["a", "b", "c"]);
        let requests = plan_requests(&pool, None, false, None);

        assert_eq!(requests.len(), 3);
        for model in &pool {
            assert_eq!(
                count(&requests, |r| matches!(r, VisualizationRequest::Summary { model: m } if m == model)),
                1
            );
        }
    }

    #[test]
    fn structure_requests_follow_the_structure_map() {
        let pool = models(&["a", "b"]);
        let structures = parse_structure_map("a 1ABC 2def\nunknown 3ghi\n");

        let requests = plan_requests(&pool, Some(&structures), false, None);

        let structure_requests: Vec<(&str, &str)> = requests
            .iter()
            .filter_map(|r| match r {
                VisualizationRequest::Structure { model, pdb_code } => {
                    Some((model.as_str(), pdb_code.as_str()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(structure_requests, vec![("a", "1abc"), ("a", "2def")]);
    }

    #[test]
    fn torsion_flag_adds_one_request_per_model() {
        let pool = models(&["a", "b"]);

        let with = plan_requests(&pool, None, true, None);
        let without = plan_requests(&pool, None, false, None);

        assert_eq!(
            count(&with, |r| matches!(r, VisualizationRequest::Torsions { .. })),
            2
        );
        assert_eq!(
            count(&without, |r| matches!(r, VisualizationRequest::Torsions { .. })),
            0
        );
    }

    #[test]
    fn reference_gets_summary_and_torsions_outside_the_pool() {
        let pool = models(&["a"]);
        let reference = ModelName::from("EvoEF2");
        let structures = parse_structure_map("EvoEF2 1abc\n");

        let requests = plan_requests(&pool, Some(&structures), true, Some(&reference));

        assert_eq!(
            &requests[2..],
            &[
                VisualizationRequest::Summary {
                    model: reference.clone()
                },
                VisualizationRequest::Torsions {
                    model: reference.clone()
                },
            ]
        );
        assert!(
            requests
                .iter()
                .all(|r| !matches!(r, VisualizationRequest::Structure { .. }))
        );
    }

    #[test]
    fn parse_structure_map_skips_blank_lines() {
        let map = parse_structure_map("\nmodel_a 1abc\n\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map[&ModelName::from("model_a")], vec!["1abc".to_string()]);
    }

    #[test]
    fn parse_structure_map_drops_file_extension_from_model() {
        let map = parse_structure_map("prodconn.csv 1ABC 2def\n");
        assert_eq!(
            map[&ModelName::from("prodconn")],
            vec!["1abc".to_string(), "2def".to_string()]
        );
    }
}
