//! Option propagation over a finished graph.
//!
//! Every recipe starts from its own defaults. Any node (or the root) that
//! reaches a package may force one of its options with `"Pkg:option"`; when
//! several do, the declaration nearest to the root wins and ties go to the
//! first declarer in discovery order.

use std::collections::{BTreeMap, HashMap};

use crane_core::recipe::{OptionOverride, Recipe};
use crane_core::reference::Reference;
use crane_util::errors::{CraneError, CraneResult};
use petgraph::graph::NodeIndex;

use crate::conflict::{Override, OverrideKind, OverrideReport};
use crate::graph::ResolutionGraph;

/// Effective option values per package.
pub type OptionValues = BTreeMap<Reference, BTreeMap<String, String>>;

/// Someone who forces option values downstream.
struct Declarer<'a> {
    node: NodeIndex,
    depth: usize,
    overrides: &'a [OptionOverride],
}

/// Compute the effective options of every package in `graph`.
///
/// `recipes` must hold the recipe of every package node. Invalid overrides
/// (unknown option, value not allowed) fail with `RecipeEvaluation`.
pub fn propagate(
    graph: &ResolutionGraph,
    recipes: &HashMap<Reference, Recipe>,
    root_overrides: &[OptionOverride],
    report: &mut OverrideReport,
) -> CraneResult<OptionValues> {
    let depths = graph.depths();
    let depth_of = |idx: NodeIndex| depths.get(&idx).copied().unwrap_or(usize::MAX);

    let downstream: HashMap<&Reference, Vec<OptionOverride>> = recipes
        .iter()
        .map(|(reference, recipe)| (reference, recipe.downstream_options()))
        .collect();

    let mut declarers = vec![Declarer {
        node: graph.root(),
        depth: 0,
        overrides: root_overrides,
    }];
    for reference in graph.packages() {
        let Some(overrides) = downstream.get(reference).filter(|o| !o.is_empty()) else {
            continue;
        };
        let Some(node) = graph.find(reference) else {
            continue;
        };
        declarers.push(Declarer {
            node,
            depth: depth_of(node),
            overrides,
        });
    }
    // stable: discovery order breaks depth ties
    declarers.sort_by_key(|d| d.depth);

    let mut values = OptionValues::new();
    for reference in graph.packages() {
        let recipe = recipes
            .get(reference)
            .ok_or_else(|| CraneError::RecipeNotFound {
                reference: reference.to_string(),
            })?;
        let Some(node) = graph.find(reference) else {
            continue;
        };

        let mut effective = recipe.own_defaults();
        for (option, value) in &effective {
            check(recipe, reference, option, value)?;
        }

        let mut winners: BTreeMap<&str, &str> = BTreeMap::new();
        for declarer in &declarers {
            if declarer.node == node || !graph.reaches(declarer.node, node) {
                continue;
            }
            for o in declarer.overrides.iter().filter(|o| o.package == reference.name()) {
                check(recipe, reference, &o.option, &o.value)?;
                let Some(selected) = winners.get(o.option.as_str()).copied() else {
                    winners.insert(&o.option, &o.value);
                    continue;
                };
                if selected != o.value {
                    report.add(Override {
                        package: reference.name().to_string(),
                        consumer: graph.node(declarer.node).to_string(),
                        kind: OverrideKind::Option {
                            option: o.option.clone(),
                            requested: o.value.clone(),
                            selected: selected.to_string(),
                        },
                    });
                }
            }
        }

        for (option, value) in winners {
            tracing::debug!(package = %reference, option, value, "option forced downstream");
            effective.insert(option.to_string(), value.to_string());
        }
        values.insert(reference.clone(), effective);
    }
    Ok(values)
}

fn check(recipe: &Recipe, reference: &Reference, option: &str, value: &str) -> CraneResult<()> {
    recipe
        .validate_option(option, value)
        .map_err(|message| CraneError::RecipeEvaluation {
            reference: reference.to_string(),
            message,
        })
}
