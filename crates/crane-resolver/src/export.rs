//! Textual renderings of a resolved graph.

use std::collections::BTreeMap;

use crane_core::recipe::RequirementKind;
use crane_util::errors::{CraneError, CraneResult};
use serde::Serialize;

use crate::graph::ResolutionGraph;
use crate::resolver::Resolution;

/// Every edge as `(parent, child)` display strings, in discovery order.
pub fn edges(graph: &ResolutionGraph) -> Vec<(String, String)> {
    graph
        .edges()
        .into_iter()
        .map(|(from, to, _)| (from.to_string(), to.to_string()))
        .collect()
}

/// Render the graph in dot format, one line per edge.
pub fn to_dot(graph: &ResolutionGraph) -> String {
    let mut out = String::from("digraph {\n");
    for (from, to) in edges(graph) {
        out.push_str(&format!("    \"{}\" -> \"{}\"\n", escape(&from), escape(&to)));
    }
    out.push_str("}\n");
    out
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Serialize)]
struct JsonResolution<'a> {
    root: String,
    nodes: Vec<JsonNode<'a>>,
}

#[derive(Serialize)]
struct JsonNode<'a> {
    reference: String,
    build_requires: Vec<String>,
    requires: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a BTreeMap<String, String>>,
}

/// Render a resolution as pretty-printed JSON: the root display name and, for
/// every package, its direct requirements and effective options.
pub fn to_json(resolution: &Resolution) -> CraneResult<String> {
    let graph = &resolution.graph;
    let nodes = graph
        .packages()
        .into_iter()
        .filter_map(|reference| {
            let idx = graph.find(reference)?;
            let mut build_requires = Vec::new();
            let mut requires = Vec::new();
            for (child, edge) in graph.dependencies_of(idx) {
                let name = graph.node(child).to_string();
                match edge.kind {
                    RequirementKind::Build => build_requires.push(name),
                    RequirementKind::Regular => requires.push(name),
                }
            }
            Some(JsonNode {
                reference: reference.to_string(),
                build_requires,
                requires,
                options: resolution.options_of(reference).filter(|o| !o.is_empty()),
            })
        })
        .collect();

    let doc = JsonResolution {
        root: graph.node(graph.root()).to_string(),
        nodes,
    };
    serde_json::to_string_pretty(&doc).map_err(|e| CraneError::Generic {
        message: format!("Failed to serialize resolution: {e}"),
    })
}
