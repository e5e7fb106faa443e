//! Resolved dependency graph construction and traversal.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crane_core::recipe::RequirementKind;
use crane_core::reference::Reference;
use petgraph::algo::{dijkstra, has_path_connecting};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// A node in the resolved graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphNode {
    /// The virtual consumer node, shown by its external identity (`Crane.toml`).
    Root { display: String },
    /// A concrete, alias-free package.
    Package(Reference),
}

impl GraphNode {
    pub fn reference(&self) -> Option<&Reference> {
        match self {
            GraphNode::Root { .. } => None,
            GraphNode::Package(r) => Some(r),
        }
    }
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphNode::Root { display } => f.write_str(display),
            GraphNode::Package(r) => write!(f, "{r}"),
        }
    }
}

/// Edge label: the requirement category that introduced the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepEdge {
    pub kind: RequirementKind,
}

/// A resolved dependency graph backed by petgraph.
///
/// Nodes are unique per concrete reference and edges unique per
/// (parent, child) pair. Iteration follows insertion order, which the
/// resolver makes equal to depth-first discovery order.
#[derive(Debug, Clone)]
pub struct ResolutionGraph {
    graph: DiGraph<GraphNode, DepEdge>,
    index: HashMap<Reference, NodeIndex>,
    root: NodeIndex,
}

impl ResolutionGraph {
    /// Create a graph holding only the virtual root.
    pub fn new(display: &str) -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(GraphNode::Root {
            display: display.to_string(),
        });
        Self {
            graph,
            index: HashMap::new(),
            root,
        }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Add or retrieve the node for a reference. The flag is `true` when the
    /// node was created by this call.
    pub fn add_node(&mut self, reference: Reference) -> (NodeIndex, bool) {
        if let Some(&idx) = self.index.get(&reference) {
            return (idx, false);
        }
        let idx = self.graph.add_node(GraphNode::Package(reference.clone()));
        self.index.insert(reference, idx);
        (idx, true)
    }

    /// Add an edge unless `from` already points at `to`.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: DepEdge) -> bool {
        if self.graph.edges(from).any(|e| e.target() == to) {
            return false;
        }
        self.graph.add_edge(from, to, edge);
        true
    }

    pub fn find(&self, reference: &Reference) -> Option<NodeIndex> {
        self.index.get(reference).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &GraphNode {
        &self.graph[idx]
    }

    pub fn reference(&self, idx: NodeIndex) -> Option<&Reference> {
        self.graph[idx].reference()
    }

    /// All package references (excluding the root), in discovery order.
    pub fn packages(&self) -> Vec<&Reference> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph[idx].reference())
            .collect()
    }

    /// Direct dependencies of a node, in the order the edges were added.
    pub fn dependencies_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &DepEdge)> {
        self.sorted_edges(idx, Direction::Outgoing)
    }

    /// Reverse dependencies (who requires this node).
    pub fn dependents_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &DepEdge)> {
        self.sorted_edges(idx, Direction::Incoming)
    }

    fn sorted_edges(&self, idx: NodeIndex, dir: Direction) -> Vec<(NodeIndex, &DepEdge)> {
        let mut edges: Vec<(EdgeIndex, NodeIndex, &DepEdge)> = self
            .graph
            .edges_directed(idx, dir)
            .map(|e| {
                let other = match dir {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (e.id(), other, e.weight())
            })
            .collect();
        edges.sort_by_key(|(id, _, _)| *id);
        edges.into_iter().map(|(_, n, w)| (n, w)).collect()
    }

    /// Every edge as `(parent, child, label)`, in insertion order.
    pub fn edges(&self) -> Vec<(&GraphNode, &GraphNode, &DepEdge)> {
        self.graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()], e.weight()))
            .collect()
    }

    /// Shortest distance (in edges) from the root to every reachable node.
    pub fn depths(&self) -> HashMap<NodeIndex, usize> {
        dijkstra(&self.graph, self.root, None, |_| 1usize)
    }

    /// Whether `to` can be reached from `from` by following requirements.
    pub fn reaches(&self, from: NodeIndex, to: NodeIndex) -> bool {
        has_path_connecting(&self.graph, from, to, None)
    }

    /// Find the path from the root to a package.
    ///
    /// Accepts a full reference or a bare package name.
    pub fn find_path(&self, key: &str) -> Option<Vec<&GraphNode>> {
        let target = self.resolve_key(key)?;
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        if self.dfs_path(self.root, target, &mut path, &mut visited) {
            Some(path.iter().map(|&idx| &self.graph[idx]).collect())
        } else {
            None
        }
    }

    fn resolve_key(&self, key: &str) -> Option<NodeIndex> {
        if let Ok(reference) = Reference::parse(key) {
            if let Some(idx) = self.find(&reference) {
                return Some(idx);
            }
        }
        self.graph
            .node_indices()
            .find(|&idx| self.graph[idx].reference().is_some_and(|r| r.name() == key))
    }

    fn dfs_path(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            path.pop();
            return false;
        }
        for (child, _) in self.dependencies_of(current) {
            if self.dfs_path(child, target, path, visited) {
                return true;
            }
        }
        path.pop();
        false
    }

    /// Render the graph as a tree, grouping the root's requirements by kind.
    pub fn print_tree(&self, max_depth: Option<usize>) -> String {
        let mut output = format!("{}\n", self.graph[self.root]);

        let deps = self.dependencies_of(self.root);
        let sections: Vec<(&str, Vec<NodeIndex>)> = RequirementKind::ORDER
            .iter()
            .map(|kind| {
                let label = match kind {
                    RequirementKind::Build => "[build_requires]",
                    RequirementKind::Regular => "[requires]",
                };
                let members: Vec<NodeIndex> = deps
                    .iter()
                    .filter(|(_, e)| e.kind == *kind)
                    .map(|(idx, _)| *idx)
                    .collect();
                (label, members)
            })
            .filter(|(_, members)| !members.is_empty())
            .collect();

        let show_headers = sections.iter().any(|(label, _)| *label == "[build_requires]");
        let mut visited = HashSet::from([self.root]);
        let total = sections.len();
        for (n, (label, members)) in sections.iter().enumerate() {
            if show_headers {
                output.push_str(&format!("{label}\n"));
            }
            let last_section = n + 1 == total;
            for (i, idx) in members.iter().enumerate() {
                let is_last = i + 1 == members.len() && last_section;
                self.print_subtree(&mut output, *idx, "", is_last, 1, max_depth, &mut visited);
            }
        }
        output
    }

    #[allow(clippy::too_many_arguments)]
    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        depth: usize,
        max_depth: Option<usize>,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{prefix}{connector}{}\n", self.graph[idx]));

        if max_depth.is_some_and(|max| depth >= max) || !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let deps = self.dependencies_of(idx);
        let count = deps.len();
        for (i, (child, _)) in deps.iter().enumerate() {
            self.print_subtree(
                output,
                *child,
                &child_prefix,
                i + 1 == count,
                depth + 1,
                max_depth,
                visited,
            );
        }

        visited.remove(&idx);
    }

    /// Who requires `key`, transitively, up to the root.
    pub fn print_inverted_tree(&self, key: &str) -> String {
        let mut output = String::new();
        let Some(idx) = self.resolve_key(key) else {
            return output;
        };
        output.push_str(&format!("{}\n", self.graph[idx]));

        let mut visited = HashSet::from([idx]);
        let dependents = self.dependents_of(idx);
        let count = dependents.len();
        for (i, (dep, _)) in dependents.iter().enumerate() {
            self.print_inverted_subtree(&mut output, *dep, "", i + 1 == count, &mut visited);
        }
        output
    }

    fn print_inverted_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{prefix}{connector}{}\n", self.graph[idx]));

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let dependents = self.dependents_of(idx);
        let count = dependents.len();
        for (i, (dep, _)) in dependents.iter().enumerate() {
            self.print_inverted_subtree(output, *dep, &child_prefix, i + 1 == count, visited);
        }

        visited.remove(&idx);
    }

    /// Number of package nodes (excluding the root).
    pub fn len(&self) -> usize {
        self.graph.node_count() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(s: &str) -> Reference {
        Reference::parse(s).unwrap()
    }

    const REGULAR: DepEdge = DepEdge {
        kind: RequirementKind::Regular,
    };
    const BUILD: DepEdge = DepEdge {
        kind: RequirementKind::Build,
    };

    #[test]
    fn add_and_find() {
        let mut g = ResolutionGraph::new("Crane.toml");
        let (idx, created) = g.add_node(r("LibA/0.1@user/testing"));
        assert!(created);
        assert_eq!(g.find(&r("LibA/0.1@user/testing")), Some(idx));
        assert_eq!(g.reference(idx).unwrap().version(), "0.1");
        assert_eq!(g.node(g.root()).to_string(), "Crane.toml");
    }

    #[test]
    fn duplicate_add_returns_same_index() {
        let mut g = ResolutionGraph::new("Crane.toml");
        let (a, _) = g.add_node(r("LibA/0.1@user/testing"));
        let (b, created) = g.add_node(r("LibA/0.1@user/testing"));
        assert_eq!(a, b);
        assert!(!created);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn duplicate_edges_are_dropped() {
        let mut g = ResolutionGraph::new("Crane.toml");
        let (a, _) = g.add_node(r("LibA/0.1@user/testing"));
        assert!(g.add_edge(g.root(), a, REGULAR));
        assert!(!g.add_edge(g.root(), a, BUILD));
        assert_eq!(g.edges().len(), 1);
    }

    #[test]
    fn dependencies_keep_insertion_order() {
        let mut g = ResolutionGraph::new("Crane.toml");
        let root = g.root();
        let names = ["LibA", "LibB", "LibC"];
        for name in names {
            let (idx, _) = g.add_node(r(&format!("{name}/0.1@user/testing")));
            g.add_edge(root, idx, REGULAR);
        }
        let order: Vec<String> = g
            .dependencies_of(root)
            .iter()
            .map(|(idx, _)| g.reference(*idx).unwrap().name().to_string())
            .collect();
        assert_eq!(order, names);
    }

    #[test]
    fn tree_groups_build_requirements() {
        let mut g = ResolutionGraph::new("Crane.toml");
        let root = g.root();
        let (tool, _) = g.add_node(r("Tool/1.0@user/testing"));
        let (a, _) = g.add_node(r("LibA/0.1@user/testing"));
        let (c, _) = g.add_node(r("LibC/0.1@user/testing"));
        g.add_edge(root, tool, BUILD);
        g.add_edge(root, a, REGULAR);
        g.add_edge(a, c, REGULAR);

        let tree = g.print_tree(None);
        let build = tree.find("[build_requires]").unwrap();
        let regular = tree.find("[requires]").unwrap();
        assert!(build < regular);
        assert!(tree.contains("Tool/1.0@user/testing"));
        assert!(tree.contains("    └── LibC/0.1@user/testing"));
    }

    #[test]
    fn tree_without_build_requirements_has_no_headers() {
        let mut g = ResolutionGraph::new("Crane.toml");
        let root = g.root();
        let (a, _) = g.add_node(r("LibA/0.1@user/testing"));
        g.add_edge(root, a, REGULAR);
        let tree = g.print_tree(None);
        assert_eq!(tree, "Crane.toml\n└── LibA/0.1@user/testing\n");
    }

    #[test]
    fn find_path_by_name() {
        let mut g = ResolutionGraph::new("Crane.toml");
        let root = g.root();
        let (a, _) = g.add_node(r("LibA/0.1@user/testing"));
        let (c, _) = g.add_node(r("LibC/0.1@user/testing"));
        g.add_edge(root, a, REGULAR);
        g.add_edge(a, c, REGULAR);

        let path = g.find_path("LibC").unwrap();
        let rendered: Vec<String> = path.iter().map(|n| n.to_string()).collect();
        assert_eq!(
            rendered,
            ["Crane.toml", "LibA/0.1@user/testing", "LibC/0.1@user/testing"]
        );
        assert!(g.find_path("LibZ").is_none());
    }

    #[test]
    fn inverted_tree_reaches_root() {
        let mut g = ResolutionGraph::new("Crane.toml");
        let root = g.root();
        let (a, _) = g.add_node(r("LibA/0.1@user/testing"));
        let (c, _) = g.add_node(r("LibC/0.1@user/testing"));
        g.add_edge(root, a, REGULAR);
        g.add_edge(a, c, REGULAR);

        let inv = g.print_inverted_tree("LibC/0.1@user/testing");
        assert!(inv.starts_with("LibC/0.1@user/testing\n"));
        assert!(inv.contains("LibA/0.1@user/testing"));
        assert!(inv.contains("Crane.toml"));
    }

    #[test]
    fn depths_and_reachability() {
        let mut g = ResolutionGraph::new("Crane.toml");
        let root = g.root();
        let (a, _) = g.add_node(r("LibA/0.1@user/testing"));
        let (c, _) = g.add_node(r("LibC/0.1@user/testing"));
        g.add_edge(root, a, REGULAR);
        g.add_edge(a, c, REGULAR);
        g.add_edge(root, c, REGULAR);

        let depths = g.depths();
        assert_eq!(depths[&root], 0);
        assert_eq!(depths[&c], 1);
        assert!(g.reaches(a, c));
        assert!(!g.reaches(c, a));
    }
}
