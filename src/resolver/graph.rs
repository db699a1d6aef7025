//! The shim graph: adapter pairs and the nested adaptations between them.
//!
//! An edge `a -> b` means an adapter for `a` wraps or unwraps values
//! through the adapter for `b`. Cycles are legal (a type whose members
//! return the same type).

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::core::target::ShimTarget;

#[derive(Debug, Clone, Default)]
pub struct ShimGraph {
    graph: DiGraph<ShimTarget, ()>,
    target_to_node: HashMap<ShimTarget, NodeIndex>,
}

impl ShimGraph {
    pub fn new() -> Self {
        ShimGraph::default()
    }

    /// Add a pair. Re-adding a known pair returns its existing node.
    pub fn add_pair(&mut self, target: &ShimTarget) -> NodeIndex {
        if let Some(&node) = self.target_to_node.get(target) {
            return node;
        }
        let node = self.graph.add_node(target.clone());
        self.target_to_node.insert(target.clone(), node);
        node
    }

    /// Record that `from` adapts values through `to`.
    pub fn add_edge(&mut self, from: &ShimTarget, to: &ShimTarget) {
        let from = self.add_pair(from);
        let to = self.add_pair(to);
        self.graph.update_edge(from, to, ());
    }

    pub fn contains(&self, target: &ShimTarget) -> bool {
        self.target_to_node.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn neighbors(&self, node: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut nodes: Vec<_> = self.graph.neighbors_directed(node, direction).collect();
        // petgraph yields the most recently added edge first
        nodes.reverse();
        nodes
    }

    /// Pairs `target` adapts through, in the order they were found.
    pub fn dependencies(&self, target: &ShimTarget) -> Vec<&ShimTarget> {
        match self.target_to_node.get(target) {
            Some(&node) => self
                .neighbors(node, Direction::Outgoing)
                .into_iter()
                .map(|n| &self.graph[n])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Pairs that adapt through `target`.
    pub fn dependents(&self, target: &ShimTarget) -> Vec<&ShimTarget> {
        match self.target_to_node.get(target) {
            Some(&node) => self
                .neighbors(node, Direction::Incoming)
                .into_iter()
                .map(|n| &self.graph[n])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Every pair, in insertion order.
    pub fn targets(&self) -> impl Iterator<Item = &ShimTarget> {
        self.graph.node_indices().map(|n| &self.graph[n])
    }

    /// Pairs nothing else adapts through, in insertion order.
    pub fn roots(&self) -> Vec<&ShimTarget> {
        self.root_nodes().into_iter().map(|n| &self.graph[n]).collect()
    }

    fn root_nodes(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&n| {
                self.graph
                    .neighbors_directed(n, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect()
    }

    /// Render the graph as an indented tree.
    ///
    /// Pairs already printed are marked `(*)` and not expanded again, which
    /// also terminates cycles. Pairs reachable only through a cycle are
    /// printed as extra roots.
    pub fn render_tree(&self, max_depth: usize) -> String {
        let mut output = String::new();
        let mut seen = HashSet::new();

        for root in self.root_nodes() {
            self.render_node(root, 0, max_depth, &mut seen, &mut output);
        }
        for node in self.graph.node_indices() {
            if !seen.contains(&node) {
                self.render_node(node, 0, max_depth, &mut seen, &mut output);
            }
        }

        output
    }

    /// Render the graph in Graphviz DOT format, one node per adapter.
    pub fn to_dot(&self) -> String {
        let mut output = String::from("digraph shims {\n");
        for node in self.graph.node_indices() {
            let target = &self.graph[node];
            let _ = writeln!(
                output,
                "    \"{}\" [label=\"{}\"];",
                target.adapter_name(),
                target.to_string().replace('"', "\\\"")
            );
        }
        for edge in self.graph.edge_indices() {
            if let Some((from, to)) = self.graph.edge_endpoints(edge) {
                let _ = writeln!(
                    output,
                    "    \"{}\" -> \"{}\";",
                    self.graph[from].adapter_name(),
                    self.graph[to].adapter_name()
                );
            }
        }
        output.push_str("}\n");
        output
    }

    fn render_node(
        &self,
        node: NodeIndex,
        depth: usize,
        max_depth: usize,
        seen: &mut HashSet<NodeIndex>,
        output: &mut String,
    ) {
        if depth > max_depth {
            return;
        }

        let is_duplicate = !seen.insert(node);
        let prefix = if depth == 0 {
            String::new()
        } else {
            format!("{}├── ", "│   ".repeat(depth - 1))
        };
        let dup_marker = if is_duplicate { " (*)" } else { "" };
        let _ = writeln!(output, "{}{}{}", prefix, self.graph[node], dup_marker);

        if is_duplicate {
            return;
        }
        for dep in self.neighbors(node, Direction::Outgoing) {
            self.render_node(dep, depth + 1, max_depth, seen, output);
        }
    }
}
