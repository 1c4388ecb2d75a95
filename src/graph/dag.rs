//! dag.rs
//! Wraps a petgraph `DiGraph` keyed by column name with the queries the
//! identification algorithms need.

use super::node::{CausalNode, NodeId};
use crate::error::{CausalError, Result};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use petgraph::visit::{Bfs, Reversed};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct CausalGraph {
    pub(crate) graph: DiGraph<CausalNode, ()>,
    index: HashMap<String, NodeId>,
}

impl CausalGraph {
    pub fn new() -> Self { Self::default() }

    /// Builds a graph from a node list and `(cause, effect)` pairs.
    /// Edge endpoints must appear in `nodes`.
    pub fn from_edges<S: AsRef<str>>(nodes: &[S], edges: &[(S, S)]) -> Result<Self> {
        let mut graph = Self::new();
        for name in nodes {
            graph.add_node(name.as_ref());
        }
        for (from, to) in edges {
            graph.add_edge(from.as_ref(), to.as_ref())?;
        }
        Ok(graph)
    }

    /// Builds the graph used when the caller supplies none.
    ///
    /// Every column becomes a node. The i-th non-treatment, non-outcome column
    /// points at the i-th treatment (pairs stop at the shorter list), every
    /// such column points at the outcome, and every treatment points at the
    /// outcome.
    pub fn default_for<S: AsRef<str>>(columns: &[S], treatments: &[S], outcome: &str) -> Self {
        let treatment_names: Vec<&str> = treatments.iter().map(AsRef::as_ref).collect();
        let others: Vec<&str> = columns
            .iter()
            .map(AsRef::as_ref)
            .filter(|c| *c != outcome && !treatment_names.contains(c))
            .collect();

        let mut graph = Self::new();
        for column in columns {
            graph.add_node(column.as_ref());
        }
        graph.add_node(outcome);
        for treatment in &treatment_names {
            graph.add_node(treatment);
        }

        let edges = others
            .iter()
            .zip(treatment_names.iter())
            .map(|(other, treatment)| (*other, *treatment))
            .chain(others.iter().map(|other| (*other, outcome)))
            .chain(treatment_names.iter().map(|treatment| (*treatment, outcome)));
        for (from, to) in edges {
            graph.link(graph.index[from], graph.index[to]);
        }
        graph
    }

    /// Adds a node with the default cost. Existing names are left untouched.
    pub fn add_node(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.graph.add_node(CausalNode::new(name));
        self.index.insert(name.to_string(), id);
        id
    }

    /// Adds a node, or overwrites the cost of an existing one.
    pub fn add_node_with_cost(&mut self, name: &str, cost: f64) -> Result<NodeId> {
        if !(cost >= 0.0 && cost.is_finite()) {
            return Err(CausalError::InvalidNodeCost { node: name.to_string(), cost });
        }
        let id = self.add_node(name);
        self.graph[id].cost = Some(cost);
        Ok(id)
    }

    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<()> {
        let (a, b) = (self.node_id(from)?, self.node_id(to)?);
        self.link(a, b);
        Ok(())
    }

    fn link(&mut self, a: NodeId, b: NodeId) {
        self.graph.update_edge(a, b, ());
    }

    /// Removes the edge `from -> to`, returning whether it existed.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
        let (Some(&a), Some(&b)) = (self.index.get(from), self.index.get(to)) else {
            return false;
        };
        match self.graph.find_edge(a, b) {
            Some(edge) => self.graph.remove_edge(edge).is_some(),
            None => false,
        }
    }

    // --- Accessors ---

    pub fn node_id(&self, name: &str) -> Result<NodeId> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| CausalError::NodeNotFound(name.to_string()))
    }

    pub fn name(&self, id: NodeId) -> &str { &self.graph[id].name }
    pub fn contains(&self, name: &str) -> bool { self.index.contains_key(name) }
    pub fn node_count(&self) -> usize { self.graph.node_count() }
    pub fn edge_count(&self) -> usize { self.graph.edge_count() }

    pub fn cost(&self, name: &str) -> Result<f64> {
        Ok(self.graph[self.node_id(name)?].cost())
    }

    /// Node names in insertion order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_weights().map(|n| n.name.as_str())
    }

    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| (self.name(a), self.name(b)))
            .collect()
    }

    /// True if the directed edge `a -> b` exists. Unknown names are never adjacent.
    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    pub fn predecessors(&self, name: &str) -> Result<Vec<&str>> {
        let id = self.node_id(name)?;
        Ok(self
            .graph
            .neighbors_directed(id, Direction::Incoming)
            .map(|p| self.name(p))
            .collect())
    }

    pub fn successors(&self, name: &str) -> Result<Vec<&str>> {
        let id = self.node_id(name)?;
        Ok(self
            .graph
            .neighbors_directed(id, Direction::Outgoing)
            .map(|c| self.name(c))
            .collect())
    }

    // --- Graph Algorithms ---

    /// All nodes with a directed path into `name`, excluding `name` itself.
    pub fn ancestors(&self, name: &str) -> Result<BTreeSet<String>> {
        let start = self.node_id(name)?;
        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(reversed, start);
        let mut found = BTreeSet::new();
        while let Some(node) = bfs.next(reversed) {
            if node != start {
                found.insert(self.name(node).to_string());
            }
        }
        Ok(found)
    }

    /// All nodes reachable from `name`, excluding `name` itself.
    pub fn descendants(&self, name: &str) -> Result<BTreeSet<String>> {
        let start = self.node_id(name)?;
        let mut bfs = Bfs::new(&self.graph, start);
        let mut found = BTreeSet::new();
        while let Some(node) = bfs.next(&self.graph) {
            if node != start {
                found.insert(self.name(node).to_string());
            }
        }
        Ok(found)
    }

    /// Induced subgraph on `keep`; node costs and the edges between kept
    /// nodes survive. Names absent from the graph are ignored.
    pub fn subgraph(&self, keep: &BTreeSet<String>) -> CausalGraph {
        let graph = self.graph.filter_map(
            |_, node| keep.contains(&node.name).then(|| node.clone()),
            |_, _| Some(()),
        );
        let index = graph
            .node_indices()
            .map(|id| (graph[id].name.clone(), id))
            .collect();
        CausalGraph { graph, index }
    }

    /// Returns a deterministic topological order of node names.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|id| self.name(id).to_string()).collect())
            .map_err(|cycle| CausalError::CyclicGraph {
                node: self.name(cycle.node_id()).to_string(),
            })
    }
}
