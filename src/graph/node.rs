//! Defines the `CausalNode` weight stored on every vertex of the causal graph.
use petgraph::graph::NodeIndex;

/// A unique, stable identifier for a node within the graph.
///
/// This is a type alias for `petgraph::graph::NodeIndex` to abstract the
/// underlying graph implementation.
pub type NodeId = NodeIndex;

/// Cost of placing a node in a separator when none was declared.
pub const DEFAULT_NODE_COST: f64 = 1.0;

/// A single variable of the causal model, i.e. one column of the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct CausalNode {
    /// The column identifier (e.g. "campaign").
    pub name: String,
    /// Price of conditioning on this variable. `None` falls back to
    /// [`DEFAULT_NODE_COST`].
    pub cost: Option<f64>,
}

impl CausalNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), cost: None }
    }

    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost.unwrap_or(DEFAULT_NODE_COST)
    }
}
