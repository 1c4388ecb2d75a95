//! JSON request/response payloads and their handlers.
//!
//! Field names follow the wire format (`fromNode`, `ATE`, ...), not Rust
//! conventions.
use crate::config::EstimatorConfig;
use crate::error::Result;
use crate::graph::CausalGraph;
use crate::inference::{CausalInference, SimultaneousCausalInference};
use crate::store::Dataset;
use indexmap::IndexMap;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Columns in payload order; the default graph depends on it.
pub type Table = IndexMap<String, Vec<f64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDto {
    #[serde(rename = "fromNode")]
    pub from_node: String,
    #[serde(rename = "toNode")]
    pub to_node: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDto {
    pub nodes: Vec<String>,
    pub edges: Vec<EdgeDto>,
    /// Separator cost per node; unlisted nodes cost 1.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub costs: BTreeMap<String, f64>,
}

impl GraphDto {
    pub fn to_graph(&self) -> Result<CausalGraph> {
        let edges: Vec<(&str, &str)> =
            self.edges.iter().map(|e| (e.from_node.as_str(), e.to_node.as_str())).collect();
        let nodes: Vec<&str> = self.nodes.iter().map(String::as_str).collect();
        let mut graph = CausalGraph::from_edges(&nodes, &edges)?;
        for (name, &cost) in &self.costs {
            graph.node_id(name)?;
            graph.add_node_with_cost(name, cost)?;
        }
        Ok(graph)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub table: Table,
    pub graph: GraphDto,
    pub treatment: String,
    pub outcome: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResponse {
    #[serde(rename = "ATE")]
    pub ate: f64,
    #[serde(rename = "NAIVE")]
    pub naive: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimultaneousRequest {
    pub table: Table,
    #[serde(default)]
    pub graph: Option<GraphDto>,
    pub treatments: Vec<String>,
    pub outcome: String,
}

/// Non-finite effects serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimultaneousResponse {
    pub effects: BTreeMap<String, f64>,
}

/// Builds the dataset and graph of `request` and returns the IPW and naive
/// estimates.
pub fn handle(request: &InferenceRequest, config: &EstimatorConfig) -> Result<InferenceResponse> {
    config.validate()?;
    let dataset = Dataset::from_table(&request.table)?;
    let graph = request.graph.to_graph()?;
    debug!(
        "inference request: {} rows, {} nodes, '{}' -> '{}'",
        dataset.n_rows(),
        graph.node_count(),
        request.treatment,
        request.outcome
    );

    let inference =
        CausalInference::new(&dataset, &graph, &request.treatment, &request.outcome)?.with_config(config.clone());
    Ok(InferenceResponse {
        ate: inference.average_treatment_effect()?,
        naive: inference.naive_treatment_effect()?,
    })
}

pub fn handle_simultaneous(request: &SimultaneousRequest, config: &EstimatorConfig) -> Result<SimultaneousResponse> {
    config.validate()?;
    let dataset = Dataset::from_table(&request.table)?;
    let graph = request.graph.as_ref().map(GraphDto::to_graph).transpose()?;

    let inference = SimultaneousCausalInference::new(&dataset, &request.treatments, &request.outcome, graph.as_ref())?
        .with_config(config.clone());
    Ok(SimultaneousResponse { effects: inference.causal_effect()? })
}

/// Evaluates independent requests in parallel. Results keep the input order.
pub fn handle_batch(requests: &[InferenceRequest], config: &EstimatorConfig) -> Vec<Result<InferenceResponse>> {
    requests.par_iter().map(|request| handle(request, config)).collect()
}
