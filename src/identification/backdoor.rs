//! Minimum back-door adjustment set for a treatment/outcome pair.
use super::separator::find_minimum_d_separator;
use super::NodeSet;
use crate::error::Result;
use crate::graph::CausalGraph;
use log::debug;

/// Finds a minimum-cost adjustment set satisfying the back-door criterion.
///
/// Descendants of the treatments (other than the outcomes) are removed first,
/// since conditioning on a mediator would block part of the effect itself.
/// Direct `x -> y` edges are the effect being estimated and are dropped
/// before the separator search.
pub fn find_minimum_backdoor_set(graph: &CausalGraph, x: &NodeSet, y: &NodeSet) -> Result<(f64, NodeSet)> {
    let mut post_treatment = NodeSet::new();
    for treatment in x {
        post_treatment.extend(graph.descendants(treatment)?);
    }
    let keep: NodeSet = graph
        .node_names()
        .filter(|n| !post_treatment.contains(*n) || y.contains(*n))
        .map(str::to_string)
        .collect();

    let mut essential = graph.subgraph(&keep);
    for treatment in x {
        for outcome in y {
            essential.remove_edge(treatment, outcome);
        }
    }
    debug!(
        "back-door search on {} of {} nodes ({} post-treatment removed)",
        essential.node_count(),
        graph.node_count(),
        graph.node_count() - essential.node_count()
    );

    find_minimum_d_separator(&essential, x, y)
}
