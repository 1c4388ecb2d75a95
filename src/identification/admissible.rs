//! Sequential admissible covariates for a topologically ordered list of
//! treatments.
//!
//! The simultaneous estimator regresses block `i + 1` on the treatments seen
//! so far plus blocks `0..=i`, so a finder decides which covariate is
//! introduced at which step. The rule is kept behind a trait so it can be
//! replaced without touching the estimator.
use crate::error::{CausalError, Result};
use crate::graph::CausalGraph;
use log::debug;

/// Splits the covariates of a multi-treatment model into one block per treatment.
pub trait AdmissibleVariableFinder {
    /// Returns exactly `treatments.len()` blocks.
    ///
    /// Block `0` holds covariates causally prior to the first treatment;
    /// block `i > 0` holds covariates introduced after treatment `i - 1` and
    /// before treatment `i`. No name may appear twice, and neither the
    /// treatments nor the outcome may appear at all.
    fn find(&self, graph: &CausalGraph, treatments: &[String], outcome: &str) -> Result<Vec<Vec<String>>>;
}

/// Recursive path-model blocks taken from the graph's topological order.
///
/// Candidates are the ancestors of the outcome that are neither treatments
/// nor the outcome. Each candidate lands in the block of the first treatment
/// that follows it in the topological order. Candidates after the last
/// treatment only carry its effect to the outcome and are left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologicalBlockFinder;

impl AdmissibleVariableFinder for TopologicalBlockFinder {
    fn find(&self, graph: &CausalGraph, treatments: &[String], outcome: &str) -> Result<Vec<Vec<String>>> {
        if treatments.iter().any(|t| t == outcome) {
            return Err(CausalError::InvalidNodeSet(format!(
                "outcome '{}' is also listed as a treatment",
                outcome
            )));
        }
        let candidates = graph.ancestors(outcome)?;
        let mut blocks: Vec<Vec<String>> = vec![Vec::new(); treatments.len()];
        let mut pending = Vec::new();
        let mut next_treatment = 0;

        for node in graph.topological_order()? {
            if next_treatment == treatments.len() {
                break;
            }
            if node == treatments[next_treatment] {
                blocks[next_treatment].append(&mut pending);
                next_treatment += 1;
            } else if treatments.contains(&node) {
                return Err(CausalError::InvalidNodeSet(format!(
                    "treatment '{}' is out of topological order",
                    node
                )));
            } else if candidates.contains(&node) {
                pending.push(node);
            }
        }
        if next_treatment < treatments.len() {
            return Err(CausalError::NodeNotFound(treatments[next_treatment].clone()));
        }

        debug!("admissible blocks for {:?} -> '{}': {:?}", treatments, outcome, blocks);
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_blocks_split_at_each_treatment() {
        // z -> t1 -> m -> t2 -> y, with z and m also feeding y.
        let g = CausalGraph::from_edges(
            &["z", "t1", "m", "t2", "y"],
            &[("z", "t1"), ("t1", "m"), ("m", "t2"), ("t2", "y"), ("z", "y"), ("m", "y")],
        )
        .unwrap();
        let blocks = TopologicalBlockFinder.find(&g, &names(&["t1", "t2"]), "y").unwrap();
        assert_eq!(blocks, vec![names(&["z"]), names(&["m"])]);
    }

    #[test]
    fn test_mediators_after_last_treatment_are_left_out() {
        let g = CausalGraph::from_edges(
            &["z", "t", "m", "y"],
            &[("z", "t"), ("z", "y"), ("t", "m"), ("m", "y")],
        )
        .unwrap();
        let blocks = TopologicalBlockFinder.find(&g, &names(&["t"]), "y").unwrap();
        assert_eq!(blocks, vec![names(&["z"])]);
    }

    #[test]
    fn test_non_ancestors_of_outcome_are_ignored() {
        let g = CausalGraph::from_edges(&["s", "t", "y"], &[("s", "t"), ("t", "y")]).unwrap();
        // s precedes t but only reaches y through it, so it is an ancestor of y.
        let blocks = TopologicalBlockFinder.find(&g, &names(&["t"]), "y").unwrap();
        assert_eq!(blocks, vec![names(&["s"])]);

        let g = CausalGraph::from_edges(&["t", "y", "k"], &[("t", "y"), ("t", "k")]).unwrap();
        let blocks = TopologicalBlockFinder.find(&g, &names(&["t"]), "y").unwrap();
        assert_eq!(blocks, vec![Vec::<String>::new()]);
    }

    #[test]
    fn test_unsorted_treatments_are_rejected() {
        let g = CausalGraph::from_edges(&["t1", "t2", "y"], &[("t1", "t2"), ("t2", "y")]).unwrap();
        let err = TopologicalBlockFinder.find(&g, &names(&["t2", "t1"]), "y").unwrap_err();
        assert!(matches!(err, CausalError::InvalidNodeSet(_)));
    }
}
