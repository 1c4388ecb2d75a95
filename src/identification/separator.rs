//! separator.rs
//! Minimum-cost d-separator between two node sets, found as a minimum vertex
//! cut of the moralized ancestral graph.

use super::flow::{Capacity, FlowNetwork};
use super::NodeSet;
use crate::error::{CausalError, Result};
use crate::graph::CausalGraph;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// Undirected graph over the ancestral closure of `X ∪ Y`, with co-parents married.
#[derive(Debug, Clone, Default)]
pub struct MoralGraph {
    pub nodes: Vec<String>,
    /// Each undirected edge once, as `(i, j)` with `i < j` indices into `nodes`.
    pub edges: BTreeSet<(usize, usize)>,
}

impl MoralGraph {
    pub fn contains_edge(&self, a: &str, b: &str) -> bool {
        let pos = |n: &str| self.nodes.iter().position(|x| x == n);
        match (pos(a), pos(b)) {
            (Some(i), Some(j)) => self.edges.contains(&(i.min(j), i.max(j))),
            _ => false,
        }
    }
}

/// Returns `X ∪ Y` plus every ancestor of a node in either set.
pub fn ancestral_closure(graph: &CausalGraph, x: &NodeSet, y: &NodeSet) -> Result<NodeSet> {
    let mut closure: NodeSet = x.union(y).cloned().collect();
    for node in x.iter().chain(y.iter()) {
        closure.extend(graph.ancestors(node)?);
    }
    Ok(closure)
}

/// Moralizes `graph` restricted to `nodes`: drop directions, then connect
/// every pair of parents sharing a child.
pub fn moralize(graph: &CausalGraph, nodes: &NodeSet) -> Result<MoralGraph> {
    let order: Vec<String> = nodes.iter().cloned().collect();
    let position: BTreeMap<&str, usize> =
        order.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();
    let mut edges = BTreeSet::new();
    let mut connect = |a: usize, b: usize| {
        if a != b {
            edges.insert((a.min(b), a.max(b)));
        }
    };

    for (child_pos, child) in order.iter().enumerate() {
        // Parents of an ancestral node are ancestral themselves, so every
        // lookup below succeeds.
        let parents: Vec<usize> = graph
            .predecessors(child)?
            .into_iter()
            .filter_map(|p| position.get(p).copied())
            .collect();
        for (i, &p) in parents.iter().enumerate() {
            connect(p, child_pos);
            for &q in &parents[i + 1..] {
                connect(p, q);
            }
        }
    }
    Ok(MoralGraph { nodes: order, edges })
}

/// Checks that `x` and `y` are disjoint, known and not adjacent in `graph`.
fn validate_node_sets(graph: &CausalGraph, x: &NodeSet, y: &NodeSet) -> Result<()> {
    for node in x.iter().chain(y.iter()) {
        graph.node_id(node)?;
    }
    if let Some(shared) = x.intersection(y).next() {
        return Err(CausalError::InvalidNodeSet(format!(
            "the intersection of X and Y is non-empty ('{}')",
            shared
        )));
    }
    for a in x {
        for b in y {
            if graph.has_edge(a, b) || graph.has_edge(b, a) {
                return Err(CausalError::InvalidNodeSet(format!(
                    "'{}' and '{}' are adjacent; nodes of X and Y must not be",
                    a, b
                )));
            }
        }
    }
    Ok(())
}

/// Finds a minimum-cost set of nodes that d-separates `x` from `y` in `graph`.
///
/// Returns the total cost of the separator together with the separator
/// itself. Node costs default to 1.0, making the result a minimum-cardinality
/// separator.
///
/// # Errors
/// - `InvalidNodeSet` if the sets intersect, if any pair is adjacent, or if
///   the sets are married in the moral graph (no finite separator exists).
/// - `NodeNotFound` if a name is not in the graph.
pub fn find_minimum_d_separator(graph: &CausalGraph, x: &NodeSet, y: &NodeSet) -> Result<(f64, NodeSet)> {
    validate_node_sets(graph, x, y)?;
    if x.is_empty() || y.is_empty() {
        return Ok((0.0, NodeSet::new()));
    }

    let ancestral = ancestral_closure(graph, x, y)?;
    let moral = moralize(graph, &ancestral)?;

    // Node splitting: moral node i owns `2i` (in half) and `2i + 1` (out half).
    let n = moral.nodes.len();
    let mut network = FlowNetwork::new(2 * n);
    let source = network.add_vertex();
    let sink = network.add_vertex();
    let half_in = |i: usize| 2 * i;
    let half_out = |i: usize| 2 * i + 1;

    for (i, name) in moral.nodes.iter().enumerate() {
        network.add_edge(half_in(i), half_out(i), graph.cost(name)?);
        if x.contains(name) {
            network.add_edge(source, half_out(i), Capacity::INFINITY);
        }
        if y.contains(name) {
            network.add_edge(half_in(i), sink, Capacity::INFINITY);
        }
    }
    for &(a, b) in &moral.edges {
        network.add_edge(half_out(a), half_in(b), Capacity::INFINITY);
        network.add_edge(half_out(b), half_in(a), Capacity::INFINITY);
    }

    let cut = network.min_cut(source, sink);
    if cut.value.is_infinite() {
        return Err(CausalError::InvalidNodeSet(
            "X and Y are connected in the moral graph; no finite separator exists".into(),
        ));
    }

    let separator: NodeSet = moral
        .nodes
        .iter()
        .enumerate()
        .filter(|&(i, _)| cut.source_side[half_in(i)] && !cut.source_side[half_out(i)])
        .map(|(_, name)| name.clone())
        .collect();

    debug!(
        "minimum d-separator between {:?} and {:?}: {:?} (cost {})",
        x, y, separator, cut.value
    );
    Ok((cut.value, separator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::VecDeque;

    fn set(names: &[&str]) -> NodeSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> CausalGraph {
        CausalGraph::from_edges(nodes, edges).unwrap()
    }

    /// Checks in the moral ancestral graph that removing `s` leaves no X-Y path.
    fn separates(g: &CausalGraph, x: &NodeSet, y: &NodeSet, s: &NodeSet) -> bool {
        let moral = moralize(g, &ancestral_closure(g, x, y).unwrap()).unwrap();
        let mut seen: NodeSet = x.clone();
        let mut queue: VecDeque<String> = x.iter().cloned().collect();
        while let Some(node) = queue.pop_front() {
            if y.contains(&node) {
                return false;
            }
            for other in &moral.nodes {
                if moral.contains_edge(&node, other) && !s.contains(other) && seen.insert(other.clone()) {
                    queue.push_back(other.clone());
                }
            }
        }
        true
    }

    #[test]
    fn test_moralize_marries_co_parents() {
        let g = graph(&["a", "b", "c"], &[("a", "c"), ("b", "c")]);
        let moral = moralize(&g, &set(&["a", "b", "c"])).unwrap();
        assert!(moral.contains_edge("a", "b"));
        assert!(moral.contains_edge("a", "c"));
        assert_eq!(moral.edges.len(), 3);
    }

    #[rstest]
    // Fork: z confounds x and y.
    #[case(&["x", "y", "z"], &[("z", "x"), ("z", "y")], 1.0, &["z"])]
    // Chain x -> m -> y.
    #[case(&["x", "m", "y"], &[("x", "m"), ("m", "y")], 1.0, &["m"])]
    // Collider outside the ancestral set is never needed.
    #[case(&["x", "c", "y"], &[("x", "c"), ("y", "c")], 0.0, &[])]
    // Two parallel confounders.
    #[case(&["x", "y", "a", "b"], &[("a", "x"), ("a", "y"), ("b", "x"), ("b", "y")], 2.0, &["a", "b"])]
    fn test_minimum_separator_on_small_graphs(
        #[case] nodes: &[&str],
        #[case] edges: &[(&str, &str)],
        #[case] expected_cost: f64,
        #[case] expected: &[&str],
    ) {
        let g = graph(nodes, edges);
        let (cost, sep) = find_minimum_d_separator(&g, &set(&["x"]), &set(&["y"])).unwrap();
        assert_eq!(cost, expected_cost);
        assert_eq!(sep, set(expected));
    }

    #[test]
    fn test_separator_blocks_all_paths_and_cost_matches() {
        // Two confounding routes funnel through w; a direct route through v.
        let g = graph(
            &["x", "y", "u1", "u2", "w", "v"],
            &[("u1", "w"), ("u2", "w"), ("w", "x"), ("w", "y"), ("u1", "x"), ("v", "y"), ("x", "v")],
        );
        let (x, y) = (set(&["x"]), set(&["y"]));
        let (cost, sep) = find_minimum_d_separator(&g, &x, &y).unwrap();
        assert!(separates(&g, &x, &y, &sep), "separator {:?} leaks", sep);
        let total: f64 = sep.iter().map(|n| g.cost(n).unwrap()).sum();
        assert_eq!(cost, total);
    }

    #[test]
    fn test_costs_steer_the_choice_of_separator() {
        // x <- a <- b -> y: either a or b separates; make a expensive.
        let mut g = graph(&["x", "y", "a", "b"], &[("a", "x"), ("b", "a"), ("b", "y")]);
        g.add_node_with_cost("a", 5.0).unwrap();
        let (cost, sep) = find_minimum_d_separator(&g, &set(&["x"]), &set(&["y"])).unwrap();
        assert_eq!(sep, set(&["b"]));
        assert_eq!(cost, 1.0);
    }

    #[test]
    fn test_overlapping_sets_are_rejected() {
        let g = graph(&["x", "y"], &[]);
        let err = find_minimum_d_separator(&g, &set(&["x", "y"]), &set(&["y"])).unwrap_err();
        assert!(matches!(err, CausalError::InvalidNodeSet(_)));
    }

    #[rstest]
    #[case(("x", "y"))]
    #[case(("y", "x"))]
    fn test_adjacent_sets_are_rejected(#[case] edge: (&str, &str)) {
        let g = graph(&["x", "y"], &[edge]);
        let err = find_minimum_d_separator(&g, &set(&["x"]), &set(&["y"])).unwrap_err();
        assert!(matches!(err, CausalError::InvalidNodeSet(_)));
    }

    #[test]
    fn test_married_sets_have_no_finite_separator() {
        // x -> c <- y and c -> y2 with y2 in Y puts c in the ancestral set,
        // so x and y end up married.
        let g = graph(&["x", "y", "c", "y2"], &[("x", "c"), ("y", "c"), ("c", "y2")]);
        let err = find_minimum_d_separator(&g, &set(&["x"]), &set(&["y", "y2"])).unwrap_err();
        assert!(matches!(err, CausalError::InvalidNodeSet(_)));
    }

    #[test]
    fn test_unknown_nodes_are_reported() {
        let g = graph(&["x"], &[]);
        let err = find_minimum_d_separator(&g, &set(&["x"]), &set(&["nope"])).unwrap_err();
        assert!(matches!(err, CausalError::NodeNotFound(n) if n == "nope"));
    }
}
