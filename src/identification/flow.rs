//! flow.rs
//! Residual flow network with Edmonds-Karp maximum flow, used to find the
//! minimum vertex cut behind every separator query.

use std::collections::VecDeque;

/// Flow capacity type. `f64::INFINITY` marks an edge that may never be cut.
pub type Capacity = f64;

/// Residual capacities below this are treated as saturated.
const EPSILON: Capacity = 1e-12;

#[derive(Debug, Clone)]
struct FlowEdge {
    to: usize,
    capacity: Capacity,
    flow: Capacity,
}

impl FlowEdge {
    #[inline]
    fn residual(&self) -> Capacity {
        self.capacity - self.flow
    }
}

/// Directed capacitated network. Edge `2k` is a forward edge and `2k + 1`
/// its zero-capacity reverse partner, so `e ^ 1` is always the partner.
#[derive(Debug, Clone, Default)]
pub struct FlowNetwork {
    adjacency: Vec<Vec<usize>>,
    edges: Vec<FlowEdge>,
}

/// Outcome of a max-flow run. `value` is infinite when an uncuttable
/// source-sink path exists.
#[derive(Debug, Clone)]
pub struct MinCut {
    pub value: Capacity,
    /// `source_side[v]` is true when `v` is reachable from the source in the
    /// final residual network.
    pub source_side: Vec<bool>,
}

impl FlowNetwork {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); vertex_count],
            edges: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize { self.adjacency.len() }

    pub fn add_vertex(&mut self) -> usize {
        self.adjacency.push(Vec::new());
        self.adjacency.len() - 1
    }

    pub fn add_edge(&mut self, from: usize, to: usize, capacity: Capacity) {
        let forward = self.edges.len();
        self.edges.push(FlowEdge { to, capacity, flow: 0.0 });
        self.edges.push(FlowEdge { to: from, capacity: 0.0, flow: 0.0 });
        self.adjacency[from].push(forward);
        self.adjacency[to].push(forward + 1);
    }

    /// Runs Edmonds-Karp from `source` to `sink` and reports the minimum cut.
    /// The network is consumed; the residual state is only meaningful here.
    pub fn min_cut(mut self, source: usize, sink: usize) -> MinCut {
        let mut value = 0.0;
        while let Some(path) = self.shortest_augmenting_path(source, sink) {
            let bottleneck = path
                .iter()
                .map(|&e| self.edges[e].residual())
                .fold(Capacity::INFINITY, Capacity::min);
            if bottleneck.is_infinite() {
                return MinCut { value: Capacity::INFINITY, source_side: self.reachable_from(source) };
            }
            for &e in &path {
                self.edges[e].flow += bottleneck;
                self.edges[e ^ 1].flow -= bottleneck;
            }
            value += bottleneck;
        }
        MinCut { value, source_side: self.reachable_from(source) }
    }

    /// BFS over edges with positive residual capacity; returns the edge path.
    fn shortest_augmenting_path(&self, source: usize, sink: usize) -> Option<Vec<usize>> {
        let mut via: Vec<Option<usize>> = vec![None; self.vertex_count()];
        let mut seen = vec![false; self.vertex_count()];
        let mut queue = VecDeque::from([source]);
        seen[source] = true;

        while let Some(v) = queue.pop_front() {
            if v == sink {
                break;
            }
            for &e in &self.adjacency[v] {
                let edge = &self.edges[e];
                if !seen[edge.to] && edge.residual() > EPSILON {
                    seen[edge.to] = true;
                    via[edge.to] = Some(e);
                    queue.push_back(edge.to);
                }
            }
        }

        if !seen[sink] {
            return None;
        }
        let mut path = Vec::new();
        let mut v = sink;
        while let Some(e) = via[v] {
            path.push(e);
            v = self.edges[e ^ 1].to;
        }
        path.reverse();
        Some(path)
    }

    fn reachable_from(&self, source: usize) -> Vec<bool> {
        let mut seen = vec![false; self.vertex_count()];
        let mut queue = VecDeque::from([source]);
        seen[source] = true;
        while let Some(v) = queue.pop_front() {
            for &e in &self.adjacency[v] {
                let edge = &self.edges[e];
                if !seen[edge.to] && edge.residual() > EPSILON {
                    seen[edge.to] = true;
                    queue.push_back(edge.to);
                }
            }
        }
        seen
    }
}
