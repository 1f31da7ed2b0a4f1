use crate::graph::{Edge, EdgeId, NodeId, RoadGraph};
use crate::spatial::geometry::distance;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Per-request edge weight overrides. The path finder uses an override when
/// one is present and the graph's own weight otherwise, so the shared graph
/// never changes.
#[derive(Debug, Clone, Default)]
pub struct WeightOverrides {
    weights: FxHashMap<EdgeId, f64>,
}

impl WeightOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, edge: EdgeId, weight: f64) {
        self.weights.insert(edge, weight);
    }

    pub fn get(&self, edge: EdgeId) -> Option<f64> {
        self.weights.get(&edge).copied()
    }

    /// Overrides every edge entering or leaving `node`.
    pub fn penalize_node(&mut self, graph: &RoadGraph, node: NodeId, weight: f64) {
        for edge in graph.outgoing(node) {
            self.set(edge.id, weight);
            self.set(edge.reverse, weight);
        }
    }

    pub fn effective_weight(&self, edge: &Edge) -> f64 {
        self.get(edge.id).unwrap_or(edge.weight)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    estimated_total_cost: f64,
    node_id: NodeId,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimated_total_cost
            .total_cmp(&self.estimated_total_cost)
            .then_with(|| self.cost.total_cmp(&other.cost))
            .then_with(|| other.node_id.cmp(&self.node_id))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* search from `start` to `goal`. Edge cost is the (possibly overridden)
/// segment length and the heuristic is the great-circle distance to `goal`.
///
/// The returned nodes run from `goal` back to `start`; callers reverse them
/// when they need travel order. `None` means the two nodes are not connected.
pub fn find_path(
    graph: &RoadGraph,
    start: NodeId,
    goal: NodeId,
    overrides: &WeightOverrides,
) -> Option<Vec<NodeId>> {
    let goal_coord = graph.coord(goal)?;
    let start_coord = graph.coord(start)?;

    let mut open_set = BinaryHeap::new();
    let mut g_score: FxHashMap<NodeId, f64> = FxHashMap::default();
    let mut came_from: FxHashMap<NodeId, NodeId> = FxHashMap::default();

    g_score.insert(start, 0.0);
    open_set.push(State {
        cost: 0.0,
        estimated_total_cost: distance(&start_coord, &goal_coord),
        node_id: start,
    });

    while let Some(current) = open_set.pop() {
        if current.node_id == goal {
            return Some(reconstruct_path(goal, &came_from));
        }

        if current.cost > *g_score.get(&current.node_id).unwrap_or(&f64::INFINITY) {
            continue;
        }

        for edge in graph.outgoing(current.node_id) {
            let new_cost = current.cost + overrides.effective_weight(edge);
            if new_cost < *g_score.get(&edge.to).unwrap_or(&f64::INFINITY) {
                g_score.insert(edge.to, new_cost);
                came_from.insert(edge.to, current.node_id);

                let h_cost = graph
                    .coord(edge.to)
                    .map_or(0.0, |coord| distance(&coord, &goal_coord));

                open_set.push(State {
                    cost: new_cost,
                    estimated_total_cost: new_cost + h_cost,
                    node_id: edge.to,
                });
            }
        }
    }

    None
}

fn reconstruct_path(goal: NodeId, came_from: &FxHashMap<NodeId, NodeId>) -> Vec<NodeId> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path
}

/// Total weight of consecutive hops along `path`, taking the cheapest edge
/// between each pair. `None` if two consecutive nodes are not adjacent.
pub fn path_weight(graph: &RoadGraph, path: &[NodeId], overrides: &WeightOverrides) -> Option<f64> {
    path.windows(2).try_fold(0.0, |total, pair| {
        graph
            .outgoing(pair[0])
            .filter(|edge| edge.to == pair[1])
            .map(|edge| overrides.effective_weight(edge))
            .min_by(|a, b| a.total_cmp(b))
            .map(|weight| total + weight)
    })
}
