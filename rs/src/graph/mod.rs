use crate::core::types::Coordinate;
use crate::spatial::geometry::NodeKey;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct RouteNode {
    pub id: NodeId,
    pub key: NodeKey,
    pub coord: Coordinate,
}

impl RTreeObject for RouteNode {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.coord.longitude, self.coord.latitude])
    }
}

impl PointDistance for RouteNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.coord.longitude - point[0];
        let dy = self.coord.latitude - point[1];
        dx * dx + dy * dy
    }
}

/// Directed half of a physical road segment. Both halves of a segment share
/// `segment` and carry the same weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub weight: f64,
    pub reverse: EdgeId,
    pub segment: SegmentId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub segments: usize,
}

/// Road network built once from the road collection. Read-only after
/// construction; per-request weight changes go through
/// [`WeightOverrides`](crate::routing::WeightOverrides).
pub struct RoadGraph {
    pub(crate) nodes: Vec<RouteNode>,
    pub(crate) node_id_map: FxHashMap<NodeKey, NodeId>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) adjacency: Vec<Vec<EdgeId>>,
    pub(crate) spatial_index: RTree<RouteNode>,
}

impl Default for RoadGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RoadGraph {
    pub fn new() -> Self {
        RoadGraph {
            nodes: Vec::new(),
            node_id_map: FxHashMap::default(),
            edges: Vec::new(),
            adjacency: Vec::new(),
            spatial_index: RTree::new(),
        }
    }

    pub fn build_spatial_index(&mut self) {
        self.spatial_index = RTree::bulk_load(self.nodes.clone());
    }

    pub(crate) fn get_or_create_node(&mut self, coord: Coordinate) -> NodeId {
        let key = NodeKey::from(&coord);
        if let Some(&id) = self.node_id_map.get(&key) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(RouteNode { id, key, coord });
        self.adjacency.push(Vec::new());
        self.node_id_map.insert(key, id);
        id
    }

    pub(crate) fn add_segment(&mut self, a: NodeId, b: NodeId, weight: f64) -> SegmentId {
        let segment = SegmentId((self.edges.len() / 2) as u32);
        let forward = EdgeId(self.edges.len() as u32);
        let backward = EdgeId(forward.0 + 1);

        self.edges.push(Edge {
            id: forward,
            from: a,
            to: b,
            weight,
            reverse: backward,
            segment,
        });
        self.edges.push(Edge {
            id: backward,
            from: b,
            to: a,
            weight,
            reverse: forward,
            segment,
        });
        self.adjacency[a.0 as usize].push(forward);
        self.adjacency[b.0 as usize].push(backward);
        segment
    }

    pub fn node(&self, id: NodeId) -> Option<&RouteNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn coord(&self, id: NodeId) -> Option<Coordinate> {
        self.node(id).map(|n| n.coord)
    }

    pub fn node_by_key(&self, key: &NodeKey) -> Option<NodeId> {
        self.node_id_map.get(key).copied()
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0 as usize)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn nodes(&self) -> &[RouteNode] {
        &self.nodes
    }

    /// Outgoing edges of `id`. Every incoming edge is the reverse of one of these.
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacency
            .get(id.0 as usize)
            .into_iter()
            .flatten()
            .map(move |edge_id| &self.edges[edge_id.0 as usize])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn segment_count(&self) -> usize {
        self.edges.len() / 2
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
            segments: self.segment_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
