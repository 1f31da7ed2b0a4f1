//! Road-network routing engine: builds a graph from road polylines, snaps
//! coordinates onto it, finds shortest routes with A* and proposes an
//! alternative route when the network allows one.

pub mod core;
pub mod engine;
pub mod graph;
pub mod parser;
pub mod processing;
pub mod queue;
pub mod routing;
pub mod spatial;

pub use crate::core::config::{AlternativeOptions, EngineConfig};
pub use crate::core::errors::{Result, RouterError};
pub use crate::core::types::{Coordinate, Road, RouteLeg, RouteResult, SnapResult};
pub use crate::engine::Engine;
pub use crate::graph::{GraphStats, NodeId, RoadGraph};
pub use crate::parser::{parse_roads, GeoJsonFile, RoadSource};
pub use crate::processing::{build_graph, GraphBuilder};
pub use crate::queue::{parse_requests, RouteOutcome, RouteQueue, RouteRequest};
