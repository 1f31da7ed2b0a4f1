use crate::core::types::{Coordinate, RouteLeg, SnapResult};
use crate::graph::{NodeId, RoadGraph};
use crate::spatial::geometry::{estimate_duration, format_distance, polyline_length};

/// Stitches `start_pin -> start_snap -> path -> end_snap -> end_pin` into a
/// single leg. `path_nodes` is in path finder order (goal first). The
/// distance includes the two legs between each pin and its snap point.
pub fn assemble(
    graph: &RoadGraph,
    path_nodes: &[NodeId],
    start_pin: Coordinate,
    start_snap: &SnapResult,
    end_snap: &SnapResult,
    end_pin: Coordinate,
    average_speed_kmh: f64,
) -> Option<RouteLeg> {
    if path_nodes.is_empty() {
        return None;
    }

    let mut path = Vec::with_capacity(path_nodes.len() + 4);
    path.push(start_pin);
    path.push(start_snap.projected_point);
    path.extend(path_nodes.iter().rev().filter_map(|&id| graph.coord(id)));
    path.push(end_snap.projected_point);
    path.push(end_pin);

    let distance_meters = polyline_length(&path);

    Some(RouteLeg {
        path,
        distance_meters,
        formatted_distance: format_distance(distance_meters),
        duration_label: estimate_duration(distance_meters, average_speed_kmh),
    })
}
