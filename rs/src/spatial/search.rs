use crate::core::types::{Coordinate, SnapResult};
use crate::graph::{NodeId, RoadGraph, RouteNode};
use crate::spatial::geometry::{distance, project_onto_segment, METERS_PER_DEGREE};
use rstar::AABB;
use rustc_hash::FxHashSet;

/// Cosine floor used to widen the longitude span near the poles.
const MIN_COS_LAT: f64 = 1e-6;

impl RoadGraph {
    /// Graph nodes whose great-circle distance to `point` is at most
    /// `radius_meters`, ordered by node id.
    pub fn nodes_within_radius(&self, point: &Coordinate, radius_meters: f64) -> Vec<&RouteNode> {
        let lat_span = radius_meters / METERS_PER_DEGREE;
        let widest_lat = (point.latitude.abs() + lat_span).min(90.0);
        let lon_span =
            radius_meters / (METERS_PER_DEGREE * widest_lat.to_radians().cos().max(MIN_COS_LAT));

        let mut found: Vec<&RouteNode> = Vec::new();
        for (min_lon, max_lon) in longitude_ranges(point.longitude, lon_span) {
            let envelope = AABB::from_corners(
                [min_lon, point.latitude - lat_span],
                [max_lon, point.latitude + lat_span],
            );
            found.extend(
                self.spatial_index
                    .locate_in_envelope(&envelope)
                    .filter(|node| distance(point, &node.coord) <= radius_meters),
            );
        }
        found.sort_unstable_by_key(|node| node.id);
        found
    }

    /// Snaps `point` onto the nearest road segment touching a node within
    /// `search_radius_meters`. Returns `None` when no segment qualifies or
    /// the best projection is farther than `max_snap_distance_meters`.
    pub fn locate(
        &self,
        point: &Coordinate,
        search_radius_meters: f64,
        max_snap_distance_meters: f64,
    ) -> Option<SnapResult> {
        let candidates = self.nodes_within_radius(point, search_radius_meters);

        let mut checked_segments = FxHashSet::default();
        let mut best: Option<(Coordinate, NodeId, f64)> = None;

        for node in candidates {
            for edge in self.outgoing(node.id) {
                if !checked_segments.insert(edge.segment) {
                    continue;
                }
                let Some(linked) = self.node(edge.to) else {
                    continue;
                };

                let projection = project_onto_segment(point, &node.coord, &linked.coord);
                let dist = distance(point, &projection);

                if best.map_or(true, |(_, _, best_dist)| dist < best_dist) {
                    let to_node = distance(&projection, &node.coord);
                    let to_linked = distance(&projection, &linked.coord);
                    let entry = if to_node < to_linked {
                        node.id
                    } else {
                        linked.id
                    };
                    best = Some((projection, entry, dist));
                }
            }
        }

        match best {
            Some((projected_point, entry_node, distance_meters))
                if distance_meters <= max_snap_distance_meters =>
            {
                Some(SnapResult {
                    projected_point,
                    entry_node,
                    distance_meters,
                })
            }
            _ => None,
        }
    }
}

/// Splits `[longitude - span, longitude + span]` into ranges inside
/// [-180, 180], wrapping the part that crosses the antimeridian. The ranges
/// never overlap.
fn longitude_ranges(longitude: f64, span: f64) -> Vec<(f64, f64)> {
    if span >= 180.0 {
        return vec![(-180.0, 180.0)];
    }

    let min = longitude - span;
    let max = longitude + span;
    let mut ranges = vec![(min.max(-180.0), max.min(180.0))];
    if min < -180.0 {
        ranges.push((min + 360.0, 180.0));
    }
    if max > 180.0 {
        ranges.push((-180.0, max - 360.0));
    }
    ranges
}
