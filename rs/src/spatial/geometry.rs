use crate::core::types::Coordinate;
use std::fmt;

pub const EARTH_RADIUS: f64 = 6371000.0;

/// Meters per degree of latitude on the haversine sphere.
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS * std::f64::consts::PI / 180.0;

const NODE_KEY_SCALE: f64 = 1e5;

pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();

    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a =
        (dlat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS * c
}

pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Sum of great-circle distances between consecutive points.
pub fn polyline_length(points: &[Coordinate]) -> f64 {
    points.windows(2).map(|w| distance(&w[0], &w[1])).sum()
}

/// Coordinates rounded to five decimal places (about 1.1 m); points that
/// round to the same key are the same graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    lat_e5: i64,
    lon_e5: i64,
}

impl NodeKey {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        NodeKey {
            lat_e5: (latitude * NODE_KEY_SCALE).round() as i64,
            lon_e5: (longitude * NODE_KEY_SCALE).round() as i64,
        }
    }
}

impl From<&Coordinate> for NodeKey {
    fn from(coord: &Coordinate) -> Self {
        NodeKey::new(coord.latitude, coord.longitude)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.5},{:.5}",
            self.lat_e5 as f64 / NODE_KEY_SCALE,
            self.lon_e5 as f64 / NODE_KEY_SCALE
        )
    }
}

/// Closest point to `point` on the segment `[a, b]`, treating latitude and
/// longitude as planar coordinates. Only meaningful for short segments.
pub fn project_onto_segment(point: &Coordinate, a: &Coordinate, b: &Coordinate) -> Coordinate {
    let ab_x = b.longitude - a.longitude;
    let ab_y = b.latitude - a.latitude;
    let len_sq = ab_x * ab_x + ab_y * ab_y;

    if len_sq == 0.0 {
        return *a;
    }

    let ap_x = point.longitude - a.longitude;
    let ap_y = point.latitude - a.latitude;
    let t = (ap_x * ab_x + ap_y * ab_y) / len_sq;

    if t < 0.0 {
        *a
    } else if t > 1.0 {
        *b
    } else {
        Coordinate::new(a.latitude + t * ab_y, a.longitude + t * ab_x)
    }
}

pub fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{} m", meters.round() as i64)
    }
}

pub fn estimate_duration(meters: f64, speed_kmh: f64) -> String {
    let hours = meters / 1000.0 / speed_kmh;
    let total_minutes = (hours * 60.0).round() as i64;

    if total_minutes < 1 {
        return "<1 min".to_string();
    }
    if total_minutes < 60 {
        return format!("{} min", total_minutes);
    }

    let h = total_minutes / 60;
    let m = total_minutes % 60;
    if m > 0 {
        format!("{}h {}min", h, m)
    } else {
        format!("{}h", h)
    }
}
