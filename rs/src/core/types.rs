use crate::graph::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// One road record. A `LineString` road has a single line, a
/// `MultiLineString` road has several; coordinates are already in
/// `(latitude, longitude)` order.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Road {
    #[serde(default)]
    pub osm_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    pub lines: Vec<Vec<Coordinate>>,
}

impl Road {
    pub fn line_string(points: Vec<Coordinate>) -> Self {
        Road {
            lines: vec![points],
            ..Default::default()
        }
    }

    pub fn multi_line_string(lines: Vec<Vec<Coordinate>>) -> Self {
        Road {
            lines,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn label(&self) -> String {
        match (&self.name, self.osm_id) {
            (Some(name), Some(id)) => format!("{} ({})", name, id),
            (Some(name), None) => name.clone(),
            (None, Some(id)) => format!("osm {}", id),
            (None, None) => "unnamed road".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    pub projected_point: Coordinate,
    pub entry_node: NodeId,
    pub distance_meters: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    pub path: Vec<Coordinate>,
    pub distance_meters: f64,
    pub formatted_distance: String,
    pub duration_label: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RouteResult {
    pub main: RouteLeg,
    pub alternative: Option<RouteLeg>,
}
