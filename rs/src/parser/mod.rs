use crate::core::errors::{Result, RouterError};
use crate::core::types::{Coordinate, Road};
use geojson::{Feature, GeoJson, Geometry, Position, Value};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::{Path, PathBuf};

/// Read-only supplier of road records for graph construction.
pub trait RoadSource: Send + Sync {
    fn load_roads(&self) -> Result<Vec<Road>>;
}

impl RoadSource for Vec<Road> {
    fn load_roads(&self) -> Result<Vec<Road>> {
        Ok(self.clone())
    }
}

/// GeoJSON document on disk holding road features.
#[derive(Debug, Clone)]
pub struct GeoJsonFile {
    path: PathBuf,
}

impl GeoJsonFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        GeoJsonFile {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RoadSource for GeoJsonFile {
    fn load_roads(&self) -> Result<Vec<Road>> {
        let json = fs::read_to_string(&self.path)?;
        let roads = parse_roads(&json)?;
        log::info!("Loaded {} roads from {}", roads.len(), self.path.display());
        Ok(roads)
    }
}

/// Parses a `FeatureCollection`, a bare array of features, a single feature
/// or a bare geometry. Features whose geometry cannot be used are logged and
/// skipped.
pub fn parse_roads(json: &str) -> Result<Vec<Road>> {
    let document: JsonValue = serde_json::from_str(json)?;

    let features = match document {
        JsonValue::Array(items) => items,
        JsonValue::Object(mut object) => match object.remove("features") {
            Some(JsonValue::Array(items)) => items,
            Some(_) => {
                return Err(RouterError::InvalidGeometry(
                    "\"features\" must be an array".to_string(),
                ))
            }
            None => return parse_document(JsonValue::Object(object)).map(|road| vec![road]),
        },
        _ => {
            return Err(RouterError::InvalidGeometry(
                "expected a FeatureCollection or an array of features".to_string(),
            ))
        }
    };

    let mut roads = Vec::with_capacity(features.len());
    for (index, value) in features.into_iter().enumerate() {
        match Feature::from_json_value(value)
            .map_err(|e| RouterError::InvalidGeometry(e.to_string()))
            .and_then(|feature| road_from_feature(&feature))
        {
            Ok(road) => roads.push(road),
            Err(e) => log::warn!("Skipping road feature {}: {}", index, e),
        }
    }

    Ok(roads)
}

fn parse_document(value: JsonValue) -> Result<Road> {
    let document =
        GeoJson::from_json_value(value).map_err(|e| RouterError::InvalidGeometry(e.to_string()))?;
    match document {
        GeoJson::Feature(feature) => road_from_feature(&feature),
        GeoJson::Geometry(geometry) => Ok(Road {
            lines: lines_from_geometry(&geometry)?,
            ..Default::default()
        }),
        GeoJson::FeatureCollection(_) => Err(RouterError::InvalidGeometry(
            "FeatureCollection without features".to_string(),
        )),
    }
}

fn road_from_feature(feature: &Feature) -> Result<Road> {
    let properties = feature.properties.as_ref();
    let name = properties
        .and_then(|p| p.get("name"))
        .and_then(JsonValue::as_str)
        .map(str::to_string);
    let osm_id = properties
        .and_then(|p| p.get("osm_id"))
        .and_then(JsonValue::as_i64);

    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| RouterError::InvalidGeometry("missing geometry".to_string()))?;

    Ok(Road {
        osm_id,
        name,
        lines: lines_from_geometry(geometry)?,
    })
}

fn lines_from_geometry(geometry: &Geometry) -> Result<Vec<Vec<Coordinate>>> {
    match &geometry.value {
        Value::LineString(line) => Ok(vec![to_coordinates(line)?]),
        Value::MultiLineString(lines) => lines.iter().map(|line| to_coordinates(line)).collect(),
        _ => Err(RouterError::InvalidGeometry(
            "geometry is not a LineString or MultiLineString".to_string(),
        )),
    }
}

/// Positions are `[longitude, latitude, ...]`.
fn to_coordinates(positions: &[Position]) -> Result<Vec<Coordinate>> {
    positions
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] => Ok(Coordinate::new(*lat, *lon)),
            _ => Err(RouterError::InvalidGeometry(format!(
                "position {:?} needs at least two values",
                position
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_line_and_multi_line_features() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"osm_id": 42, "name": "Estrada Velha"},
                    "geometry": {"type": "LineString", "coordinates": [[-47.9, -15.7], [-47.8, -15.6, 1000.0]]}
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": {
                        "type": "MultiLineString",
                        "coordinates": [[[1.0, 2.0], [3.0, 4.0]], [[5.0, 6.0], [7.0, 8.0]]]
                    }
                }
            ]
        }"#;

        let roads = parse_roads(json).unwrap();
        assert_eq!(roads.len(), 2);

        assert_eq!(roads[0].osm_id, Some(42));
        assert_eq!(roads[0].name.as_deref(), Some("Estrada Velha"));
        assert_eq!(
            roads[0].lines,
            vec![vec![Coordinate::new(-15.7, -47.9), Coordinate::new(-15.6, -47.8)]]
        );

        assert_eq!(roads[1].lines.len(), 2);
        assert_eq!(roads[1].lines[1][0], Coordinate::new(6.0, 5.0));
    }

    #[test]
    fn skips_unusable_features() {
        let json = r#"[
            {"type": "Feature", "properties": {"name": "no geometry"}},
            {"type": "Feature", "geometry": null},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}},
            {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[1.0], [2.0, 3.0]]}},
            {"type": "Feature", "geometry": {"type": "LineString", "coordinates": "oops"}},
            {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[1.0, 2.0], [3.0, 4.0]]}}
        ]"#;

        let roads = parse_roads(json).unwrap();
        assert_eq!(roads.len(), 1);
        assert_eq!(roads[0].lines[0][1], Coordinate::new(4.0, 3.0));
    }

    #[test]
    fn accepts_a_single_feature() {
        let json = r#"{"type": "Feature", "properties": {"name": "Vicinal 3"}, "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [0.0, 1.0]]}}"#;
        let roads = parse_roads(json).unwrap();
        assert_eq!(roads.len(), 1);
        assert_eq!(roads[0].name.as_deref(), Some("Vicinal 3"));
    }

    #[test]
    fn accepts_a_bare_geometry() {
        let json = r#"{"type": "MultiLineString", "coordinates": [[[10.0, 20.0], [10.5, 20.5]]]}"#;
        let roads = parse_roads(json).unwrap();
        assert_eq!(roads.len(), 1);
        assert_eq!(roads[0].lines[0][1], Coordinate::new(20.5, 10.5));
        assert!(roads[0].name.is_none());
    }

    #[test]
    fn rejects_documents_that_are_not_json() {
        assert!(matches!(parse_roads("not json"), Err(RouterError::JsonError(_))));
        assert!(matches!(
            parse_roads(r#"{"features": 3}"#),
            Err(RouterError::InvalidGeometry(_))
        ));
        assert!(matches!(parse_roads("12"), Err(RouterError::InvalidGeometry(_))));
        assert!(matches!(
            parse_roads(r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#),
            Err(RouterError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn in_memory_collection_is_a_source() {
        let roads = vec![Road::line_string(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 0.01),
        ])];
        assert_eq!(roads.load_roads().unwrap(), roads);
    }
}
