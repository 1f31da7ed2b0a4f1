use crate::core::errors::{Result, RouterError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_SEARCH_RADIUS_METERS: f64 = 3000.0;
pub const DEFAULT_MAX_SNAP_DISTANCE_METERS: f64 = 5000.0;
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 30.0;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AlternativeOptions {
    /// Fractions of the main path's node count at which a node is penalized.
    pub checkpoints: Vec<f64>,
    /// Candidates sharing at least this fraction of nodes with the main route are rejected.
    pub max_overlap: f64,
    pub max_detour_factor: f64,
    pub penalty_weight: f64,
}

impl Default for AlternativeOptions {
    fn default() -> Self {
        AlternativeOptions {
            checkpoints: vec![0.15, 0.30, 0.50, 0.70, 0.85],
            max_overlap: 0.999,
            max_detour_factor: 5.0,
            penalty_weight: 1.0e9,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub search_radius_meters: f64,
    pub max_snap_distance_meters: f64,
    pub average_speed_kmh: f64,
    pub alternative: AlternativeOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            search_radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
            max_snap_distance_meters: DEFAULT_MAX_SNAP_DISTANCE_METERS,
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
            alternative: AlternativeOptions::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(RouterError::InvalidConfig(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )))
            }
        }

        positive("searchRadiusMeters", self.search_radius_meters)?;
        positive("maxSnapDistanceMeters", self.max_snap_distance_meters)?;
        positive("averageSpeedKmh", self.average_speed_kmh)?;
        positive("alternative.penaltyWeight", self.alternative.penalty_weight)?;

        if let Some(bad) = self
            .alternative
            .checkpoints
            .iter()
            .find(|f| !(0.0..=1.0).contains(*f))
        {
            return Err(RouterError::InvalidConfig(format!(
                "checkpoint fraction {} is outside [0, 1]",
                bad
            )));
        }

        let overlap = self.alternative.max_overlap;
        if !(overlap > 0.0 && overlap <= 1.0) {
            return Err(RouterError::InvalidConfig(format!(
                "alternative.maxOverlap must be in (0, 1], got {}",
                overlap
            )));
        }

        if !(self.alternative.max_detour_factor >= 1.0) {
            return Err(RouterError::InvalidConfig(format!(
                "alternative.maxDetourFactor must be at least 1, got {}",
                self.alternative.max_detour_factor
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.alternative.checkpoints.len(), 5);
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let config = EngineConfig::from_json_str(
            r#"{"searchRadiusMeters": 1500, "alternative": {"maxDetourFactor": 2.5}}"#,
        )
        .unwrap();
        assert_eq!(config.search_radius_meters, 1500.0);
        assert_eq!(config.max_snap_distance_meters, 5000.0);
        assert_eq!(config.alternative.max_detour_factor, 2.5);
        assert_eq!(config.alternative.max_overlap, 0.999);
    }

    #[test]
    fn rejects_out_of_range_checkpoint() {
        let err = EngineConfig::from_json_str(r#"{"alternative": {"checkpoints": [0.5, 1.5]}}"#)
            .unwrap_err();
        assert!(matches!(err, RouterError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_non_positive_radius() {
        let config = EngineConfig {
            search_radius_meters: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RouterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            EngineConfig::from_json_str("{not json"),
            Err(RouterError::JsonError(_))
        ));
    }
}
