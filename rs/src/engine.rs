use crate::core::config::EngineConfig;
use crate::core::errors::{Result, RouterError};
use crate::core::types::{Coordinate, Road, RouteLeg, RouteResult, SnapResult};
use crate::graph::{GraphStats, NodeId, RoadGraph};
use crate::parser::RoadSource;
use crate::processing::build_graph;
use crate::routing::{assemble, find_alternative, find_path, WeightOverrides};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Owns one road graph and answers routing requests against it.
///
/// The graph is built by [`Engine::initialize`]; until that completes every
/// request fails with [`RouterError::EngineNotInitialized`]. Requests never
/// mutate the graph, so an `Engine` can serve them from many threads.
pub struct Engine {
    config: EngineConfig,
    source: Arc<dyn RoadSource>,
    graph: OnceCell<Arc<RoadGraph>>,
}

struct MainRoute {
    start_pin: Coordinate,
    end_pin: Coordinate,
    start_snap: SnapResult,
    end_snap: SnapResult,
    path: Vec<NodeId>,
    leg: RouteLeg,
}

impl Engine {
    pub fn new<S>(config: EngineConfig, source: S) -> Result<Self>
    where
        S: RoadSource + 'static,
    {
        config.validate()?;
        Ok(Engine {
            config,
            source: Arc::new(source),
            graph: OnceCell::new(),
        })
    }

    /// Engine over an already built graph; it is initialized from the start.
    pub fn with_graph(config: EngineConfig, graph: RoadGraph) -> Result<Self> {
        config.validate()?;
        Ok(Engine {
            config,
            source: Arc::new(Vec::<Road>::new()),
            graph: OnceCell::from(Arc::new(graph)),
        })
    }

    /// Loads the roads and builds the graph on a blocking task. Calling it
    /// again after success returns immediately; concurrent callers share one build.
    pub async fn initialize(&self) -> Result<()> {
        self.graph
            .get_or_try_init(|| async {
                let source = Arc::clone(&self.source);
                log::info!("Building road graph");

                let graph = tokio::task::spawn_blocking(move || -> Result<RoadGraph> {
                    let roads = source.load_roads()?;
                    Ok(build_graph(&roads))
                })
                .await
                .map_err(|e| RouterError::InitializationFailed(e.to_string()))??;

                Ok::<_, RouterError>(Arc::new(graph))
            })
            .await?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.graph.initialized()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> Result<&Arc<RoadGraph>> {
        self.graph.get().ok_or(RouterError::EngineNotInitialized)
    }

    pub fn stats(&self) -> Result<GraphStats> {
        Ok(self.graph()?.stats())
    }

    /// Snaps a coordinate onto the road network.
    pub fn snap(&self, latitude: f64, longitude: f64) -> Result<SnapResult> {
        let graph = self.graph()?;
        self.snap_on(graph, Coordinate::new(latitude, longitude))
    }

    fn snap_on(&self, graph: &RoadGraph, point: Coordinate) -> Result<SnapResult> {
        graph
            .locate(
                &point,
                self.config.search_radius_meters,
                self.config.max_snap_distance_meters,
            )
            .ok_or(RouterError::RoadNotFound {
                latitude: point.latitude,
                longitude: point.longitude,
            })
    }

    fn main_route(
        &self,
        graph: &RoadGraph,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<MainRoute> {
        let start_snap = self.snap_on(graph, origin)?;
        let end_snap = self.snap_on(graph, destination)?;

        let path = find_path(
            graph,
            start_snap.entry_node,
            end_snap.entry_node,
            &WeightOverrides::new(),
        )
        .ok_or(RouterError::NoPathFound)?;

        let leg = assemble(
            graph,
            &path,
            origin,
            &start_snap,
            &end_snap,
            destination,
            self.config.average_speed_kmh,
        )
        .ok_or(RouterError::NoPathFound)?;

        Ok(MainRoute {
            start_pin: origin,
            end_pin: destination,
            start_snap,
            end_snap,
            path,
            leg,
        })
    }

    /// Main route between two coordinates plus, when one exists, an
    /// alternative that avoids part of it.
    pub fn compute_route(
        &self,
        origin_lat: f64,
        origin_lng: f64,
        dest_lat: f64,
        dest_lng: f64,
    ) -> Result<RouteResult> {
        let graph = self.graph()?;
        let main = self.main_route(
            graph,
            Coordinate::new(origin_lat, origin_lng),
            Coordinate::new(dest_lat, dest_lng),
        )?;

        let alternative = find_alternative(
            graph,
            &main.path,
            &main.leg,
            &main.start_snap,
            &main.end_snap,
            main.start_pin,
            main.end_pin,
            &self.config.alternative,
            self.config.average_speed_kmh,
        );

        log::debug!(
            "Route computed: {} ({} points), alternative: {}",
            main.leg.formatted_distance,
            main.leg.path.len(),
            alternative
                .as_ref()
                .map_or("none".to_string(), |leg| leg.formatted_distance.clone())
        );

        Ok(RouteResult {
            main: main.leg,
            alternative,
        })
    }

    /// Polyline of the main route only, without searching for an alternative.
    pub fn compute_main_path(
        &self,
        origin_lat: f64,
        origin_lng: f64,
        dest_lat: f64,
        dest_lng: f64,
    ) -> Result<Vec<Coordinate>> {
        let graph = self.graph()?;
        let main = self.main_route(
            graph,
            Coordinate::new(origin_lat, origin_lng),
            Coordinate::new(dest_lat, dest_lng),
        )?;
        Ok(main.leg.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    fn single_road() -> Vec<Road> {
        vec![Road::line_string(vec![
            c(0.0, 0.0),
            c(0.0, 0.01),
            c(0.0, 0.02),
            c(0.0, 0.03),
        ])]
    }

    #[test]
    fn requests_before_initialize_fail() {
        let engine = Engine::new(EngineConfig::default(), single_road()).unwrap();
        assert!(!engine.is_initialized());
        assert!(matches!(
            engine.compute_route(0.0, 0.0, 0.0, 0.03),
            Err(RouterError::EngineNotInitialized)
        ));
        assert!(matches!(engine.stats(), Err(RouterError::EngineNotInitialized)));
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let engine = Engine::new(EngineConfig::default(), single_road()).unwrap();
        engine.initialize().await.unwrap();
        let first = Arc::as_ptr(engine.graph().unwrap());
        engine.initialize().await.unwrap();
        assert_eq!(first, Arc::as_ptr(engine.graph().unwrap()));
        assert_eq!(engine.stats().unwrap().segments, 3);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig {
            average_speed_kmh: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            Engine::new(config, single_road()),
            Err(RouterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn single_road_has_no_alternative() {
        let engine =
            Engine::with_graph(EngineConfig::default(), build_graph(&single_road())).unwrap();
        let result = engine.compute_route(0.0005, 0.001, -0.0005, 0.029).unwrap();

        assert!(result.alternative.is_none());
        assert_eq!(result.main.path.first(), Some(&c(0.0005, 0.001)));
        assert_eq!(result.main.path.last(), Some(&c(-0.0005, 0.029)));
    }

    #[test]
    fn far_away_points_are_not_snapped() {
        let engine =
            Engine::with_graph(EngineConfig::default(), build_graph(&single_road())).unwrap();
        assert!(matches!(
            engine.compute_route(1.0, 1.0, 0.0, 0.03),
            Err(RouterError::RoadNotFound { .. })
        ));
        assert!(engine.snap(0.0001, 0.015).is_ok());
    }
}
