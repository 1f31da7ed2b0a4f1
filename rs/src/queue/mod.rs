use crate::core::errors::{Result, RouterError};
use crate::core::types::{Coordinate, RouteResult};
use crate::engine::Engine;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct RouteRequest {
    #[serde(default)]
    pub id: String,
    pub origin: Coordinate,
    pub destination: Coordinate,
}

impl RouteRequest {
    pub fn new(origin: Coordinate, destination: Coordinate) -> Self {
        RouteRequest {
            id: String::new(),
            origin,
            destination,
        }
    }
}

/// Reads a JSON array of `{"id"?, "origin", "destination"}` requests.
pub fn parse_requests(json: &str) -> Result<Vec<RouteRequest>> {
    Ok(serde_json::from_str(json)?)
}

/// Per-request batch output: the route, or the error that stopped it.
#[derive(Debug, Serialize)]
pub struct RouteOutcome {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<(String, Result<RouteResult>)> for RouteOutcome {
    fn from((id, result): (String, Result<RouteResult>)) -> Self {
        match result {
            Ok(route) => RouteOutcome {
                id,
                route: Some(route),
                error: None,
            },
            Err(e) => RouteOutcome {
                id,
                route: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Batch of routing requests answered in parallel against one engine.
pub struct RouteQueue {
    queue: Mutex<VecDeque<RouteRequest>>,
    active_count: Mutex<usize>,
    pub max_concurrency: usize,
    engine: Arc<Engine>,
    pool: rayon::ThreadPool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RouteQueue {
    pub fn new(engine: Arc<Engine>, max_concurrency: Option<usize>) -> Result<Self> {
        let actual_concurrency = max_concurrency.unwrap_or_else(|| {
            let cpu_count = num_cpus::get();
            if cpu_count > 1 {
                cpu_count - 1
            } else {
                1
            }
        });

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(actual_concurrency.max(1))
            .thread_name(|i| format!("routing-worker-{}", i))
            .build()
            .map_err(|e| RouterError::ThreadPool(e.to_string()))?;

        Ok(RouteQueue {
            queue: Mutex::new(VecDeque::new()),
            active_count: Mutex::new(0),
            max_concurrency: actual_concurrency.max(1),
            engine,
            pool,
        })
    }

    /// Queues a request and returns its id, generating one if it is empty.
    pub fn enqueue(&self, mut request: RouteRequest) -> String {
        if request.id.is_empty() {
            request.id = Uuid::new_v4().to_string();
        }
        let id = request.id.clone();
        lock(&self.queue).push_back(request);
        id
    }

    /// Drains the queue and routes every request on the worker pool.
    /// Results come back in enqueue order.
    pub fn process_all(&self) -> Vec<(String, Result<RouteResult>)> {
        let requests: Vec<RouteRequest> = lock(&self.queue).drain(..).collect();
        if requests.is_empty() {
            return Vec::new();
        }
        log::debug!(
            "Processing {} route requests on {} workers",
            requests.len(),
            self.max_concurrency
        );

        self.pool.install(|| {
            requests
                .into_par_iter()
                .map(|request| {
                    *lock(&self.active_count) += 1;
                    let result = self.engine.compute_route(
                        request.origin.latitude,
                        request.origin.longitude,
                        request.destination.latitude,
                        request.destination.longitude,
                    );
                    *lock(&self.active_count) -= 1;
                    (request.id, result)
                })
                .collect()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.queue_size() == 0 && self.active_count() == 0
    }

    pub fn queue_size(&self) -> usize {
        lock(&self.queue).len()
    }

    pub fn active_count(&self) -> usize {
        *lock(&self.active_count)
    }

    pub fn clear(&self) {
        lock(&self.queue).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;
    use crate::core::types::Road;
    use crate::processing::build_graph;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    fn engine() -> Arc<Engine> {
        let graph = build_graph(&[Road::line_string(vec![
            c(0.0, 0.0),
            c(0.0, 0.01),
            c(0.0, 0.02),
        ])]);
        Arc::new(Engine::with_graph(EngineConfig::default(), graph).unwrap())
    }

    #[test]
    fn enqueue_assigns_ids_when_missing() {
        let queue = RouteQueue::new(engine(), Some(2)).unwrap();
        let generated = queue.enqueue(RouteRequest::new(c(0.0, 0.0), c(0.0, 0.02)));
        let given = queue.enqueue(RouteRequest {
            id: "farm-17".to_string(),
            origin: c(0.0, 0.0),
            destination: c(0.0, 0.02),
        });

        assert!(Uuid::parse_str(&generated).is_ok());
        assert_eq!(given, "farm-17");
        assert_eq!(queue.queue_size(), 2);
        assert!(!queue.is_empty());

        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    fn processes_requests_in_enqueue_order() {
        let queue = RouteQueue::new(engine(), Some(3)).unwrap();
        let ids: Vec<String> = (0..6)
            .map(|i| {
                let lon = 0.002 * i as f64;
                queue.enqueue(RouteRequest::new(c(0.0001, lon), c(-0.0001, 0.019)))
            })
            .collect();
        let unreachable = queue.enqueue(RouteRequest::new(c(5.0, 5.0), c(0.0, 0.02)));

        let results = queue.process_all();
        assert_eq!(results.len(), 7);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(&results[i].0, id);
            assert!(results[i].1.is_ok());
        }
        assert_eq!(results[6].0, unreachable);
        assert!(matches!(results[6].1, Err(RouterError::RoadNotFound { .. })));
        assert!(queue.is_empty());
        assert!(queue.process_all().is_empty());
    }

    #[test]
    fn batch_file_requests_become_outcomes() {
        let requests = parse_requests(
            r#"[
                {"id": "escola", "origin": {"latitude": 0.0001, "longitude": 0.001},
                 "destination": {"latitude": -0.0001, "longitude": 0.019}},
                {"origin": {"latitude": 5.0, "longitude": 5.0},
                 "destination": {"latitude": 0.0, "longitude": 0.02}}
            ]"#,
        )
        .unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].id.is_empty());

        let queue = RouteQueue::new(engine(), Some(2)).unwrap();
        for request in requests {
            queue.enqueue(request);
        }
        let outcomes: Vec<RouteOutcome> =
            queue.process_all().into_iter().map(RouteOutcome::from).collect();

        assert_eq!(outcomes[0].id, "escola");
        assert!(outcomes[0].route.is_some());
        assert!(outcomes[0].error.is_none());

        assert!(Uuid::parse_str(&outcomes[1].id).is_ok());
        assert!(outcomes[1].route.is_none());
        assert!(outcomes[1].error.as_deref().unwrap().starts_with("No road found"));

        let json = serde_json::to_value(&outcomes[1]).unwrap();
        assert!(json.get("route").is_none());
    }

    #[test]
    fn malformed_batch_is_an_error() {
        assert!(matches!(
            parse_requests(r#"[{"id": "x"}]"#),
            Err(RouterError::JsonError(_))
        ));
    }
}
