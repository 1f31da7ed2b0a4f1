use std::io::Error as IoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("File IO Error: {0}")]
    FileIO(#[from] IoError),
    #[error("JSON Deserialization Error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid Geometry: {0}")]
    InvalidGeometry(String),
    #[error("Invalid Configuration: {0}")]
    InvalidConfig(String),
    #[error("Routing engine is not initialized")]
    EngineNotInitialized,
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),
    #[error("No road found near ({latitude}, {longitude})")]
    RoadNotFound { latitude: f64, longitude: f64 },
    #[error("No path found between origin and destination")]
    NoPathFound,
    #[error("Thread Pool Error: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, RouterError>;
