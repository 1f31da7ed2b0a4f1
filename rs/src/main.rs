//! Command-line front end: builds the routing engine from a roads GeoJSON
//! file and prints one route, or a batch of routes, as JSON.

use clap::Parser;
use log::{error, info};
use rural_road_router::{
    parse_requests, Engine, EngineConfig, GeoJsonFile, Result, RouteOutcome, RouteQueue,
    RouterError,
};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "rural-road-router")]
#[command(about = "Shortest and alternative routes over a rural road network")]
#[command(version)]
struct Cli {
    /// GeoJSON file with LineString / MultiLineString road features
    #[arg(long)]
    roads: PathBuf,

    /// JSON file with engine settings (search radius, alternative options, ...)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of {"id", "origin", "destination"} requests routed in parallel
    #[arg(long, conflicts_with_all = ["origin_lat", "origin_lng", "dest_lat", "dest_lng"])]
    batch: Option<PathBuf>,

    /// Worker threads for --batch (defaults to CPU count - 1)
    #[arg(long, requires = "batch")]
    workers: Option<usize>,

    #[arg(allow_negative_numbers = true, required_unless_present = "batch")]
    origin_lat: Option<f64>,
    #[arg(allow_negative_numbers = true, required_unless_present = "batch")]
    origin_lng: Option<f64>,
    #[arg(allow_negative_numbers = true, required_unless_present = "batch")]
    dest_lat: Option<f64>,
    #[arg(allow_negative_numbers = true, required_unless_present = "batch")]
    dest_lng: Option<f64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    let engine = Engine::new(config, GeoJsonFile::new(&cli.roads))?;
    engine.initialize().await?;

    if let Some(batch) = &cli.batch {
        let requests = parse_requests(&fs::read_to_string(batch)?)?;
        let queue = RouteQueue::new(Arc::new(engine), cli.workers)?;
        for request in requests {
            queue.enqueue(request);
        }
        info!("Routing {} requests", queue.queue_size());

        let outcomes: Vec<RouteOutcome> = tokio::task::spawn_blocking(move || queue.process_all())
            .await
            .map_err(|e| RouterError::ThreadPool(e.to_string()))?
            .into_iter()
            .map(RouteOutcome::from)
            .collect();
        return print_json(&outcomes, cli.pretty);
    }

    let (Some(origin_lat), Some(origin_lng), Some(dest_lat), Some(dest_lng)) =
        (cli.origin_lat, cli.origin_lng, cli.dest_lat, cli.dest_lng)
    else {
        return Err(RouterError::InvalidConfig(
            "origin and destination coordinates are required".to_string(),
        ));
    };
    let route = engine.compute_route(origin_lat, origin_lng, dest_lat, dest_lng)?;
    print_json(&route, cli.pretty)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}
