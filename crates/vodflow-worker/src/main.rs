//! Transcode worker binary.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vodflow_queue::TranscodeQueue;
use vodflow_store::{InMemoryVideoStore, VideoStore};
use vodflow_worker::{FfmpegTranscoder, WorkerConfig, WorkerLoop};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vodflow=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting vodflow-worker");

    // Load configuration
    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    // The durable store implementation is swapped in by the deployment; the
    // in-memory store serves local runs.
    let store: Arc<dyn VideoStore> = Arc::new(InMemoryVideoStore::new(&config.ingest_dir));
    let queue = Arc::new(TranscodeQueue::new());
    let transcoder = Arc::new(FfmpegTranscoder::new());

    let worker = WorkerLoop::new(config, store, queue, transcoder);
    let shutdown = worker.shutdown_handle();

    // Setup signal handlers
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        shutdown.send(true).ok();
    });

    // Run the loop to completion
    if let Err(e) = worker.run().await {
        error!("Worker error: {}", e);
        std::process::exit(1);
    }

    info!("Worker shutdown complete");
}
