//! Transcode worker binary.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vshare_media::FfmpegProcessor;
use vshare_queue::QueueConfig;
use vshare_storage::ObjectStore;
use vshare_worker::{S3BlobStore, TaskExecutor, WorkerConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production.
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vshare=info".parse().unwrap())
        .add_directive("rdkafka=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }

    info!("Starting vshare-worker");

    if let Err(e) = vshare_media::check_ffmpeg() {
        error!("{}", e);
        std::process::exit(1);
    }
    if let Err(e) = vshare_media::check_ffprobe() {
        error!("{}", e);
        std::process::exit(1);
    }

    let worker_config = WorkerConfig::from_env();

    let queue_config = match QueueConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load queue config: {}", e);
            std::process::exit(1);
        }
    };

    let object_store = match ObjectStore::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create object store client: {}", e);
            std::process::exit(1);
        }
    };

    let store = Arc::new(S3BlobStore::new(
        object_store,
        worker_config.download_timeout,
        worker_config.upload_timeout,
    ));
    let media = Arc::new(FfmpegProcessor::new());

    let executor = match TaskExecutor::new(&worker_config, &queue_config, media, store) {
        Ok(e) => e,
        Err(e) => {
            error!("Failed to create task executor: {}", e);
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    if let Err(e) = executor.run(shutdown_rx).await {
        error!("Executor error: {}", e);
        std::process::exit(1);
    }

    info!("Worker shutdown complete");
}
