//! API server binary.

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vshare_api::services::ResultApplier;
use vshare_api::{create_router, ApiConfig, AppState};
use vshare_queue::QueueConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production.
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vshare=info".parse().unwrap())
        .add_directive("tower_http=info".parse().unwrap())
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

    info!("Starting vshare-api");

    let config = ApiConfig::from_env();
    let bind_addr = config.bind_addr();
    let result_group_id = config.result_group_id.clone();

    let state = match AppState::new(config).await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            std::process::exit(1);
        }
    };

    let queue_config = match QueueConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load queue config: {}", e);
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    // Result applier runs as a background task in the serving process.
    let applier = ResultApplier::new(
        state.repo.clone(),
        state.index_sync.clone(),
        queue_config,
        result_group_id,
    );
    let applier_rx = shutdown_rx.clone();
    let applier_handle = tokio::spawn(async move {
        if let Err(e) = applier.run(applier_rx).await {
            error!("Result applier error: {}", e);
        }
    });

    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };
    info!("Listening on {}", bind_addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    if let Err(e) = server.await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    applier_handle.await.ok();
    info!("API shutdown complete");
}
