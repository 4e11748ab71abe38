mod api;
mod config;
mod sentiment;
mod service;
mod storage;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::sentiment::SentimentClassifier;
use crate::service::ReviewService;
use crate::storage::ReviewStore;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("🚀 Starting Sentiment Reviews API Server");
    info!("📋 Configuration loaded");
    info!("   - Database: {:?}", config.storage.database_path);
    info!(
        "   - Lexicon: {} positive / {} negative keywords",
        config.sentiment.positive.len(),
        config.sentiment.negative.len()
    );
    info!("   - Server: {}:{}", config.server.host, config.server.port);

    // Initialize review storage
    info!("💾 Initializing review storage...");
    let store = Arc::new(ReviewStore::new(
        &config.storage.database_path,
        Duration::from_millis(config.storage.busy_timeout_ms),
    ));
    store
        .initialize()
        .with_context(|| format!("Failed to initialize {:?}", store.path()))?;
    let review_count = store.count().context("Failed to count reviews")?;
    info!("✅ Review storage ready ({} reviews)", review_count);

    let classifier = SentimentClassifier::from_config(&config.sentiment);
    let state = AppState {
        review_service: ReviewService::new(store.clone(), classifier),
    };

    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET  /health           - Health check");
    info!("   POST /api/reviews      - Add new review");
    info!("   GET  /api/reviews      - List reviews (?sentiment=positive|negative|neutral)");
    info!("");
    info!("✨ Server is ready to accept requests!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Release the store once the server has drained
    drop(store);

    info!("👋 Server shutting down gracefully");

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}
