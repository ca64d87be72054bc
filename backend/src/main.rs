//! Diet Planner Backend
//!
//! Serves personalized weekly meal and workout plans.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: Dataset encoding, ranking model, scoring and plan assembly
//! - State: The load-once engine context shared by every request

use anyhow::{Context, Result};
use diet_planner_backend::{config, routes, state::AppState, state::EngineContext};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting Diet Planner Backend"
    );

    if config::AppConfig::is_production() {
        check_production_config(&config);
    }

    // Metrics exporter (optional)
    if config.metrics.enabled {
        install_metrics_exporter(&config.metrics.listen)?;
    }

    // Load dataset and model once; failures degrade instead of aborting
    let engine = tokio::task::spawn_blocking({
        let config = config.clone();
        move || EngineContext::load(&config)
    })
    .await
    .context("Engine loading task failed")?;

    let status = engine.status();
    info!(
        dataset_loaded = status.dataset_loaded,
        model_loaded = status.model_loaded,
        recipes = status.recipe_count,
        loaded_at = %engine.loaded_at(),
        "Engine ready"
    );

    // Create application state
    let state = AppState::new(engine, config.clone());

    // Build application
    let app = routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "diet_planner_backend=info,tower_http=info".into()
        } else {
            "diet_planner_backend=debug,tower_http=debug".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Start the Prometheus scrape endpoint
fn install_metrics_exporter(listen: &str) -> Result<()> {
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("Invalid metrics listen address: {}", listen))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;

    info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Warn about settings that are legal but unusual in production
fn check_production_config(config: &config::AppConfig) {
    if config.scoring.seed.is_some() {
        warn!("scoring.seed is set - every unseeded request will receive the same plan");
    }

    if !config.dataset.path.exists() {
        warn!(
            path = %config.dataset.path.display(),
            "Recipe dataset not found - the service will start in degraded mode"
        );
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
