//! Quill server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{extract::DefaultBodyLimit, middleware};
use quill_api::{AppState, router as api_router};
use quill_common::{Config, LocalStorage};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str =
    "quill=debug,quill_api=debug,quill_core=debug,quill_db=debug,tower_http=debug";

/// Headroom on top of the largest avatar for the rest of a multipart form.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if config.log.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config);

    info!("Starting quill server...");

    let db = quill_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    quill_db::migrate(&db).await?;
    info!("Migrations completed");

    tokio::fs::create_dir_all(&config.storage.base_path)
        .await
        .with_context(|| {
            format!(
                "failed to create storage directory {}",
                config.storage.base_path.display()
            )
        })?;
    let storage = Arc::new(LocalStorage::new(
        config.storage.base_path.clone(),
        config.storage.base_url.clone(),
    ));

    let state = AppState::new(Arc::new(db), storage, &config);
    let body_limit = config.storage.max_avatar_bytes + FORM_OVERHEAD_BYTES;

    let app = api_router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            quill_api::auth_middleware,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let ip = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server.host {}", config.server.host))?;
    let addr = SocketAddr::new(ip, config.server.port);
    info!(%addr, url = %config.server.url, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
