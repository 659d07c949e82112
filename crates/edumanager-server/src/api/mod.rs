//! HTTP surface: router assembly and server lifecycle

pub mod response;

use std::{net::SocketAddr, time::Duration};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use tokio::signal;

use crate::config::Config;
use crate::db;
use crate::error::AppResult;
use crate::features::{self, FeatureState};
use crate::middleware;

/// Build the application router with all routes and middleware
pub fn create_router(state: FeatureState, config: &Config) -> Router {
    let pool = state.db.clone();

    Router::new()
        .route("/health", get(health_check))
        .with_state(pool)
        .nest("/api/v1", features::router(state))
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Bind, serve and wait for a shutdown signal
pub async fn serve(pool: PgPool, config: Config) -> AppResult<()> {
    let state = FeatureState::new(pool, &config);
    let app = create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn health_check(State(pool): State<PgPool>) -> Response {
    match db::health_check(&pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "version": env!("CARGO_PKG_VERSION"),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "database": "disconnected",
                })),
            )
                .into_response()
        },
    }
}

async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received terminate signal, starting graceful shutdown"),
    }

    tracing::info!(timeout_secs, "Draining open connections");
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
