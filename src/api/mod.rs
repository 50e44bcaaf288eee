//! Livepush HTTP Server
//!
//! HTTP layer for Livepush, built with Axum.
//!
//! # Endpoints
//!
//! - `GET /` - Page with the live payload and its update script
//! - `GET /ws` - WebSocket live-push channel
//! - `GET /snapshot` - Current clock face as an SVG document
//! - `GET /health/live` - Liveness probe
//! - `GET /health` - Status with active session count
//!
//! Other paths answer 404 `Not found`; non-GET requests to `/` answer
//! 405 `Method not allowed`.
//!
//! # Example
//!
//! ```rust,no_run
//! use livepush::api::{serve, AppState};
//! use livepush::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let state = AppState::from_config(&config)?;
//!     serve(state, config.socket_addr()?).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::websocket::websocket_handler;

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .route(
            "/",
            get(routes::home::home).fallback(routes::home::method_not_allowed),
        )
        .route("/snapshot", get(routes::snapshot::snapshot))
        .route("/ws", get(websocket_handler))
        .nest("/health", health_routes)
        .fallback(routes::home::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Start the server
///
/// Failing to bind is the only error that escapes; session failures stay
/// inside their session.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), ApiError> {
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Livepush listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Livepush shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
