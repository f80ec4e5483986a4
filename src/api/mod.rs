//! HTTP API over the dispatch service.
//!
//! Provides two endpoints:
//! - `POST /dispatch`: solve one request, returning the full response
//! - `GET /strategies`: registered strategy names

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::service::DispatchService;

pub use types::{ErrorResponse, StrategyInfo};

/// Application state shared across all request handlers.
///
/// The service holds configuration only, so no locks are needed.
pub struct AppState {
    pub service: DispatchService,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/dispatch", post(handlers::post_dispatch))
        .route("/strategies", get(handlers::get_strategies))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
