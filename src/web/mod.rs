//! Web form front-end.
//!
//! Routes:
//! - `GET /` form prefilled with the default state
//! - `POST /simulate` results page
//! - `POST /api/simulate` JSON in, named results out
//! - `POST /report` customer report as a download

mod handlers;
pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::engine::types::EngineParams;

/// Immutable application state shared across all request handlers.
///
/// Every request builds its own input from the posted form, so nothing here
/// changes after startup and no locks are needed.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Business rules applied to every simulation.
    pub params: EngineParams,
    /// Customer name prefilled in the form.
    pub customer: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            params: EngineParams::default(),
            customer: "Cliente".to_string(),
        }
    }
}

/// Builds the axum router with all routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/simulate", post(handlers::simulate))
        .route("/api/simulate", post(handlers::api_simulate))
        .route("/report", post(handlers::download_report))
        .with_state(state)
}

/// Binds to the given address and serves the front-end.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "web front-end listening");
    axum::serve(listener, app).await
}
