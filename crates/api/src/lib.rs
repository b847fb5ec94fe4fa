//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes over the ledger facade
//! - Acting-user middleware
//! - JSON error mapping for ledger and request errors

pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use axum::Router;
use bursar_core::Ledger;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The double-entry ledger serving every tenant.
    pub ledger: Arc<Ledger>,
}

impl AppState {
    /// Wraps a ledger for sharing between handlers.
    #[must_use]
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(ledger),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
