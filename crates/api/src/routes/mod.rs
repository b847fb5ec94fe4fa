//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::actor::actor_middleware};

pub mod accounts;
pub mod health;
pub mod journal_entries;
pub mod periods;
pub mod trial_balance;

/// Creates the API router with every route.
///
/// Ledger routes sit behind [`actor_middleware`]; the health check does not.
pub fn api_routes() -> Router<AppState> {
    let ledger_routes = Router::new()
        .merge(accounts::routes())
        .merge(journal_entries::routes())
        .merge(periods::routes())
        .merge(trial_balance::routes())
        .layer(middleware::from_fn(actor_middleware));

    Router::new().merge(health::routes()).merge(ledger_routes)
}
