//! Bursar API Server
//!
//! Main entry point for the Bursar ledger service.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bursar_api::{AppState, create_router};
use bursar_core::{Ledger, LedgerSettings};
use bursar_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bursar=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let settings = LedgerSettings::from(&config.ledger);
    info!(
        balance_tolerance = %settings.balance_tolerance,
        retained_earnings_code = ?settings.retained_earnings_code,
        "Ledger configured"
    );
    let state = AppState::new(Ledger::in_memory(settings));

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
