//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Ledger rules configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Ledger rules configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Largest absolute difference between debits and credits still treated as balanced.
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: Decimal,
    /// Equity account that receives income and expense when a period is closed.
    ///
    /// When unset, periods close without posting closing entries.
    #[serde(default)]
    pub retained_earnings_code: Option<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: default_balance_tolerance(),
            retained_earnings_code: None,
        }
    }
}

fn default_balance_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BURSAR").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
