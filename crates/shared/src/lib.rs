//! Shared types, errors, and configuration for Bursar.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references (tenants, users, entries, periods)
//! - Pagination types for list endpoints
//! - Request-level error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, LedgerConfig, ServerConfig};
pub use error::{AppError, AppResult};
