//! Chart of accounts registry.
//!
//! Accounts are hierarchical, typed, and soft-deactivated rather than
//! deleted. Their balances are never stored by callers; the registry fills
//! them from the ledger projection on every read.

mod registry;
mod types;

pub use registry::ChartOfAccounts;
pub use types::{Account, AccountFilter, AccountType, AccountUpdate, NewAccount};
