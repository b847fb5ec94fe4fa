//! Double-entry accounting core for Bursar.
//!
//! This crate contains the bookkeeping domain with ZERO web dependencies.
//! Storage sits behind the traits in [`store`], and every operation takes the
//! tenant explicitly.
//!
//! # Modules
//!
//! - `accounts` - Chart of accounts registry
//! - `journal` - Drafting, posting and reversing journal entries
//! - `projection` - Account balances and general ledger views
//! - `closing` - Trial balance and period closing
//! - `store` - Repository traits and the in-memory backend
//! - `ledger` - Facade wiring the components together

pub mod accounts;
pub mod closing;
pub mod error;
pub mod journal;
pub mod ledger;
pub mod locks;
pub mod projection;
pub mod store;

pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use ledger::{Ledger, LedgerSettings};
