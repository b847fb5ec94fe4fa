//! Ledger projection.
//!
//! Balances are derived from posted journal entries, never stored by callers.
//! The projector keeps per-account accumulators up to date as entries post and
//! can replay the entry log to rebuild them or to answer range queries.

mod balance;
mod projector;
mod types;

pub use balance::{AccountTotals, NormalSide, split_columns};
pub use projector::LedgerProjector;
pub use types::{AccountActivity, GeneralLedger, GeneralLedgerLine};

#[cfg(test)]
mod projector_props;
