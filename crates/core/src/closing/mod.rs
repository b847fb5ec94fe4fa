//! Trial balance and period closing.
//!
//! Periods move `open -> closed -> locked`, with `closed -> open` allowed for
//! authorized reopens. A period closes only when its pro-forma trial balance
//! balances, and no posting can land in it while the close runs.

mod closing_entry;
mod coordinator;
mod period;
mod trial_balance;

pub use closing_entry::closing_lines;
pub use coordinator::{CloseOutcome, ClosePeriodInput, ClosingCoordinator};
pub use period::{
    AccountingPeriod, NewPeriod, PeriodKind, PeriodStatus, PeriodTransition, validate_date_range,
};
pub use trial_balance::{TrialBalance, TrialBalanceLine, TrialBalanceTotals};

#[cfg(test)]
mod trial_balance_props;
