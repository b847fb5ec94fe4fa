//! Ledger projection output types.

use bursar_shared::types::JournalEntryId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::balance::AccountTotals;
use crate::accounts::AccountType;
use crate::error::LedgerResult;

/// Activity of one account relative to a date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountActivity {
    /// Everything dated before the range start.
    pub opening: AccountTotals,
    /// Everything dated inside the range.
    pub period: AccountTotals,
}

impl AccountActivity {
    /// Opening plus period totals.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if a total leaves the decimal range.
    pub fn closing(&self) -> LedgerResult<AccountTotals> {
        let mut closing = self.opening;
        closing.merge(&self.period)?;
        Ok(closing)
    }

    /// Returns true if any line touched the account up to the range end.
    #[must_use]
    pub fn has_activity(&self) -> bool {
        !self.opening.is_empty() || !self.period.is_empty()
    }
}

/// One posting line in a general ledger view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralLedgerLine {
    /// Entry date.
    pub date: NaiveDate,
    /// The posting entry.
    pub entry_id: JournalEntryId,
    /// Human-readable entry number.
    pub entry_number: String,
    /// Line description, falling back to the entry description.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Balance after this line, positive on the normal side.
    pub running_balance: Decimal,
}

/// Chronological view of one account over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralLedger {
    /// Account code.
    pub account_code: String,
    /// Account name.
    pub account_name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Range start (inclusive).
    pub from: NaiveDate,
    /// Range end (inclusive).
    pub to: NaiveDate,
    /// Balance before the range.
    pub opening_balance: Decimal,
    /// Lines ordered by date, then entry sequence.
    pub lines: Vec<GeneralLedgerLine>,
    /// Debits inside the range.
    pub total_debit: Decimal,
    /// Credits inside the range.
    pub total_credit: Decimal,
    /// Balance at the range end.
    pub closing_balance: Decimal,
}
