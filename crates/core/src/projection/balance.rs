//! Balance arithmetic for the double-entry sign convention.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// The side on which an account increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalSide {
    /// Debits increase the balance.
    Debit,
    /// Credits increase the balance.
    Credit,
}

impl NormalSide {
    /// Signs a debit-minus-credit amount so that the normal side is positive.
    #[must_use]
    pub fn signed(self, net_debit: Decimal) -> Decimal {
        match self {
            Self::Debit => net_debit,
            Self::Credit => -net_debit,
        }
    }
}

/// Running debit and credit totals of one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccountTotals {
    /// Sum of debits.
    pub debit_total: Decimal,
    /// Sum of credits.
    pub credit_total: Decimal,
    /// Number of lines recorded.
    pub line_count: u64,
}

impl AccountTotals {
    /// Adds one line. The totals are left untouched on error.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if a total leaves the decimal range.
    pub fn record(&mut self, debit: Decimal, credit: Decimal) -> LedgerResult<()> {
        self.merge(&Self {
            debit_total: debit,
            credit_total: credit,
            line_count: 1,
        })
    }

    /// Adds another set of totals. The totals are left untouched on error.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if a total leaves the decimal range.
    pub fn merge(&mut self, other: &Self) -> LedgerResult<()> {
        let debit_total = self
            .debit_total
            .checked_add(other.debit_total)
            .ok_or(LedgerError::AmountOverflow)?;
        let credit_total = self
            .credit_total
            .checked_add(other.credit_total)
            .ok_or(LedgerError::AmountOverflow)?;
        *self = Self {
            debit_total,
            credit_total,
            line_count: self.line_count.saturating_add(other.line_count),
        };
        Ok(())
    }

    /// Debits minus credits.
    #[must_use]
    pub fn net_debit(&self) -> Decimal {
        self.debit_total - self.credit_total
    }

    /// Net balance, positive on the given normal side.
    #[must_use]
    pub fn balance(&self, side: NormalSide) -> Decimal {
        side.signed(self.net_debit())
    }

    /// Returns true if nothing was ever recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line_count == 0
    }
}

/// Splits a debit-minus-credit amount into (debit column, credit column).
///
/// Exactly one column is nonzero unless the amount is zero, so contra
/// balances land in the column opposite to the account's normal side.
#[must_use]
pub fn split_columns(net_debit: Decimal) -> (Decimal, Decimal) {
    if net_debit >= Decimal::ZERO {
        (net_debit, Decimal::ZERO)
    } else {
        (Decimal::ZERO, -net_debit)
    }
}
