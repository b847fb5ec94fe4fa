//! Trial balance aggregation.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::accounts::{Account, AccountType};
use crate::error::{LedgerError, LedgerResult};
use crate::projection::{AccountActivity, split_columns};

/// One account row of a trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalanceLine {
    /// Account code.
    pub account_code: String,
    /// Account name.
    pub account_name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Whether the account is active.
    pub is_active: bool,
    /// Balance before the range, positive on the normal side.
    pub opening_balance: Decimal,
    /// Debits inside the range.
    pub debit_movement: Decimal,
    /// Credits inside the range.
    pub credit_movement: Decimal,
    /// Balance at the range end, positive on the normal side.
    pub closing_balance: Decimal,
    /// Closing amount in the debit column.
    pub debit: Decimal,
    /// Closing amount in the credit column.
    pub credit: Decimal,
}

impl TrialBalanceLine {
    /// Debit column minus credit column.
    #[must_use]
    pub fn net_debit(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// Trial balance totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrialBalanceTotals {
    /// Total debits inside the range.
    pub debit_movement: Decimal,
    /// Total credits inside the range.
    pub credit_movement: Decimal,
    /// Total of the closing debit column.
    pub total_debit: Decimal,
    /// Total of the closing credit column.
    pub total_credit: Decimal,
    /// Absolute difference between the closing columns.
    pub difference: Decimal,
    /// Whether the difference is within tolerance.
    pub is_balanced: bool,
}

/// Point-in-time trial balance over an inclusive date range.
#[derive(Debug, Clone, Serialize)]
pub struct TrialBalance {
    /// Range start.
    pub from: NaiveDate,
    /// Range end.
    pub to: NaiveDate,
    /// When the snapshot was taken.
    pub generated_at: DateTime<Utc>,
    /// True for a pro-forma balance that also counts drafts.
    pub includes_drafts: bool,
    /// Tolerance used for `is_balanced`.
    pub tolerance: Decimal,
    /// Rows ordered by account code.
    pub lines: Vec<TrialBalanceLine>,
    /// Aggregate totals.
    pub totals: TrialBalanceTotals,
}

impl TrialBalance {
    /// Aggregates account activity into a trial balance.
    ///
    /// Every active account is listed. Inactive accounts are listed only when
    /// something was posted to them up to the range end.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if a balance or total leaves the decimal range.
    pub fn build(
        from: NaiveDate,
        to: NaiveDate,
        accounts: &[Account],
        activity: &HashMap<String, AccountActivity>,
        includes_drafts: bool,
        tolerance: Decimal,
    ) -> LedgerResult<Self> {
        let mut lines: Vec<TrialBalanceLine> = accounts
            .iter()
            .filter_map(|account| {
                let activity = activity.get(&account.code).copied().unwrap_or_default();
                if !account.is_active && !activity.has_activity() {
                    return None;
                }
                Some(line_for(account, &activity))
            })
            .collect::<LedgerResult<_>>()?;
        lines.sort_by(|a, b| a.account_code.cmp(&b.account_code));

        let totals = totals_of(&lines, tolerance)?;

        Ok(Self {
            from,
            to,
            generated_at: Utc::now(),
            includes_drafts,
            tolerance,
            lines,
            totals,
        })
    }

    /// Returns true if total debits equal total credits within tolerance.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.totals.is_balanced
    }
}

fn line_for(account: &Account, activity: &AccountActivity) -> LedgerResult<TrialBalanceLine> {
    let side = account.account_type.normal_side();
    let closing = activity.closing()?;
    let (debit, credit) = split_columns(closing.net_debit());

    Ok(TrialBalanceLine {
        account_code: account.code.clone(),
        account_name: account.name.clone(),
        account_type: account.account_type,
        is_active: account.is_active,
        opening_balance: activity.opening.balance(side),
        debit_movement: activity.period.debit_total,
        credit_movement: activity.period.credit_total,
        closing_balance: closing.balance(side),
        debit,
        credit,
    })
}

fn checked_sum(mut amounts: impl Iterator<Item = Decimal>) -> LedgerResult<Decimal> {
    amounts.try_fold(Decimal::ZERO, |sum, amount| {
        sum.checked_add(amount).ok_or(LedgerError::AmountOverflow)
    })
}

fn totals_of(lines: &[TrialBalanceLine], tolerance: Decimal) -> LedgerResult<TrialBalanceTotals> {
    let debit_movement = checked_sum(lines.iter().map(|l| l.debit_movement))?;
    let credit_movement = checked_sum(lines.iter().map(|l| l.credit_movement))?;
    let total_debit = checked_sum(lines.iter().map(|l| l.debit))?;
    let total_credit = checked_sum(lines.iter().map(|l| l.credit))?;
    let difference = (total_debit - total_credit).abs();

    Ok(TrialBalanceTotals {
        debit_movement,
        credit_movement,
        total_debit,
        total_credit,
        difference,
        is_balanced: difference <= tolerance,
    })
}
