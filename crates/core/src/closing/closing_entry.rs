//! Lines of the entry that zeroes income and expense into equity.

use rust_decimal::Decimal;

use super::trial_balance::TrialBalance;
use crate::error::{LedgerError, LedgerResult};
use crate::journal::LineInput;

/// Builds the closing lines for a trial balance taken at a period end.
///
/// Each income and expense account with a closing balance gets a line on the
/// opposite side, and the net result lands on the retained earnings account.
/// Returns no lines when there is nothing to close.
///
/// # Errors
///
/// Returns `AmountOverflow` if the net result leaves the decimal range.
pub fn closing_lines(
    trial_balance: &TrialBalance,
    retained_earnings_code: &str,
) -> LedgerResult<Vec<LineInput>> {
    let mut lines = Vec::new();
    let mut net_debit = Decimal::ZERO;

    for row in trial_balance
        .lines
        .iter()
        .filter(|row| row.account_type.is_temporary())
    {
        let amount = row.net_debit();
        if amount == Decimal::ZERO {
            continue;
        }
        net_debit = net_debit
            .checked_add(amount)
            .ok_or(LedgerError::AmountOverflow)?;
        let mut line = if amount > Decimal::ZERO {
            LineInput::credit(row.account_code.clone(), amount)
        } else {
            LineInput::debit(row.account_code.clone(), -amount)
        };
        line.description = Some(format!("Close {}", row.account_name));
        lines.push(line);
    }

    if lines.is_empty() {
        return Ok(lines);
    }

    // Net income (credit-heavy) is credited to equity; a net loss is debited.
    if net_debit != Decimal::ZERO {
        let mut line = if net_debit > Decimal::ZERO {
            LineInput::debit(retained_earnings_code, net_debit)
        } else {
            LineInput::credit(retained_earnings_code, -net_debit)
        };
        line.description = Some("Net result for the period".to_string());
        lines.push(line);
    }

    Ok(lines)
}
