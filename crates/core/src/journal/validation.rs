//! Structural validation of journal entry lines.

use rust_decimal::Decimal;

use super::types::{EntryTotals, JournalEntryLine, LineInput};
use crate::error::{LedgerError, LedgerResult, LineDefect};

/// Largest amount a single line may carry (10^15).
///
/// Keeps every running total far inside the range of [`Decimal`].
pub const MAX_LINE_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Checks that there is at least one line and that every line carries exactly
/// one positive amount.
///
/// # Errors
///
/// - `EmptyEntry` if there are no lines
/// - `MalformedLine` for the first line with a negative amount, two nonzero
///   sides, no amount at all, or an amount above [`MAX_LINE_AMOUNT`]
pub fn validate_lines(lines: &[LineInput]) -> LedgerResult<()> {
    if lines.is_empty() {
        return Err(LedgerError::EmptyEntry);
    }

    for (index, line) in lines.iter().enumerate() {
        if let Some(defect) = line_defect(line.debit, line.credit) {
            return Err(LedgerError::MalformedLine {
                line: index + 1,
                defect,
            });
        }
    }

    Ok(())
}

/// Returns what is wrong with a (debit, credit) pair, if anything.
#[must_use]
pub fn line_defect(debit: Decimal, credit: Decimal) -> Option<LineDefect> {
    if debit < Decimal::ZERO || credit < Decimal::ZERO {
        Some(LineDefect::NegativeAmount)
    } else if debit > MAX_LINE_AMOUNT || credit > MAX_LINE_AMOUNT {
        Some(LineDefect::AmountTooLarge)
    } else if debit > Decimal::ZERO && credit > Decimal::ZERO {
        Some(LineDefect::BothSides)
    } else if debit == Decimal::ZERO && credit == Decimal::ZERO {
        Some(LineDefect::NoAmount)
    } else {
        None
    }
}

/// Checks that debits equal credits within `tolerance`.
///
/// # Errors
///
/// Returns `UnbalancedEntry` with both totals otherwise.
pub fn ensure_balanced(totals: EntryTotals, tolerance: Decimal) -> LedgerResult<()> {
    if totals.is_balanced(tolerance) {
        Ok(())
    } else {
        Err(LedgerError::UnbalancedEntry {
            debit: totals.debit,
            credit: totals.credit,
        })
    }
}

/// Numbers validated line inputs and trims their codes and memos.
#[must_use]
pub fn build_lines(lines: Vec<LineInput>) -> Vec<JournalEntryLine> {
    lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| JournalEntryLine {
            line_number: index + 1,
            account_code: line.account_code.trim().to_string(),
            debit: line.debit,
            credit: line.credit,
            description: non_blank(line.description),
            reference: non_blank(line.reference),
        })
        .collect()
}

pub(crate) fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
