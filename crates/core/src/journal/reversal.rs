//! Construction of reversing entries.

use bursar_shared::types::{JournalEntryId, UserId};
use chrono::{DateTime, NaiveDate, Utc};

use super::types::{EntryStatus, JournalEntry, JournalEntryLine};

/// Builds the posted entry that cancels `original`.
///
/// Every line keeps its account and swaps debit with credit, so applying both
/// entries nets every account back to where it was.
#[must_use]
pub fn build_reversal(
    original: &JournalEntry,
    sequence: u64,
    date: NaiveDate,
    reversed_by: UserId,
    at: DateTime<Utc>,
) -> JournalEntry {
    let lines = original
        .lines
        .iter()
        .map(|line| JournalEntryLine {
            line_number: line.line_number,
            account_code: line.account_code.clone(),
            debit: line.credit,
            credit: line.debit,
            description: line.description.clone(),
            reference: line.reference.clone(),
        })
        .collect();

    let mut reversal = JournalEntry::draft(
        JournalEntryId::new(),
        sequence,
        date,
        format!("Reversal: {}", original.description),
        Some(original.entry_number.clone()),
        lines,
        reversed_by,
    );
    reversal.status = EntryStatus::Posted;
    reversal.approved_by = Some(reversed_by);
    reversal.posted_at = Some(at);
    reversal.reversal_of = Some(original.id);
    reversal
}

/// Marks `original` as reversed by `reversal`.
pub fn mark_reversed(
    original: &mut JournalEntry,
    reversal: &JournalEntry,
    reversed_by: UserId,
    reason: String,
    at: DateTime<Utc>,
) {
    original.status = EntryStatus::Reversed;
    original.reversed_by_entry = Some(reversal.id);
    original.reversed_by = Some(reversed_by);
    original.reversed_at = Some(at);
    original.reversal_reason = Some(reason);
    original.updated_at = at;
}
