//! Journal entry domain types.

use std::fmt;

use bursar_shared::types::{JournalEntryId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Journal entry status.
///
/// `draft --post--> posted --reverse--> reversed`. Drafts may also be
/// discarded, which deletes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Editable, does not affect balances.
    Draft,
    /// Immutable and reflected in balances.
    Posted,
    /// Cancelled by a later reversing entry (terminal).
    Reversed,
}

impl EntryStatus {
    /// Returns true if the entry can still be edited or discarded.
    #[must_use]
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the entry's lines count toward account balances.
    ///
    /// Reversed entries still count: their effect is cancelled by the
    /// reversing entry, not by dropping history.
    #[must_use]
    pub fn affects_balances(self) -> bool {
        matches!(self, Self::Posted | Self::Reversed)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Posted => write!(f, "posted"),
            Self::Reversed => write!(f, "reversed"),
        }
    }
}

/// One debit or credit line of a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryLine {
    /// 1-based position within the entry.
    pub line_number: usize,
    /// Target account code.
    pub account_code: String,
    /// Debit amount (zero on credit lines).
    pub debit: Decimal,
    /// Credit amount (zero on debit lines).
    pub credit: Decimal,
    /// Optional line memo.
    pub description: Option<String>,
    /// Optional external reference.
    pub reference: Option<String>,
}

/// A journal entry and its audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique id, also the idempotency key for posting.
    pub id: JournalEntryId,
    /// Per-tenant sequence number.
    pub sequence: u64,
    /// Human-readable number, e.g. "JE-000042".
    pub entry_number: String,
    /// Accounting date.
    pub date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// Optional external reference.
    pub reference: Option<String>,
    /// Ordered lines.
    pub lines: Vec<JournalEntryLine>,
    /// Current status.
    pub status: EntryStatus,
    /// Author of the draft.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// User who posted the entry.
    pub approved_by: Option<UserId>,
    /// When the entry was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// On a reversing entry, the entry it cancels.
    pub reversal_of: Option<JournalEntryId>,
    /// On a reversed entry, the entry that cancels it.
    pub reversed_by_entry: Option<JournalEntryId>,
    /// User who requested the reversal.
    pub reversed_by: Option<UserId>,
    /// When the reversal happened.
    pub reversed_at: Option<DateTime<Utc>>,
    /// Why the entry was reversed.
    pub reversal_reason: Option<String>,
}

impl JournalEntry {
    /// Builds a new draft entry.
    #[must_use]
    pub fn draft(
        id: JournalEntryId,
        sequence: u64,
        date: NaiveDate,
        description: String,
        reference: Option<String>,
        lines: Vec<JournalEntryLine>,
        created_by: UserId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            sequence,
            entry_number: format_entry_number(sequence),
            date,
            description,
            reference,
            lines,
            status: EntryStatus::Draft,
            created_by,
            created_at: now,
            updated_at: now,
            approved_by: None,
            posted_at: None,
            reversal_of: None,
            reversed_by_entry: None,
            reversed_by: None,
            reversed_at: None,
            reversal_reason: None,
        }
    }

    /// Distinct account codes referenced by the lines, in line order.
    #[must_use]
    pub fn account_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            if !codes.contains(&line.account_code.as_str()) {
                codes.push(&line.account_code);
            }
        }
        codes
    }

    /// Recomputes debit and credit totals from the lines.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if a total leaves the decimal range.
    pub fn totals(&self) -> LedgerResult<EntryTotals> {
        EntryTotals::of(self.lines.iter().map(|line| (line.debit, line.credit)))
    }
}

/// Formats a sequence number as an entry number.
#[must_use]
pub fn format_entry_number(sequence: u64) -> String {
    format!("JE-{sequence:06}")
}

/// Debit and credit totals of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryTotals {
    /// Sum of debits.
    pub debit: Decimal,
    /// Sum of credits.
    pub credit: Decimal,
}

impl EntryTotals {
    /// Sums (debit, credit) pairs.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if a sum leaves the decimal range.
    pub fn of(amounts: impl IntoIterator<Item = (Decimal, Decimal)>) -> LedgerResult<Self> {
        amounts.into_iter().try_fold(
            Self {
                debit: Decimal::ZERO,
                credit: Decimal::ZERO,
            },
            |acc, (debit, credit)| {
                Ok(Self {
                    debit: acc
                        .debit
                        .checked_add(debit)
                        .ok_or(LedgerError::AmountOverflow)?,
                    credit: acc
                        .credit
                        .checked_add(credit)
                        .ok_or(LedgerError::AmountOverflow)?,
                })
            },
        )
    }

    /// Absolute difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        (self.debit - self.credit).abs()
    }

    /// Returns true if debits and credits agree within `tolerance`.
    #[must_use]
    pub fn is_balanced(&self, tolerance: Decimal) -> bool {
        self.difference() <= tolerance
    }
}

/// Input for one line of a draft.
#[derive(Debug, Clone, Deserialize)]
pub struct LineInput {
    /// Target account code.
    pub account_code: String,
    /// Debit amount.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount.
    #[serde(default)]
    pub credit: Decimal,
    /// Optional line memo.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional external reference.
    #[serde(default)]
    pub reference: Option<String>,
}

impl LineInput {
    /// A debit line.
    #[must_use]
    pub fn debit(account_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
            reference: None,
        }
    }

    /// A credit line.
    #[must_use]
    pub fn credit(account_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
            reference: None,
        }
    }
}

/// Input for creating or replacing a draft.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftInput {
    /// Accounting date.
    pub date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// Optional external reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Ordered lines.
    pub lines: Vec<LineInput>,
}

/// Input for reversing a posted entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ReverseInput {
    /// Why the entry is reversed. Must not be blank.
    pub reason: String,
    /// Date of the reversing entry; defaults to the original date.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Filter for listing journal entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryFilter {
    /// Only entries with this status.
    #[serde(default)]
    pub status: Option<EntryStatus>,
    /// Only entries dated on or after this date.
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Only entries dated on or before this date.
    #[serde(default)]
    pub to: Option<NaiveDate>,
    /// Only entries with a line on this account.
    #[serde(default)]
    pub account_code: Option<String>,
}

impl EntryFilter {
    /// Returns true if the entry passes every set criterion.
    #[must_use]
    pub fn matches(&self, entry: &JournalEntry) -> bool {
        self.status.is_none_or(|status| entry.status == status)
            && self.from.is_none_or(|from| entry.date >= from)
            && self.to.is_none_or(|to| entry.date <= to)
            && self.account_code.as_deref().is_none_or(|code| {
                entry.lines.iter().any(|line| line.account_code == code)
            })
    }
}

/// Result of a reversal: the original entry and its reversing entry.
#[derive(Debug, Clone, Serialize)]
pub struct ReversalOutcome {
    /// The original entry, now reversed.
    pub original: JournalEntry,
    /// The new posted entry with swapped sides.
    pub reversal: JournalEntry,
}
