//! Accounting periods and their status transitions.

use std::fmt;

use bursar_shared::types::{PeriodId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Length of an accounting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    /// Calendar or fiscal month.
    Month,
    /// Quarter.
    Quarter,
    /// Full fiscal year.
    Year,
}

/// Period status.
///
/// `open --close--> closed --lock--> locked`, and `closed --reopen--> open`.
/// Locked periods are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Accepts postings.
    Open,
    /// Closed; may be reopened by an authorized user.
    Closed,
    /// Permanently closed.
    Locked,
}

impl PeriodStatus {
    /// Returns true if entries may be posted into the period.
    #[must_use]
    pub fn accepts_postings(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Locked => write!(f, "locked"),
        }
    }
}

/// One recorded status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTransition {
    /// Status before the change.
    pub from: PeriodStatus,
    /// Status after the change.
    pub to: PeriodStatus,
    /// Who made the change.
    pub by: UserId,
    /// When it happened.
    pub at: DateTime<Utc>,
    /// Optional justification, e.g. for a reopen.
    pub note: Option<String>,
}

/// An accounting period with an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingPeriod {
    /// Period id.
    pub id: PeriodId,
    /// Display name, e.g. "January 2025".
    pub name: String,
    /// Period length.
    pub kind: PeriodKind,
    /// First day (inclusive).
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
    /// Current status.
    pub status: PeriodStatus,
    /// Who created the period.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Who last closed the period.
    pub closed_by: Option<UserId>,
    /// When the period was last closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Every status change, oldest first.
    pub history: Vec<PeriodTransition>,
}

impl AccountingPeriod {
    /// Creates an open period.
    #[must_use]
    pub fn new(input: NewPeriod, created_by: UserId) -> Self {
        Self {
            id: PeriodId::new(),
            name: input.name.trim().to_string(),
            kind: input.kind,
            start_date: input.start_date,
            end_date: input.end_date,
            status: PeriodStatus::Open,
            created_by,
            created_at: Utc::now(),
            closed_by: None,
            closed_at: None,
            history: Vec::new(),
        }
    }

    /// Returns true if `date` falls inside the period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Returns true if the inclusive range `[start, end]` shares a day with the period.
    #[must_use]
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end_date && self.start_date <= end
    }

    /// Moves to `to` and appends the change to the history.
    pub fn transition(&mut self, to: PeriodStatus, by: UserId, note: Option<String>) {
        let at = Utc::now();
        if to == PeriodStatus::Closed {
            self.closed_by = Some(by);
            self.closed_at = Some(at);
        }
        self.history.push(PeriodTransition {
            from: self.status,
            to,
            by,
            at,
            note,
        });
        self.status = to;
    }
}

/// Input for creating a period.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPeriod {
    /// Display name.
    pub name: String,
    /// Period length.
    pub kind: PeriodKind,
    /// First day (inclusive).
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
}

/// Checks that `start` is not after `end`.
///
/// # Errors
///
/// Returns `InvalidDateRange` otherwise.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> LedgerResult<()> {
    if start > end {
        return Err(LedgerError::InvalidDateRange { start, end });
    }
    Ok(())
}
