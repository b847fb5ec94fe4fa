//! Ledger error types.
//!
//! Every failure is a named variant returned from the operation that detected
//! it. Variants are grouped by [`ErrorKind`] so callers can tell input mistakes
//! apart from out-of-sequence operations without matching every variant.

use std::fmt;

use bursar_shared::types::{JournalEntryId, PeriodId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::closing::PeriodStatus;
use crate::journal::{EntryStatus, MAX_LINE_AMOUNT};
use crate::store::StoreError;

/// Result type alias using `LedgerError`.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Broad category of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller input is invalid; nothing was applied.
    Validation,
    /// A double-entry invariant would be violated; the transition was blocked.
    Invariant,
    /// The operation is out of sequence for the current state.
    State,
    /// A lookup or uniqueness check failed.
    NotFound,
    /// The storage backend failed.
    Storage,
}

/// Why a journal entry line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineDefect {
    /// Both debit and credit are nonzero.
    BothSides,
    /// Neither debit nor credit carries an amount.
    NoAmount,
    /// Debit or credit is negative.
    NegativeAmount,
    /// Debit or credit is above [`MAX_LINE_AMOUNT`].
    AmountTooLarge,
}

impl fmt::Display for LineDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BothSides => write!(f, "debit and credit are both nonzero"),
            Self::NoAmount => write!(f, "debit and credit are both zero"),
            Self::NegativeAmount => write!(f, "amounts cannot be negative"),
            Self::AmountTooLarge => write!(f, "amounts cannot exceed {MAX_LINE_AMOUNT}"),
        }
    }
}

/// Why a parent account was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentDefect {
    /// No account with the parent code exists.
    Missing,
    /// The parent account is deactivated.
    Inactive,
    /// The parent has a different account type.
    TypeMismatch,
    /// An account cannot be its own parent.
    SelfReference,
}

impl fmt::Display for ParentDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "does not exist"),
            Self::Inactive => write!(f, "is inactive"),
            Self::TypeMismatch => write!(f, "has a different account type"),
            Self::SelfReference => write!(f, "is the account itself"),
        }
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// A journal entry must carry at least one line.
    #[error("Journal entry must have at least one line")]
    EmptyEntry,

    /// A line violates the one-sided, non-negative amount rule.
    #[error("Line {line} is malformed: {defect}")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// What is wrong with the line.
        defect: LineDefect,
    },

    /// A line references an account code that is not registered.
    #[error("Account {0} is not registered")]
    UnknownAccount(String),

    /// The account is deactivated and cannot receive postings.
    #[error("Account {0} is inactive")]
    AccountInactive(String),

    /// Account creation or update input is invalid.
    #[error("Invalid account: {0}")]
    MalformedAccount(String),

    /// Period creation input is invalid.
    #[error("Invalid period: {0}")]
    MalformedPeriod(String),

    /// Start date is after end date.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// A reversal was requested without a reason.
    #[error("A reversal reason is required")]
    MissingReason,

    /// The account named to receive closing entries cannot be used.
    #[error("Account {0} cannot receive closing entries: it must be an active equity account")]
    InvalidRetainedEarnings(String),

    // ========== Invariant Errors ==========
    /// Debits and credits differ by more than the tolerance.
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// The trial balance of the period does not balance.
    #[error("Period {period_id} is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedPeriod {
        /// The period being closed.
        period_id: PeriodId,
        /// Total debit column.
        debit: Decimal,
        /// Total credit column.
        credit: Decimal,
    },

    /// A running total would leave the representable decimal range.
    #[error("Amount totals exceed the supported range")]
    AmountOverflow,

    // ========== State Errors ==========
    /// The journal entry cannot move from its current status to the requested one.
    #[error("Invalid journal entry transition from {from} to {to}")]
    InvalidStateTransition {
        /// The current status.
        from: EntryStatus,
        /// The attempted target status.
        to: EntryStatus,
    },

    /// The period covering the entry date does not accept postings.
    #[error("Accounting period {period_id} is {status}, no posting allowed")]
    PeriodClosed {
        /// The covering period.
        period_id: PeriodId,
        /// Its current status.
        status: PeriodStatus,
    },

    /// No accounting period covers the entry date.
    #[error("No accounting period found for date {0}")]
    NoPeriodForDate(NaiveDate),

    /// Only posted entries can be reversed.
    #[error("Journal entry {id} is {status}, only posted entries can be reversed")]
    EntryNotPosted {
        /// The entry.
        id: JournalEntryId,
        /// Its current status.
        status: EntryStatus,
    },

    /// The period is not open, so it cannot be closed.
    #[error("Accounting period {period_id} is already {status}")]
    PeriodAlreadyClosed {
        /// The period.
        period_id: PeriodId,
        /// Its current status.
        status: PeriodStatus,
    },

    /// The period is not closed, so it cannot be reopened or locked.
    #[error("Accounting period {period_id} is {status}, expected closed")]
    PeriodNotClosed {
        /// The period.
        period_id: PeriodId,
        /// Its current status.
        status: PeriodStatus,
    },

    /// The account still carries a balance.
    #[error("Account {code} has an open balance of {balance}")]
    AccountHasOpenBalance {
        /// The account code.
        code: String,
        /// The projected balance.
        balance: Decimal,
    },

    /// Account type cannot change once postings or child accounts exist.
    #[error("Cannot change account type for account {0}")]
    AccountTypeChangeNotAllowed(String),

    // ========== Not Found / Uniqueness Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),

    /// Accounting period not found.
    #[error("Accounting period not found: {0}")]
    PeriodNotFound(PeriodId),

    /// The account code is already registered.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// The parent account cannot hold the new account.
    #[error("Parent account {parent} {defect}")]
    InvalidParent {
        /// The requested parent code.
        parent: String,
        /// Why it was rejected.
        defect: ParentDefect,
    },

    /// The date range overlaps an existing period.
    #[error("Accounting period overlaps with existing period: {0}")]
    OverlappingPeriod(String),

    // ========== Storage Errors ==========
    /// The storage backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyEntry
            | Self::MalformedLine { .. }
            | Self::UnknownAccount(_)
            | Self::AccountInactive(_)
            | Self::MalformedAccount(_)
            | Self::MalformedPeriod(_)
            | Self::InvalidDateRange { .. }
            | Self::MissingReason
            | Self::InvalidRetainedEarnings(_) => ErrorKind::Validation,

            Self::UnbalancedEntry { .. } | Self::UnbalancedPeriod { .. } | Self::AmountOverflow => {
                ErrorKind::Invariant
            }

            Self::InvalidStateTransition { .. }
            | Self::PeriodClosed { .. }
            | Self::NoPeriodForDate(_)
            | Self::EntryNotPosted { .. }
            | Self::PeriodAlreadyClosed { .. }
            | Self::PeriodNotClosed { .. }
            | Self::AccountHasOpenBalance { .. }
            | Self::AccountTypeChangeNotAllowed(_) => ErrorKind::State,

            Self::AccountNotFound(_)
            | Self::EntryNotFound(_)
            | Self::PeriodNotFound(_)
            | Self::DuplicateCode(_)
            | Self::InvalidParent { .. }
            | Self::OverlappingPeriod(_) => ErrorKind::NotFound,

            Self::Store(_) => ErrorKind::Storage,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyEntry => "EMPTY_ENTRY",
            Self::MalformedLine { .. } => "MALFORMED_LINE",
            Self::UnknownAccount(_) => "UNKNOWN_ACCOUNT",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::MalformedAccount(_) => "MALFORMED_ACCOUNT",
            Self::MalformedPeriod(_) => "MALFORMED_PERIOD",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::MissingReason => "MISSING_REASON",
            Self::InvalidRetainedEarnings(_) => "INVALID_RETAINED_EARNINGS",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::UnbalancedPeriod { .. } => "UNBALANCED_PERIOD",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::NoPeriodForDate(_) => "NO_PERIOD_FOR_DATE",
            Self::EntryNotPosted { .. } => "ENTRY_NOT_POSTED",
            Self::PeriodAlreadyClosed { .. } => "PERIOD_ALREADY_CLOSED",
            Self::PeriodNotClosed { .. } => "PERIOD_NOT_CLOSED",
            Self::AccountHasOpenBalance { .. } => "ACCOUNT_HAS_OPEN_BALANCE",
            Self::AccountTypeChangeNotAllowed(_) => "ACCOUNT_TYPE_CHANGE_NOT_ALLOWED",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::DuplicateCode(_) => "DUPLICATE_CODE",
            Self::InvalidParent { .. } => "INVALID_PARENT",
            Self::OverlappingPeriod(_) => "OVERLAPPING_PERIOD",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::EmptyEntry
            | Self::MalformedLine { .. }
            | Self::UnknownAccount(_)
            | Self::AccountInactive(_)
            | Self::MalformedAccount(_)
            | Self::MalformedPeriod(_)
            | Self::InvalidDateRange { .. }
            | Self::MissingReason
            | Self::InvalidRetainedEarnings(_)
            | Self::InvalidParent { .. } => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::EntryNotFound(_) | Self::PeriodNotFound(_) => 404,

            // 409 Conflict - out-of-sequence operations and uniqueness
            Self::InvalidStateTransition { .. }
            | Self::PeriodClosed { .. }
            | Self::NoPeriodForDate(_)
            | Self::EntryNotPosted { .. }
            | Self::PeriodAlreadyClosed { .. }
            | Self::PeriodNotClosed { .. }
            | Self::AccountHasOpenBalance { .. }
            | Self::AccountTypeChangeNotAllowed(_)
            | Self::DuplicateCode(_)
            | Self::OverlappingPeriod(_) => 409,

            // 422 Unprocessable - invariant violations
            Self::UnbalancedEntry { .. } | Self::UnbalancedPeriod { .. } | Self::AmountOverflow => {
                422
            }

            // 500 Internal Server Error
            Self::Store(_) => 500,
        }
    }

    /// Returns true if repeating the same call may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(StoreError::Conflict(_)))
    }
}
