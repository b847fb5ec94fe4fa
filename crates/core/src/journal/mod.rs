//! Journal engine.
//!
//! Journal entries are drafted, posted into an open period, and cancelled by
//! reversal rather than deletion. Posting is the only way an entry starts
//! affecting balances.
//!
//! # Rules
//!
//! - Every line carries exactly one positive amount (debit or credit)
//! - Posted entries balance: total debits equal total credits within tolerance
//! - Posted entries are immutable; reversal creates an opposite entry

mod engine;
mod reversal;
mod types;
mod validation;

pub use engine::JournalEngine;
pub use reversal::{build_reversal, mark_reversed};
pub use types::{
    DraftInput, EntryFilter, EntryStatus, EntryTotals, JournalEntry, JournalEntryLine, LineInput,
    ReversalOutcome, ReverseInput, format_entry_number,
};
pub use validation::{
    MAX_LINE_AMOUNT, build_lines, ensure_balanced, line_defect, validate_lines,
};

#[cfg(test)]
mod validation_props;
