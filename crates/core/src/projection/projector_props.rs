//! Property-based tests for the ledger projection.
//!
//! - Idempotent projection: replaying an entry never double-counts
//! - Balanced books: projected debits always equal projected credits
//! - Recovery by replay: a rebuild reproduces the incremental state

use std::sync::Arc;

use bursar_shared::types::{JournalEntryId, TenantId, UserId};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::LedgerProjector;
use crate::journal::{EntryStatus, JournalEntry, JournalEntryLine};
use crate::store::{InMemoryStore, JournalStore};

const CODES: [&str; 4] = ["1000", "2000", "4000", "5000"];

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a balanced two-line posting between distinct accounts.
fn posting() -> impl Strategy<Value = (usize, usize, Decimal)> {
    (0..CODES.len(), 0..CODES.len(), positive_amount())
        .prop_filter("distinct accounts", |(debit, credit, _)| debit != credit)
}

fn make_entry(sequence: u64, debit: usize, credit: usize, amount: Decimal) -> JournalEntry {
    let line = |line_number, code: &str, debit, credit| JournalEntryLine {
        line_number,
        account_code: code.to_string(),
        debit,
        credit,
        description: None,
        reference: None,
    };
    let mut entry = JournalEntry::draft(
        JournalEntryId::new(),
        sequence,
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        "Generated".to_string(),
        None,
        vec![
            line(1, CODES[debit], amount, Decimal::ZERO),
            line(2, CODES[credit], Decimal::ZERO, amount),
        ],
        UserId::new(),
    );
    entry.status = EntryStatus::Posted;
    entry
}

fn entries(postings: &[(usize, usize, Decimal)]) -> Vec<JournalEntry> {
    postings
        .iter()
        .zip(1u64..)
        .map(|(&(debit, credit, amount), sequence)| make_entry(sequence, debit, credit, amount))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// *For any* set of postings applied twice, the totals SHALL equal a single
    /// application.
    #[test]
    fn prop_replay_is_idempotent(postings in prop::collection::vec(posting(), 1..20)) {
        let projector = LedgerProjector::new(Arc::new(InMemoryStore::new()));
        let tenant = TenantId::new();
        let entries = entries(&postings);

        for entry in &entries {
            prop_assert!(projector.apply_posting(tenant, entry).unwrap());
        }
        let once: Vec<_> = CODES.iter().map(|c| projector.totals(tenant, c)).collect();

        for entry in entries.iter().rev() {
            prop_assert!(!projector.apply_posting(tenant, entry).unwrap());
        }
        let twice: Vec<_> = CODES.iter().map(|c| projector.totals(tenant, c)).collect();

        prop_assert_eq!(once, twice);
    }

    /// *For any* balanced postings, projected debits SHALL equal projected credits.
    #[test]
    fn prop_projection_stays_balanced(postings in prop::collection::vec(posting(), 1..20)) {
        let projector = LedgerProjector::new(Arc::new(InMemoryStore::new()));
        let tenant = TenantId::new();
        let expected: Decimal = postings.iter().map(|(_, _, amount)| *amount).sum();

        for entry in entries(&postings) {
            projector.apply_posting(tenant, &entry).unwrap();
        }

        let (debit, credit) = projector.grand_totals(tenant).unwrap();
        prop_assert_eq!(debit, credit);
        prop_assert_eq!(debit, expected);
    }

    /// *For any* stored postings, a rebuild SHALL reproduce the incremental totals.
    #[test]
    fn prop_rebuild_matches_incremental(postings in prop::collection::vec(posting(), 0..20)) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let store = Arc::new(InMemoryStore::new());
        let projector = LedgerProjector::new(Arc::clone(&store));
        let tenant = TenantId::new();
        let entries = entries(&postings);

        runtime.block_on(store.save_entries(tenant, &entries)).unwrap();
        for entry in &entries {
            projector.apply_posting(tenant, entry).unwrap();
        }
        let incremental: Vec<_> = CODES.iter().map(|c| projector.totals(tenant, c)).collect();

        let replayed = runtime.block_on(projector.rebuild(tenant)).unwrap();
        let rebuilt: Vec<_> = CODES.iter().map(|c| projector.totals(tenant, c)).collect();

        prop_assert_eq!(replayed, entries.len());
        prop_assert_eq!(incremental, rebuilt);
    }
}
