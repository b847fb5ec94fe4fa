//! Property-based tests for trial balance aggregation.
//!
//! - Balanced books: activity from balanced postings always yields a
//!   balanced trial balance
//! - Closing entries: closing lines balance and zero every temporary account

use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::closing_entry::closing_lines;
use super::trial_balance::TrialBalance;
use crate::accounts::{Account, AccountType};
use crate::projection::{AccountActivity, AccountTotals};

const ACCOUNTS: [(&str, AccountType); 5] = [
    ("1000", AccountType::Asset),
    ("2000", AccountType::Liability),
    ("3100", AccountType::Equity),
    ("4000", AccountType::Income),
    ("5000", AccountType::Expense),
];

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a balanced posting: (debit account, credit account, amount, opening?).
fn posting() -> impl Strategy<Value = (usize, usize, Decimal, bool)> {
    (
        0..ACCOUNTS.len(),
        0..ACCOUNTS.len(),
        positive_amount(),
        any::<bool>(),
    )
        .prop_filter("distinct accounts", |(d, c, _, _)| d != c)
}

fn chart() -> Vec<Account> {
    ACCOUNTS
        .iter()
        .map(|(code, account_type)| Account::new(*code, *code, *account_type, None, None))
        .collect()
}

fn activity_of(postings: &[(usize, usize, Decimal, bool)]) -> HashMap<String, AccountActivity> {
    let mut activity: HashMap<String, AccountActivity> = HashMap::new();
    for &(debit, credit, amount, opening) in postings {
        for (index, debit_amount, credit_amount) in
            [(debit, amount, Decimal::ZERO), (credit, Decimal::ZERO, amount)]
        {
            let slot = activity.entry(ACCOUNTS[index].0.to_string()).or_default();
            let totals: &mut AccountTotals = if opening {
                &mut slot.opening
            } else {
                &mut slot.period
            };
            totals.record(debit_amount, credit_amount).unwrap();
        }
    }
    activity
}

fn build(activity: &HashMap<String, AccountActivity>) -> TrialBalance {
    TrialBalance::build(
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        &chart(),
        activity,
        false,
        Decimal::new(1, 2),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* set of balanced postings, the trial balance SHALL balance and
    /// its movement totals SHALL agree.
    #[test]
    fn prop_balanced_postings_balance(postings in prop::collection::vec(posting(), 0..30)) {
        let tb = build(&activity_of(&postings));

        prop_assert!(tb.is_balanced());
        prop_assert_eq!(tb.totals.total_debit, tb.totals.total_credit);
        prop_assert_eq!(tb.totals.debit_movement, tb.totals.credit_movement);
        prop_assert_eq!(tb.lines.len(), ACCOUNTS.len());
    }

    /// *For any* ledger, the closing lines SHALL balance and bring every
    /// income and expense account to zero.
    #[test]
    fn prop_closing_lines_zero_temporary_accounts(postings in prop::collection::vec(posting(), 1..30)) {
        let mut activity = activity_of(&postings);
        let tb = build(&activity);
        let lines = closing_lines(&tb, "3100").unwrap();

        let debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = lines.iter().map(|l| l.credit).sum();
        prop_assert_eq!(debit, credit);

        for line in &lines {
            activity
                .entry(line.account_code.clone())
                .or_default()
                .period
                .record(line.debit, line.credit)
                .unwrap();
        }
        let after = build(&activity);
        for row in after.lines.iter().filter(|r| r.account_type.is_temporary()) {
            prop_assert_eq!(row.closing_balance, Decimal::ZERO);
        }
        prop_assert!(after.is_balanced());
    }
}
