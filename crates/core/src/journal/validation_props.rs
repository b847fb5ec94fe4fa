//! Property-based tests for journal line validation.
//!
//! - Balance integrity: balanced entries pass, entries off by more than the
//!   tolerance fail with both totals reported
//! - Line shape: a line is valid iff exactly one side is positive

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::types::{EntryTotals, LineInput};
use super::validation::{ensure_balanced, line_defect, validate_lines};
use crate::error::LedgerError;

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate any amount with two decimals, including negatives and zero.
fn any_amount() -> impl Strategy<Value = Decimal> {
    (-1_000i64..1_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn tolerance() -> Decimal {
    Decimal::new(1, 2)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* set of debits offset by a single credit of their sum, the
    /// entry SHALL validate and balance.
    #[test]
    fn prop_balanced_entry_accepted(debits in prop::collection::vec(positive_amount(), 1..8)) {
        let total: Decimal = debits.iter().copied().sum();
        let mut lines: Vec<LineInput> = debits
            .iter()
            .map(|amount| LineInput::debit("5000", *amount))
            .collect();
        lines.push(LineInput::credit("1000", total));

        prop_assert!(validate_lines(&lines).is_ok());
        let totals = EntryTotals::of(lines.iter().map(|l| (l.debit, l.credit))).unwrap();
        prop_assert!(ensure_balanced(totals, tolerance()).is_ok());
        prop_assert_eq!(totals.debit, totals.credit);
    }

    /// *For any* debit and credit differing by more than the tolerance, the
    /// entry SHALL be rejected with both totals.
    #[test]
    fn prop_unbalanced_entry_rejected(
        debit in positive_amount(),
        credit in positive_amount(),
    ) {
        prop_assume!((debit - credit).abs() > tolerance());

        let totals = EntryTotals::of([(debit, Decimal::ZERO), (Decimal::ZERO, credit)]).unwrap();
        let result = ensure_balanced(totals, tolerance());

        prop_assert!(
            matches!(result, Err(LedgerError::UnbalancedEntry { debit: d, credit: c }) if d == debit && c == credit),
            "Unbalanced entry should be rejected"
        );
    }

    /// *For any* amounts, a line SHALL be valid iff exactly one side is
    /// positive and neither is negative.
    #[test]
    fn prop_line_valid_iff_one_positive_side(debit in any_amount(), credit in any_amount()) {
        let one_sided = (debit > Decimal::ZERO && credit == Decimal::ZERO)
            || (credit > Decimal::ZERO && debit == Decimal::ZERO);
        prop_assert_eq!(line_defect(debit, credit).is_none(), one_sided);
    }
}
