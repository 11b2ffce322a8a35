//! Property-based tests for journal line validation rules.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, from_minor_units};

use super::entry::EntryType;
use super::error::LedgerError;
use super::types::{JournalLineInput, LineAccountInfo};
use super::validation::{LineTotals, totals_of, validate_lines};

/// Strategy to generate a valid positive amount (0.0001 to 1,000,000.0000).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000_000i64).prop_map(|minor| Decimal::new(minor, 4))
}

/// Strategy to generate a zero or negative amount.
fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

/// Strategy to generate an entry type.
fn entry_type_strategy() -> impl Strategy<Value = EntryType> {
    prop_oneof![Just(EntryType::Debit), Just(EntryType::Credit)]
}

fn active(id: AccountId) -> Option<LineAccountInfo> {
    Some(LineAccountInfo {
        id,
        code: "1000".into(),
        is_active: true,
    })
}

fn line(entry_type: EntryType, amount: Decimal) -> JournalLineInput {
    JournalLineInput {
        id: None,
        account_id: AccountId::new(),
        amount,
        currency: None,
        entry_type,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Non-positive amounts are rejected with the index of the offending line.
    #[test]
    fn prop_non_positive_amount_rejected(
        entry_type in entry_type_strategy(),
        bad in non_positive_amount(),
        good in positive_amount(),
        bad_index in 0usize..3,
    ) {
        let mut lines = vec![line(entry_type, good); 3];
        lines[bad_index].amount = bad;

        let result = validate_lines(&lines, &active);
        prop_assert_eq!(result, Err(LedgerError::NonPositiveAmount { line: bad_index }));
    }

    /// Amounts with up to four decimal places survive the storage conversion unchanged.
    #[test]
    fn prop_valid_amount_keeps_value(amount in positive_amount(), entry_type in entry_type_strategy()) {
        let validated = validate_lines(&[line(entry_type, amount)], &active).unwrap();
        prop_assert_eq!(from_minor_units(validated[0].amount_minor), amount);
    }

    /// A fifth decimal place is always rejected.
    #[test]
    fn prop_fifth_decimal_rejected(whole in 0i64..1_000_000, digit in 1i64..10) {
        let amount = Decimal::new(whole * 100_000 + digit, 5);
        let result = validate_lines(&[line(EntryType::Debit, amount)], &active);
        prop_assert_eq!(result, Err(LedgerError::ExcessAmountPrecision { line: 0 }));
    }

    /// Splitting one side into many lines keeps the set balanced.
    #[test]
    fn prop_split_lines_stay_balanced(parts in prop::collection::vec(positive_amount(), 1..10)) {
        let total: Decimal = parts.iter().copied().sum();
        let mut lines: Vec<JournalLineInput> =
            parts.into_iter().map(|a| line(EntryType::Debit, a)).collect();
        lines.push(line(EntryType::Credit, total));

        let validated = validate_lines(&lines, &active).unwrap();
        prop_assert!(totals_of(&validated).is_balanced());
    }

    /// Totals never depend on line order.
    #[test]
    fn prop_totals_order_independent(
        lines in prop::collection::vec((entry_type_strategy(), positive_amount()), 0..12)
    ) {
        let forward = LineTotals::from_lines(lines.iter().copied());
        let backward = LineTotals::from_lines(lines.iter().rev().copied());
        prop_assert_eq!(forward, backward);
    }
}
