//! Property-based tests for LedgerService.
//!
//! - Balance integrity: perturbing one side of a balanced set by a cent is
//!   rejected on create and on post
//! - Idempotent posting
//! - Transition closure: nothing leaves Voided, Posted cannot be deleted

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, JournalLineId};

use super::entry::{EntryType, JournalEntry, JournalLine};
use super::error::LedgerError;
use super::service::LedgerService;
use super::status::{EntryStatus, TransitionDecision};
use super::types::{CreateJournalEntryInput, JournalLineInput, LineAccountInfo, NewJournalEntry};

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn status_strategy() -> impl Strategy<Value = EntryStatus> {
    prop_oneof![
        Just(EntryStatus::Draft),
        Just(EntryStatus::Posted),
        Just(EntryStatus::Voided)
    ]
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
}

fn active(id: AccountId) -> Option<LineAccountInfo> {
    Some(LineAccountInfo {
        id,
        code: "1000".into(),
        is_active: true,
    })
}

/// Balanced line set: the debits are `amounts`, one credit line carries the total.
fn balanced_lines(amounts: &[Decimal]) -> Vec<JournalLineInput> {
    let total: Decimal = amounts.iter().copied().sum();
    let mut lines: Vec<JournalLineInput> = amounts
        .iter()
        .map(|a| JournalLineInput::debit(AccountId::new(), *a))
        .collect();
    lines.push(JournalLineInput::credit(AccountId::new(), total));
    lines
}

fn to_entry(new: NewJournalEntry) -> JournalEntry {
    JournalEntry {
        id: new.id,
        entry_date: new.entry_date,
        description: new.description,
        reference: new.reference,
        status: new.status,
        lines: new
            .lines
            .into_iter()
            .map(|l| JournalLine {
                id: JournalLineId::new(),
                entry_id: new.id,
                account_id: l.account_id,
                amount: l.amount,
                currency: l.currency,
                entry_type: l.entry_type,
                position: l.position,
            })
            .collect(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Balanced sets are accepted and their totals match exactly.
    #[test]
    fn prop_balanced_entry_accepted(amounts in prop::collection::vec(positive_amount(), 1..8)) {
        let input = CreateJournalEntryInput::new("prop", balanced_lines(&amounts));
        let new = LedgerService::prepare_create(input, today(), active).unwrap();
        prop_assert_eq!(new.totals.debits, new.totals.credits);
    }

    /// Moving any single line by ±0.01 makes create fail with both totals reported.
    #[test]
    fn prop_perturbed_entry_rejected_on_create(
        amounts in prop::collection::vec(positive_amount(), 1..8),
        index in any::<prop::sample::Index>(),
        up in any::<bool>(),
    ) {
        let mut lines = balanced_lines(&amounts);
        let i = index.index(lines.len());
        let delta = Decimal::new(1, 2);
        if up {
            lines[i].amount += delta;
        } else if lines[i].amount > delta {
            lines[i].amount -= delta;
        } else {
            lines[i].amount += delta;
        }

        let input = CreateJournalEntryInput::new("prop", lines);
        let result = LedgerService::prepare_create(input, today(), active);
        prop_assert!(
            matches!(result, Err(LedgerError::UnbalancedEntry { .. })),
            "perturbed entry should be rejected, got: {:?}",
            result
        );
    }

    /// A draft whose stored lines drift out of balance cannot be posted.
    #[test]
    fn prop_perturbed_draft_rejected_on_post(
        amounts in prop::collection::vec(positive_amount(), 1..8),
        index in any::<prop::sample::Index>(),
    ) {
        let input = CreateJournalEntryInput::new("prop", balanced_lines(&amounts));
        let mut entry = to_entry(LedgerService::prepare_create(input, today(), active).unwrap());
        let i = index.index(entry.lines.len());
        entry.lines[i].amount += Decimal::new(1, 2);

        let result = LedgerService::prepare_post(&entry, active);
        prop_assert!(
            matches!(result, Err(LedgerError::UnbalancedEntry { .. })),
            "expected an unbalanced entry, got {:?}",
            result
        );
    }

    /// Posting twice yields the same state as posting once.
    #[test]
    fn prop_post_idempotent(amounts in prop::collection::vec(positive_amount(), 1..8)) {
        let input = CreateJournalEntryInput::new("prop", balanced_lines(&amounts));
        let mut entry = to_entry(LedgerService::prepare_create(input, today(), active).unwrap());

        let first = LedgerService::prepare_post(&entry, active).unwrap();
        if let Some(status) = first.target() {
            entry.status = status;
        }
        let second = LedgerService::prepare_post(&entry, active).unwrap();

        prop_assert_eq!(entry.status, EntryStatus::Posted);
        prop_assert_eq!(second, TransitionDecision::Unchanged);
    }

    /// No sequence of requests leads out of Voided; Posted is never deletable.
    #[test]
    fn prop_transition_closure(requests in prop::collection::vec(status_strategy(), 0..12)) {
        let mut status = EntryStatus::Voided;
        for requested in requests {
            if let Ok(decision) = TransitionDecision::between(status, requested) {
                if let Some(next) = decision.target() {
                    status = next;
                }
            }
            prop_assert_eq!(status, EntryStatus::Voided);
        }
        prop_assert!(LedgerService::ensure_deletable(EntryStatus::Posted).is_err());
    }

    /// Only allowed moves change the status; every reachable status stays in the table.
    #[test]
    fn prop_random_walk_respects_table(requests in prop::collection::vec(status_strategy(), 0..20)) {
        let mut status = EntryStatus::Draft;
        for requested in requests {
            match TransitionDecision::between(status, requested) {
                Ok(decision) => {
                    prop_assert!(status.can_transition_to(requested));
                    if let Some(next) = decision.target() {
                        status = next;
                    }
                }
                Err(err) => {
                    prop_assert_eq!(status, EntryStatus::Voided);
                    prop_assert!(
                        matches!(err, LedgerError::InvalidTransition { .. }),
                        "expected an invalid transition, got {:?}",
                        err
                    );
                }
            }
        }
    }
}

#[test]
fn test_signed_effect_matches_entry_type() {
    let amount = Decimal::new(1234, 2);
    assert_eq!(EntryType::Debit.signed(amount), amount);
    assert_eq!(EntryType::Credit.signed(amount), -amount);
}
