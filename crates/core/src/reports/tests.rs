//! Tests for trial balance aggregation.

use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_shared::types::AccountId;

use super::error::ReportRuleError;
use super::service::ReportService;
use super::types::{AccountSnapshot, PostedLine, TrialBalanceOptions};
use crate::account::AccountType;
use crate::ledger::EntryType;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn snapshot(code: &str, account_type: AccountType) -> AccountSnapshot {
    AccountSnapshot {
        id: AccountId::new(),
        code: code.to_string(),
        name: format!("Account {code}"),
        account_type,
    }
}

fn posted(account: &AccountSnapshot, entry_type: EntryType, amount: Decimal) -> PostedLine {
    PostedLine {
        account_id: account.id,
        amount,
        entry_type,
    }
}

fn account_type_strategy() -> impl Strategy<Value = AccountType> {
    prop_oneof![
        Just(AccountType::Asset),
        Just(AccountType::Liability),
        Just(AccountType::Equity),
        Just(AccountType::Revenue),
        Just(AccountType::Expense),
    ]
}

proptest! {
    /// For any set of balanced entries over any accounts, the trial balance
    /// columns are exactly equal.
    #[test]
    fn prop_trial_balance_closure(
        types in prop::collection::vec(account_type_strategy(), 2..8),
        entries in prop::collection::vec(
            (any::<prop::sample::Index>(), any::<prop::sample::Index>(), 1i64..1_000_000i64),
            0..30,
        ),
    ) {
        let accounts: Vec<AccountSnapshot> = types
            .iter()
            .enumerate()
            .map(|(i, t)| snapshot(&format!("{}", 1000 + i), *t))
            .collect();

        let mut lines = Vec::new();
        for (debit_index, credit_index, cents) in entries {
            let amount = Decimal::new(cents, 2);
            lines.push(posted(&accounts[debit_index.index(accounts.len())], EntryType::Debit, amount));
            lines.push(posted(&accounts[credit_index.index(accounts.len())], EntryType::Credit, amount));
        }

        let balances = ReportService::accumulate(&lines);
        let report = ReportService::build_trial_balance(
            &TrialBalanceOptions::as_of(date(2026, 12, 31)),
            accounts,
            &balances,
        ).unwrap();

        prop_assert_eq!(report.total_debits, report.total_credits);
        for line in &report.lines {
            prop_assert!(line.debit >= Decimal::ZERO && line.credit >= Decimal::ZERO);
            prop_assert!(line.debit.is_zero() || line.credit.is_zero());
            prop_assert!(!(line.debit.is_zero() && line.credit.is_zero()));
        }
    }

    /// Net balance equals the difference of the two columns for any line set.
    #[test]
    fn prop_net_balance_matches_columns(
        lines in prop::collection::vec((any::<bool>(), 1i64..1_000_000i64), 0..20),
    ) {
        let account = snapshot("1000", AccountType::Asset);
        let posted_lines: Vec<PostedLine> = lines
            .iter()
            .map(|(is_debit, cents)| {
                posted(&account, EntryType::from_is_debit(*is_debit), Decimal::new(*cents, 2))
            })
            .collect();

        let net = ReportService::net_balance(&posted_lines);
        let (debit, credit, _) = ReportService::present(net, EntryType::Debit);
        prop_assert_eq!(debit - credit, net);
    }
}

#[test]
fn test_cash_sale_trial_balance() {
    let cash = snapshot("1000", AccountType::Asset);
    let revenue = snapshot("4000", AccountType::Revenue);
    let lines = vec![
        posted(&cash, EntryType::Debit, dec!(100.00)),
        posted(&revenue, EntryType::Credit, dec!(100.00)),
    ];

    let balances = ReportService::accumulate(&lines);
    let report = ReportService::build_trial_balance(
        &TrialBalanceOptions::as_of(date(2026, 1, 31)),
        vec![revenue.clone(), cash.clone()],
        &balances,
    )
    .unwrap();

    assert_eq!(report.lines.len(), 2);
    assert_eq!(report.lines[0].code, "1000");
    assert_eq!(report.lines[0].debit, dec!(100.00));
    assert_eq!(report.lines[0].credit, Decimal::ZERO);
    assert_eq!(report.lines[1].code, "4000");
    assert_eq!(report.lines[1].credit, dec!(100.00));
    assert!(!report.lines[1].abnormal);
    assert_eq!(report.total_debits, dec!(100.00));
    assert_eq!(report.total_credits, dec!(100.00));
    assert_eq!(report.report_date, date(2026, 1, 31));
}

#[test]
fn test_abnormal_balance_goes_to_opposite_column() {
    let cash = snapshot("1000", AccountType::Asset);
    let revenue = snapshot("4000", AccountType::Revenue);
    // Refund larger than sales: revenue carries a debit balance.
    let lines = vec![
        posted(&revenue, EntryType::Debit, dec!(30)),
        posted(&cash, EntryType::Credit, dec!(30)),
    ];

    let balances = ReportService::accumulate(&lines);
    let report = ReportService::build_trial_balance(
        &TrialBalanceOptions::as_of(date(2026, 1, 31)),
        vec![cash, revenue],
        &balances,
    )
    .unwrap();

    let cash_line = report.line_by_code("1000").unwrap();
    assert_eq!(cash_line.credit, dec!(30));
    assert!(cash_line.abnormal);

    let revenue_line = report.line_by_code("4000").unwrap();
    assert_eq!(revenue_line.debit, dec!(30));
    assert!(revenue_line.abnormal);
    assert_eq!(report.total_debits, report.total_credits);
}

#[test]
fn test_zero_balance_accounts() {
    let cash = snapshot("1000", AccountType::Asset);
    let revenue = snapshot("4000", AccountType::Revenue);
    let expense = snapshot("5000", AccountType::Expense);
    let lines = vec![
        posted(&cash, EntryType::Debit, dec!(50)),
        posted(&revenue, EntryType::Credit, dec!(50)),
    ];
    let balances = ReportService::accumulate(&lines);
    let accounts = vec![cash, revenue, expense.clone()];

    let report = ReportService::build_trial_balance(
        &TrialBalanceOptions::as_of(date(2026, 1, 31)),
        accounts.clone(),
        &balances,
    )
    .unwrap();
    assert!(report.line(expense.id).is_none());

    let report = ReportService::build_trial_balance(
        &TrialBalanceOptions::as_of(date(2026, 1, 31)).with_zero_balances(),
        accounts,
        &balances,
    )
    .unwrap();
    let line = report.line(expense.id).unwrap();
    assert_eq!(line.debit, Decimal::ZERO);
    assert_eq!(line.credit, Decimal::ZERO);
    assert!(!line.abnormal);
}

#[test]
fn test_account_netting_to_zero_is_omitted() {
    let cash = snapshot("1000", AccountType::Asset);
    let lines = vec![
        posted(&cash, EntryType::Debit, dec!(10)),
        posted(&cash, EntryType::Credit, dec!(10)),
    ];
    let balances = ReportService::accumulate(&lines);
    let report = ReportService::build_trial_balance(
        &TrialBalanceOptions::as_of(date(2026, 1, 31)),
        vec![cash],
        &balances,
    )
    .unwrap();
    assert!(report.lines.is_empty());
    assert_eq!(report.total_debits, Decimal::ZERO);
}

#[test]
fn test_invalid_range_rejected() {
    let options = TrialBalanceOptions::as_of(date(2026, 1, 1)).since(date(2026, 2, 1));
    let err = ReportService::build_trial_balance(&options, vec![], &HashMap::new()).unwrap_err();
    assert_eq!(
        err,
        ReportRuleError::InvalidDateRange {
            start: date(2026, 2, 1),
            end: date(2026, 1, 1)
        }
    );
    let app: tally_shared::AppError = err.into();
    assert_eq!(app.status_code(), 400);
}

#[test]
fn test_missing_account_makes_report_out_of_balance() {
    let cash = snapshot("1000", AccountType::Asset);
    let revenue = snapshot("4000", AccountType::Revenue);
    let lines = vec![
        posted(&cash, EntryType::Debit, dec!(100)),
        posted(&revenue, EntryType::Credit, dec!(100)),
    ];
    let balances = ReportService::accumulate(&lines);

    let accounts = vec![cash];
    let excluded = ReportService::excluded_balances(&accounts, &balances);
    assert_eq!(excluded, vec![(revenue.id, dec!(-100))]);

    let err = ReportService::build_trial_balance(
        &TrialBalanceOptions::as_of(date(2026, 1, 31)),
        accounts,
        &balances,
    )
    .unwrap_err();
    assert!(matches!(err, ReportRuleError::OutOfBalance { .. }));
    let app: tally_shared::AppError = err.into();
    assert!(app.is_internal());
}

#[test]
fn test_net_balance_is_raw_signed() {
    let revenue = snapshot("4000", AccountType::Revenue);
    let lines = vec![
        posted(&revenue, EntryType::Credit, dec!(100)),
        posted(&revenue, EntryType::Debit, dec!(20)),
    ];
    assert_eq!(ReportService::net_balance(&lines), dec!(-80));
    assert_eq!(ReportService::net_balance(&Vec::<PostedLine>::new()), Decimal::ZERO);
}
