//! Report generation service.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tally_shared::types::{AccountId, is_within_tolerance};

use super::error::ReportRuleError;
use super::types::{
    AccountSnapshot, PostedLine, TrialBalanceLine, TrialBalanceOptions, TrialBalanceReport,
};
use crate::ledger::EntryType;

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Rejects a start date after the end date.
    ///
    /// # Errors
    ///
    /// Returns `ReportRuleError::InvalidDateRange`.
    pub fn validate_range(options: &TrialBalanceOptions) -> Result<(), ReportRuleError> {
        match options.start_date {
            Some(start) if start > options.end_date => Err(ReportRuleError::InvalidDateRange {
                start,
                end: options.end_date,
            }),
            _ => Ok(()),
        }
    }

    /// Sums signed line effects per account: `+amount` for a debit,
    /// `-amount` for a credit.
    #[must_use]
    pub fn accumulate<'a>(
        lines: impl IntoIterator<Item = &'a PostedLine>,
    ) -> HashMap<AccountId, Decimal> {
        let mut balances: HashMap<AccountId, Decimal> = HashMap::new();
        for line in lines {
            *balances.entry(line.account_id).or_default() += line.entry_type.signed(line.amount);
        }
        balances
    }

    /// Raw signed net (debits minus credits) of the given lines.
    #[must_use]
    pub fn net_balance<'a>(lines: impl IntoIterator<Item = &'a PostedLine>) -> Decimal {
        lines
            .into_iter()
            .map(|line| line.entry_type.signed(line.amount))
            .sum()
    }

    /// Places a signed balance into the debit or credit column.
    ///
    /// Returns `(debit, credit, abnormal)`. Both columns are non-negative.
    #[must_use]
    pub fn present(balance: Decimal, normal_side: EntryType) -> (Decimal, Decimal, bool) {
        if balance > Decimal::ZERO {
            (balance, Decimal::ZERO, normal_side == EntryType::Credit)
        } else if balance < Decimal::ZERO {
            (Decimal::ZERO, -balance, normal_side == EntryType::Debit)
        } else {
            (Decimal::ZERO, Decimal::ZERO, false)
        }
    }

    /// Builds a trial balance from per-account balances and the account set.
    ///
    /// Only accounts in `accounts` appear. Rows are ordered by code.
    ///
    /// # Errors
    ///
    /// - `InvalidDateRange` if the options are inconsistent
    /// - `OutOfBalance` if the columns differ by more than the tolerance
    pub fn build_trial_balance(
        options: &TrialBalanceOptions,
        mut accounts: Vec<AccountSnapshot>,
        balances: &HashMap<AccountId, Decimal>,
    ) -> Result<TrialBalanceReport, ReportRuleError> {
        Self::validate_range(options)?;
        accounts.sort_by(|a, b| a.code.cmp(&b.code));

        let mut lines = Vec::with_capacity(accounts.len());
        let mut total_debits = Decimal::ZERO;
        let mut total_credits = Decimal::ZERO;

        for account in accounts {
            let balance = balances.get(&account.id).copied().unwrap_or_default();
            if balance.is_zero() && !options.include_zero_balance {
                continue;
            }

            let (debit, credit, abnormal) =
                Self::present(balance, account.account_type.normal_side());
            total_debits += debit;
            total_credits += credit;

            lines.push(TrialBalanceLine {
                account_id: account.id,
                code: account.code,
                name: account.name,
                account_type: account.account_type,
                debit,
                credit,
                abnormal,
            });
        }

        if !is_within_tolerance(total_debits, total_credits) {
            return Err(ReportRuleError::OutOfBalance {
                debits: total_debits,
                credits: total_credits,
            });
        }

        Ok(TrialBalanceReport {
            report_date: options.end_date,
            start_date: options.start_date,
            lines,
            total_debits,
            total_credits,
        })
    }

    /// Accounts carrying a non-zero balance that are missing from `accounts`.
    ///
    /// Used to explain an out-of-balance report.
    #[must_use]
    pub fn excluded_balances(
        accounts: &[AccountSnapshot],
        balances: &HashMap<AccountId, Decimal>,
    ) -> Vec<(AccountId, Decimal)> {
        let mut excluded: Vec<(AccountId, Decimal)> = balances
            .iter()
            .filter(|(id, balance)| {
                !balance.is_zero() && !accounts.iter().any(|a| a.id == **id)
            })
            .map(|(id, balance)| (*id, *balance))
            .collect();
        excluded.sort_by_key(|(id, _)| *id);
        excluded
    }
}
