//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

use crate::account::AccountType;
use crate::ledger::EntryType;

/// One line of a posted entry, as read for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostedLine {
    /// Account the line affects.
    pub account_id: AccountId,
    /// Strictly positive amount.
    pub amount: Decimal,
    /// Debit or credit.
    pub entry_type: EntryType,
}

/// Account fields a trial balance shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// Account ID.
    pub id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
}

/// Parameters of a trial balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceOptions {
    /// Inclusive last date.
    pub end_date: NaiveDate,
    /// Inclusive first date; `None` is unbounded.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Emit accounts whose balance is zero.
    #[serde(default)]
    pub include_zero_balance: bool,
}

impl TrialBalanceOptions {
    /// Cumulative trial balance up to `end_date`, non-zero accounts only.
    #[must_use]
    pub const fn as_of(end_date: NaiveDate) -> Self {
        Self {
            end_date,
            start_date: None,
            include_zero_balance: false,
        }
    }

    /// Restricts the report to entries on or after `start_date`.
    #[must_use]
    pub const fn since(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Includes zero-balance accounts.
    #[must_use]
    pub const fn with_zero_balances(mut self) -> Self {
        self.include_zero_balance = true;
        self
    }
}

/// One account row of a trial balance.
///
/// At most one of `debit` and `credit` is non-zero; both are non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceLine {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Debit column.
    pub debit: Decimal,
    /// Credit column.
    pub credit: Decimal,
    /// Balance sits on the side opposite the type's normal side.
    pub abnormal: bool,
}

/// Trial balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Inclusive end date of the report.
    pub report_date: NaiveDate,
    /// Inclusive start date, `None` when cumulative.
    pub start_date: Option<NaiveDate>,
    /// Rows ordered by account code.
    pub lines: Vec<TrialBalanceLine>,
    /// Sum of the debit column.
    pub total_debits: Decimal,
    /// Sum of the credit column.
    pub total_credits: Decimal,
}

impl TrialBalanceReport {
    /// Returns the row for `account_id`.
    #[must_use]
    pub fn line(&self, account_id: AccountId) -> Option<&TrialBalanceLine> {
        self.lines.iter().find(|l| l.account_id == account_id)
    }

    /// Returns the row for an account code.
    #[must_use]
    pub fn line_by_code(&self, code: &str) -> Option<&TrialBalanceLine> {
        self.lines.iter().find(|l| l.code == code)
    }
}
