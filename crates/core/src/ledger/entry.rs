//! Journal entry and line domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, CurrencyCode, JournalEntryId, JournalLineId};

use super::status::EntryStatus;
use super::validation::LineTotals;

/// Type of journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry (increases assets/expenses, decreases liabilities/equity/revenue).
    Debit,
    /// Credit entry (decreases assets/expenses, increases liabilities/equity/revenue).
    Credit,
}

impl EntryType {
    /// Returns the net effect of `amount` on an account balance:
    /// positive for a debit, negative for a credit.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Debit => amount,
            Self::Credit => -amount,
        }
    }

    /// Returns true for a debit.
    #[must_use]
    pub const fn is_debit(self) -> bool {
        matches!(self, Self::Debit)
    }

    /// Builds the entry type from a stored debit flag.
    #[must_use]
    pub const fn from_is_debit(is_debit: bool) -> Self {
        if is_debit { Self::Debit } else { Self::Credit }
    }
}

/// A single line of a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Unique identifier for this line.
    pub id: JournalLineId,
    /// The entry this line belongs to.
    pub entry_id: JournalEntryId,
    /// The account affected by this line.
    pub account_id: AccountId,
    /// Strictly positive amount.
    pub amount: Decimal,
    /// Currency label of the amount.
    pub currency: CurrencyCode,
    /// Whether this is a debit or credit.
    pub entry_type: EntryType,
    /// Zero-based display position inside the entry.
    pub position: i32,
}

impl JournalLine {
    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.entry_type.signed(self.amount)
    }
}

/// A journal entry with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Free text description.
    pub description: String,
    /// Optional external reference (invoice number, voucher).
    pub reference: Option<String>,
    /// Lifecycle status.
    pub status: EntryStatus,
    /// Lines ordered by position.
    #[serde(default)]
    pub lines: Vec<JournalLine>,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// When the entry was last updated.
    pub updated_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Returns the debit and credit totals over all lines.
    #[must_use]
    pub fn totals(&self) -> LineTotals {
        LineTotals::from_lines(self.lines.iter().map(|l| (l.entry_type, l.amount)))
    }

    /// Sum of debit line amounts.
    #[must_use]
    pub fn total_debits(&self) -> Decimal {
        self.totals().debits
    }

    /// Sum of credit line amounts.
    #[must_use]
    pub fn total_credits(&self) -> Decimal {
        self.totals().credits
    }

    /// Returns true if debits equal credits within tolerance.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.totals().is_balanced()
    }

    /// Returns the line with the given ID.
    #[must_use]
    pub fn line(&self, id: JournalLineId) -> Option<&JournalLine> {
        self.lines.iter().find(|l| l.id == id)
    }
}
