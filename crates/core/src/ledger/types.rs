//! Ledger domain types for entry creation, updates, and listing.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, CurrencyCode, JournalEntryId, JournalLineId};

use super::entry::EntryType;
use super::status::{EntryStatus, TransitionDecision};
use super::validation::LineTotals;

/// Input for a single journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLineInput {
    /// Existing line to update. `None` inserts a new line.
    #[serde(default)]
    pub id: Option<JournalLineId>,
    /// Account affected by the line.
    pub account_id: AccountId,
    /// Strictly positive amount, at most four decimal places.
    pub amount: Decimal,
    /// Currency code, defaults to USD.
    #[serde(default)]
    pub currency: Option<String>,
    /// Debit or credit.
    pub entry_type: EntryType,
}

impl JournalLineInput {
    /// Creates a new debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self::new(account_id, amount, EntryType::Debit)
    }

    /// Creates a new credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self::new(account_id, amount, EntryType::Credit)
    }

    fn new(account_id: AccountId, amount: Decimal, entry_type: EntryType) -> Self {
        Self {
            id: None,
            account_id,
            amount,
            currency: None,
            entry_type,
        }
    }

    /// Targets an existing line.
    #[must_use]
    pub fn with_id(mut self, id: JournalLineId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the currency code.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }
}

/// Input for creating a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJournalEntryInput {
    /// Accounting date, defaults to today (UTC).
    #[serde(default)]
    pub entry_date: Option<NaiveDate>,
    /// Free text description.
    pub description: String,
    /// Optional external reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Lines in display order.
    pub lines: Vec<JournalLineInput>,
    /// Draft (default) or Posted.
    #[serde(default)]
    pub status: Option<EntryStatus>,
}

impl CreateJournalEntryInput {
    /// Creates a draft input with today's date.
    pub fn new(description: impl Into<String>, lines: Vec<JournalLineInput>) -> Self {
        Self {
            entry_date: None,
            description: description.into(),
            reference: None,
            lines,
            status: None,
        }
    }

    /// Sets the accounting date.
    #[must_use]
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.entry_date = Some(date);
        self
    }

    /// Sets the reference.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Requests the entry to be created as posted.
    #[must_use]
    pub fn posted(mut self) -> Self {
        self.status = Some(EntryStatus::Posted);
        self
    }
}

/// Partial update of a journal entry. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateJournalEntryInput {
    /// New accounting date (draft only).
    pub entry_date: Option<NaiveDate>,
    /// New description.
    pub description: Option<String>,
    /// `Some(None)` clears the reference.
    pub reference: Option<Option<String>>,
    /// Desired final line set (draft only).
    pub lines: Option<Vec<JournalLineInput>>,
    /// Requested status transition.
    pub status: Option<EntryStatus>,
}

/// Filter for listing journal entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryFilter {
    /// Case-insensitive substring of the description.
    pub description_contains: Option<String>,
    /// Case-insensitive substring of the reference.
    pub reference_contains: Option<String>,
    /// Exact status.
    pub status: Option<EntryStatus>,
    /// Inclusive lower bound on the entry date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the entry date.
    pub date_to: Option<NaiveDate>,
    /// Entries with at least one line on this account.
    pub account_id: Option<AccountId>,
}

/// What line validation needs to know about an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineAccountInfo {
    /// Account ID.
    pub id: AccountId,
    /// Account code, used in messages.
    pub code: String,
    /// Whether the account is active.
    pub is_active: bool,
}

/// A line that passed validation, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLine {
    /// Existing line to update, or `None` for an insert.
    pub id: Option<JournalLineId>,
    /// Account affected by the line.
    pub account_id: AccountId,
    /// Strictly positive amount.
    pub amount: Decimal,
    /// Amount in storage units (ten-thousandths).
    pub amount_minor: i64,
    /// Normalized currency code.
    pub currency: CurrencyCode,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Zero-based position.
    pub position: i32,
}

/// A validated entry ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJournalEntry {
    /// Pre-assigned entry ID.
    pub id: JournalEntryId,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Trimmed description.
    pub description: String,
    /// Trimmed reference, `None` when blank.
    pub reference: Option<String>,
    /// Initial status.
    pub status: EntryStatus,
    /// Validated lines.
    pub lines: Vec<ValidatedLine>,
    /// Line totals.
    pub totals: LineTotals,
}

/// Changes to the line set of a draft entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChanges {
    /// Final lines; those with an `id` are updated, the rest inserted.
    pub lines: Vec<ValidatedLine>,
    /// Existing lines to delete.
    pub removed: Vec<JournalLineId>,
}

/// Everything an update writes, computed before any write happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
    /// New accounting date.
    pub entry_date: Option<NaiveDate>,
    /// New description.
    pub description: Option<String>,
    /// New reference.
    pub reference: Option<Option<String>>,
    /// Line edits, draft entries only.
    pub line_changes: Option<LineChanges>,
    /// Status change, if any.
    pub transition: TransitionDecision,
}

impl UpdatePlan {
    /// Returns true if the plan writes header columns.
    #[must_use]
    pub fn touches_header(&self) -> bool {
        self.entry_date.is_some() || self.description.is_some() || self.reference.is_some()
    }
}
