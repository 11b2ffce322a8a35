//! Ledger error types for validation and state errors.
//!
//! Line-level errors carry the zero-based line index so callers can point at
//! the offending input (`lines[2].amount`).

use rust_decimal::Decimal;
use tally_shared::AppError;
use tally_shared::types::{AccountId, JournalEntryId, JournalLineId};
use thiserror::Error;

use super::status::EntryStatus;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Lookup Errors ==========
    /// Journal entry does not exist or was deleted.
    #[error("journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),

    // ========== Validation Errors ==========
    /// Debits and credits differ.
    #[error("debits ({debits}) must equal credits ({credits})")]
    UnbalancedEntry {
        /// Total debit amount.
        debits: Decimal,
        /// Total credit amount.
        credits: Decimal,
    },

    /// Entry has no lines where at least one is required.
    #[error("entry must have at least one line")]
    EmptyEntry,

    /// Line amount is zero or negative.
    #[error("line {line}: amount must be greater than zero")]
    NonPositiveAmount {
        /// Line index.
        line: usize,
    },

    /// Line amount has more than four fractional digits.
    #[error("line {line}: amount may have at most 4 decimal places")]
    ExcessAmountPrecision {
        /// Line index.
        line: usize,
    },

    /// Line amount is too large to store.
    #[error("line {line}: amount is out of range")]
    AmountOutOfRange {
        /// Line index.
        line: usize,
    },

    /// Line currency is not a three-letter code.
    #[error("line {line}: invalid currency code '{code}'")]
    InvalidCurrency {
        /// Line index.
        line: usize,
        /// Code as given.
        code: String,
    },

    /// Line references an account that does not exist.
    #[error("line {line}: account {account_id} does not exist")]
    UnknownLineAccount {
        /// Line index.
        line: usize,
        /// Referenced account.
        account_id: AccountId,
    },

    /// Line references an inactive account.
    #[error("line {line}: account {account_id} is inactive")]
    InactiveLineAccount {
        /// Line index.
        line: usize,
        /// Referenced account.
        account_id: AccountId,
    },

    /// Line ID in an update does not belong to the entry.
    #[error("line {line}: line {line_id} does not belong to this entry")]
    LineNotInEntry {
        /// Line index.
        line: usize,
        /// Foreign line ID.
        line_id: JournalLineId,
    },

    /// Line ID appears more than once in an update.
    #[error("line {line}: line {line_id} appears more than once")]
    DuplicateLine {
        /// Line index.
        line: usize,
        /// Repeated line ID.
        line_id: JournalLineId,
    },

    /// Entries cannot be created directly in the given status.
    #[error("entries cannot be created as {0}")]
    InvalidCreateStatus(EntryStatus),

    /// Status string is not a known status.
    #[error("invalid entry status '{0}'")]
    InvalidStatus(String),

    // ========== State Errors ==========
    /// Account referenced by a line is gone at post time.
    #[error("cannot post: account {account_id} no longer exists")]
    MissingAccountAtPost {
        /// Referenced account.
        account_id: AccountId,
    },

    /// Account referenced by a line is inactive at post time.
    #[error("cannot post: account {code} ({account_id}) is inactive")]
    InactiveAccountAtPost {
        /// Referenced account.
        account_id: AccountId,
        /// Account code.
        code: String,
    },

    /// Status transition not allowed.
    #[error("cannot move entry from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: EntryStatus,
        /// Requested status.
        to: EntryStatus,
    },

    /// Field cannot change once the entry left draft.
    #[error("cannot change {field} of a {status} entry")]
    ImmutableEntry {
        /// Current status.
        status: EntryStatus,
        /// Field the caller tried to change.
        field: &'static str,
    },

    /// Posted entries cannot be deleted.
    #[error("posted entries cannot be deleted: void or un-post first")]
    CannotDeletePosted,

    /// Status changed between read and write.
    #[error("concurrent modification detected, please retry")]
    ConcurrentModification,
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::EmptyEntry => "EMPTY_ENTRY",
            Self::NonPositiveAmount { .. } => "NON_POSITIVE_AMOUNT",
            Self::ExcessAmountPrecision { .. } => "EXCESS_AMOUNT_PRECISION",
            Self::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            Self::InvalidCurrency { .. } => "INVALID_CURRENCY",
            Self::UnknownLineAccount { .. } => "ACCOUNT_NOT_FOUND",
            Self::InactiveLineAccount { .. } => "ACCOUNT_INACTIVE",
            Self::LineNotInEntry { .. } => "LINE_NOT_IN_ENTRY",
            Self::DuplicateLine { .. } => "DUPLICATE_LINE",
            Self::InvalidCreateStatus(_) => "INVALID_CREATE_STATUS",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::MissingAccountAtPost { .. } => "ACCOUNT_MISSING_AT_POST",
            Self::InactiveAccountAtPost { .. } => "ACCOUNT_INACTIVE_AT_POST",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ImmutableEntry { .. } => "IMMUTABLE_ENTRY",
            Self::CannotDeletePosted => "CANNOT_DELETE_POSTED",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
        }
    }

    /// Returns the input field the error points at, if any.
    #[must_use]
    pub fn field(&self) -> Option<String> {
        match self {
            Self::NonPositiveAmount { line }
            | Self::ExcessAmountPrecision { line }
            | Self::AmountOutOfRange { line } => Some(format!("lines[{line}].amount")),
            Self::InvalidCurrency { line, .. } => Some(format!("lines[{line}].currency")),
            Self::UnknownLineAccount { line, .. } | Self::InactiveLineAccount { line, .. } => {
                Some(format!("lines[{line}].account_id"))
            }
            Self::LineNotInEntry { line, .. } | Self::DuplicateLine { line, .. } => {
                Some(format!("lines[{line}].id"))
            }
            Self::UnbalancedEntry { .. } | Self::EmptyEntry => Some("lines".to_string()),
            Self::InvalidCreateStatus(_) | Self::InvalidStatus(_) => Some("status".to_string()),
            _ => None,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::EntryNotFound(id) => Self::not_found("journal entry", id),
            LedgerError::MissingAccountAtPost { .. }
            | LedgerError::InactiveAccountAtPost { .. }
            | LedgerError::InvalidTransition { .. }
            | LedgerError::ImmutableEntry { .. }
            | LedgerError::CannotDeletePosted
            | LedgerError::ConcurrentModification => Self::conflict(err.to_string()),
            _ => Self::Validation {
                field: err.field(),
                message: err.to_string(),
            },
        }
    }
}
