//! Report error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::AppError;
use thiserror::Error;

/// Errors that can occur while building reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportRuleError {
    /// Start date after end date.
    #[error("start date {start} is after end date {end}")]
    InvalidDateRange {
        /// Requested start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },

    /// Debit and credit columns differ: the stored ledger is corrupt.
    #[error("trial balance out of balance: debits {debits}, credits {credits}")]
    OutOfBalance {
        /// Debit column total.
        debits: Decimal,
        /// Credit column total.
        credits: Decimal,
    },
}

impl ReportRuleError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::OutOfBalance { .. } => "TRIAL_BALANCE_OUT_OF_BALANCE",
        }
    }
}

impl From<ReportRuleError> for AppError {
    fn from(err: ReportRuleError) -> Self {
        match err {
            ReportRuleError::InvalidDateRange { .. } => {
                Self::validation_field(err.to_string(), "start_date")
            }
            ReportRuleError::OutOfBalance { .. } => Self::internal(err.to_string()),
        }
    }
}
