//! Account rule violations.

use tally_shared::AppError;
use tally_shared::types::AccountId;
use thiserror::Error;

/// Errors raised by the chart of accounts rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountRuleError {
    /// Account type string is not one of the five known types.
    #[error("invalid account type '{0}': expected asset, liability, equity, revenue or expense")]
    InvalidType(String),

    /// Code is empty after trimming.
    #[error("account code must not be empty")]
    EmptyCode,

    /// Name is empty after trimming.
    #[error("account name must not be empty")]
    EmptyName,

    /// Parent points at the account itself.
    #[error("an account cannot be its own parent")]
    SelfParent,

    /// Parent does not exist or was deleted.
    #[error("parent account {0} does not exist")]
    ParentNotFound(AccountId),

    /// Parent exists but is inactive.
    #[error("parent account {0} is inactive")]
    ParentInactive(AccountId),
}

impl AccountRuleError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidType(_) => "INVALID_ACCOUNT_TYPE",
            Self::EmptyCode => "EMPTY_ACCOUNT_CODE",
            Self::EmptyName => "EMPTY_ACCOUNT_NAME",
            Self::SelfParent => "SELF_PARENT",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::ParentInactive(_) => "PARENT_INACTIVE",
        }
    }

    /// Returns the input field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidType(_) => "account_type",
            Self::EmptyCode => "code",
            Self::EmptyName => "name",
            Self::SelfParent | Self::ParentNotFound(_) | Self::ParentInactive(_) => "parent_id",
        }
    }
}

impl From<AccountRuleError> for AppError {
    fn from(err: AccountRuleError) -> Self {
        let field = err.field();
        Self::validation_field(err.to_string(), field)
    }
}
