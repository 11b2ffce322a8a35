//! Chart of accounts.
//!
//! Account types, the account record, and the rules every create or update
//! must satisfy before it reaches storage.

pub mod error;
pub mod types;
pub mod validation;

pub use error::AccountRuleError;
pub use types::{
    Account, AccountFilter, AccountType, CreateAccountInput, ParentInfo, UpdateAccountInput,
};
pub use validation::AccountRules;
