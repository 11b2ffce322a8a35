//! Rules applied to account creates and updates.
//!
//! Parent lookups are injected as closures so the rules stay free of storage
//! concerns. A lookup returns `None` for missing or deleted accounts.

use tally_shared::types::AccountId;

use super::error::AccountRuleError;
use super::types::{CreateAccountInput, ParentInfo, UpdateAccountInput};

/// Chart of accounts rules.
pub struct AccountRules;

impl AccountRules {
    /// Validates and normalizes a create request.
    ///
    /// Code and name are trimmed. The parent, when set, must exist and be active.
    ///
    /// # Errors
    ///
    /// Returns `AccountRuleError` for empty code or name and for an unusable parent.
    pub fn prepare_create<P>(
        input: CreateAccountInput,
        parent_lookup: P,
    ) -> Result<CreateAccountInput, AccountRuleError>
    where
        P: Fn(AccountId) -> Option<ParentInfo>,
    {
        let code = input.code.trim().to_string();
        if code.is_empty() {
            return Err(AccountRuleError::EmptyCode);
        }
        let name = Self::normalize_name(&input.name)?;

        if let Some(parent_id) = input.parent_id {
            Self::check_parent(parent_id, &parent_lookup)?;
        }

        Ok(CreateAccountInput {
            code,
            name,
            ..input
        })
    }

    /// Validates and normalizes an update of account `id`.
    ///
    /// # Errors
    ///
    /// Returns `AccountRuleError` for an empty name, a self reference, or an
    /// unusable parent.
    pub fn prepare_update<P>(
        id: AccountId,
        patch: UpdateAccountInput,
        parent_lookup: P,
    ) -> Result<UpdateAccountInput, AccountRuleError>
    where
        P: Fn(AccountId) -> Option<ParentInfo>,
    {
        let name = patch
            .name
            .as_deref()
            .map(Self::normalize_name)
            .transpose()?;

        if let Some(Some(parent_id)) = patch.parent_id {
            if parent_id == id {
                return Err(AccountRuleError::SelfParent);
            }
            Self::check_parent(parent_id, &parent_lookup)?;
        }

        Ok(UpdateAccountInput { name, ..patch })
    }

    fn normalize_name(name: &str) -> Result<String, AccountRuleError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AccountRuleError::EmptyName);
        }
        Ok(name.to_string())
    }

    fn check_parent<P>(parent_id: AccountId, parent_lookup: &P) -> Result<(), AccountRuleError>
    where
        P: Fn(AccountId) -> Option<ParentInfo>,
    {
        let parent = parent_lookup(parent_id).ok_or(AccountRuleError::ParentNotFound(parent_id))?;
        if !parent.is_active {
            return Err(AccountRuleError::ParentInactive(parent_id));
        }
        Ok(())
    }
}
