//! Account repository for chart of accounts database operations.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use tally_core::account::{
    Account, AccountFilter, AccountRuleError, AccountRules, CreateAccountInput, ParentInfo,
    UpdateAccountInput,
};
use tally_core::ledger::LineAccountInfo;
use tally_shared::AppError;
use tally_shared::types::{AccountId, PageRequest, PageResponse};
use tracing::{error, info};

use super::contains_ci;
use crate::entities::{accounts, sea_orm_active_enums};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account not found, or logically deleted.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// No account carries the code.
    #[error("Account not found: code '{0}'")]
    CodeNotFound(String),

    /// Account code already exists.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// A chart of accounts rule failed.
    #[error(transparent)]
    Rule(#[from] AccountRuleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(id) => Self::not_found("account", id),
            AccountError::CodeNotFound(code) => Self::not_found("account", code),
            AccountError::DuplicateCode(_) => Self::conflict(err.to_string()),
            AccountError::Rule(rule) => rule.into(),
            AccountError::Database(db) => {
                error!(error = %db, "account storage failure");
                Self::internal_with("database error", db)
            }
        }
    }
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Code or name is empty
    /// - Parent account is missing, deleted, or inactive
    /// - Account code already exists (deleted accounts included)
    pub async fn create(&self, input: CreateAccountInput) -> Result<Account, AccountError> {
        let txn = self.db.begin().await?;

        let parent = match input.parent_id {
            Some(parent_id) => find_parent(&txn, parent_id).await?,
            None => None,
        };
        let input = AccountRules::prepare_create(input, |id| parent.filter(|p| p.id == id))?;

        let existing = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(&input.code))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AccountError::DuplicateCode(input.code));
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let model = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            code: Set(input.code.clone()),
            name: Set(input.name),
            account_type: Set(input.account_type.into()),
            parent_id: Set(input.parent_id.map(AccountId::into_inner)),
            is_active: Set(input.is_active),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|err| map_unique_violation(err, &input.code))?;

        txn.commit().await?;

        info!(account_id = %model.id, code = %model.code, "account created");
        Ok(to_account(model))
    }

    /// Gets an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist or was deleted.
    pub async fn get_by_id(&self, id: AccountId) -> Result<Account, AccountError> {
        find_live(&self.db, id)
            .await?
            .map(to_account)
            .ok_or(AccountError::NotFound(id))
    }

    /// Gets an account by code.
    ///
    /// # Errors
    ///
    /// Returns `CodeNotFound` if no live account carries the code.
    pub async fn get_by_code(&self, code: &str) -> Result<Account, AccountError> {
        accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code))
            .filter(accounts::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .map(to_account)
            .ok_or_else(|| AccountError::CodeNotFound(code.to_string()))
    }

    /// Applies the fields present in `patch`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Account does not exist
    /// - Name is empty
    /// - Parent is the account itself, missing, deleted, or inactive
    pub async fn update(
        &self,
        id: AccountId,
        patch: UpdateAccountInput,
    ) -> Result<Account, AccountError> {
        let txn = self.db.begin().await?;

        let current = find_live(&txn, id)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        let parent = match patch.parent_id {
            Some(Some(parent_id)) if parent_id != id => find_parent(&txn, parent_id).await?,
            _ => None,
        };
        let patch = AccountRules::prepare_update(id, patch, |pid| parent.filter(|p| p.id == pid))?;

        if patch.is_empty() {
            txn.commit().await?;
            return Ok(to_account(current));
        }

        let mut active: accounts::ActiveModel = current.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(account_type) = patch.account_type {
            active.account_type = Set(account_type.into());
        }
        if let Some(parent_id) = patch.parent_id {
            active.parent_id = Set(parent_id.map(AccountId::into_inner));
        }
        if let Some(is_active) = patch.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        let model = active.update(&txn).await?;
        txn.commit().await?;

        info!(account_id = %id, "account updated");
        Ok(to_account(model))
    }

    /// Logically deletes an account. Journal lines are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist or was already deleted.
    pub async fn delete(&self, id: AccountId) -> Result<(), AccountError> {
        let txn = self.db.begin().await?;

        let current = find_live(&txn, id)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let mut active: accounts::ActiveModel = current.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;

        info!(account_id = %id, "account deleted");
        Ok(())
    }

    /// Lists live accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: &AccountFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Account>, AccountError> {
        let page = page.normalized();

        let mut query = accounts::Entity::find().filter(accounts::Column::DeletedAt.is_null());

        if let Some(name) = filter.name_contains.as_deref() {
            query = query.filter(contains_ci(accounts::Column::Name, name));
        }
        if let Some(account_type) = filter.account_type {
            query = query.filter(
                accounts::Column::AccountType
                    .eq(sea_orm_active_enums::AccountType::from(account_type)),
            );
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(is_active));
        }

        let paginator = query
            .order_by_asc(accounts::Column::Code)
            .paginate(&self.db, page.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.index()).await?;

        Ok(PageResponse::new(
            models.into_iter().map(to_account).collect(),
            page,
            total,
        ))
    }
}

/// Loads line validation info for the given accounts.
///
/// Deleted accounts are absent from the result.
pub(crate) async fn line_accounts<C>(
    conn: &C,
    ids: impl IntoIterator<Item = AccountId>,
) -> Result<HashMap<AccountId, LineAccountInfo>, DbErr>
where
    C: ConnectionTrait,
{
    let mut ids: Vec<uuid::Uuid> = ids.into_iter().map(AccountId::into_inner).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let models = accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(ids))
        .filter(accounts::Column::DeletedAt.is_null())
        .all(conn)
        .await?;

    Ok(models
        .into_iter()
        .map(|m| {
            let id = AccountId::from_uuid(m.id);
            (
                id,
                LineAccountInfo {
                    id,
                    code: m.code,
                    is_active: m.is_active,
                },
            )
        })
        .collect())
}

/// Finds an account that is not logically deleted.
async fn find_live<C>(conn: &C, id: AccountId) -> Result<Option<accounts::Model>, DbErr>
where
    C: ConnectionTrait,
{
    accounts::Entity::find_by_id(id.into_inner())
        .filter(accounts::Column::DeletedAt.is_null())
        .one(conn)
        .await
}

async fn find_parent<C>(conn: &C, id: AccountId) -> Result<Option<ParentInfo>, DbErr>
where
    C: ConnectionTrait,
{
    Ok(find_live(conn, id).await?.map(|m| ParentInfo {
        id,
        is_active: m.is_active,
    }))
}

fn map_unique_violation(err: DbErr, code: &str) -> AccountError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AccountError::DuplicateCode(code.to_string()),
        _ => AccountError::Database(err),
    }
}

fn to_account(model: accounts::Model) -> Account {
    Account {
        id: AccountId::from_uuid(model.id),
        code: model.code,
        name: model.name,
        account_type: model.account_type.into(),
        parent_id: model.parent_id.map(AccountId::from_uuid),
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
#[path = "account_tests.rs"]
mod tests;
