//! Tests for mapping storage errors on account writes.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, DbErr, Set};
use tally_core::account::{AccountType, CreateAccountInput};
use tally_shared::types::AccountId;

use super::{AccountError, AccountRepository, map_unique_violation};
use crate::entities::{accounts, sea_orm_active_enums};
use crate::test_support::memory_db;

#[tokio::test]
async fn test_unique_violation_maps_to_duplicate_code() {
    let db = memory_db().await;

    AccountRepository::new(db.clone())
        .create(CreateAccountInput::new("2000", "Payables", AccountType::Liability))
        .await
        .unwrap();

    // Same code written past the repository pre-check, as a concurrent
    // create would be.
    let now: DateTimeWithTimeZone = Utc::now().into();
    let err = accounts::ActiveModel {
        id: Set(AccountId::new().into_inner()),
        code: Set("2000".to_string()),
        name: Set("Other payables".to_string()),
        account_type: Set(sea_orm_active_enums::AccountType::Liability),
        parent_id: Set(None),
        is_active: Set(true),
        deleted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&db)
    .await
    .unwrap_err();

    let mapped = map_unique_violation(err, "2000");
    assert!(matches!(mapped, AccountError::DuplicateCode(ref code) if code == "2000"));
}

#[test]
fn test_other_storage_errors_stay_database_errors() {
    let mapped = map_unique_violation(DbErr::Custom("disk full".to_string()), "2000");
    assert!(matches!(mapped, AccountError::Database(_)));
}
