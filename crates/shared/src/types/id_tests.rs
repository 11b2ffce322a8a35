use super::*;
use std::collections::HashSet;

#[test]
fn test_fresh_ids_sort_by_creation() {
    let first = JournalLineId::new();
    let second = JournalLineId::new();
    assert!(first < second);
    assert_ne!(first, second);
}

#[test]
fn test_uuid_conversions_preserve_value() {
    let uuid = Uuid::now_v7();
    let id = JournalEntryId::from_uuid(uuid);
    assert_eq!(id.into_inner(), uuid);
    assert_eq!(Uuid::from(id), uuid);
    assert_eq!(JournalEntryId::from(uuid), id);
}

#[test]
fn test_display_is_bare_uuid_and_debug_names_kind() {
    let uuid = Uuid::now_v7();
    let id = AccountId::from_uuid(uuid);
    assert_eq!(id.to_string(), uuid.to_string());
    assert_eq!(format!("{id:?}"), format!("AccountId({uuid})"));
}

#[test]
fn test_parse_rejects_garbage() {
    let uuid = Uuid::now_v7();
    let id: AccountId = uuid.to_string().parse().unwrap();
    assert_eq!(id.into_inner(), uuid);
    assert!("1000".parse::<AccountId>().is_err());
}

#[test]
fn test_json_form_is_plain_uuid() {
    let uuid = Uuid::now_v7();
    let json = serde_json::to_string(&AccountId::from_uuid(uuid)).unwrap();
    assert_eq!(json, format!("\"{uuid}\""));

    let back: AccountId = serde_json::from_str(&json).unwrap();
    assert_eq!(back.into_inner(), uuid);
}

#[test]
fn test_ids_work_as_set_keys() {
    let id = AccountId::new();
    let set: HashSet<_> = [id, id, AccountId::new()].into_iter().collect();
    assert_eq!(set.len(), 2);
}
