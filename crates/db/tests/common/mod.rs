//! Shared fixtures for repository tests.
//!
//! Every test gets its own in-memory SQLite database migrated with the real
//! migration. The pool holds exactly one connection so the database lives
//! as long as the pool.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;

use tally_core::account::{Account, AccountType, CreateAccountInput};
use tally_core::ledger::{LedgerEvent, LedgerObserver};
use tally_db::migration::Migrator;
use tally_db::{AccountRepository, JournalRepository, ReportRepository};
use tally_shared::config::DatabaseConfig;

pub async fn setup_db() -> DatabaseConnection {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        connect_timeout_secs: 8,
        acquire_timeout_secs: 8,
        sqlx_logging: false,
    };

    let db = tally_db::connect(&config)
        .await
        .expect("Failed to open SQLite database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Observer that keeps every event for later assertions.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<LedgerEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl LedgerObserver for RecordingObserver {
    fn record(&self, event: &LedgerEvent) {
        self.events.lock().unwrap().push(*event);
    }
}

pub struct TestLedger {
    pub db: DatabaseConnection,
    pub accounts: AccountRepository,
    pub journal: JournalRepository,
    pub reports: ReportRepository,
    pub observer: Arc<RecordingObserver>,
}

pub async fn setup_ledger() -> TestLedger {
    let db = setup_db().await;
    let observer = Arc::new(RecordingObserver::default());
    TestLedger {
        accounts: AccountRepository::new(db.clone()),
        journal: JournalRepository::new(db.clone()).with_observer(observer.clone()),
        reports: ReportRepository::new(db.clone()),
        observer,
        db,
    }
}

impl TestLedger {
    pub async fn account(&self, code: &str, name: &str, account_type: AccountType) -> Account {
        self.accounts
            .create(CreateAccountInput::new(code, name, account_type))
            .await
            .expect("Failed to create account")
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
