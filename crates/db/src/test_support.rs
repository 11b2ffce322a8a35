//! In-memory database for in-crate repository tests.

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tally_shared::config::DatabaseConfig;

use crate::migration::Migrator;

/// One-connection SQLite pool, migrated.
pub(crate) async fn memory_db() -> DatabaseConnection {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        connect_timeout_secs: 8,
        acquire_timeout_secs: 8,
        sqlx_logging: false,
    };
    let db = crate::connect(&config).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}
