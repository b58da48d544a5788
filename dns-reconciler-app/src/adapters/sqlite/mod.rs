//! SQLite-backed local mirror using `SeaORM`.
//!
//! A single `SqliteStore` implements `DomainRepository` and `RecordRepository`
//! against one local `SQLite` database file.

mod domain_repo;
pub(crate) mod entity;
mod migration;
mod record_repo;

use std::path::Path;

use chrono::{DateTime, Utc};
use dns_reconciler_core::error::{CoreError, CoreResult};
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use migration::Migrator;

/// SQLite-based store for domains and their mirrored records.
pub struct SqliteStore {
    /// Shared `SeaORM` database connection.
    pub(crate) db: DatabaseConnection,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path` and run pending migrations.
    ///
    /// # Errors
    /// Returns `CoreError::Storage` if directory creation, database
    /// connection, or schema migration fails.
    pub async fn new(db_path: &Path) -> CoreResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::Storage(format!("Failed to create directory: {e}")))?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let db = Database::connect(&db_url)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to connect to SQLite: {e}")))?;

        let store = Self { db };

        Migrator::up(&store.db, None)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to run migrations: {e}")))?;

        Ok(store)
    }
}

/// Parse an RFC3339 column back into UTC.
fn parse_timestamp(field: &str, raw: &str) -> CoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::Serialization(format!("Invalid {field}: {e}")))
}

fn parse_optional_timestamp(field: &str, raw: Option<&str>) -> CoreResult<Option<DateTime<Utc>>> {
    raw.map(|s| parse_timestamp(field, s)).transpose()
}
