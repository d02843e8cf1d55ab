//! SQLite persistence for the keeper.
//!
//! [`Store`] wraps a pooled sqlx connection. The schema is created idempotently when the
//! store connects, and the per-entity operations live in the submodules as separate `impl`
//! blocks.
//!
//! Timestamps are written as UTC and identifiers are UUID v4 strings generated here, so the
//! database never has to produce either.

mod aliases;
mod contents;
mod files;
mod folders;
mod formats;
mod listeners;
mod order;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use crate::constants::SEEDED_CONTENT_FORMATS;
use crate::KeeperResult;

pub use aliases::AliasFilter;
pub use order::{AliasOrder, AliasOrderColumn, FolderOrder, FolderOrderColumn};

const SCHEMA: [&str; 8] = [
    "CREATE TABLE IF NOT EXISTS folders (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        parent_id TEXT NULL REFERENCES folders(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS files (
        id TEXT PRIMARY KEY,
        folder_id TEXT NULL REFERENCES folders(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS content_formats (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS file_contents (
        id TEXT PRIMARY KEY,
        file_id TEXT NOT NULL REFERENCES files(id) ON DELETE CASCADE,
        version TEXT NOT NULL,
        content TEXT NOT NULL,
        format_id TEXT NULL REFERENCES content_formats(id),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (file_id, version)
    )",
    "CREATE TABLE IF NOT EXISTS listeners (
        id TEXT PRIMARY KEY,
        file_id TEXT NOT NULL REFERENCES files(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        callback_endpoint TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS aliases (
        id TEXT PRIMARY KEY,
        \"key\" TEXT NOT NULL,
        \"value\" TEXT NOT NULL,
        color TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (\"key\", \"value\")
    )",
    "CREATE TABLE IF NOT EXISTS files_aliases (
        file_id TEXT NOT NULL REFERENCES files(id) ON DELETE CASCADE,
        alias_id TEXT NOT NULL REFERENCES aliases(id) ON DELETE CASCADE,
        PRIMARY KEY (file_id, alias_id)
    )",
    "CREATE INDEX IF NOT EXISTS idx_listeners_file_id ON listeners(file_id)",
];

/// Pooled handle to the keeper database. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Connect to `database_url` and make sure the schema exists.
    ///
    /// `sqlite::memory:` databases are pinned to a single long-lived connection, since every
    /// new SQLite connection to `:memory:` would otherwise open an empty database.
    ///
    /// # Errors
    ///
    /// Returns [`crate::KeeperError::Database`] if the url is malformed, the database cannot
    /// be opened, or schema creation fails.
    pub async fn connect(database_url: &str) -> KeeperResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Wrap an existing pool. The schema is assumed to be in place already.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> KeeperResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        for name in SEEDED_CONTENT_FORMATS {
            sqlx::query(
                "INSERT INTO content_formats (id, name) VALUES ($1, $2)
                 ON CONFLICT(name) DO NOTHING",
            )
            .bind(new_id())
            .bind(name)
            .execute(&self.pool)
            .await?;
        }

        tracing::debug!("database schema ready");
        Ok(())
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) async fn memory_store() -> Store {
    Store::connect("sqlite::memory:").await.unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_init_is_idempotent() {
        let store = memory_store().await;
        store.init_schema().await.unwrap();

        let formats = store.list_content_formats().await.unwrap();
        assert_eq!(formats.len(), SEEDED_CONTENT_FORMATS.len());
    }

    #[tokio::test]
    async fn test_connect_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!(
            "sqlite://{}",
            dir.path().join("missing").join("keeper.db").display()
        );
        let result = Store::connect(&url).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("keeper.db").display());

        let store = Store::connect(&url).await.unwrap();
        let folder = store
            .create_folder(&keeper_types::EntryName::new("apps").unwrap(), None)
            .await
            .unwrap();
        drop(store);

        let reopened = Store::connect(&url).await.unwrap();
        let found = reopened.get_folder(&folder.id).await.unwrap();
        assert_eq!(found.path, "apps");
    }
}
