//! `config` table schema management and query helpers.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DataError, Result};

fn map_query_err(operation: &'static str) -> impl FnOnce(sqlx::Error) -> DataError {
    move |source| DataError::QueryFailed { operation, source }
}

const SELECT_ENTRIES_SQL: &str = r"
    SELECT key, value, type, description, created_at, updated_at
    FROM config
    ORDER BY key
";

const SELECT_ENTRY_SQL: &str = r"
    SELECT key, value, type, description, created_at, updated_at
    FROM config
    WHERE key = ?1
";

const UPSERT_ENTRY_SQL: &str = r"
    INSERT INTO config (key, value, type, description)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        type = excluded.type,
        description = excluded.description
";

const CLEAR_ENTRIES_SQL: &str = r"DELETE FROM config";

const COUNT_ENTRIES_SQL: &str = r"SELECT COUNT(*) FROM config";

/// Open the SQLite database at `path` and apply pending migrations.
///
/// The pool is bounded to a single connection: the settings store treats
/// the database handle as one shared resource, opened at startup and
/// closed once at shutdown.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrations fail.
pub async fn connect(path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
        .map_err(map_query_err("connect"))?;
    run_migrations(&pool).await?;
    debug!(path = %path.display(), "settings database opened");
    Ok(pool)
}

/// Apply the `config` table migrations.
///
/// # Errors
///
/// Returns an error when migration execution fails.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|source| DataError::MigrationFailed { source })?;
    Ok(())
}

/// Raw projection of the `config` table.
#[derive(Debug, Clone, FromRow)]
pub struct ConfigRow {
    /// Dot-namespaced configuration key.
    pub key: String,
    /// Canonical string form of the stored value.
    pub value: String,
    /// Semantic type tag (`boolean`, `int`, `long`, `double`, `float`, `string`).
    #[sqlx(rename = "type")]
    pub value_type: String,
    /// Operator-facing documentation for the key.
    pub description: Option<String>,
    /// Insertion timestamp.
    pub created_at: NaiveDateTime,
    /// Last write timestamp, refreshed by trigger on every update.
    pub updated_at: NaiveDateTime,
}

/// Borrowed payload for an upsert into the `config` table.
#[derive(Debug, Clone, Copy)]
pub struct NewConfigEntry<'a> {
    /// Dot-namespaced configuration key.
    pub key: &'a str,
    /// Canonical string form of the value.
    pub value: &'a str,
    /// Semantic type tag derived from the value.
    pub value_type: &'a str,
    /// Operator-facing documentation for the key.
    pub description: &'a str,
}

/// Fetch every persisted configuration entry, ordered by key.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub async fn fetch_all_entries(pool: &SqlitePool) -> Result<Vec<ConfigRow>> {
    sqlx::query_as::<_, ConfigRow>(SELECT_ENTRIES_SQL)
        .fetch_all(pool)
        .await
        .map_err(map_query_err("fetch_all_entries"))
}

/// Fetch a single configuration entry by key.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub async fn fetch_entry(pool: &SqlitePool, key: &str) -> Result<Option<ConfigRow>> {
    sqlx::query_as::<_, ConfigRow>(SELECT_ENTRY_SQL)
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(map_query_err("fetch_entry"))
}

/// Insert or replace a configuration entry.
///
/// Replacing an existing key preserves `created_at`; the schema trigger
/// refreshes `updated_at`.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub async fn upsert_entry(pool: &SqlitePool, entry: &NewConfigEntry<'_>) -> Result<()> {
    sqlx::query(UPSERT_ENTRY_SQL)
        .bind(entry.key)
        .bind(entry.value)
        .bind(entry.value_type)
        .bind(entry.description)
        .execute(pool)
        .await
        .map_err(map_query_err("upsert_entry"))?;
    Ok(())
}

/// Delete every configuration entry.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub async fn clear_entries(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CLEAR_ENTRIES_SQL)
        .execute(pool)
        .await
        .map_err(map_query_err("clear_entries"))?;
    Ok(())
}

/// Count persisted configuration entries.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub async fn count_entries(pool: &SqlitePool) -> Result<i64> {
    let row: (i64,) = sqlx::query_as(COUNT_ENTRIES_SQL)
        .fetch_one(pool)
        .await
        .map_err(map_query_err("count_entries"))?;
    Ok(row.0)
}
