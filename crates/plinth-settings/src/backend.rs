//! Persistence seam between the settings cache and its durable backends.
//!
//! Exactly one backend is selected at initialisation: the SQLite database
//! when it can be opened, the flat-file fallback otherwise.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::warn;

use plinth_data::config as data_config;

use crate::defaults;
use crate::error::{SettingsError, SettingsResult};
use crate::value::{SettingsValue, ValueKind};

/// Contract shared by the primary database backend and the degraded
/// flat-file fallback.
#[async_trait]
pub(crate) trait PersistenceBackend: Send + Sync {
    /// Load every persisted entry.
    async fn load(&self) -> SettingsResult<Vec<(String, SettingsValue)>>;

    /// Durably record one entry.
    async fn persist(&self, key: &str, value: &SettingsValue) -> SettingsResult<()>;

    /// Remove every persisted entry.
    async fn clear(&self) -> SettingsResult<()>;

    /// Whether the primary database handle is open.
    fn is_connected(&self) -> bool;

    /// Release the backing resources.
    async fn close(&self);
}

/// SQLite-backed primary persistence.
pub(crate) struct DatabaseBackend {
    pool: SqlitePool,
}

impl DatabaseBackend {
    pub(crate) const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersistenceBackend for DatabaseBackend {
    async fn load(&self) -> SettingsResult<Vec<(String, SettingsValue)>> {
        let rows = data_config::fetch_all_entries(&self.pool)
            .await
            .map_err(|source| SettingsError::DataAccess {
                operation: "fetch_all_entries",
                source,
            })?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let kind: ValueKind = match row.value_type.parse() {
                Ok(kind) => kind,
                Err(err) => {
                    warn!(key = %row.key, error = %err, "dropping entry with unknown type tag");
                    continue;
                }
            };
            match kind.parse(&row.value) {
                Some(value) => entries.push((row.key, value)),
                None => {
                    warn!(
                        key = %row.key,
                        tag = %row.value_type,
                        "dropping entry with malformed stored value"
                    );
                }
            }
        }
        Ok(entries)
    }

    async fn persist(&self, key: &str, value: &SettingsValue) -> SettingsResult<()> {
        let canonical = value.canonical();
        let description = defaults::describe(key);
        let entry = data_config::NewConfigEntry {
            key,
            value: &canonical,
            value_type: value.kind().as_tag(),
            description: &description,
        };
        data_config::upsert_entry(&self.pool, &entry)
            .await
            .map_err(|source| SettingsError::DataAccess {
                operation: "upsert_entry",
                source,
            })
    }

    async fn clear(&self) -> SettingsResult<()> {
        data_config::clear_entries(&self.pool)
            .await
            .map_err(|source| SettingsError::DataAccess {
                operation: "clear_entries",
                source,
            })
    }

    fn is_connected(&self) -> bool {
        !self.pool.is_closed()
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
