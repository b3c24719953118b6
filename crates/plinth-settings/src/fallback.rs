//! Degraded flat-file persistence used when the database cannot be opened.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

use crate::backend::PersistenceBackend;
use crate::defaults;
use crate::error::{SettingsError, SettingsResult};
use crate::value::SettingsValue;

/// Best-effort flat-file persistence for degraded mode.
///
/// Keys are stored with dots replaced by hyphens; values found in the file
/// are merged over the compiled-in defaults at load. Durability is reduced:
/// each write rewrites the whole snapshot and failures are logged rather
/// than surfaced. Once this mode is selected at initialisation it is
/// permanent for the process lifetime; no reconnection to the primary
/// database is attempted.
pub struct FallbackStore {
    path: PathBuf,
    snapshot: Mutex<BTreeMap<String, SettingsValue>>,
}

impl FallbackStore {
    /// Create a fallback store reading and writing `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: Mutex::new(BTreeMap::new()),
        }
    }

    /// Filesystem-safe transform of a dotted configuration key.
    #[must_use]
    pub fn file_key(key: &str) -> String {
        key.replace('.', "-")
    }

    async fn read_file(&self) -> SettingsResult<BTreeMap<String, serde_json::Value>> {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|source| SettingsError::FallbackFormat { source }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(SettingsError::Io {
                operation: "read_fallback_file",
                source,
            }),
        }
    }
}

fn coerce_file_value(raw: &serde_json::Value, default: &SettingsValue) -> Option<SettingsValue> {
    let parsed: SettingsValue = serde_json::from_value(raw.clone()).ok()?;
    parsed.coerce(default.kind())
}

#[async_trait]
impl PersistenceBackend for FallbackStore {
    async fn load(&self) -> SettingsResult<Vec<(String, SettingsValue)>> {
        let file = match self.read_file().await {
            Ok(file) => file,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "unreadable fallback file; using compiled-in defaults only"
                );
                BTreeMap::new()
            }
        };

        let mut entries = Vec::new();
        for (key, default) in defaults::all_defaults() {
            let value = file
                .get(Self::file_key(key).as_str())
                .and_then(|raw| coerce_file_value(raw, default))
                .unwrap_or_else(|| default.clone());
            entries.push((key.to_string(), value));
        }

        let mut snapshot = self.snapshot.lock().await;
        *snapshot = entries.iter().cloned().collect();
        Ok(entries)
    }

    async fn persist(&self, key: &str, value: &SettingsValue) -> SettingsResult<()> {
        let serialized = {
            let mut snapshot = self.snapshot.lock().await;
            snapshot.insert(key.to_string(), value.clone());
            let by_file_key: BTreeMap<String, &SettingsValue> = snapshot
                .iter()
                .map(|(key, value)| (Self::file_key(key), value))
                .collect();
            serde_json::to_vec_pretty(&by_file_key)
                .map_err(|source| SettingsError::FallbackFormat { source })?
        };
        fs::write(&self.path, serialized)
            .await
            .map_err(|source| SettingsError::Io {
                operation: "write_fallback_file",
                source,
            })
    }

    async fn clear(&self) -> SettingsResult<()> {
        self.snapshot.lock().await.clear();
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SettingsError::Io {
                operation: "remove_fallback_file",
                source,
            }),
        }
    }

    fn is_connected(&self) -> bool {
        false
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_keys_are_hyphenated() {
        assert_eq!(
            FallbackStore::file_key("sleep.percentage_required"),
            "sleep-percentage_required"
        );
        assert_eq!(FallbackStore::file_key("plain"), "plain");
    }

    #[tokio::test]
    async fn missing_file_loads_exactly_the_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FallbackStore::new(dir.path().join("config.json"));

        let entries = store.load().await.expect("load");
        assert_eq!(entries.len(), defaults::all_defaults().count());
        for (key, value) in entries {
            assert_eq!(Some(value), defaults::default_for(&key));
        }
        assert!(!store.is_connected());
    }

    #[tokio::test]
    async fn file_values_override_defaults_in_their_declared_shape() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"sleep-percentage_required": 0.75, "plugin-language": "fr", "unknown-key": 1}"#,
        )
        .expect("seed file");

        let store = FallbackStore::new(path);
        let entries: BTreeMap<String, SettingsValue> =
            store.load().await.expect("load").into_iter().collect();

        assert_eq!(
            entries.get("sleep.percentage_required"),
            Some(&SettingsValue::Double(0.75))
        );
        assert_eq!(
            entries.get("plugin.language"),
            Some(&SettingsValue::Text("fr".to_string()))
        );
        // Keys without a compiled-in default are not invented.
        assert!(!entries.contains_key("unknown.key"));
    }

    #[tokio::test]
    async fn persisted_snapshot_survives_a_reload() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");

        let store = FallbackStore::new(&path);
        store.load().await.expect("initial load");
        store
            .persist("plugin.debug_mode", &SettingsValue::Bool(true))
            .await
            .expect("persist");

        let raw = std::fs::read_to_string(&path).expect("snapshot file");
        assert!(raw.contains("plugin-debug_mode"));

        let reopened = FallbackStore::new(&path);
        let entries: BTreeMap<String, SettingsValue> =
            reopened.load().await.expect("reload").into_iter().collect();
        assert_eq!(
            entries.get("plugin.debug_mode"),
            Some(&SettingsValue::Bool(true))
        );
    }

    #[tokio::test]
    async fn clear_removes_the_snapshot_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");

        let store = FallbackStore::new(&path);
        store
            .persist("plugin.debug_mode", &SettingsValue::Bool(true))
            .await
            .expect("persist");
        assert!(path.exists());

        store.clear().await.expect("clear");
        assert!(!path.exists());
        // Clearing twice is not an error.
        store.clear().await.expect("second clear");
    }
}
