//! The settings store facade: cached reads, asynchronous durable writes,
//! and degraded-mode selection.

use std::collections::HashMap;
use std::future::{Future, IntoFuture};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::backend::{DatabaseBackend, PersistenceBackend};
use crate::defaults;
use crate::error::{SettingsError, SettingsResult};
use crate::fallback::FallbackStore;
use crate::value::{SettingsValue, ValueKind};

/// Bound on a single durable write attempt.
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Database filename inside the store's data directory.
const DATABASE_FILE: &str = "config.db";

/// Fallback snapshot filename inside the store's data directory.
const FALLBACK_FILE: &str = "config.json";

/// Typed, cached, durable key/value settings store.
///
/// Reads are answered from an in-memory cache populated at [`open`];
/// writes update the cache synchronously and persist on a background
/// task. The handle is cheap to clone; all clones share one cache and one
/// backing resource.
///
/// [`open`]: SettingsStore::open
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<Inner>,
}

struct Inner {
    cache: DashMap<String, SettingsValue>,
    backend: Box<dyn PersistenceBackend>,
    pending_writes: AtomicUsize,
}

impl SettingsStore {
    /// Open the store rooted at `data_dir`.
    ///
    /// Creates the directory, opens `config.db`, loads every persisted
    /// entry into the cache, then seeds any compiled-in default not
    /// already present into both cache and backing store. When the
    /// database cannot be opened the store logs a warning and continues in
    /// degraded flat-file mode; `open` itself never fails the host.
    #[instrument(name = "settings_store.open", skip(data_dir))]
    pub async fn open(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        if let Err(err) = tokio::fs::create_dir_all(&data_dir).await {
            warn!(
                path = %data_dir.display(),
                error = %err,
                "failed to create settings data directory"
            );
        }

        let backend: Box<dyn PersistenceBackend> =
            match plinth_data::connect(&data_dir.join(DATABASE_FILE)).await {
                Ok(pool) => {
                    info!("database settings store initialised");
                    Box::new(DatabaseBackend::new(pool))
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        "settings database unavailable; falling back to file-based configuration"
                    );
                    Box::new(FallbackStore::new(data_dir.join(FALLBACK_FILE)))
                }
            };

        let store = Self {
            inner: Arc::new(Inner {
                cache: DashMap::new(),
                backend,
                pending_writes: AtomicUsize::new(0),
            }),
        };
        store.load_and_seed().await;
        store
    }

    async fn load_and_seed(&self) {
        match self.inner.backend.load().await {
            Ok(entries) => {
                for (key, value) in entries {
                    self.inner.cache.insert(key, value);
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to load persisted settings; seeding defaults only");
            }
        }

        for (key, default) in defaults::all_defaults() {
            if self.inner.cache.contains_key(key) {
                continue;
            }
            self.inner.cache.insert(key.to_string(), default.clone());
            if let Err(err) = self.inner.backend.persist(key, default).await {
                warn!(key, error = %err, "failed to seed default value");
            }
        }
    }

    /// Cached value for `key` coerced to `kind`, falling back to the
    /// compiled-in default; `Ok(None)` when neither exists.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Coercion`] when a present value does not
    /// parse under `kind`.
    pub fn get(&self, key: &str, kind: ValueKind) -> SettingsResult<Option<SettingsValue>> {
        let stored = self
            .inner
            .cache
            .get(key)
            .map(|entry| entry.value().clone())
            .or_else(|| defaults::default_for(key));
        let Some(stored) = stored else {
            return Ok(None);
        };
        stored
            .coerce(kind)
            .map(Some)
            .ok_or_else(|| SettingsError::Coercion {
                key: key.to_string(),
                requested: kind,
                value: stored.canonical(),
            })
    }

    /// Like [`SettingsStore::get`], but returns `default` when the key is
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Coercion`] when a present value does not
    /// parse under `kind`; the default only replaces the absent case.
    pub fn get_or(
        &self,
        key: &str,
        kind: ValueKind,
        default: SettingsValue,
    ) -> SettingsResult<SettingsValue> {
        Ok(self.get(key, kind)?.unwrap_or(default))
    }

    /// Write `value` for `key`.
    ///
    /// The cache is updated before this call returns, so subsequent reads
    /// on this process observe the new value immediately; the durable
    /// write runs on a background task bounded by a timeout. The returned
    /// ticket resolves once the durable attempt completes. Persistence
    /// failures are logged and reported as [`WriteOutcome::CacheOnly`],
    /// never surfaced as errors.
    pub fn set(&self, key: impl Into<String>, value: impl Into<SettingsValue>) -> WriteTicket {
        let key = key.into();
        let value = value.into();
        self.inner.cache.insert(key.clone(), value.clone());

        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        inner.pending_writes.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            let outcome = persist_one(&inner, &key, &value).await;
            inner.pending_writes.fetch_sub(1, Ordering::SeqCst);
            let _ = tx.send(outcome);
        });

        WriteTicket { rx }
    }

    /// Point-in-time copy of the full cache. Mutating the result does not
    /// affect store state.
    #[must_use]
    pub fn get_all(&self) -> HashMap<String, SettingsValue> {
        self.inner
            .cache
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Clear every durable entry and re-seed the compiled-in defaults.
    ///
    /// Runs on a background task; reads racing the reset may observe a
    /// partially-reset cache. The ticket resolves [`WriteOutcome::Persisted`]
    /// only when the clear and every re-seeded write reached the backing
    /// store.
    pub fn reset_to_defaults(&self) -> WriteTicket {
        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        inner.pending_writes.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            let outcome = reset_all(&inner).await;
            inner.pending_writes.fetch_sub(1, Ordering::SeqCst);
            let _ = tx.send(outcome);
        });
        WriteTicket { rx }
    }

    /// Whether the primary database handle is open. Diagnostics only:
    /// reads are always answered from the cache regardless.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.backend.is_connected()
    }

    /// Close the backing resource. A close racing in-flight writes is
    /// logged, not treated as an error.
    pub async fn close(&self) {
        let pending = self.inner.pending_writes.load(Ordering::SeqCst);
        if pending > 0 {
            warn!(pending, "closing settings store with writes still in flight");
        }
        self.inner.backend.close().await;
        info!("settings store closed");
    }
}

async fn persist_one(inner: &Inner, key: &str, value: &SettingsValue) -> WriteOutcome {
    match timeout(WRITE_TIMEOUT, inner.backend.persist(key, value)).await {
        Ok(Ok(())) => WriteOutcome::Persisted,
        Ok(Err(err)) => {
            warn!(key, error = %err, "failed to save config value; cache remains authoritative");
            WriteOutcome::CacheOnly
        }
        Err(_) => {
            warn!(
                key,
                timeout_ms = %WRITE_TIMEOUT.as_millis(),
                "durable write timed out; cache remains authoritative"
            );
            WriteOutcome::CacheOnly
        }
    }
}

async fn reset_all(inner: &Inner) -> WriteOutcome {
    let mut outcome = WriteOutcome::Persisted;
    match timeout(WRITE_TIMEOUT, inner.backend.clear()).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!(error = %err, "failed to clear persisted settings");
            outcome = WriteOutcome::CacheOnly;
        }
        Err(_) => {
            warn!("clearing persisted settings timed out");
            outcome = WriteOutcome::CacheOnly;
        }
    }

    inner.cache.clear();
    for (key, default) in defaults::all_defaults() {
        inner.cache.insert(key.to_string(), default.clone());
        if persist_one(inner, key, default).await == WriteOutcome::CacheOnly {
            outcome = WriteOutcome::CacheOnly;
        }
    }
    info!("configuration reset to defaults");
    outcome
}

/// Completion handle for one durable write attempt.
///
/// Await it (the type implements [`IntoFuture`]) to learn whether the
/// write reached the backing store or only the cache.
pub struct WriteTicket {
    rx: oneshot::Receiver<WriteOutcome>,
}

/// Terminal state of a durable write attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write reached the backing store.
    Persisted,
    /// The write is visible in the cache only; the failure was logged.
    CacheOnly,
}

impl IntoFuture for WriteTicket {
    type Output = WriteOutcome;
    type IntoFuture = Pin<Box<dyn Future<Output = WriteOutcome> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.rx.await.unwrap_or(WriteOutcome::CacheOnly) })
    }
}
