//! Writes every accepted workspace snapshot and drives the saving indicator.
//!
//! The indicator goes `pending` on each write and falls back to `idle` once the dwell passes
//! without another write. A failed write leaves it `pending` until a later write succeeds.

use crate::db::DurableStore;
use crate::debounce::KeyedDebouncer;
use crate::errors::{AppError, AppResult};
use crate::models::{SaveStatus, Workspace};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::time::Duration;

const INDICATOR_KEY: &str = "saving-indicator";
const CORRUPT_SUFFIX: &str = ".corrupt";

pub struct PersistenceEngine {
    store: Arc<dyn DurableStore>,
    key: String,
    status: Arc<watch::Sender<SaveStatus>>,
    indicator: KeyedDebouncer<&'static str>,
    last_write_error: Mutex<Option<String>>,
}

impl PersistenceEngine {
    pub fn new(store: Arc<dyn DurableStore>, key: impl Into<String>, dwell: Duration) -> Self {
        let (status, _) = watch::channel(SaveStatus::Idle);
        Self {
            store,
            key: key.into(),
            status: Arc::new(status),
            indicator: KeyedDebouncer::new(dwell),
            last_write_error: Mutex::new(None),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn load(&self) -> AppResult<Option<Vec<u8>>> {
        self.store.get(&self.key)
    }

    /// Copies unreadable bytes aside so the next write cannot destroy them.
    pub fn back_up_corrupt(&self, raw: &[u8]) -> AppResult<String> {
        let backup_key = format!("{}{}", self.key, CORRUPT_SUFFIX);
        self.store.set(&backup_key, raw)?;
        tracing::warn!(key = %backup_key, bytes = raw.len(), "backed up unreadable workspace document");
        Ok(backup_key)
    }

    /// Writes the full snapshot. Returns whether the write reached the store; failures are
    /// logged and kept for `last_write_error`, never raised.
    pub fn persist(&self, workspace: &Workspace) -> bool {
        self.status.send_replace(SaveStatus::Pending);

        let result = serde_json::to_vec(workspace)
            .map_err(AppError::from)
            .and_then(|bytes| self.store.set(&self.key, &bytes).map(|_| bytes.len()));

        match result {
            Ok(bytes) => {
                tracing::debug!(key = %self.key, bytes, "workspace persisted");
                self.record_error(None);
                let status = Arc::clone(&self.status);
                self.indicator.debounce(INDICATOR_KEY, move || {
                    status.send_replace(SaveStatus::Idle);
                });
                true
            }
            Err(error) => {
                tracing::error!(key = %self.key, error = %error, "failed to persist workspace");
                self.record_error(Some(error.to_string()));
                self.indicator.cancel(&INDICATOR_KEY);
                false
            }
        }
    }

    pub fn status(&self) -> SaveStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.subscribe()
    }

    pub fn last_write_error(&self) -> Option<String> {
        self.last_write_error
            .lock()
            .map(|error| error.clone())
            .unwrap_or_default()
    }

    fn record_error(&self, error: Option<String>) {
        if let Ok(mut slot) = self.last_write_error.lock() {
            *slot = error;
        }
    }
}
