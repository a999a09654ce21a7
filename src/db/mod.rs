use crate::config::WorkspaceSettings;
use crate::errors::{AppError, AppResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Key/value persistence for whole serialized documents.
pub trait DurableStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> AppResult<()>;
}

#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        };
        store.ensure_default_settings()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn get_settings(&self) -> AppResult<WorkspaceSettings> {
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                "SELECT value_json FROM settings WHERE key = 'app'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match raw {
            Some(raw) => Ok(serde_json::from_str::<WorkspaceSettings>(&raw).unwrap_or_else(|error| {
                tracing::warn!(error = %error, "malformed settings row, using defaults");
                WorkspaceSettings::default()
            })),
            None => Ok(WorkspaceSettings::default()),
        }
    }

    pub fn update_settings(&self, update: serde_json::Value) -> AppResult<WorkspaceSettings> {
        let current = self.get_settings()?;
        let mut merged = serde_json::to_value(current)?;
        merge_json(&mut merged, update);
        let settings: WorkspaceSettings = serde_json::from_value(merged)
            .map_err(|error| AppError::InvalidFormat(format!("invalid settings update: {}", error)))?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO settings (key, value_json, updated_at)
             VALUES ('app', ?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            params![serde_json::to_string(&settings)?, Utc::now().to_rfc3339()],
        )?;

        Ok(settings)
    }

    fn ensure_default_settings(&self) -> AppResult<()> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(1) FROM settings WHERE key = 'app'", [], |row| row.get(0))?;
        if count == 0 {
            conn.execute(
                "INSERT INTO settings (key, value_json, updated_at) VALUES ('app', ?1, ?2)",
                params![
                    serde_json::to_string(&WorkspaceSettings::default())?,
                    Utc::now().to_rfc3339()
                ],
            )?;
        }
        Ok(())
    }

    fn conn(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))
    }
}

impl DurableStore for SqliteStore {
    fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        let conn = self.conn()?;
        conn.query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| {
            row.get::<_, Vec<u8>>(0)
        })
        .optional()
        .map_err(AppError::from)
    }

    fn set(&self, key: &str, value: &[u8]) -> AppResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )
        .map_err(|error| AppError::StoreWrite(error.to_string()))?;
        Ok(())
    }
}

/// In-process store. Writes can be made to fail to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: impl Into<Vec<u8>>) -> Self {
        let store = Self::default();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.into());
        }
        store
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn entries(&self) -> AppResult<MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|_| AppError::Internal("memory store mutex poisoned".to_string()))
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::StoreWrite(format!("write to {} rejected", key)));
        }
        self.entries()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

fn merge_json(target: &mut serde_json::Value, update: serde_json::Value) {
    match (target, update) {
        (serde_json::Value::Object(target_map), serde_json::Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_json(target_map.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (target, update) => {
            *target = update;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sqlite_store_upserts_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::new(&dir.path().join("nested").join("test.db")).expect("db");

        assert_eq!(store.get("atelier-projects").expect("get"), None);
        store.set("atelier-projects", b"[]").expect("set");
        store.set("atelier-projects", b"[1]").expect("overwrite");
        assert_eq!(store.get("atelier-projects").expect("get"), Some(b"[1]".to_vec()));
    }

    #[test]
    fn sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("test.db");
        {
            let store = SqliteStore::new(&path).expect("db");
            store.set("k", b"v").expect("set");
        }
        let reopened = SqliteStore::new(&path).expect("reopen");
        assert_eq!(reopened.get("k").expect("get"), Some(b"v".to_vec()));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn settings_default_and_merge_partial_updates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::new(&dir.path().join("test.db")).expect("db");

        assert_eq!(store.get_settings().expect("settings"), WorkspaceSettings::default());

        let updated = store
            .update_settings(json!({"editQuietMs": 800, "seedWelcomeContent": false}))
            .expect("update");
        assert_eq!(updated.edit_quiet_ms, 800);
        assert!(!updated.seed_welcome_content);
        assert_eq!(updated.saving_dwell_ms, 1500);
        assert_eq!(store.get_settings().expect("reload"), updated);
    }

    #[test]
    fn settings_update_with_wrong_types_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::new(&dir.path().join("test.db")).expect("db");
        let error = store
            .update_settings(json!({"editQuietMs": "soon"}))
            .expect_err("wrong type");
        assert!(matches!(error, AppError::InvalidFormat(_)));
        assert_eq!(store.get_settings().expect("settings"), WorkspaceSettings::default());
    }

    #[test]
    fn memory_store_can_fail_writes() {
        let store = MemoryStore::with_entry("k", "old");
        store.set_fail_writes(true);
        assert!(matches!(store.set("k", b"new"), Err(AppError::StoreWrite(_))));
        assert_eq!(store.get("k").expect("get"), Some(b"old".to_vec()));

        store.set_fail_writes(false);
        store.set("k", b"new").expect("set");
        assert_eq!(store.get("k").expect("get"), Some(b"new".to_vec()));
    }
}
