use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DATA_DIR_ENV: &str = "ATELIER_DATA_DIR";
pub const DATABASE_FILE: &str = "workspace.sqlite";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkspaceSettings {
    /// Key under which the serialized workspace lives in the durable store.
    pub storage_key: String,
    /// How long the saving indicator stays up after the last write.
    pub saving_dwell_ms: u64,
    /// Quiet period before a staged edit is committed.
    pub edit_quiet_ms: u64,
    pub seed_welcome_content: bool,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            storage_key: "atelier-projects".to_string(),
            saving_dwell_ms: 1500,
            edit_quiet_ms: 500,
            seed_welcome_content: true,
        }
    }
}

impl WorkspaceSettings {
    pub fn saving_dwell(&self) -> Duration {
        Duration::from_millis(self.saving_dwell_ms)
    }

    pub fn edit_quiet(&self) -> Duration {
        Duration::from_millis(self.edit_quiet_ms)
    }
}

pub fn resolve_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(dir);
    }
    if let Some(home) = std::env::var_os("HOME").filter(|value| !value.is_empty()) {
        return PathBuf::from(home).join(".atelier");
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

pub fn database_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join(DATABASE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_in_defaults() {
        let settings: WorkspaceSettings =
            serde_json::from_str(r#"{"editQuietMs": 250}"#).expect("settings");
        assert_eq!(settings.edit_quiet(), Duration::from_millis(250));
        assert_eq!(settings.saving_dwell(), Duration::from_millis(1500));
        assert_eq!(settings.storage_key, "atelier-projects");
        assert!(settings.seed_welcome_content);
    }

    #[test]
    fn database_lives_in_data_dir() {
        let dir = PathBuf::from("/tmp/atelier");
        assert_eq!(database_path(&dir), dir.join("workspace.sqlite"));
    }
}
