use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::database::ActivityId;

const LAST_SEEN_ACTIVITY: &str = "last_seen_activity";
const NOTIFICATIONS_ENABLED: &str = "notifications_enabled";

/// Per-device key-value state kept in a small JSON file.
/// Without a path the state lives only as long as the value.
#[derive(Debug, Clone, Default)]
pub struct ClientState {
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl ClientState {
    /// Loads the file if it exists; a missing file is an empty state.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = read_json_opt(&path)?.unwrap_or_default();
        Ok(Self {
            path: Some(path),
            values,
        })
    }

    pub fn ephemeral() -> Self {
        Self::default()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value).with_context(|| format!("Failed to serialize '{}'", key))?;
        self.values.insert(key.to_string(), value);
        self.persist()
    }

    /// Picks up changes another process made to the file since it was opened.
    pub fn reload(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        self.values = read_json_opt(path)?.unwrap_or_default();
        Ok(())
    }

    pub fn last_seen_activity(&self) -> Option<ActivityId> {
        self.get(LAST_SEEN_ACTIVITY)
    }

    pub fn set_last_seen_activity(&mut self, id: ActivityId) -> Result<()> {
        self.set(LAST_SEEN_ACTIVITY, id)
    }

    /// Notifications are opt-in.
    pub fn notifications_enabled(&self) -> bool {
        self.get(NOTIFICATIONS_ENABLED).unwrap_or(false)
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) -> Result<()> {
        self.set(NOTIFICATIONS_ENABLED, enabled)
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        write_json(path, &self.values)?;
        debug!("Saved client state to {}", path.display());
        Ok(())
    }
}

fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create client state directory")?;
    }
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json).context("Failed to write client state file")?;
    Ok(())
}

fn read_json_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(path)?;
    let data = serde_json::from_str(&json).with_context(|| {
        format!(
            "Failed to parse JSON from {:?}. First 200 chars: {}",
            path,
            json.chars().take(200).collect::<String>()
        )
    })?;
    Ok(Some(data))
}
