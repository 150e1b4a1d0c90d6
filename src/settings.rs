use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Key under which the previously selected language code is saved.
pub const PREVIOUS_LANGUAGE_KEY: &str = "PREVIOUS_LANGUAGE";

/// Key under which the unlocked memento ids are saved (JSON array of strings).
pub const SAVED_MEMENTOS_KEY: &str = "SAVED_MEMENTOS";

/// Key marking that the scan hint has been shown once.
pub const SCAN_HINT_SEEN_KEY: &str = "SCAN_HINT_SEEN";

/// Opaque persisted key/string storage.
///
/// Everything the app remembers between runs (language choice, unlocked
/// mementos, one-time hints) goes through this store as plain strings; the
/// callers own the encoding of anything richer.
pub struct SettingsStore {
    values: HashMap<String, String>,
    path: Option<PathBuf>,
}

impl SettingsStore {
    /// Load the store from the default config location, creating an empty
    /// store when no file exists yet.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from(path)
    }

    pub fn load_from(path: PathBuf) -> Result<Self> {
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("malformed settings file at {}", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read settings at {}", path.display()));
            }
        };
        Ok(Self {
            values,
            path: Some(path),
        })
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            values: HashMap::new(),
            path: None,
        }
    }

    fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("no user config directory available")?;
        Ok(base.join("gallery-guide").join("settings.json"))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set a value and persist immediately. Persistence failures are logged,
    /// not escalated; losing a saved preference must never break navigation.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
        if let Err(err) = self.save() {
            log::error!("failed to persist settings: {err:#}");
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
        if let Err(err) = self.save() {
            log::error!("failed to persist settings: {err:#}");
        }
    }

    /// Drop all saved state (the `--reset` flag).
    pub fn clear(&mut self) {
        self.values.clear();
        if let Err(err) = self.save() {
            log::error!("failed to persist settings: {err:#}");
        }
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(path, raw)
            .with_context(|| format!("failed to write settings at {}", path.display()))?;
        Ok(())
    }
}
