use std::{fs, path::{Path, PathBuf}};

use serde_json::{Map, Value};
use tracing::debug;

use crate::{entry::GitUserEntry, error::AppError};

/// Settings key holding the identity list
pub const ENTRY_LIST_KEY: &str = "userEmailConfigList";

/// Persistence port the registry loads from and saves to
pub trait EntryStore {
    /// Reads the stored identity list, `None` if it was never written
    fn load_entries(&self) -> Result<Option<Vec<GitUserEntry>>, AppError>;

    /// Overwrites the stored identity list
    ///
    /// # Arguments
    /// * `entries` - Complete list to persist
    fn save_entries(&self, entries: &[GitUserEntry]) -> Result<(), AppError>;
}

/// Stores identities in a JSON settings file next to the other settings keys
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EntryStore for JsonFileStore {
    fn load_entries(&self) -> Result<Option<Vec<GitUserEntry>>, AppError> {
        let mut settings: Map<String, Value> = read_settings_object(&self.path)?;
        debug!("loading identities from {}", self.path.display());

        match settings.remove(ENTRY_LIST_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(list) => Ok(Some(serde_json::from_value(list)?)),
        }
    }

    fn save_entries(&self, entries: &[GitUserEntry]) -> Result<(), AppError> {
        let mut settings: Map<String, Value> = read_settings_object(&self.path)?;
        settings.insert(ENTRY_LIST_KEY.to_string(), serde_json::to_value(entries)?);

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json: String = serde_json::to_string_pretty(&Value::Object(settings))?;
        fs::write(&self.path, json)?;
        debug!("saved {} identities to {}", entries.len(), self.path.display());
        Ok(())
    }
}

/// Reads the settings file as a JSON object
///
/// A missing or blank file reads as an empty object.
///
/// # Arguments
/// * `path` - Location of the settings file
pub fn read_settings_object(path: &Path) -> Result<Map<String, Value>, AppError> {
    if !path.exists() {
        return Ok(Map::new());
    }

    let file_contents: String = fs::read_to_string(path)?;
    if file_contents.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(&file_contents)? {
        Value::Object(settings) => Ok(settings),
        _ => Err(AppError::Settings(format!(
            "{} must contain a JSON object",
            path.display()
        ))),
    }
}
