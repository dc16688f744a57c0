use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::{error::AppError, storage::read_settings_object};

/// Directory created under the platform config dir
const SETTINGS_DIR: &str = "gitmu";
/// Settings file name inside [`SETTINGS_DIR`]
const SETTINGS_FILE: &str = "settings.json";
/// Fallback settings file in the home directory
const HOME_SETTINGS_FILE: &str = ".gitmu.json";
/// Domain used when deriving noreply emails
pub const NOREPLY_DOMAIN: &str = "users.noreply.github.com";

/// Behaviour switches read from the settings file
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Derive `<name>@users.noreply.github.com` instead of asking for an email
    pub use_noreply_email: bool,
    /// Unset user.name and user.email in both scopes during startup
    pub unset_user_email_on_startup: bool,
}

impl Settings {
    /// Reads settings from the file at `path`, defaults for anything missing
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let settings = read_settings_object(path)?;
        Ok(serde_json::from_value(Value::Object(settings))?)
    }

    /// Noreply address for a user name
    pub fn noreply_email(user_name: &str) -> String {
        format!("{user_name}@{NOREPLY_DOMAIN}")
    }
}

/// Gets the default settings file path
pub fn default_settings_path() -> Result<PathBuf, AppError> {
    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join(SETTINGS_DIR).join(SETTINGS_FILE));
    }

    let home_dir: PathBuf = dirs::home_dir().ok_or_else(|| {
        AppError::Validation("failed to find the home directory".to_string())
    })?;
    Ok(home_dir.join(HOME_SETTINGS_FILE))
}
