use serde::{Deserialize, Serialize};

/// One Git identity as stored in the settings file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GitUserEntry {
    /// Git username (user.name)
    pub user_name: String,
    /// Git email address (user.email)
    pub user_email: String,
}

impl GitUserEntry {
    /// Creates an entry from a user name and email
    pub fn new(user_name: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            user_email: user_email.into(),
        }
    }

    /// Label used both for display and as the entry's unique key.
    ///
    /// Always derived from the two fields, never stored.
    pub fn display_key(&self) -> String {
        format!("{} ({})", self.user_name, self.user_email)
    }
}
