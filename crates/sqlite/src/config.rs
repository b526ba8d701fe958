//! Store configuration.

use serde::{Deserialize, Serialize};

/// SQLite store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file path. `:memory:` opens a private in-memory database.
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_path() -> String {
    "data/matchday.db".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}
