//! Runtime configuration, read once at startup.

use trophynote_core::{Result, SyncError};

/// Credentials and ids for the two collaborators. Built from the process
/// environment once in `main` and handed to the client constructors, so
/// nothing downstream reads ambient state.
#[derive(Debug, Clone)]
pub struct Config {
    pub steam_api_key: String,
    pub steam_id: String,
    pub notion_api_key: String,
    pub notion_database_id: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            steam_api_key: require("STEAM_API_KEY")?,
            steam_id: require("STEAM_ID")?,
            notion_api_key: require("NOTION_API_KEY")?,
            notion_database_id: require("NOTION_DATABASE_ID")?,
        })
    }
}

fn require(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| SyncError::Config(format!("{} is not set", key)))
}
