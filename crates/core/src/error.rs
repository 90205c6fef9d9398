//! Error types for Trophynote

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Steam API error: {0}")]
    SteamApi(String),

    #[error("Notion API error: {0}")]
    Notion(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
