//! Error types for cookie extraction and storage

use common::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Cookie file is absent or unreadable
    #[error("No cookies. Run: {tool} --setup")]
    NoCookies { tool: String },

    /// Cookie file exists but lacks `Secure_1PSID`
    #[error("Invalid cookies. Run: {tool} --setup")]
    InvalidCookies { tool: String },

    #[error("__Secure-1PSID cookie not found")]
    MissingPsid,

    #[error("No supported browser profile found")]
    BrowserNotFound,

    #[error("Cookie database not found for {0}")]
    CookieDbNotFound(&'static str),

    #[error("Failed to decrypt cookie {name}: {reason}")]
    Decrypt { name: String, reason: String },

    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
