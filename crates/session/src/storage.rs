//! Cookie file storage
//!
//! Stores the session cookies in `~/.nanobanana/cookies.json` (or under
//! `$NANOBANANA_HOME`). The file is shared by every tool and is readable by
//! its owner only.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::cookies::SessionCookies;
use crate::error::SessionError;

/// Handles persistent storage of session cookies
#[derive(Debug, Clone)]
pub struct CookieStore {
    /// Path to the cookies JSON file
    path: PathBuf,
}

impl CookieStore {
    /// Creates a store at the default cookie file location
    pub fn new() -> Result<Self, SessionError> {
        Ok(Self {
            path: common::config::cookie_file()?,
        })
    }

    /// Creates a store backed by an explicit file
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the cookie file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cookies. A missing file or one that is not valid JSON
    /// yields `None` rather than an error.
    pub fn load(&self) -> Result<Option<SessionCookies>, SessionError> {
        if !self.path.exists() {
            debug!("No cookie file at {:?}", self.path);
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<SessionCookies>(&content) {
            Ok(cookies) => Ok(Some(cookies)),
            Err(e) => {
                warn!("Ignoring unreadable cookie file {:?}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    /// Loads cookies that can actually authenticate. `tool` names the binary
    /// in the "Run: <tool> --setup" hint.
    pub fn require(&self, tool: &str) -> Result<SessionCookies, SessionError> {
        let cookies = self.load()?.ok_or_else(|| SessionError::NoCookies {
            tool: tool.to_string(),
        })?;

        if !cookies.is_valid() {
            return Err(SessionError::InvalidCookies {
                tool: tool.to_string(),
            });
        }

        Ok(cookies)
    }

    /// Saves cookies to disk, creating the directory and restricting the file
    /// to its owner.
    pub fn save(&self, cookies: &SessionCookies) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SessionError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(cookies)?;
        std::fs::write(&self.path, content).map_err(|source| SessionError::Write {
            path: self.path.clone(),
            source,
        })?;
        restrict_permissions(&self.path)?;

        info!("Saved session cookies to {:?}", self.path);
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), SessionError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), SessionError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (CookieStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = CookieStore::at(temp_dir.path().join("nested").join("cookies.json"));
        (store, temp_dir)
    }

    #[test]
    fn test_save_and_load() {
        let (store, _temp) = create_test_store();
        let cookies = SessionCookies::new("psid", Some("ts".into()));

        store.save(&cookies).unwrap();

        assert_eq!(store.load().unwrap(), Some(cookies));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (store, _temp) = create_test_store();
        store.save(&SessionCookies::new("psid", None)).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_missing_file_is_none() {
        let (store, _temp) = create_test_store();
        assert!(store.load().unwrap().is_none());

        let err = store.require("geminipro").unwrap_err();
        assert_eq!(err.to_string(), "No cookies. Run: geminipro --setup");
    }

    #[test]
    fn test_corrupt_file_is_none() {
        let (store, _temp) = create_test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{not json").unwrap();

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_require_rejects_missing_psid() {
        let (store, _temp) = create_test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"Secure_1PSIDTS": "ts"}"#).unwrap();

        let err = store.require("nanobanana").unwrap_err();
        assert_eq!(err.to_string(), "Invalid cookies. Run: nanobanana --setup");
    }
}
