//! Tool configuration
//!
//! All three tools share one state directory (`~/.nanobanana` by default):
//! - `cookies.json` - the Gemini session cookies written by `--setup`
//! - `config.toml`  - optional defaults for timeouts, output dir and browser
//! - `images/`      - default destination for generated images

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable that relocates the state directory.
pub const HOME_ENV: &str = "NANOBANANA_HOME";

const CONFIG_DIR_NAME: &str = ".nanobanana";
const COOKIE_FILE_NAME: &str = "cookies.json";
const SETTINGS_FILE_NAME: &str = "config.toml";
const IMAGES_DIR_NAME: &str = "images";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine home directory")]
    NoHome,

    #[error("Failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid settings file {}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// User defaults read from `config.toml`. Every field is optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub timeout_secs: u64,
    pub output_dir: Option<PathBuf>,
    pub browser: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            output_dir: None,
            browser: None,
        }
    }
}

impl Settings {
    /// Loads settings from the default location, falling back to defaults
    /// when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_dir()?.join(SETTINGS_FILE_NAME))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Output directory for images: the configured one, else `images/` under
    /// the state directory.
    pub fn output_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.output_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_output_dir(),
        }
    }
}

/// Resolves the state directory.
/// - `$NANOBANANA_HOME` when set
/// - otherwise `~/.nanobanana`
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os(HOME_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Path of the shared cookie file.
pub fn cookie_file() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(COOKIE_FILE_NAME))
}

pub fn default_output_dir() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(IMAGES_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::load_from(&temp.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.timeout_secs, 120);
    }

    #[test]
    fn test_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = 300\nbrowser = \"brave\"\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.timeout_secs, 300);
        assert_eq!(settings.browser.as_deref(), Some("brave"));
        assert!(settings.output_dir.is_none());
    }

    #[test]
    fn test_malformed_file_names_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = \"soon\"").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_configured_output_dir_wins() {
        let settings = Settings {
            output_dir: Some(PathBuf::from("/tmp/art")),
            ..Settings::default()
        };
        assert_eq!(settings.output_dir().unwrap(), PathBuf::from("/tmp/art"));
    }
}
