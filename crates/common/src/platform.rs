use std::path::PathBuf;
use tracing::debug;

/// Chromium-family browsers we can read session cookies from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Chrome,
    Chromium,
    Brave,
    Edge,
}

impl Browser {
    /// Returns all browsers in preference order
    pub fn all() -> &'static [Browser] {
        &[Browser::Chrome, Browser::Chromium, Browser::Brave, Browser::Edge]
    }

    /// Returns the browser name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Browser::Chrome => "Google Chrome",
            Browser::Chromium => "Chromium",
            Browser::Brave => "Brave",
            Browser::Edge => "Microsoft Edge",
        }
    }

    /// Parses a short browser name (`chrome`, `chromium`, `brave`, `edge`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "chrome" | "google-chrome" | "google chrome" => Some(Browser::Chrome),
            "chromium" => Some(Browser::Chromium),
            "brave" => Some(Browser::Brave),
            "edge" | "microsoft-edge" | "microsoft edge" => Some(Browser::Edge),
            _ => None,
        }
    }

    /// Keyring (service, account) pair holding the cookie encryption password
    pub fn safe_storage_entry(&self) -> (&'static str, &'static str) {
        match self {
            Browser::Chrome => ("Chrome Safe Storage", "Chrome"),
            Browser::Chromium => ("Chromium Safe Storage", "Chromium"),
            Browser::Brave => ("Brave Safe Storage", "Brave"),
            Browser::Edge => ("Microsoft Edge Safe Storage", "Microsoft Edge"),
        }
    }

    /// Value of the `application` attribute on the browser's libsecret
    /// Safe Storage item (Linux)
    pub fn libsecret_application(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Chromium => "chromium",
            Browser::Brave => "brave",
            Browser::Edge => "microsoft-edge",
        }
    }
}

/// Detects the first installed browser profile, checking in order:
/// Chrome, Chromium, Brave, Edge.
pub fn detect_browser_profile() -> Option<(Browser, PathBuf)> {
    for browser in Browser::all() {
        if let Some(path) = get_browser_profile_path(*browser) {
            if path.exists() {
                debug!("Found {} profile at: {:?}", browser.name(), path);
                return Some((*browser, path));
            }
        }
    }
    None
}

/// Locates the cookie SQLite database inside a browser profile.
/// Recent Chromium builds keep it under `Network/`.
pub fn cookie_db_path(browser: Browser) -> Option<PathBuf> {
    let profile = get_browser_profile_path(browser)?;
    [profile.join("Network").join("Cookies"), profile.join("Cookies")]
        .into_iter()
        .find(|p| p.exists())
}

/// Gets the browser profile path for a specific browser on the current platform.
pub fn get_browser_profile_path(browser: Browser) -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    return get_browser_profile_linux(browser);

    #[cfg(target_os = "macos")]
    return get_browser_profile_macos(browser);

    #[cfg(target_os = "windows")]
    return get_browser_profile_windows(browser);

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        let _ = browser;
        tracing::warn!("Unsupported platform for browser detection");
        None
    }
}

#[cfg(target_os = "linux")]
fn get_browser_profile_linux(browser: Browser) -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;

    let profile_path = match browser {
        Browser::Chrome => config_dir.join("google-chrome/Default"),
        Browser::Chromium => config_dir.join("chromium/Default"),
        Browser::Brave => config_dir.join("BraveSoftware/Brave-Browser/Default"),
        Browser::Edge => config_dir.join("microsoft-edge/Default"),
    };

    Some(profile_path)
}

#[cfg(target_os = "macos")]
fn get_browser_profile_macos(browser: Browser) -> Option<PathBuf> {
    let app_support = dirs::data_dir()?; // ~/Library/Application Support

    let profile_path = match browser {
        Browser::Chrome => app_support.join("Google/Chrome/Default"),
        Browser::Chromium => app_support.join("Chromium/Default"),
        Browser::Brave => app_support.join("BraveSoftware/Brave-Browser/Default"),
        Browser::Edge => app_support.join("Microsoft Edge/Default"),
    };

    Some(profile_path)
}

#[cfg(target_os = "windows")]
fn get_browser_profile_windows(browser: Browser) -> Option<PathBuf> {
    let local_app_data = dirs::data_local_dir()?; // %LOCALAPPDATA%

    let profile_path = match browser {
        Browser::Chrome => local_app_data.join("Google/Chrome/User Data/Default"),
        Browser::Chromium => local_app_data.join("Chromium/User Data/Default"),
        Browser::Brave => local_app_data.join("BraveSoftware/Brave-Browser/User Data/Default"),
        Browser::Edge => local_app_data.join("Microsoft/Edge/User Data/Default"),
    };

    Some(profile_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_all() {
        let browsers = Browser::all();
        assert_eq!(browsers.len(), 4);
        assert_eq!(browsers[0], Browser::Chrome);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Browser::from_name("Chrome"), Some(Browser::Chrome));
        assert_eq!(Browser::from_name(" brave "), Some(Browser::Brave));
        assert_eq!(Browser::from_name("microsoft-edge"), Some(Browser::Edge));
        assert_eq!(Browser::from_name("firefox"), None);
    }

    #[test]
    fn test_safe_storage_entry() {
        assert_eq!(
            Browser::Chrome.safe_storage_entry(),
            ("Chrome Safe Storage", "Chrome")
        );
        assert_eq!(Browser::Chrome.libsecret_application(), "chrome");
        assert_eq!(Browser::Brave.libsecret_application(), "brave");
    }
}
