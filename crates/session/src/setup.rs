//! `--setup`: copy the browser's Google session into the cookie file
//!
//! Strategy:
//! 1. Read the browser's cookie database directly
//! 2. Fall back to opening Gemini in a browser window and reading the tab
//! 3. On failure the caller prints [`manual_instructions`]

use common::platform::{self, Browser};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::chrome;
use crate::cookies::SessionCookies;
use crate::error::SessionError;
use crate::launcher;
use crate::storage::CookieStore;

/// Where the saved cookies came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieSource {
    CookieDatabase(Browser),
    LiveBrowser,
}

/// Outcome of a successful setup
#[derive(Debug, Clone)]
pub struct SetupReport {
    pub path: PathBuf,
    pub source: CookieSource,
    /// `false` means only `__Secure-1PSID` was found (may still work)
    pub has_psidts: bool,
}

/// Extracts cookies from `browser` (or the first one installed) and saves them.
pub fn run_setup(store: &CookieStore, browser: Option<Browser>) -> Result<SetupReport, SessionError> {
    let (cookies, source) = extract_cookies(browser)?;
    store.save(&cookies)?;

    Ok(SetupReport {
        path: store.path().to_path_buf(),
        source,
        has_psidts: cookies.secure_1psidts.is_some(),
    })
}

fn extract_cookies(browser: Option<Browser>) -> Result<(SessionCookies, CookieSource), SessionError> {
    let db_error = match chrome::extract(browser) {
        Ok(cookies) => {
            let resolved = browser
                .or_else(|| platform::detect_browser_profile().map(|(b, _)| b))
                .unwrap_or(Browser::Chrome);
            info!("Read session cookies from the {} cookie database", resolved.name());
            return Ok((cookies, CookieSource::CookieDatabase(resolved)));
        }
        Err(e) => e,
    };

    // A missing 1PSID means the user is not signed in; a browser window
    // gives them the chance to do so.
    warn!("Cookie database extraction failed: {}", db_error);

    let profile_root = browser
        .and_then(platform::get_browser_profile_path)
        .or_else(|| platform::detect_browser_profile().map(|(_, p)| p))
        .and_then(|profile| profile.parent().map(Path::to_path_buf));

    match launcher::extract_from_live_browser(profile_root.as_deref()) {
        Ok(cookies) => Ok((cookies, CookieSource::LiveBrowser)),
        Err(launch_error) => {
            warn!("Live browser extraction failed: {}", launch_error);
            Err(db_error)
        }
    }
}

/// Step-by-step instructions for creating the cookie file by hand
pub fn manual_instructions(cookie_file: &Path) -> String {
    format!(
        "Manual setup instructions:\n\
         1. Go to https://gemini.google.com (logged in)\n\
         2. Open DevTools (F12) > Application > Cookies\n\
         3. Copy __Secure-1PSID and __Secure-1PSIDTS values\n\
         4. Create {} with:\n   \
         {{\"Secure_1PSID\": \"...\", \"Secure_1PSIDTS\": \"...\"}}",
        cookie_file.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_instructions_name_the_file() {
        let text = manual_instructions(Path::new("/home/me/.nanobanana/cookies.json"));
        assert!(text.contains("/home/me/.nanobanana/cookies.json"));
        assert!(text.contains("__Secure-1PSIDTS"));
        assert!(text.contains(r#"{"Secure_1PSID": "...", "Secure_1PSIDTS": "..."}"#));
    }
}
