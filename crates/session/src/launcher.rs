use headless_chrome::{Browser, LaunchOptions};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::constants::{GEMINI_APP_URL, PSIDTS_COOKIE, PSID_COOKIE};
use crate::cookies::SessionCookies;
use crate::error::SessionError;

/// How long the window stays open for the user to sign in
pub const SIGN_IN_TIMEOUT: Duration = Duration::from_secs(300);

const COOKIE_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Opens Gemini in a visible browser window and reads the session cookies
/// from the tab.
///
/// With `user_data_dir` pointing at an existing browser profile the user is
/// usually already signed in; otherwise they can sign in in the window, which
/// stays open for up to [`SIGN_IN_TIMEOUT`].
pub fn extract_from_live_browser(user_data_dir: Option<&Path>) -> Result<SessionCookies, SessionError> {
    let mut builder = LaunchOptions::default_builder();
    builder
        .headless(false) // Headful so user can login if needed
        .idle_browser_timeout(SIGN_IN_TIMEOUT + Duration::from_secs(30));

    if let Some(path) = user_data_dir {
        builder.user_data_dir(Some(path.to_path_buf()));
    }

    let launch_options = builder
        .build()
        .map_err(|e| SessionError::Launch(format!("Failed to build launch options: {}", e)))?;

    let browser = Browser::new(launch_options)
        .map_err(|e| SessionError::Launch(format!("Failed to launch browser: {}", e)))?;

    let tab = browser
        .new_tab()
        .map_err(|e| SessionError::Launch(format!("Failed to create tab: {}", e)))?;

    info!("Opening {} to read session cookies", GEMINI_APP_URL);
    tab.navigate_to(GEMINI_APP_URL)
        .map_err(|e| SessionError::Launch(format!("Failed to navigate to {}: {}", GEMINI_APP_URL, e)))?;

    tab.wait_for_element("body")
        .map_err(|e| SessionError::Launch(format!("Failed to load page: {}", e)))?;

    wait_for_session(SIGN_IN_TIMEOUT, COOKIE_POLL_INTERVAL, || {
        let cookies = tab
            .get_cookies()
            .map_err(|e| SessionError::Launch(format!("Failed to get cookies: {}", e)))?;
        Ok(cookies
            .into_iter()
            .filter(|c| c.name == PSID_COOKIE || c.name == PSIDTS_COOKIE)
            .map(|c| (c.name, c.value))
            .collect())
    })
}

/// Calls `read_cookies` until it yields `__Secure-1PSID` or `timeout` runs out.
pub fn wait_for_session<F>(
    timeout: Duration,
    interval: Duration,
    mut read_cookies: F,
) -> Result<SessionCookies, SessionError>
where
    F: FnMut() -> Result<Vec<(String, String)>, SessionError>,
{
    let deadline = Instant::now() + timeout;
    let mut prompted = false;

    loop {
        let pairs = read_cookies()?;
        if pairs.iter().any(|(name, value)| name == PSID_COOKIE && !value.is_empty()) {
            return SessionCookies::from_pairs(pairs);
        }
        if Instant::now() >= deadline {
            return Err(SessionError::MissingPsid);
        }
        if !prompted {
            warn!(
                "Not signed in. Sign in to Google in the browser window to continue (waiting up to {}s)",
                timeout.as_secs()
            );
            prompted = true;
        }
        std::thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn psid_pairs() -> Vec<(String, String)> {
        vec![
            (PSID_COOKIE.to_string(), "psid".to_string()),
            (PSIDTS_COOKIE.to_string(), "psidts".to_string()),
        ]
    }

    #[test]
    fn test_waits_until_signed_in() {
        let mut polls = 0;
        let cookies = wait_for_session(Duration::from_secs(5), Duration::from_millis(1), || {
            polls += 1;
            Ok(if polls < 3 { Vec::new() } else { psid_pairs() })
        })
        .unwrap();

        assert_eq!(polls, 3);
        assert_eq!(cookies.secure_1psid, "psid");
        assert_eq!(cookies.secure_1psidts.as_deref(), Some("psidts"));
    }

    #[test]
    fn test_gives_up_after_timeout() {
        let mut polls = 0;
        let err = wait_for_session(Duration::from_millis(20), Duration::from_millis(5), || {
            polls += 1;
            Ok(vec![(PSIDTS_COOKIE.to_string(), "only-ts".to_string())])
        })
        .unwrap_err();

        assert!(matches!(err, SessionError::MissingPsid));
        assert!(polls > 1);
    }

    #[test]
    fn test_read_error_stops_waiting() {
        let err = wait_for_session(Duration::from_secs(5), Duration::from_millis(1), || {
            Err(SessionError::Launch("tab closed".to_string()))
        })
        .unwrap_err();
        assert!(matches!(err, SessionError::Launch(_)));
    }
}
