//! `--setup` and the authenticated client shared by the Gemini tools

use anyhow::{bail, Context, Result};
use common::{Browser, Settings, EXIT_ERROR, EXIT_SUCCESS};
use gemini_web::GeminiClient;
use session::setup::manual_instructions;
use session::{CookieStore, SessionError, SetupReport};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

/// Reads `config.toml`, defaults when absent
pub fn load_settings() -> Result<Settings> {
    Settings::load().context("Failed to load settings")
}

/// Maps a browser name from the command line or settings
pub fn resolve_browser(name: Option<&str>) -> Result<Option<Browser>> {
    let Some(name) = name else {
        return Ok(None);
    };
    match Browser::from_name(name) {
        Some(browser) => Ok(Some(browser)),
        None => bail!(
            "Unknown browser '{}'. Expected one of: chrome, chromium, brave, edge",
            name
        ),
    }
}

/// Runs `--setup` and prints its outcome the way the tools always have.
pub fn setup_command(browser_flag: Option<&str>) -> ExitCode {
    match try_setup(browser_flag) {
        Ok(report) => {
            println!("Cookies saved to {}", report.path.display());
            if !report.has_psidts {
                println!("Warning: __Secure-1PSIDTS not found (may still work)");
            }
            ExitCode::from(EXIT_SUCCESS as u8)
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if matches!(e.downcast_ref::<SessionError>(), Some(SessionError::MissingPsid)) {
                eprintln!("Make sure you're logged into gemini.google.com in your browser");
            }
            let cookie_file = common::config::cookie_file()
                .unwrap_or_else(|_| PathBuf::from("~/.nanobanana/cookies.json"));
            eprintln!();
            eprintln!("{}", manual_instructions(&cookie_file));
            ExitCode::from(EXIT_ERROR as u8)
        }
    }
}

fn try_setup(browser_flag: Option<&str>) -> Result<SetupReport> {
    let settings = load_settings()?;
    let browser = resolve_browser(browser_flag.or(settings.browser.as_deref()))?;

    println!(
        "Extracting cookies from {}...",
        browser.map(|b| b.name()).unwrap_or("Chrome")
    );

    let store = CookieStore::new()?;
    let report = session::run_setup(&store, browser)?;
    debug!("Cookies came from {:?}", report.source);
    Ok(report)
}

/// Loads the saved cookies and initialises a Gemini session.
pub async fn connect(tool: &str, timeout_secs: u64) -> Result<GeminiClient> {
    let cookies = CookieStore::new()?.require(tool)?;
    let mut client = GeminiClient::new(&cookies, timeout_secs)?;
    client.init().await?;
    Ok(client)
}
