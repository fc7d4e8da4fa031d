//! Gemini web session cookies
//!
//! The Gemini web app authenticates with two Google cookies,
//! `__Secure-1PSID` and `__Secure-1PSIDTS`. This crate pulls them out of a
//! local Chromium-family browser and keeps them in the shared cookie file.

pub mod chrome;
pub mod constants;
pub mod cookies;
pub mod error;
pub mod launcher;
pub mod setup;
pub mod storage;

pub use cookies::SessionCookies;
pub use error::SessionError;
pub use setup::{run_setup, CookieSource, SetupReport};
pub use storage::CookieStore;
