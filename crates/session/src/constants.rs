//! Cookie names and browser-side constants

/// Browser cookie carrying the Google session id
pub const PSID_COOKIE: &str = "__Secure-1PSID";

/// Browser cookie carrying the session timestamp token
pub const PSIDTS_COOKIE: &str = "__Secure-1PSIDTS";

/// Domain the session cookies are scoped to
pub const GOOGLE_COOKIE_DOMAIN: &str = ".google.com";

/// Page opened by the launcher fallback
pub const GEMINI_APP_URL: &str = "https://gemini.google.com";

// =============================================================================
// Chromium cookie encryption
// =============================================================================

/// PBKDF2 salt used by Chromium's OSCrypt
pub const OSCRYPT_SALT: &[u8] = b"saltysalt";

/// CBC initialisation vector: sixteen spaces
pub const OSCRYPT_IV: [u8; 16] = [b' '; 16];

/// Key length for AES-128
pub const OSCRYPT_KEY_LEN: usize = 16;

/// Hard-coded password Linux Chromium uses when no keyring is present
pub const LINUX_FALLBACK_PASSWORD: &str = "peanuts";

pub const LINUX_PBKDF2_ITERATIONS: u32 = 1;

pub const MACOS_PBKDF2_ITERATIONS: u32 = 1003;
