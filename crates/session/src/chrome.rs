//! Reads Google session cookies straight from a Chromium cookie database
//!
//! The live database is locked while the browser runs, so it is copied to a
//! temp directory first. Values are stored encrypted with OSCrypt:
//! `v10`/`v11` prefix + AES-128-CBC, key derived with PBKDF2-HMAC-SHA1.

use aes::Aes128;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use common::platform::{self, Browser};
use rusqlite::{Connection, OpenFlags};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::constants::*;
use crate::cookies::SessionCookies;
use crate::error::SessionError;

type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// A raw row from the `cookies` table
#[derive(Debug, Clone)]
struct CookieRow {
    host_key: String,
    name: String,
    value: String,
    encrypted_value: Vec<u8>,
}

/// Extracts the session cookies for `browser`, or the first installed
/// browser when `None`.
pub fn extract(browser: Option<Browser>) -> Result<SessionCookies, SessionError> {
    let browser = match browser {
        Some(b) => b,
        None => platform::detect_browser_profile()
            .map(|(b, _)| b)
            .ok_or(SessionError::BrowserNotFound)?,
    };

    let db_path =
        platform::cookie_db_path(browser).ok_or(SessionError::CookieDbNotFound(browser.name()))?;
    debug!("Reading {} cookies from {:?}", browser.name(), db_path);

    let rows = read_google_rows(&db_path)?;
    debug!("Found {} google.com cookie rows", rows.len());

    let keys = KeyRing::for_browser(browser, &SystemSecretStore);
    let mut pairs = Vec::new();
    for row in rows {
        if row.name != PSID_COOKIE && row.name != PSIDTS_COOKIE {
            continue;
        }
        let value = if !row.value.is_empty() {
            row.value
        } else {
            keys.decrypt(&row.host_key, &row.encrypted_value)
                .map_err(|reason| SessionError::Decrypt {
                    name: row.name.clone(),
                    reason,
                })?
        };
        pairs.push((row.name, value));
    }

    SessionCookies::from_pairs(pairs)
}

fn read_google_rows(db_path: &Path) -> Result<Vec<CookieRow>, SessionError> {
    let scratch = tempfile::tempdir()?;
    let copy = scratch.path().join("Cookies");
    std::fs::copy(db_path, &copy)?;

    let conn = Connection::open_with_flags(&copy, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let mut stmt = conn.prepare(
        "SELECT host_key, name, value, encrypted_value FROM cookies \
         WHERE host_key LIKE '%google.com' \
         ORDER BY host_key = ?1 DESC",
    )?;

    let rows = stmt
        .query_map([GOOGLE_COOKIE_DOMAIN], |row| {
            Ok(CookieRow {
                host_key: row.get(0)?,
                name: row.get(1)?,
                value: row.get(2)?,
                encrypted_value: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

// =============================================================================
// OSCrypt decryption
// =============================================================================

/// Where a browser keeps its Safe Storage password
pub trait SecretStore {
    fn safe_storage_password(&self, browser: Browser) -> Result<String, String>;
}

/// The login keychain on macOS, the Secret Service (gnome-keyring, KWallet)
/// on Linux
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSecretStore;

impl SecretStore for SystemSecretStore {
    #[cfg(target_os = "linux")]
    fn safe_storage_password(&self, browser: Browser) -> Result<String, String> {
        use secret_service::EncryptionType;
        use secret_service::blocking::SecretService;

        let service = SecretService::connect(EncryptionType::Dh)
            .map_err(|e| format!("Secret Service unavailable: {}", e))?;
        let found = service
            .search_items(libsecret_attributes(browser))
            .map_err(|e| format!("Secret Service search failed: {}", e))?;

        let item = found
            .unlocked
            .into_iter()
            .chain(found.locked)
            .next()
            .ok_or_else(|| {
                format!(
                    "no Safe Storage item with application={}",
                    browser.libsecret_application()
                )
            })?;
        item.unlock().map_err(|e| format!("failed to unlock Safe Storage item: {}", e))?;
        let secret = item
            .get_secret()
            .map_err(|e| format!("failed to read Safe Storage item: {}", e))?;

        String::from_utf8(secret).map_err(|_| "Safe Storage secret is not UTF-8".to_string())
    }

    #[cfg(not(target_os = "linux"))]
    fn safe_storage_password(&self, browser: Browser) -> Result<String, String> {
        let (service, account) = browser.safe_storage_entry();
        keyring::Entry::new(service, account)
            .and_then(|entry| entry.get_password())
            .map_err(|e| e.to_string())
    }
}

/// Attributes Chromium stores its libsecret password under. The item is
/// keyed by `application`, not by the Safe Storage label.
pub fn libsecret_attributes(browser: Browser) -> HashMap<&'static str, &'static str> {
    HashMap::from([("application", browser.libsecret_application())])
}

/// Derived keys for the `v10` and `v11` value formats
struct KeyRing {
    v10: Option<[u8; OSCRYPT_KEY_LEN]>,
    v11: Option<[u8; OSCRYPT_KEY_LEN]>,
}

impl KeyRing {
    fn for_browser(browser: Browser, secrets: &impl SecretStore) -> Self {
        let stored = match secrets.safe_storage_password(browser) {
            Ok(password) => Some(password),
            Err(e) => {
                warn!("No {} Safe Storage password: {}", browser.name(), e);
                None
            }
        };

        if cfg!(target_os = "macos") {
            let key = stored.map(|p| derive_key(p.as_bytes(), MACOS_PBKDF2_ITERATIONS));
            Self { v10: key, v11: key }
        } else {
            Self {
                v10: Some(derive_key(
                    LINUX_FALLBACK_PASSWORD.as_bytes(),
                    LINUX_PBKDF2_ITERATIONS,
                )),
                v11: stored.map(|p| derive_key(p.as_bytes(), LINUX_PBKDF2_ITERATIONS)),
            }
        }
    }

    fn decrypt(&self, host_key: &str, encrypted: &[u8]) -> Result<String, String> {
        if encrypted.len() < 3 {
            return Err("value too short".into());
        }
        let (prefix, payload) = encrypted.split_at(3);
        let key = match prefix {
            b"v10" => self.v10.ok_or("no Safe Storage password for v10 value")?,
            b"v11" => self.v11.ok_or("no Safe Storage password for v11 value")?,
            other => {
                return Err(format!(
                    "unsupported format {:?}",
                    String::from_utf8_lossy(other)
                ));
            }
        };
        decrypt_value(&key, host_key, payload)
    }
}

/// PBKDF2-HMAC-SHA1 over the OSCrypt salt
pub fn derive_key(password: &[u8], iterations: u32) -> [u8; OSCRYPT_KEY_LEN] {
    let mut key = [0u8; OSCRYPT_KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha1>(password, OSCRYPT_SALT, iterations, &mut key);
    key
}

/// Decrypts one value (without its `v1x` prefix). Databases from Chromium 130
/// on prepend SHA-256(host_key) to the plaintext; that prefix is dropped.
pub fn decrypt_value(
    key: &[u8; OSCRYPT_KEY_LEN],
    host_key: &str,
    ciphertext: &[u8],
) -> Result<String, String> {
    let cipher = Aes128CbcDec::new_from_slices(key, &OSCRYPT_IV)
        .map_err(|e| format!("invalid key: {}", e))?;

    let mut buf = ciphertext.to_vec();
    let plain = cipher
        .decrypt_padded_mut::<Pkcs7>(&mut buf)
        .map_err(|_| "bad padding (wrong key?)".to_string())?;

    let digest = Sha256::digest(host_key.as_bytes());
    let plain = match plain.strip_prefix(digest.as_slice()) {
        Some(rest) => rest,
        None => plain,
    };

    String::from_utf8(plain.to_vec()).map_err(|_| {
        warn!("Decrypted cookie is not UTF-8");
        "decrypted value is not UTF-8".to_string()
    })
}
