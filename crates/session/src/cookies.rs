//! The two-field session cookie record

use serde::{Deserialize, Serialize};

use crate::constants::{PSIDTS_COOKIE, PSID_COOKIE};
use crate::error::SessionError;

/// Session cookies as persisted in `cookies.json`.
///
/// The on-disk field names drop the `__Secure-` prefix:
/// `{"Secure_1PSID": "...", "Secure_1PSIDTS": "..."}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookies {
    #[serde(rename = "Secure_1PSID", default)]
    pub secure_1psid: String,

    #[serde(
        rename = "Secure_1PSIDTS",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub secure_1psidts: Option<String>,
}

impl SessionCookies {
    pub fn new(secure_1psid: impl Into<String>, secure_1psidts: Option<String>) -> Self {
        Self {
            secure_1psid: secure_1psid.into(),
            secure_1psidts,
        }
    }

    /// Picks the session cookies out of browser `(name, value)` pairs.
    /// The first non-empty value for each name wins.
    pub fn from_pairs<I, N, V>(pairs: I) -> Result<Self, SessionError>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: Into<String>,
    {
        let mut psid: Option<String> = None;
        let mut psidts: Option<String> = None;

        for (name, value) in pairs {
            let value: String = value.into();
            if value.is_empty() {
                continue;
            }
            match name.as_ref() {
                PSID_COOKIE if psid.is_none() => psid = Some(value),
                PSIDTS_COOKIE if psidts.is_none() => psidts = Some(value),
                _ => {}
            }
        }

        let psid = psid.ok_or(SessionError::MissingPsid)?;
        Ok(Self::new(psid, psidts))
    }

    /// Whether the record can authenticate at all
    pub fn is_valid(&self) -> bool {
        !self.secure_1psid.trim().is_empty()
    }

    /// Browser-named `(name, value)` pairs, 1PSIDTS only when present
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![(PSID_COOKIE, self.secure_1psid.as_str())];
        if let Some(ts) = self.secure_1psidts.as_deref() {
            pairs.push((PSIDTS_COOKIE, ts));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_field_names() {
        let cookies = SessionCookies::new("abc", Some("def".into()));
        let json = serde_json::to_value(&cookies).unwrap();
        assert_eq!(json["Secure_1PSID"], "abc");
        assert_eq!(json["Secure_1PSIDTS"], "def");

        let parsed: SessionCookies = serde_json::from_str(r#"{"Secure_1PSID": "x"}"#).unwrap();
        assert_eq!(parsed.secure_1psid, "x");
        assert!(parsed.secure_1psidts.is_none());
    }

    #[test]
    fn test_from_pairs_picks_session_cookies() {
        let pairs = vec![
            ("NID", "ignored"),
            ("__Secure-1PSID", "psid"),
            ("__Secure-1PSIDTS", "ts"),
            ("__Secure-1PSID", "later"),
        ];
        let cookies = SessionCookies::from_pairs(pairs).unwrap();
        assert_eq!(cookies.secure_1psid, "psid");
        assert_eq!(cookies.secure_1psidts.as_deref(), Some("ts"));
    }

    #[test]
    fn test_from_pairs_requires_psid() {
        let err = SessionCookies::from_pairs(vec![("__Secure-1PSIDTS", "ts")]).unwrap_err();
        assert!(matches!(err, SessionError::MissingPsid));
    }

    #[test]
    fn test_pairs_skip_missing_psidts() {
        let cookies = SessionCookies::new("a", Some("b".into()));
        assert_eq!(
            cookies.pairs(),
            vec![("__Secure-1PSID", "a"), ("__Secure-1PSIDTS", "b")]
        );

        let only_psid = SessionCookies::new("a", None);
        assert_eq!(only_psid.pairs(), vec![("__Secure-1PSID", "a")]);
    }
}
