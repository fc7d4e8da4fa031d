//! Endpoints, request headers and model selectors for the Gemini web app

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, ORIGIN, REFERER,
    USER_AGENT,
};

// =============================================================================
// Endpoints
// =============================================================================

pub const GOOGLE_URL: &str = "https://www.google.com";

pub const GEMINI_INIT_URL: &str = "https://gemini.google.com/app";

pub const STREAM_GENERATE_PATH: &str =
    "/_/BardChatUi/data/assistant.lamda.BardFrontendService/StreamGenerate";

pub const STREAM_GENERATE_URL: &str = "https://gemini.google.com/_/BardChatUi/data/assistant.lamda.BardFrontendService/StreamGenerate";

pub const UPLOAD_URL: &str = "https://content-push.googleapis.com/upload";

/// Cookie domains the session cookies are presented to. Generated images are
/// served from googleusercontent.com and need the session too.
pub const SESSION_COOKIE_DOMAINS: &[(&str, &str)] = &[
    ("https://www.google.com", ".google.com"),
    ("https://lh3.googleusercontent.com", ".googleusercontent.com"),
];

/// Upload channel id expected by content-push
pub const UPLOAD_PUSH_ID: &str = "feeds/mcudyrk2a4khkz";

/// Header selecting the backend model
pub const MODEL_HEADER_NAME: &str = "x-goog-ext-525001261-jspb";

/// Chrome-like User-Agent; the web app rejects obvious non-browser clients
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Set of URLs the client talks to. Production by default; tests point every
/// entry at a local mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub google: String,
    pub init: String,
    pub generate: String,
    pub upload: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            google: GOOGLE_URL.to_string(),
            init: GEMINI_INIT_URL.to_string(),
            generate: STREAM_GENERATE_URL.to_string(),
            upload: UPLOAD_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// All endpoints under one base URL, using the production paths
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            google: format!("{}/", base),
            init: format!("{}/app", base),
            generate: format!("{}{}", base, STREAM_GENERATE_PATH),
            upload: format!("{}/upload", base),
        }
    }

    pub fn all(&self) -> [&str; 4] {
        [
            self.google.as_str(),
            self.init.as_str(),
            self.generate.as_str(),
            self.upload.as_str(),
        ]
    }
}

// =============================================================================
// Headers
// =============================================================================

/// Browser-like headers sent with every StreamGenerate call
pub fn gemini_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded;charset=utf-8"),
    );
    headers.insert(ORIGIN, HeaderValue::from_static("https://gemini.google.com"));
    headers.insert(REFERER, HeaderValue::from_static("https://gemini.google.com/"));
    headers.insert(
        HeaderName::from_static("x-same-domain"),
        HeaderValue::from_static("1"),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}

/// Default headers for the underlying HTTP client
pub fn client_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers
}

pub fn upload_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("push-id"),
        HeaderValue::from_static(UPLOAD_PUSH_ID),
    );
    headers
}

// =============================================================================
// Models
// =============================================================================

/// Backend models reachable from the web app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Model {
    /// Whatever the account defaults to
    #[default]
    Unspecified,
    /// Gemini 3 Pro
    Gemini3Pro,
    /// Gemini 3 Pro with image generation enabled
    Gemini3ProImage,
}

impl Model {
    pub fn name(&self) -> &'static str {
        match self {
            Model::Unspecified => "unspecified",
            Model::Gemini3Pro => "gemini-3.0-pro",
            Model::Gemini3ProImage => "gemini-3.0-pro-image",
        }
    }

    /// Value of the model selector header, if the model needs one.
    ///
    /// The image variant uses the extended selector; the short `[4]` form
    /// no longer triggers image generation.
    pub fn header_value(&self) -> Option<&'static str> {
        match self {
            Model::Unspecified => None,
            Model::Gemini3Pro => Some(r#"[1,null,null,null,"9d8ca3786ebdfbea",null,null,0,[4]]"#),
            Model::Gemini3ProImage => {
                Some(r#"[1,null,null,null,"9d8ca3786ebdfbea",null,null,0,[4],null,null,2]"#)
            }
        }
    }

    /// Model selector as a header map (empty for `Unspecified`)
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = self.header_value() {
            headers.insert(
                HeaderName::from_static(MODEL_HEADER_NAME),
                HeaderValue::from_static(value),
            );
        }
        headers
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
