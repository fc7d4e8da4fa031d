//! Cookie-authenticated HTTP client for the Gemini web app

use rand::Rng;
use reqwest::cookie::Jar;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde_json::json;
use session::SessionCookies;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::constants::{
    client_headers, gemini_headers, upload_headers, Endpoints, Model, SESSION_COOKIE_DOMAINS,
};
use crate::error::GeminiError;
use crate::response::{parse_model_output, ModelOutput};

/// Request ids advance by this step, like the web app does
const REQ_ID_STEP: u32 = 100_000;

/// Values scraped from the app page during `init()`
#[derive(Debug, Clone)]
struct SessionState {
    access_token: String,
    build_label: Option<String>,
    session_id: Option<String>,
}

/// Client for the Gemini web app, authenticated with browser session cookies
pub struct GeminiClient {
    http: Client,
    endpoints: Endpoints,
    timeout_secs: u64,
    session: Option<SessionState>,
    req_id: AtomicU32,
}

impl GeminiClient {
    /// Creates a client against the production endpoints
    pub fn new(cookies: &SessionCookies, timeout_secs: u64) -> Result<Self, GeminiError> {
        Self::with_endpoints(cookies, timeout_secs, Endpoints::default())
    }

    pub fn with_endpoints(
        cookies: &SessionCookies,
        timeout_secs: u64,
        endpoints: Endpoints,
    ) -> Result<Self, GeminiError> {
        let jar = Arc::new(Jar::default());
        seed_cookie_jar(&jar, cookies, &endpoints)?;

        let http = Client::builder()
            .default_headers(client_headers())
            .cookie_provider(jar)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        let first_id = rand::thread_rng().gen_range(10_000..100_000);

        Ok(Self {
            http,
            endpoints,
            timeout_secs,
            session: None,
            req_id: AtomicU32::new(first_id),
        })
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Loads the app page and scrapes the per-session tokens.
    pub async fn init(&mut self) -> Result<(), GeminiError> {
        // Lets google.com refresh its own cookies first; failure is harmless.
        if let Err(e) = self.http.get(&self.endpoints.google).send().await {
            debug!("Warm-up request failed: {}", e);
        }

        let response = self
            .http
            .get(&self.endpoints.init)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeminiError::Auth(format!(
                "Failed to load the Gemini app page (HTTP {}).",
                status.as_u16()
            )));
        }

        let html = response.text().await.map_err(|e| self.transport_error(e))?;

        let access_token = extract_page_value(&html, "SNlM0e").ok_or_else(|| {
            GeminiError::Auth(
                "Access token not found on the app page. \
                 The __Secure-1PSIDTS cookie may have expired; run --setup again."
                    .to_string(),
            )
        })?;
        let build_label = extract_page_value(&html, "cfb2h");
        let session_id = extract_page_value(&html, "FdrFJe");

        info!("Gemini session initialized");
        debug!(
            "Build label: {:?}, session id present: {}",
            build_label,
            session_id.is_some()
        );

        self.session = Some(SessionState {
            access_token,
            build_label,
            session_id,
        });
        Ok(())
    }

    /// The `SNlM0e` token sent as `at` with every generate request
    pub fn access_token(&self) -> Result<&str, GeminiError> {
        self.session
            .as_ref()
            .map(|s| s.access_token.as_str())
            .ok_or(GeminiError::NotInitialized)
    }

    /// Sends a prompt with optional attachments and parses the reply.
    pub async fn generate_content(
        &self,
        prompt: &str,
        files: &[PathBuf],
        model: Model,
    ) -> Result<ModelOutput, GeminiError> {
        let access_token = self.access_token()?.to_string();

        let mut attachments = Vec::with_capacity(files.len());
        for path in files {
            let id = self.upload_file(path).await?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string());
            attachments.push(json!([[id], name]));
        }

        let message = if attachments.is_empty() {
            json!([prompt])
        } else {
            json!([prompt, 0, null, attachments])
        };
        let inner = json!([message, null, null]).to_string();
        let outer = json!([null, inner]).to_string();

        let body = format!(
            "at={}&f.req={}",
            urlencoding::encode(&access_token),
            urlencoding::encode(&outer)
        );

        debug!("Sending prompt to {} ({} attachment(s))", model, files.len());
        let response = self.post_stream_generate(body, model).await?;
        let raw = response.text().await.map_err(|e| self.transport_error(e))?;
        debug!("StreamGenerate returned {} bytes", raw.len());

        parse_model_output(&raw)
    }

    /// Uploads a local file and returns the identifier the generate call
    /// refers to it by.
    pub async fn upload_file(&self, path: &Path) -> Result<String, GeminiError> {
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        debug!("Uploading {} ({} bytes)", path.display(), data.len());
        let form = Form::new().part("file", Part::bytes(data).file_name(name));

        let response = self
            .http
            .post(&self.endpoints.upload)
            .headers(upload_headers())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeminiError::Upload(format!("HTTP {}", status.as_u16())));
        }

        let id = response.text().await.map_err(|e| self.transport_error(e))?;
        let id = id.trim().to_string();
        if id.is_empty() {
            return Err(GeminiError::Upload("empty file identifier".to_string()));
        }
        Ok(id)
    }

    /// Downloads `url` to `dest`, creating parent directories.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<PathBuf, GeminiError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(GeminiError::Download(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &bytes).await?;

        info!("Saved {} bytes to {}", bytes.len(), dest.display());
        Ok(dest.to_path_buf())
    }

    /// POSTs a prepared form body to StreamGenerate and checks the status.
    /// The body is left unread so callers can stream it.
    pub async fn post_stream_generate(
        &self,
        body: String,
        model: Model,
    ) -> Result<Response, GeminiError> {
        let session = self.session.as_ref().ok_or(GeminiError::NotInitialized)?;

        let req_id = self.req_id.fetch_add(REQ_ID_STEP, Ordering::Relaxed);
        let mut query: Vec<(&str, String)> =
            vec![("_reqid", req_id.to_string()), ("rt", "c".to_string())];
        if let Some(bl) = &session.build_label {
            query.push(("bl", bl.clone()));
        }
        if let Some(sid) = &session.session_id {
            query.push(("f.sid", sid.clone()));
        }

        let response = self
            .http
            .post(&self.endpoints.generate)
            .headers(gemini_headers())
            .headers(model.headers())
            .query(&query)
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("StreamGenerate returned {}", status);
            return Err(GeminiError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response)
    }

    /// Maps a reqwest failure, turning timeouts into the user-facing message
    pub fn transport_error(&self, err: reqwest::Error) -> GeminiError {
        if err.is_timeout() {
            GeminiError::Timeout(self.timeout_secs)
        } else {
            GeminiError::Transport(err)
        }
    }
}

/// Presents the session cookies to every endpoint host, and to the Google
/// cookie domains when talking to production.
fn seed_cookie_jar(
    jar: &Jar,
    cookies: &SessionCookies,
    endpoints: &Endpoints,
) -> Result<(), GeminiError> {
    let pairs = cookies.pairs();

    for endpoint in endpoints.all() {
        let url = Url::parse(endpoint).map_err(|_| GeminiError::InvalidUrl(endpoint.to_string()))?;
        for (name, value) in &pairs {
            jar.add_cookie_str(&format!("{}={}; Path=/", name, value), &url);
        }
    }

    for (origin, domain) in SESSION_COOKIE_DOMAINS {
        let url = Url::parse(origin).map_err(|_| GeminiError::InvalidUrl(origin.to_string()))?;
        for (name, value) in &pairs {
            jar.add_cookie_str(
                &format!("{}={}; Domain={}; Path=/; Secure", name, value, domain),
                &url,
            );
        }
    }

    Ok(())
}

/// Pulls `"key":"value"` out of the app page's inline bootstrap data.
pub fn extract_page_value(html: &str, key: &str) -> Option<String> {
    let marker = format!("\"{}\":\"", key);
    let start = html.find(&marker)? + marker.len();
    let end = html[start..].find('"')?;
    let value = &html[start..start + end];
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_page_value() {
        let html = r#"<script>WIZ_global_data = {"cfb2h":"boq_assistant-bard-web-server_20250101.00_p0","SNlM0e":"AKlEn5abc:1700000000000","FdrFJe":"-123456789"};</script>"#;
        assert_eq!(
            extract_page_value(html, "SNlM0e").as_deref(),
            Some("AKlEn5abc:1700000000000")
        );
        assert_eq!(extract_page_value(html, "FdrFJe").as_deref(), Some("-123456789"));
        assert!(extract_page_value(html, "missing").is_none());
    }

    #[test]
    fn test_empty_page_value_is_none() {
        assert!(extract_page_value(r#"{"SNlM0e":""}"#, "SNlM0e").is_none());
    }

    #[test]
    fn test_client_starts_uninitialized() {
        let cookies = SessionCookies::new("psid", Some("psidts".to_string()));
        let client = GeminiClient::new(&cookies, 30).unwrap();
        assert!(matches!(client.access_token(), Err(GeminiError::NotInitialized)));
        assert_eq!(client.timeout_secs(), 30);
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let cookies = SessionCookies::new("psid", None);
        let mut endpoints = Endpoints::default();
        endpoints.init = "not a url".to_string();
        let err = GeminiClient::with_endpoints(&cookies, 30, endpoints).err().unwrap();
        assert!(matches!(err, GeminiError::InvalidUrl(_)));
    }
}
