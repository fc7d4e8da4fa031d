//! Caption track discovery and transcript download
//!
//! 1. GET the watch page (answering the EU consent interstitial once) and
//!    read the innertube API key
//! 2. POST the innertube `player` endpoint as the Android client, which still
//!    returns caption tracks without a PO token
//! 3. Pick a track and GET its timedtext XML

use regex::Regex;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::TranscriptError;
use crate::timedtext::parse_timedtext;

pub const YOUTUBE_URL: &str = "https://www.youtube.com";

const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

const CONSENT_FORM_MARKER: &str = "action=\"https://consent.youtube.com/s\"";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";

const BOT_CHECK_REASON: &str = "Sign in to confirm you\u{2019}re not a bot";
const AGE_GATE_REASON: &str = "This video may be inappropriate for some users.";
const UNAVAILABLE_REASON: &str = "This video is unavailable";

static API_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("static regex")
});

static CONSENT_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name="v" value="(.*?)""#).expect("static regex"));

/// One caption line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// A caption track offered for the video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub language: String,
    pub language_code: String,
    pub base_url: String,
    /// Auto-generated (speech recognition) rather than uploaded
    pub is_generated: bool,
}

/// Every caption track of one video, split by origin
#[derive(Debug, Clone, Default)]
pub struct TranscriptList {
    pub video_id: String,
    pub manual: Vec<TrackInfo>,
    pub generated: Vec<TrackInfo>,
}

impl TranscriptList {
    /// Builds the list from the innertube `captions` object.
    pub fn from_captions(video_id: &str, captions: &Value) -> Result<Self, TranscriptError> {
        let tracks = captions
            .pointer("/playerCaptionsTracklistRenderer/captionTracks")
            .and_then(Value::as_array)
            .ok_or(TranscriptError::TranscriptsDisabled)?;

        let mut list = TranscriptList {
            video_id: video_id.to_string(),
            ..Default::default()
        };

        for track in tracks {
            let Some(base_url) = track.get("baseUrl").and_then(Value::as_str) else {
                continue;
            };
            let language_code = track
                .get("languageCode")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let language = track
                .pointer("/name/runs/0/text")
                .or_else(|| track.pointer("/name/simpleText"))
                .and_then(Value::as_str)
                .unwrap_or(language_code.as_str())
                .to_string();

            let info = TrackInfo {
                language,
                language_code,
                base_url: base_url.replace("&fmt=srv3", ""),
                is_generated: track.get("kind").and_then(Value::as_str) == Some("asr"),
            };

            if info.is_generated {
                list.generated.push(info);
            } else {
                list.manual.push(info);
            }
        }

        Ok(list)
    }

    /// First requested language that has a track; uploaded tracks win over
    /// generated ones for the same language.
    pub fn find(&self, languages: &[String]) -> Result<&TrackInfo, TranscriptError> {
        languages
            .iter()
            .find_map(|code| {
                self.manual
                    .iter()
                    .chain(self.generated.iter())
                    .find(|t| &t.language_code == code)
            })
            .ok_or_else(|| TranscriptError::NoTranscriptFound {
                requested: languages.to_vec(),
                available: self
                    .manual
                    .iter()
                    .chain(self.generated.iter())
                    .map(|t| t.language_code.clone())
                    .collect(),
            })
    }
}

/// Transcript fetcher for youtube.com
pub struct TranscriptApi {
    http: Client,
    jar: Arc<Jar>,
    base_url: String,
}

impl TranscriptApi {
    pub fn new(timeout_secs: u64) -> Result<Self, TranscriptError> {
        Self::with_base_url(YOUTUBE_URL, timeout_secs)
    }

    /// Points every request at `base_url` instead of youtube.com
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, TranscriptError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));

        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .default_headers(headers)
            .cookie_provider(jar.clone())
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            jar,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches the transcript in the first available language of `languages`.
    pub async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<Snippet>, TranscriptError> {
        let list = self.list(video_id).await?;
        let track = list.find(languages)?;
        info!(
            "Fetching {} transcript ({})",
            track.language_code,
            if track.is_generated { "generated" } else { "manual" }
        );
        self.fetch_track(track).await
    }

    /// Lists the caption tracks of a video.
    pub async fn list(&self, video_id: &str) -> Result<TranscriptList, TranscriptError> {
        let html = self.fetch_watch_page(video_id).await?;
        let api_key = extract_api_key(&html)?;
        let player = self.fetch_player(video_id, &api_key).await?;

        check_playability(video_id, &player)?;

        let null = Value::Null;
        let captions = player.get("captions").unwrap_or(&null);
        TranscriptList::from_captions(video_id, captions)
    }

    pub async fn fetch_track(&self, track: &TrackInfo) -> Result<Vec<Snippet>, TranscriptError> {
        if track.base_url.contains("&exp=xpe") {
            return Err(TranscriptError::PoTokenRequired);
        }
        let xml = self.get_text(&track.base_url).await?;
        let snippets = parse_timedtext(&xml)?;
        debug!("Parsed {} caption entries", snippets.len());
        Ok(snippets)
    }

    fn watch_url(&self, video_id: &str) -> String {
        format!("{}/watch?v={}", self.base_url, video_id)
    }

    async fn fetch_watch_page(&self, video_id: &str) -> Result<String, TranscriptError> {
        let url = self.watch_url(video_id);
        let html = self.get_text(&url).await?;
        if !html.contains(CONSENT_FORM_MARKER) {
            return Ok(html);
        }

        debug!("Consent form served, retrying with a consent cookie");
        self.give_consent(&url, &html)?;
        let html = self.get_text(&url).await?;
        if html.contains(CONSENT_FORM_MARKER) {
            return Err(TranscriptError::ConsentCookie);
        }
        Ok(html)
    }

    fn give_consent(&self, watch_url: &str, html: &str) -> Result<(), TranscriptError> {
        let value = CONSENT_VALUE
            .captures(html)
            .and_then(|c| c.get(1))
            .ok_or(TranscriptError::ConsentCookie)?;
        let url = Url::parse(watch_url)
            .map_err(|e| TranscriptError::DataUnparsable(format!("watch URL: {}", e)))?;
        self.jar
            .add_cookie_str(&format!("CONSENT=YES+{}; Path=/", value.as_str()), &url);
        Ok(())
    }

    async fn fetch_player(&self, video_id: &str, api_key: &str) -> Result<Value, TranscriptError> {
        let url = format!("{}/youtubei/v1/player?key={}", self.base_url, api_key);
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        let response = self.http.post(&url).json(&body).send().await?;
        check_status(response.status())?;
        Ok(response.json::<Value>().await?)
    }

    async fn get_text(&self, url: &str) -> Result<String, TranscriptError> {
        let response = self.http.get(url).send().await?;
        check_status(response.status())?;
        Ok(response.text().await?)
    }
}

fn check_status(status: StatusCode) -> Result<(), TranscriptError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(TranscriptError::IpBlocked);
    }
    if !status.is_success() {
        return Err(TranscriptError::Http(status.as_u16()));
    }
    Ok(())
}

fn extract_api_key(html: &str) -> Result<String, TranscriptError> {
    if let Some(caps) = API_KEY.captures(html) {
        return Ok(caps[1].to_string());
    }
    if html.contains(RECAPTCHA_MARKER) {
        return Err(TranscriptError::IpBlocked);
    }
    Err(TranscriptError::DataUnparsable(
        "INNERTUBE_API_KEY not found on the watch page".to_string(),
    ))
}

/// Maps a non-OK `playabilityStatus` to the matching error
fn check_playability(video_id: &str, player: &Value) -> Result<(), TranscriptError> {
    let Some(status) = player.pointer("/playabilityStatus/status").and_then(Value::as_str) else {
        return Ok(());
    };
    if status == "OK" {
        return Ok(());
    }

    let reason = player
        .pointer("/playabilityStatus/reason")
        .and_then(Value::as_str)
        .unwrap_or_default();
    debug!("Playability status {}: {}", status, reason);

    match (status, reason) {
        ("LOGIN_REQUIRED", BOT_CHECK_REASON) => Err(TranscriptError::RequestBlocked),
        ("LOGIN_REQUIRED", AGE_GATE_REASON) => Err(TranscriptError::AgeRestricted),
        ("ERROR", UNAVAILABLE_REASON) => {
            if video_id.starts_with("http://") || video_id.starts_with("https://") {
                Err(TranscriptError::InvalidVideoId)
            } else {
                Err(TranscriptError::VideoUnavailable)
            }
        }
        _ => {
            let mut reason = reason.to_string();
            if let Some(subreasons) = player
                .pointer("/playabilityStatus/errorScreen/playerErrorMessageRenderer/subreason/runs")
                .and_then(Value::as_array)
            {
                let extra: String = subreasons
                    .iter()
                    .filter_map(|r| r.get("text").and_then(Value::as_str))
                    .collect();
                if !extra.is_empty() {
                    reason = format!("{} ({})", reason, extra);
                }
            }
            Err(TranscriptError::VideoUnplayable { reason })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captions() -> Value {
        json!({
            "playerCaptionsTracklistRenderer": {
                "captionTracks": [
                    {"baseUrl": "https://yt/api/timedtext?v=x&lang=en&kind=asr&fmt=srv3", "languageCode": "en",
                     "kind": "asr", "name": {"runs": [{"text": "English (auto-generated)"}]}, "isTranslatable": true},
                    {"baseUrl": "https://yt/api/timedtext?v=x&lang=de", "languageCode": "de",
                     "name": {"simpleText": "German"}},
                    {"baseUrl": "https://yt/api/timedtext?v=x&lang=en", "languageCode": "en",
                     "name": {"runs": [{"text": "English"}]}}
                ]
            }
        })
    }

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_track_list_split() {
        let list = TranscriptList::from_captions("x", &captions()).unwrap();
        assert_eq!(list.manual.len(), 2);
        assert_eq!(list.generated.len(), 1);
        assert_eq!(list.generated[0].base_url, "https://yt/api/timedtext?v=x&lang=en&kind=asr");
        assert_eq!(list.manual[0].language, "German");
    }

    #[test]
    fn test_manual_track_preferred() {
        let list = TranscriptList::from_captions("x", &captions()).unwrap();
        let track = list.find(&langs(&["en"])).unwrap();
        assert!(!track.is_generated);
        assert_eq!(track.language, "English");

        let track = list.find(&langs(&["fr", "de"])).unwrap();
        assert_eq!(track.language_code, "de");
    }

    #[test]
    fn test_no_matching_language() {
        let list = TranscriptList::from_captions("x", &captions()).unwrap();
        match list.find(&langs(&["ja"])) {
            Err(TranscriptError::NoTranscriptFound { available, .. }) => {
                assert_eq!(available, vec!["de", "en", "en"]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_captions_means_disabled() {
        assert!(matches!(
            TranscriptList::from_captions("x", &Value::Null),
            Err(TranscriptError::TranscriptsDisabled)
        ));
    }

    #[test]
    fn test_playability_mapping() {
        let player = |status: &str, reason: &str| {
            json!({"playabilityStatus": {"status": status, "reason": reason}})
        };

        assert!(check_playability("x", &json!({})).is_ok());
        assert!(check_playability("x", &player("OK", "")).is_ok());
        assert!(matches!(
            check_playability("x", &player("LOGIN_REQUIRED", BOT_CHECK_REASON)),
            Err(TranscriptError::RequestBlocked)
        ));
        assert!(matches!(
            check_playability("x", &player("LOGIN_REQUIRED", AGE_GATE_REASON)),
            Err(TranscriptError::AgeRestricted)
        ));
        assert!(matches!(
            check_playability("x", &player("ERROR", UNAVAILABLE_REASON)),
            Err(TranscriptError::VideoUnavailable)
        ));
        assert!(matches!(
            check_playability("https://youtu.be/x", &player("ERROR", UNAVAILABLE_REASON)),
            Err(TranscriptError::InvalidVideoId)
        ));
        assert!(matches!(
            check_playability("x", &player("UNPLAYABLE", "Private video")),
            Err(TranscriptError::VideoUnplayable { .. })
        ));
    }

    #[test]
    fn test_api_key_extraction() {
        assert_eq!(
            extract_api_key(r#"ytcfg.set({"INNERTUBE_API_KEY": "AIzaSy_abc-123"})"#).unwrap(),
            "AIzaSy_abc-123"
        );
        assert!(matches!(
            extract_api_key(r#"<div class="g-recaptcha"></div>"#),
            Err(TranscriptError::IpBlocked)
        ));
        assert!(matches!(
            extract_api_key("<html></html>"),
            Err(TranscriptError::DataUnparsable(_))
        ));
    }
}
