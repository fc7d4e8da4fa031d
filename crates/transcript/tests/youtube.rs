//! Transcript fetching against a mock youtube.com

use serde_json::{json, Value};
use transcript::{fetch_transcript, TranscriptApi, TranscriptError};
use wiremock::matchers::{body_partial_json, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VIDEO_ID: &str = "dQw4w9WgXcQ";

const WATCH_PAGE: &str =
    r#"<html><script>ytcfg.set({"INNERTUBE_API_KEY":"test-key_1","INNERTUBE_CONTEXT":{}});</script></html>"#;

const CONSENT_PAGE: &str = r#"<form action="https://consent.youtube.com/s" method="POST"><input type="hidden" name="v" value="cb.20250101-00-p0"></form>"#;

const TIMEDTEXT: &str = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.0" dur="1.5">Never gonna</text><text start="1.5" dur="2.0">give you up</text></transcript>"#;

fn en() -> Vec<String> {
    vec!["en".to_string()]
}

fn player_with_tracks(server: &MockServer) -> Value {
    json!({
        "playabilityStatus": {"status": "OK"},
        "captions": {
            "playerCaptionsTracklistRenderer": {
                "captionTracks": [
                    {"baseUrl": format!("{}/api/timedtext?v={}&lang=en&fmt=srv3", server.uri(), VIDEO_ID),
                     "languageCode": "en", "name": {"runs": [{"text": "English"}]}},
                    {"baseUrl": format!("{}/api/timedtext?v={}&lang=fr&kind=asr", server.uri(), VIDEO_ID),
                     "languageCode": "fr", "kind": "asr", "name": {"runs": [{"text": "French (auto-generated)"}]}}
                ]
            }
        }
    })
}

async fn mount_watch_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", VIDEO_ID))
        .respond_with(ResponseTemplate::new(200).set_body_string(WATCH_PAGE))
        .mount(server)
        .await;
}

async fn mount_player(server: &MockServer, player: Value) {
    Mock::given(method("POST"))
        .and(path("/youtubei/v1/player"))
        .and(query_param("key", "test-key_1"))
        .and(body_partial_json(json!({
            "context": {"client": {"clientName": "ANDROID"}},
            "videoId": VIDEO_ID
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(player))
        .mount(server)
        .await;
}

async fn mount_timedtext(server: &MockServer, lang: &str) {
    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .and(query_param("lang", lang))
        .respond_with(ResponseTemplate::new(200).set_body_string(TIMEDTEXT))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_manual_transcript() {
    let server = MockServer::start().await;
    mount_watch_page(&server).await;
    mount_player(&server, player_with_tracks(&server)).await;
    mount_timedtext(&server, "en").await;

    let api = TranscriptApi::with_base_url(&server.uri(), 10).unwrap();
    let snippets = api.fetch(VIDEO_ID, &en()).await.unwrap();

    assert_eq!(snippets.len(), 2);
    assert_eq!(snippets[0].text, "Never gonna");
    assert_eq!(snippets[1].start, 1.5);
    assert_eq!(snippets[1].duration, 2.0);
}

#[tokio::test]
async fn test_generated_track_for_requested_language() {
    let server = MockServer::start().await;
    mount_watch_page(&server).await;
    mount_player(&server, player_with_tracks(&server)).await;
    mount_timedtext(&server, "fr").await;

    let api = TranscriptApi::with_base_url(&server.uri(), 10).unwrap();
    let list = api.list(VIDEO_ID).await.unwrap();
    let track = list.find(&["fr".to_string()]).unwrap();
    assert!(track.is_generated);

    let snippets = api.fetch_track(track).await.unwrap();
    assert_eq!(snippets[1].text, "give you up");
}

#[tokio::test]
async fn test_consent_cookie_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(header_regex("cookie", r"CONSENT=YES\+cb\.20250101-00-p0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(WATCH_PAGE))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CONSENT_PAGE))
        .mount(&server)
        .await;
    mount_player(&server, player_with_tracks(&server)).await;
    mount_timedtext(&server, "en").await;

    let api = TranscriptApi::with_base_url(&server.uri(), 10).unwrap();
    let snippets = api.fetch(VIDEO_ID, &en()).await.unwrap();
    assert_eq!(snippets.len(), 2);
}

#[tokio::test]
async fn test_consent_that_never_sticks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CONSENT_PAGE))
        .mount(&server)
        .await;

    let api = TranscriptApi::with_base_url(&server.uri(), 10).unwrap();
    let err = api.fetch(VIDEO_ID, &en()).await.unwrap_err();
    assert!(matches!(err, TranscriptError::ConsentCookie));
}

#[tokio::test]
async fn test_disabled_transcripts_message() {
    let server = MockServer::start().await;
    mount_watch_page(&server).await;
    mount_player(&server, json!({"playabilityStatus": {"status": "OK"}})).await;

    let api = TranscriptApi::with_base_url(&server.uri(), 10).unwrap();
    let result = fetch_transcript(&api, VIDEO_ID, &en()).await;

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "status": "error",
            "error": "Transcripts disabled by video owner",
            "video_id": VIDEO_ID
        })
    );
    assert_eq!(result.exit_code(), 1);
}

#[tokio::test]
async fn test_age_restricted_message() {
    let server = MockServer::start().await;
    mount_watch_page(&server).await;
    mount_player(
        &server,
        json!({"playabilityStatus": {
            "status": "LOGIN_REQUIRED",
            "reason": "This video may be inappropriate for some users."
        }}),
    )
    .await;

    let api = TranscriptApi::with_base_url(&server.uri(), 10).unwrap();
    let result = fetch_transcript(&api, VIDEO_ID, &en()).await;
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["error"], "Age-restricted content not supported");
}

#[tokio::test]
async fn test_missing_language() {
    let server = MockServer::start().await;
    mount_watch_page(&server).await;
    mount_player(&server, player_with_tracks(&server)).await;

    let api = TranscriptApi::with_base_url(&server.uri(), 10).unwrap();
    let result = fetch_transcript(&api, VIDEO_ID, &["ja".to_string()]).await;
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["error"], "No transcript available for this video");
}

#[tokio::test]
async fn test_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let api = TranscriptApi::with_base_url(&server.uri(), 10).unwrap();
    let err = api.fetch(VIDEO_ID, &en()).await.unwrap_err();
    assert!(matches!(err, TranscriptError::IpBlocked));
    assert!(err.user_message().starts_with("Failed to fetch transcript:"));
}
