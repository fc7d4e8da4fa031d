//! Typed view of a StreamGenerate reply
//!
//! Positions inside the payload are undocumented and were established by
//! inspecting live traffic:
//! - `body[1]`            conversation metadata (`[cid, rid]`)
//! - `body[4]`            candidates
//! - `cand[0]`            candidate id
//! - `cand[1][0]`         reply text
//! - `cand[12][1]`        web images
//! - `cand[12][7][0]`     generated images (often only in a later envelope)
//! - `cand[22][0]`        text replacing a `card_content` placeholder
//! - `cand[37][0][0]`     thoughts

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::GeminiError;
use crate::frames;

static CARD_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^http://googleusercontent\.com/card_content/\d+").expect("static regex")
});

/// Inline placeholders the web app leaves where media is rendered
static MEDIA_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"http://googleusercontent\.com/\w+/\d+\n*").expect("static regex")
});

/// An image found on the web and cited in the reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebImage {
    pub url: String,
    pub title: String,
    pub alt: String,
}

/// An image the model generated for this reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub url: String,
    pub title: String,
    pub alt: String,
}

impl GeneratedImage {
    /// URL of the full-resolution rendition
    pub fn full_size_url(&self) -> String {
        format!("{}=s2048", self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Candidate {
    pub rcid: String,
    pub text: String,
    pub thoughts: Option<String>,
    pub web_images: Vec<WebImage>,
    pub generated_images: Vec<GeneratedImage>,
}

/// Parsed reply: metadata plus every candidate the server offered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOutput {
    pub metadata: Vec<String>,
    pub candidates: Vec<Candidate>,
}

impl ModelOutput {
    /// The candidate the web app displays
    pub fn chosen(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    pub fn text(&self) -> &str {
        self.chosen().map(|c| c.text.as_str()).unwrap_or_default()
    }

    pub fn thoughts(&self) -> Option<&str> {
        self.chosen().and_then(|c| c.thoughts.as_deref())
    }

    pub fn generated_images(&self) -> &[GeneratedImage] {
        self.chosen()
            .map(|c| c.generated_images.as_slice())
            .unwrap_or_default()
    }

    pub fn web_images(&self) -> &[WebImage] {
        self.chosen()
            .map(|c| c.web_images.as_slice())
            .unwrap_or_default()
    }
}

/// Parses a raw StreamGenerate body.
pub fn parse_model_output(raw: &str) -> Result<ModelOutput, GeminiError> {
    let frames = frames::decode_frames(raw);
    let bodies = frames::envelope_bodies(&frames);
    debug!("Decoded {} frames, {} envelope bodies", frames.len(), bodies.len());

    // Streaming replies repeat the body as it grows; the last one is complete.
    let Some(body_index) = bodies.iter().rposition(has_candidates) else {
        if let Some(code) = frames::vendor_error_code(&frames) {
            debug!("Server returned error code {}", code);
            if let Some(err) = GeminiError::from_vendor_code(code) {
                return Err(err);
            }
            return Err(GeminiError::InvalidResponse(format!(
                "Server returned error code {}.",
                code
            )));
        }
        return Err(GeminiError::InvalidResponse(
            "Invalid response data received.".to_string(),
        ));
    };

    let body = &bodies[body_index];
    let metadata = body
        .get(1)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let candidates = body
        .get(4)
        .and_then(Value::as_array)
        .map(|cands| {
            cands
                .iter()
                .enumerate()
                .map(|(index, cand)| parse_candidate(index, cand, &bodies))
                .collect()
        })
        .unwrap_or_default();

    Ok(ModelOutput {
        metadata,
        candidates,
    })
}

fn has_candidates(body: &Value) -> bool {
    body.get(4)
        .and_then(Value::as_array)
        .is_some_and(|c| !c.is_empty())
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}

fn parse_candidate(index: usize, cand: &Value, bodies: &[Value]) -> Candidate {
    let mut text = str_at(cand, "/1/0").unwrap_or_default().to_string();
    if CARD_CONTENT.is_match(&text) {
        if let Some(card) = str_at(cand, "/22/0") {
            text = card.to_string();
        }
    }
    let text = MEDIA_PLACEHOLDER.replace_all(&text, "").trim_end().to_string();

    let web_images = cand
        .pointer("/12/1")
        .and_then(Value::as_array)
        .map(|images| {
            images
                .iter()
                .filter_map(|img| {
                    Some(WebImage {
                        url: str_at(img, "/0/0/0")?.to_string(),
                        title: str_at(img, "/7/0").unwrap_or_default().to_string(),
                        alt: str_at(img, "/0/4").unwrap_or_default().to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Candidate {
        rcid: str_at(cand, "/0").unwrap_or_default().to_string(),
        text,
        thoughts: str_at(cand, "/37/0/0").map(str::to_string),
        web_images,
        generated_images: find_generated_images(index, bodies),
    }
}

/// Generated images for candidate `index`, from the latest body carrying them
fn find_generated_images(index: usize, bodies: &[Value]) -> Vec<GeneratedImage> {
    let pointer = format!("/4/{}/12/7/0", index);
    let Some(images) = bodies.iter().rev().find_map(|body| {
        body.pointer(&pointer)
            .and_then(Value::as_array)
            .filter(|imgs| !imgs.is_empty())
    }) else {
        return Vec::new();
    };

    images
        .iter()
        .enumerate()
        .filter_map(|(image_index, img)| {
            let url = str_at(img, "/0/3/3")?.to_string();
            let number = img
                .pointer("/3/6")
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_else(|| (image_index + 1).to_string());
            let alt = img
                .pointer(&format!("/3/5/{}", image_index))
                .or_else(|| img.pointer("/3/5/0"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Some(GeneratedImage {
                url,
                title: format!("[Generated Image {}]", number),
                alt,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame_for(body: &Value) -> String {
        let envelope = json!([["wrb.fr", null, serde_json::to_string(body).unwrap()]]);
        let line = serde_json::to_string(&envelope).unwrap();
        format!("{}\n{}\n", line.len(), line)
    }

    fn candidate(text: &str) -> Value {
        let mut cand = vec![Value::Null; 38];
        cand[0] = json!("rc_1");
        cand[1] = json!([text]);
        Value::Array(cand)
    }

    #[test]
    fn test_parse_text_and_metadata() {
        let body = json!([null, ["c_1", "r_1"], null, null, [candidate("Hello there")]]);
        let raw = format!(")]}}'\n\n{}", frame_for(&body));

        let output = parse_model_output(&raw).unwrap();
        assert_eq!(output.metadata, vec!["c_1", "r_1"]);
        assert_eq!(output.text(), "Hello there");
        assert_eq!(output.chosen().unwrap().rcid, "rc_1");
        assert!(output.thoughts().is_none());
    }

    #[test]
    fn test_last_body_wins() {
        let partial = json!([null, ["c"], null, null, [candidate("Hel")]]);
        let full = json!([null, ["c"], null, null, [candidate("Hello world")]]);
        let raw = format!(")]}}'\n{}{}", frame_for(&partial), frame_for(&full));

        assert_eq!(parse_model_output(&raw).unwrap().text(), "Hello world");
    }

    #[test]
    fn test_thoughts() {
        let mut cand = candidate("42");
        cand[37] = json!([["Let me think about this."]]);
        let body = json!([null, [], null, null, [cand]]);

        let output = parse_model_output(&frame_for(&body)).unwrap();
        assert_eq!(output.thoughts(), Some("Let me think about this."));
    }

    #[test]
    fn test_generated_images_from_later_body() {
        let first = json!([null, [], null, null, [candidate("Here is your image http://googleusercontent.com/image_generation_content/0")]]);

        let mut with_image = candidate("Here is your image");
        with_image[12] = json!([null, null, null, null, null, null, null, [[
            [[null, null, null, [null, null, null, "https://lh3.googleusercontent.com/gg-dl/abc"]], null, null,
             [null, null, null, null, null, ["a robot"], 1]]
        ]]]);
        let second = json!([null, [], null, null, [with_image]]);
        let raw = format!("{}{}", frame_for(&first), frame_for(&second));

        let output = parse_model_output(&raw).unwrap();
        assert_eq!(output.text(), "Here is your image");
        let images = output.generated_images();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].url, "https://lh3.googleusercontent.com/gg-dl/abc");
        assert_eq!(images[0].title, "[Generated Image 1]");
        assert_eq!(images[0].alt, "a robot");
        assert_eq!(
            images[0].full_size_url(),
            "https://lh3.googleusercontent.com/gg-dl/abc=s2048"
        );
    }

    #[test]
    fn test_vendor_error_code() {
        let failed = json!([["wrb.fr", null, null, null, null, [3, null, [["type.googleapis.com/x", [1037]]]]]]);
        let raw = format!(")]}}'\n{}", serde_json::to_string(&failed).unwrap());

        let err = parse_model_output(&raw).unwrap_err();
        assert!(matches!(err, GeminiError::UsageLimitExceeded));
    }

    #[test]
    fn test_garbage_is_invalid_response() {
        let err = parse_model_output("<html>sign in</html>").unwrap_err();
        assert!(matches!(err, GeminiError::InvalidResponse(_)));
    }
}
