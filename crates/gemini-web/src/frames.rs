//! Decoder for the StreamGenerate response body
//!
//! The body looks like:
//!
//! ```text
//! )]}'
//!
//! 1234
//! [["wrb.fr",null,"[null,[\"c_1\",\"r_1\"],...]"]]
//! 57
//! [["di",42],["af.httprm",41,"-123",7]]
//! ```
//!
//! An XSSI guard, then frames each announced by a line holding their byte
//! count. Payloads are JSON whose interesting parts are themselves
//! JSON-encoded strings, sometimes two or three levels deep. Parsing is best
//! effort: anything that fails to decode is skipped or kept verbatim.

use serde_json::Value;
use std::collections::HashSet;

/// Guard prefix prepended to block cross-site script inclusion
pub const XSSI_PREFIX: &str = ")]}'";

/// Envelope tag of a response payload frame
pub const ENVELOPE_TAG: &str = "wrb.fr";

/// Nested-string unpacking stops below this depth
pub const MAX_UNPACK_DEPTH: usize = 10;

/// Image URL scanning stops below this depth
pub const MAX_SCAN_DEPTH: usize = 30;

/// Prefix of freshly generated image URLs
pub const GENERATED_IMAGE_PREFIX: &str = "https://lh3.googleusercontent.com/gg-dl/";

const IMAGE_HOST_MARKER: &str = "googleusercontent.com";

pub fn strip_xssi(data: &str) -> &str {
    data.strip_prefix(XSSI_PREFIX).unwrap_or(data)
}

/// Splits the body into JSON frames without unpacking nested strings.
///
/// A line made only of digits is a byte count for the following line, which
/// is parsed as JSON; any other line is tried as JSON directly.
pub fn decode_frames(data: &str) -> Vec<Value> {
    let body = strip_xssi(data);
    let lines: Vec<&str> = body.trim().split('\n').collect();
    let mut frames = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();
        if is_length_line(line) {
            if let Some(payload) = lines.get(i + 1) {
                if let Ok(value) = serde_json::from_str::<Value>(payload) {
                    frames.push(value);
                }
            }
            i += 2;
        } else {
            if let Ok(value) = serde_json::from_str::<Value>(line) {
                frames.push(value);
            }
            i += 1;
        }
    }

    frames
}

fn is_length_line(line: &str) -> bool {
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}

/// Decodes every frame and unpacks JSON-encoded strings inside it.
pub fn parse_streaming_response(data: &str) -> Vec<Value> {
    decode_frames(data)
        .into_iter()
        .map(unpack_nested_json)
        .collect()
}

/// Recursively replaces strings that hold JSON arrays/objects with their
/// parsed form.
pub fn unpack_nested_json(value: Value) -> Value {
    unpack_at(value, 0)
}

fn unpack_at(value: Value, depth: usize) -> Value {
    if depth > MAX_UNPACK_DEPTH {
        return value;
    }

    match value {
        Value::String(s) => {
            if s.starts_with('[') || s.starts_with('{') {
                match serde_json::from_str::<Value>(&s) {
                    Ok(parsed) => unpack_at(parsed, depth + 1),
                    Err(_) => Value::String(s),
                }
            } else {
                Value::String(s)
            }
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| unpack_at(item, depth + 1))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, unpack_at(v, depth + 1)))
                .collect(),
        ),
        other => other,
    }
}

/// Collects image URLs anywhere in one decoded frame.
pub fn find_image_urls(value: &Value) -> Vec<String> {
    let mut urls = Vec::new();
    scan_for_urls(value, 0, &mut urls);
    urls
}

fn scan_for_urls(value: &Value, depth: usize, out: &mut Vec<String>) {
    if depth > MAX_SCAN_DEPTH {
        return;
    }

    match value {
        Value::String(s) => {
            if is_image_url(s) {
                out.push(s.clone());
            }
        }
        Value::Array(items) => {
            for item in items {
                scan_for_urls(item, depth + 1, out);
            }
        }
        Value::Object(map) => {
            for v in map.values() {
                scan_for_urls(v, depth + 1, out);
            }
        }
        _ => {}
    }
}

/// Only real `https://` URLs count; prose that mentions the host does not.
pub fn is_image_url(s: &str) -> bool {
    s.starts_with(GENERATED_IMAGE_PREFIX)
        || (s.starts_with("https://") && s.contains(IMAGE_HOST_MARKER))
}

/// Image URLs across all frames, de-duplicated in first-seen order.
pub fn extract_image_urls(frames: &[Value]) -> Vec<String> {
    let mut seen = HashSet::new();
    frames
        .iter()
        .flat_map(find_image_urls)
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Iterates the `["wrb.fr", ...]` envelopes of every frame
pub fn envelopes(frames: &[Value]) -> impl Iterator<Item = &Value> {
    frames
        .iter()
        .filter_map(Value::as_array)
        .flatten()
        .filter(|item| item.get(0).and_then(Value::as_str) == Some(ENVELOPE_TAG))
}

/// The decoded payload of each envelope. Payloads arrive as JSON-encoded
/// strings; already-unpacked payloads are taken as they are.
pub fn envelope_bodies(frames: &[Value]) -> Vec<Value> {
    envelopes(frames)
        .filter_map(|envelope| match envelope.get(2) {
            Some(Value::String(s)) => serde_json::from_str::<Value>(s).ok(),
            Some(v @ Value::Array(_)) => Some(v.clone()),
            _ => None,
        })
        .collect()
}

/// Numeric error code from a failed envelope, when the server sent one
pub fn vendor_error_code(frames: &[Value]) -> Option<i64> {
    envelopes(frames).find_map(|envelope| envelope.pointer("/5/2/0/1/0").and_then(Value::as_i64))
}
