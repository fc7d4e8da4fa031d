//! Parser for the legacy timedtext XML format:
//!
//! ```xml
//! <transcript>
//!   <text start="0.5" dur="2.1">Hello &amp;#39;world&amp;#39;</text>
//! </transcript>
//! ```
//!
//! Caption text is escaped twice and may carry inline markup such as
//! `<font color="#E5E5E5">`, which is stripped.

use quick_xml::escape::{resolve_html5_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::sync::LazyLock;

use crate::api::Snippet;
use crate::error::TranscriptError;

static INLINE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static regex"));

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#?[0-9A-Za-z]+);").expect("static regex"));

const TEXT_ELEMENT: &[u8] = b"text";

pub fn parse_timedtext(xml: &str) -> Result<Vec<Snippet>, TranscriptError> {
    let mut reader = Reader::from_str(xml);
    let mut snippets = Vec::new();

    // (start, duration, text so far) of the open <text> element
    let mut current: Option<(f64, f64, String)> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) if e.name().as_ref() == TEXT_ELEMENT => {
                let (start, duration) = timing(&e)?;
                current = Some((start, duration, String::new()));
            }
            Event::Text(t) => {
                if let Some((_, _, text)) = current.as_mut() {
                    text.push_str(&t.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(c) => {
                if let Some((_, _, text)) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(e) if e.name().as_ref() == TEXT_ELEMENT => {
                if let Some((start, duration, raw)) = current.take() {
                    if !raw.is_empty() {
                        snippets.push(Snippet {
                            text: clean_text(&raw),
                            start,
                            duration,
                        });
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(snippets)
}

fn timing(element: &BytesStart<'_>) -> Result<(f64, f64), TranscriptError> {
    let start = float_attr(element, "start")?.ok_or_else(|| {
        TranscriptError::DataUnparsable("caption entry without a start time".to_string())
    })?;
    let duration = float_attr(element, "dur")?.unwrap_or(0.0);
    Ok((start, duration))
}

fn float_attr(element: &BytesStart<'_>, name: &str) -> Result<Option<f64>, TranscriptError> {
    let Some(attr) = element.try_get_attribute(name).map_err(xml_error)? else {
        return Ok(None);
    };
    let value = attr.unescape_value().map_err(xml_error)?;
    value
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|_| TranscriptError::DataUnparsable(format!("bad {} value {:?}", name, value)))
}

/// Second unescape pass plus inline tag removal
fn clean_text(raw: &str) -> String {
    let unescaped = unescape_lenient(raw);
    INLINE_TAG.replace_all(&unescaped, "").into_owned()
}

/// Resolves XML, numeric and HTML5 named entities one at a time. Unknown
/// entities and bare `&` are left as they are.
fn unescape_lenient(raw: &str) -> String {
    ENTITY
        .replace_all(raw, |caps: &regex::Captures<'_>| {
            let entity = &caps[0];
            match unescape(entity) {
                Ok(resolved) => resolved.into_owned(),
                Err(_) => resolve_html5_entity(&caps[1])
                    .map(str::to_string)
                    .unwrap_or_else(|| entity.to_string()),
            }
        })
        .into_owned()
}

fn xml_error(err: impl std::fmt::Display) -> TranscriptError {
    TranscriptError::Xml(err.to_string())
}
