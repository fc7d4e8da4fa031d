//! Result payloads of the transcript tool

use common::ToolResult;
use serde::Serialize;

use crate::api::{Snippet, TranscriptApi};

/// `{"status": "complete", "video_id": ..., "transcript": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptReport {
    pub video_id: String,
    pub transcript: Vec<Snippet>,
}

/// `{"status": "error", "error": ..., "video_id": ...}`; the id is `null`
/// when the URL could not be parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptFailure {
    pub error: String,
    pub video_id: Option<String>,
}

pub type TranscriptResult = ToolResult<TranscriptReport, TranscriptFailure>;

/// Result for input that is not a recognisable YouTube URL
pub fn invalid_url() -> TranscriptResult {
    ToolResult::Error(TranscriptFailure {
        error: "Invalid YouTube URL".to_string(),
        video_id: None,
    })
}

/// Fetches a transcript and folds any failure into the error payload.
pub async fn fetch_transcript(
    api: &TranscriptApi,
    video_id: &str,
    languages: &[String],
) -> TranscriptResult {
    match api.fetch(video_id, languages).await {
        Ok(transcript) => ToolResult::Complete(TranscriptReport {
            video_id: video_id.to_string(),
            transcript,
        }),
        Err(e) => ToolResult::Error(TranscriptFailure {
            error: e.user_message(),
            video_id: Some(video_id.to_string()),
        }),
    }
}
