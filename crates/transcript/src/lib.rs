//! YouTube transcript fetching
//!
//! Resolves a video URL to its id, discovers caption tracks through the
//! innertube player API and parses the timedtext XML into [`Snippet`]s.

pub mod api;
pub mod error;
pub mod format;
pub mod report;
pub mod timedtext;
pub mod video_id;

pub use api::{Snippet, TrackInfo, TranscriptApi, TranscriptList};
pub use error::TranscriptError;
pub use format::{format_timestamp, render_lines};
pub use report::{fetch_transcript, invalid_url, TranscriptFailure, TranscriptReport, TranscriptResult};
pub use video_id::extract_video_id;
