use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("Subtitles are disabled for this video")]
    TranscriptsDisabled,

    #[error("No transcripts were found for any of the requested language codes: {requested:?} (available: {available:?})")]
    NoTranscriptFound {
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("The video is no longer available")]
    VideoUnavailable,

    #[error("You seem to have passed a URL instead of a video ID")]
    InvalidVideoId,

    #[error("This video is age-restricted and requires signing in")]
    AgeRestricted,

    /// YouTube's bot check triggered
    #[error("YouTube is blocking requests from your IP (sign-in required to confirm you're not a bot)")]
    RequestBlocked,

    #[error("YouTube is blocking requests from your IP (too many requests or reCAPTCHA)")]
    IpBlocked,

    #[error("The video is unplayable: {reason}")]
    VideoUnplayable { reason: String },

    #[error("Failed to automatically give consent to saving cookies")]
    ConsentCookie,

    #[error("The data required to fetch the transcript is not parsable: {0}")]
    DataUnparsable(String),

    #[error("The requested transcript requires a PO token")]
    PoTokenRequired,

    #[error("Request to YouTube failed: HTTP {0}")]
    Http(u16),

    #[error("Failed to parse transcript XML: {0}")]
    Xml(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl TranscriptError {
    /// Message shown to the user for a failed fetch
    pub fn user_message(&self) -> String {
        match self {
            TranscriptError::TranscriptsDisabled => "Transcripts disabled by video owner".to_string(),
            TranscriptError::NoTranscriptFound { .. } => {
                "No transcript available for this video".to_string()
            }
            TranscriptError::VideoUnavailable => "Video not available".to_string(),
            TranscriptError::AgeRestricted => "Age-restricted content not supported".to_string(),
            other => {
                let message = other.to_string();
                let lower = message.to_lowercase();
                if lower.contains("age") && lower.contains("restrict") {
                    "Age-restricted content not supported".to_string()
                } else {
                    format!("Failed to fetch transcript: {}", message)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            TranscriptError::TranscriptsDisabled.user_message(),
            "Transcripts disabled by video owner"
        );
        let not_found = TranscriptError::NoTranscriptFound {
            requested: vec!["de".into()],
            available: vec!["en".into()],
        };
        assert_eq!(not_found.user_message(), "No transcript available for this video");
        assert_eq!(TranscriptError::VideoUnavailable.user_message(), "Video not available");
        assert_eq!(
            TranscriptError::AgeRestricted.user_message(),
            "Age-restricted content not supported"
        );
        assert_eq!(
            TranscriptError::Http(500).user_message(),
            "Failed to fetch transcript: Request to YouTube failed: HTTP 500"
        );
    }

    #[test]
    fn test_age_check_on_other_reasons() {
        let err = TranscriptError::VideoUnplayable {
            reason: "Content is age restricted in your region".to_string(),
        };
        assert_eq!(err.user_message(), "Age-restricted content not supported");
    }
}
