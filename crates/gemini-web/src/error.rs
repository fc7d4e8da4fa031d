use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while talking to the Gemini web app
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Session initialisation failed (usually stale cookies)
    #[error("Failed to initialize client. {0}")]
    Auth(String),

    /// The client was used before `init()`
    #[error("Client is not initialized")]
    NotInitialized,

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Non-200 status from a Gemini endpoint
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("Usage limit exceeded for this model. Try again later or use another model.")]
    UsageLimitExceeded,

    #[error("The selected model is inconsistent with the conversation. Start a new chat.")]
    ModelInconsistent,

    #[error("The model header was rejected. The web app may have changed its model selectors.")]
    ModelHeaderInvalid,

    #[error("Requests from this IP are temporarily blocked. Try again later.")]
    TemporarilyBlocked,

    /// Response body could not be interpreted
    #[error("Failed to generate contents. {0}")]
    InvalidResponse(String),

    /// Generation finished without the expected output
    #[error("{0}")]
    Generation(String),

    #[error("Failed to download image: HTTP {0}")]
    Download(u16),

    #[error("Input image not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("File upload failed: {0}")]
    Upload(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GeminiError {
    /// Maps the numeric error code the web app embeds in failed responses
    pub fn from_vendor_code(code: i64) -> Option<Self> {
        match code {
            1037 => Some(GeminiError::UsageLimitExceeded),
            1050 => Some(GeminiError::ModelInconsistent),
            1052 => Some(GeminiError::ModelHeaderInvalid),
            1060 => Some(GeminiError::TemporarilyBlocked),
            _ => None,
        }
    }
}
