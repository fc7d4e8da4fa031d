//! Single-turn text chat with Gemini 3 Pro

use serde::Serialize;
use tracing::debug;

use crate::client::GeminiClient;
use crate::constants::Model;
use crate::error::GeminiError;

/// A chat answer, shaped for the `complete` JSON result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thoughts: Option<String>,
}

/// Sends one prompt. Thoughts are kept only when `show_thoughts` is set and
/// the model produced some.
pub async fn chat(
    client: &GeminiClient,
    prompt: &str,
    show_thoughts: bool,
) -> Result<ChatReply, GeminiError> {
    let output = client.generate_content(prompt, &[], Model::Gemini3Pro).await?;
    debug!("Reply has {} candidate(s)", output.candidates.len());

    let thoughts = if show_thoughts {
        output.thoughts().filter(|t| !t.is_empty()).map(str::to_string)
    } else {
        None
    };

    Ok(ChatReply {
        text: output.text().to_string(),
        thoughts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_omits_missing_thoughts() {
        let reply = ChatReply {
            text: "4".to_string(),
            thoughts: None,
        };
        assert_eq!(serde_json::to_string(&reply).unwrap(), r#"{"text":"4"}"#);

        let reply = ChatReply {
            text: "4".to_string(),
            thoughts: Some("2+2".to_string()),
        };
        assert_eq!(
            serde_json::to_string(&reply).unwrap(),
            r#"{"text":"4","thoughts":"2+2"}"#
        );
    }
}
