//! Printing results and mapping them to exit codes

use common::{Failure, ToolResult, EXIT_ERROR};
use serde::Serialize;
use std::process::ExitCode;
use transcript::TranscriptFailure;

/// How a result is written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
    PrettyJson,
}

impl OutputMode {
    pub fn json(enabled: bool, pretty: bool) -> Self {
        match (enabled, pretty) {
            (false, _) => OutputMode::Text,
            (true, false) => OutputMode::Json,
            (true, true) => OutputMode::PrettyJson,
        }
    }
}

/// Error payloads that carry a user-facing message
pub trait ErrorMessage {
    fn message(&self) -> &str;
}

impl ErrorMessage for Failure {
    fn message(&self) -> &str {
        &self.error
    }
}

impl ErrorMessage for TranscriptFailure {
    fn message(&self) -> &str {
        &self.error
    }
}

/// Folds an operation outcome into the result envelope. The message keeps
/// the whole context chain.
pub fn into_tool_result<T>(result: anyhow::Result<T>) -> ToolResult<T> {
    match result {
        Ok(value) => ToolResult::Complete(value),
        Err(e) => ToolResult::Error(Failure::new(format!("{:#}", e))),
    }
}

/// Renders a result as JSON text
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// Prints `result` and returns the process exit code.
///
/// In text mode `render` prints a completed payload and errors go to stderr
/// as `Error: <message>`; in JSON mode the whole envelope goes to stdout.
pub fn emit<T, E>(result: &ToolResult<T, E>, mode: OutputMode, render: impl FnOnce(&T)) -> ExitCode
where
    T: Serialize,
    E: Serialize + ErrorMessage,
{
    match mode {
        OutputMode::Json | OutputMode::PrettyJson => {
            match to_json(result, mode == OutputMode::PrettyJson) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error: failed to serialize result: {}", e);
                    return ExitCode::from(EXIT_ERROR as u8);
                }
            }
        }
        OutputMode::Text => match result {
            ToolResult::Complete(value) => render(value),
            ToolResult::Error(failure) => eprintln!("Error: {}", failure.message()),
        },
    }
    ExitCode::from(result.exit_code() as u8)
}
