//! Result envelope shared by the tools.
//!
//! Every invocation produces exactly one `ToolResult`. In JSON form the
//! `status` field (`"complete"` or `"error"`) decides which other fields
//! are present.

use serde::Serialize;

/// Process exit code for a completed operation
pub const EXIT_SUCCESS: i32 = 0;

/// Process exit code for any failure
pub const EXIT_ERROR: i32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolResult<T, E = Failure> {
    Complete(T),
    Error(E),
}

/// Error payload: `{"status": "error", "error": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub error: String,
}

impl Failure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl<T, E> ToolResult<T, E> {
    pub fn is_complete(&self) -> bool {
        matches!(self, ToolResult::Complete(_))
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_complete() {
            EXIT_SUCCESS
        } else {
            EXIT_ERROR
        }
    }
}

impl<T> ToolResult<T, Failure> {
    /// Converts an operation outcome, rendering the error with `Display`.
    pub fn from_result<D: std::fmt::Display>(result: Result<T, D>) -> Self {
        match result {
            Ok(value) => ToolResult::Complete(value),
            Err(e) => ToolResult::Error(Failure::new(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize)]
    struct Saved {
        filepath: String,
    }

    #[test]
    fn test_complete_carries_payload_fields() {
        let result: ToolResult<Saved> = ToolResult::Complete(Saved {
            filepath: "/tmp/a.png".into(),
        });
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"status": "complete", "filepath": "/tmp/a.png"})
        );
        assert_eq!(result.exit_code(), EXIT_SUCCESS);
    }

    #[test]
    fn test_error_shape() {
        let result: ToolResult<Saved> = ToolResult::from_result(Err::<Saved, _>("boom"));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"status": "error", "error": "boom"})
        );
        assert_eq!(result.exit_code(), EXIT_ERROR);
    }
}
