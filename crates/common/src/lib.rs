//! Shared building blocks for the nanobanana tools: state directory and
//! settings, browser profile discovery, and the result envelope.

pub mod config;
pub mod outcome;
pub mod platform;

pub use config::{ConfigError, Settings};
pub use outcome::{Failure, ToolResult, EXIT_ERROR, EXIT_SUCCESS};
pub use platform::Browser;
