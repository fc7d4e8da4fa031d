//! Shared plumbing for the `geminipro`, `nanobanana` and `yt-transcript`
//! binaries: argument definitions, logging, `--setup`, and result output.

pub mod args;
pub mod auth;
pub mod logging;
pub mod output;

pub use auth::{connect, load_settings, resolve_browser, setup_command};
pub use logging::init_logging;
pub use output::{emit, into_tool_result, OutputMode};
