//! Command-line arguments of the three tools

use clap::{Args, Parser};
use std::path::PathBuf;

/// Flags shared by the two Gemini tools
#[derive(Debug, Clone, Args)]
pub struct GeminiArgs {
    /// Extract cookies from browser
    #[arg(long)]
    pub setup: bool,

    /// Browser to read cookies from with --setup (chrome, chromium, brave, edge)
    #[arg(long, value_name = "NAME", env = "NANOBANANA_BROWSER")]
    pub browser: Option<String>,

    /// Output JSON (for programmatic use)
    #[arg(long)]
    pub json: bool,

    /// Timeout in seconds (default: 120)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Show debug output
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Parser)]
#[command(
    name = "geminipro",
    version,
    about = "Chat with Gemini 3 Pro (Google's latest reasoning model)",
    after_help = "Examples:\n  \
        geminipro --setup                     Extract cookies from browser\n  \
        geminipro \"explain quantum computing\" Chat with Gemini 3 Pro\n  \
        geminipro --json \"test prompt\"        JSON output (for agents)\n  \
        geminipro --think \"solve this puzzle\" Show reasoning process"
)]
pub struct GeminiProArgs {
    /// Your prompt/question
    #[arg(required_unless_present = "setup")]
    pub prompt: Option<String>,

    #[command(flatten)]
    pub gemini: GeminiArgs,

    /// Show model's thinking/reasoning
    #[arg(long)]
    pub think: bool,
}

#[derive(Debug, Parser)]
#[command(
    name = "nanobanana",
    version,
    about = "Generate and edit images using Gemini 3 Pro",
    after_help = "Examples:\n  \
        nanobanana --setup                              Extract cookies from browser\n  \
        nanobanana \"a sunset over mountains\"            Generate image\n  \
        nanobanana --edit photo.png \"make it vintage\"   Edit existing image\n  \
        nanobanana --json \"test prompt\"                 JSON output (for agents)\n  \
        nanobanana -o logo \"company logo\"               Custom filename\n  \
        nanobanana --timeout 180 \"complex scene\"        Longer timeout"
)]
pub struct NanoBananaArgs {
    /// Image generation/editing prompt
    #[arg(required_unless_present = "setup")]
    pub prompt: Option<String>,

    #[command(flatten)]
    pub gemini: GeminiArgs,

    /// Edit an existing image (provide path)
    #[arg(long, value_name = "IMAGE")]
    pub edit: Option<PathBuf>,

    /// Custom filename (no extension)
    #[arg(short = 'o', long = "output", value_name = "NAME")]
    pub output: Option<String>,

    /// Output directory
    #[arg(short = 'd', long = "dir", value_name = "PATH")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Parser)]
#[command(
    name = "yt-transcript",
    version,
    about = "Fetch YouTube video transcripts",
    after_help = "Examples:\n    \
        yt-transcript \"https://youtube.com/watch?v=dQw4w9WgXcQ\"\n    \
        yt-transcript --json \"https://youtu.be/dQw4w9WgXcQ\"\n    \
        yt-transcript --no-timestamps \"https://youtube.com/shorts/abc123xyz\""
)]
pub struct TranscriptArgs {
    /// YouTube video URL or video ID
    pub url: String,

    /// Output as JSON (for programmatic use)
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Output plain text without timestamps
    #[arg(short = 'n', long = "no-timestamps")]
    pub no_timestamps: bool,

    /// Preferred transcript language, in priority order (repeatable)
    #[arg(short = 'l', long = "language", value_name = "CODE", default_value = "en")]
    pub languages: Vec<String>,
}
