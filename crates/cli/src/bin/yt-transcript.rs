use clap::Parser;
use cli::args::TranscriptArgs;
use cli::{emit, init_logging, load_settings, OutputMode};
use common::ToolResult;
use std::process::ExitCode;
use transcript::{
    extract_video_id, fetch_transcript, invalid_url, render_lines, TranscriptApi,
    TranscriptFailure, TranscriptResult,
};

#[tokio::main]
async fn main() -> ExitCode {
    let args = TranscriptArgs::parse();
    init_logging(false);

    let result = run(&args).await;

    let timestamps = !args.no_timestamps;
    emit(&result, OutputMode::json(args.json, true), |report| {
        for line in render_lines(&report.transcript, timestamps) {
            println!("{}", line);
        }
    })
}

async fn run(args: &TranscriptArgs) -> TranscriptResult {
    let Some(video_id) = extract_video_id(&args.url) else {
        return invalid_url();
    };

    let failure = |error: String| {
        ToolResult::Error(TranscriptFailure {
            error,
            video_id: Some(video_id.clone()),
        })
    };

    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(e) => return failure(format!("{:#}", e)),
    };
    let api = match TranscriptApi::new(settings.timeout_secs) {
        Ok(api) => api,
        Err(e) => return failure(e.user_message()),
    };

    fetch_transcript(&api, &video_id, &args.languages).await
}
