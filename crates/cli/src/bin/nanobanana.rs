use anyhow::Result;
use chrono::Local;
use clap::Parser;
use cli::args::NanoBananaArgs;
use cli::{connect, emit, init_logging, into_tool_result, load_settings, setup_command, OutputMode};
use gemini_web::imagegen::{edit_image, ensure_input_exists, generate_image_streaming, ImageRequest};
use serde::Serialize;
use std::process::ExitCode;
use tracing::debug;

const TOOL: &str = "nanobanana";

/// `{"status": "complete", "filepath": "..."}`
#[derive(Debug, Serialize)]
struct SavedImage {
    filepath: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = NanoBananaArgs::parse();
    init_logging(args.gemini.debug);

    if args.gemini.setup {
        return setup_command(args.gemini.browser.as_deref());
    }

    let result = into_tool_result(run(&args).await);
    emit(&result, OutputMode::json(args.gemini.json, false), |saved| {
        println!("{}", saved.filepath);
    })
}

async fn run(args: &NanoBananaArgs) -> Result<SavedImage> {
    let settings = load_settings()?;
    let timeout = args.gemini.timeout.unwrap_or(settings.timeout_secs);

    let output_dir = match &args.dir {
        Some(dir) => dir.clone(),
        None => settings.output_dir()?,
    };
    let filename = args
        .output
        .clone()
        .unwrap_or_else(|| Local::now().format("%Y%m%d_%H%M%S").to_string());

    let request = ImageRequest {
        prompt: args.prompt.clone().unwrap_or_default(),
        output_dir,
        filename,
        debug: args.gemini.debug,
    };

    // A missing input is reported before any cookie or network check.
    if let Some(input) = &args.edit {
        ensure_input_exists(input)?;
    }

    let client = connect(TOOL, timeout).await?;

    let path = match &args.edit {
        Some(input) => {
            debug!("Input image: {}", input.display());
            edit_image(&client, &request, input).await?
        }
        None => generate_image_streaming(&client, &request).await?,
    };

    Ok(SavedImage {
        filepath: path.display().to_string(),
    })
}
