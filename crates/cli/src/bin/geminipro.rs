use anyhow::Result;
use clap::Parser;
use cli::args::GeminiProArgs;
use cli::{connect, emit, init_logging, into_tool_result, load_settings, setup_command, OutputMode};
use gemini_web::{chat, ChatReply};
use std::process::ExitCode;

const TOOL: &str = "geminipro";

#[tokio::main]
async fn main() -> ExitCode {
    let args = GeminiProArgs::parse();
    init_logging(args.gemini.debug);

    if args.gemini.setup {
        return setup_command(args.gemini.browser.as_deref());
    }

    let result = into_tool_result(run(&args).await);

    let show_thoughts = args.think;
    emit(&result, OutputMode::json(args.gemini.json, false), |reply| {
        if show_thoughts {
            if let Some(thoughts) = &reply.thoughts {
                println!("=== Reasoning ===");
                println!("{}", thoughts);
                println!("\n=== Response ===");
            }
        }
        println!("{}", reply.text);
    })
}

async fn run(args: &GeminiProArgs) -> Result<ChatReply> {
    let prompt = args.prompt.as_deref().unwrap_or_default();
    let settings = load_settings()?;
    let timeout = args.gemini.timeout.unwrap_or(settings.timeout_secs);

    let client = connect(TOOL, timeout).await?;
    Ok(chat(&client, prompt, args.think).await?)
}
