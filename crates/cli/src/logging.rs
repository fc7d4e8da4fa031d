use tracing_subscriber::EnvFilter;

/// Filter used with `--debug`: verbose for our crates, quiet for dependencies
const DEBUG_FILTER: &str = "warn,cli=debug,common=debug,session=debug,gemini_web=debug,transcript=debug";

/// Logs to stderr so stdout stays clean for results. `RUST_LOG` wins over
/// `debug`.
pub fn init_logging(debug: bool) {
    let default = if debug { DEBUG_FILTER } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
