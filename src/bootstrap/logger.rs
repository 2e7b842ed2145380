//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup, after settings are loaded. Logs go to
//! stderr so they never interleave with the chat transcript on stdout.

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Initialise the global tracing subscriber.
///
/// `level` is the already-resolved level (`-v` flags, then
/// `AGENTGRAPH_LOG_LEVEL`, then the project config). It accepts a level
/// string (`"info"`) or a full filter directive
/// (`"agentgraph_chat=debug,reqwest=warn"`). `RUST_LOG` is only consulted
/// when `level` does not parse.
pub fn init(level: &str) -> Result<(), AppError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(level, rust_log.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

fn build_filter(level: &str, rust_log: Option<&str>) -> Result<EnvFilter, AppError> {
    let level_err = match EnvFilter::try_new(level) {
        Ok(filter) => return Ok(filter),
        Err(e) => e,
    };
    match rust_log {
        Some(directives) => EnvFilter::try_new(directives).map_err(|env_err| {
            AppError::Logger(format!(
                "invalid log level '{level}': {level_err}; RUST_LOG parse failed: {env_err}"
            ))
        }),
        None => Err(AppError::Logger(format!("invalid log level '{level}': {level_err}"))),
    }
}

/// Map repeated `-v` flags to a level, one tier per flag:
/// `-v` warn, `-vv` info, `-vvv` debug, `-vvvv` and above trace.
pub fn level_for_verbosity(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    }
}
