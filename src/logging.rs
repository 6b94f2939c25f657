// src/logging.rs

//! Tracing subscriber for the `taskdag` binary.
//!
//! `--log-level` sets one global level. Without it, `TASKDAG_LOG` is read as
//! an `EnvFilter` directive list, so `TASKDAG_LOG=info,taskdag::action=debug`
//! narrows verbose output to the actions. Output goes to stderr; `--list`
//! and `--dry-run` own stdout.

use anyhow::Result;
use tracing::warn;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "TASKDAG_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

/// Filter for a run: the CLI level wins over `env_directives`.
///
/// Fails only when `env_directives` does not parse.
pub fn log_filter(
    cli_level: Option<LogLevel>,
    env_directives: Option<&str>,
) -> std::result::Result<EnvFilter, ParseError> {
    match (cli_level, env_directives) {
        (Some(level), _) => Ok(EnvFilter::new(level.as_directive())),
        (None, Some(directives)) if !directives.trim().is_empty() => {
            EnvFilter::try_new(directives)
        }
        (None, _) => Ok(EnvFilter::new(DEFAULT_DIRECTIVES)),
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let (filter, rejected) = match log_filter(cli_level, env.as_deref()) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new(DEFAULT_DIRECTIVES), Some(err)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;

    if let Some(err) = rejected {
        warn!(var = LOG_ENV, error = %err, "ignoring invalid log directives; using `info`");
    }
    Ok(())
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
