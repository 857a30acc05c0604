//! Logging setup on top of tracing-subscriber.
//!
//! The level comes from three places. A `-v…` flag on the command line beats
//! everything, including `RUST_LOG`. Otherwise `RUST_LOG` wins when it parses,
//! and the configured `log_level` (already env-overridden by `TUTOR_LOG_LEVEL`)
//! is the fallback.

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// The level directive picked at startup and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChoice<'a> {
    pub directive: &'a str,
    pub from_cli: bool,
}

impl<'a> LevelChoice<'a> {
    pub fn resolve(cli: Option<&'a str>, configured: &'a str) -> Self {
        match cli {
            Some(directive) => Self { directive, from_cli: true },
            None => Self { directive: configured, from_cli: false },
        }
    }
}

/// Build the filter for `choice`, given the raw `RUST_LOG` value if any.
///
/// Directives may be plain levels or full `EnvFilter` syntax such as
/// `"tutor_bot=debug,tower_http=warn"`.
pub fn build_filter(choice: LevelChoice<'_>, rust_log: Option<&str>) -> Result<EnvFilter, AppError> {
    let parse = |d: &str| {
        EnvFilter::try_new(d).map_err(|e| AppError::Logger(format!("invalid log level '{d}': {e}")))
    };

    if choice.from_cli {
        return parse(choice.directive);
    }
    match rust_log.filter(|s| !s.trim().is_empty()).map(parse) {
        Some(Ok(filter)) => Ok(filter),
        Some(Err(_)) | None => parse(choice.directive),
    }
}

/// Install the global subscriber, writing to stderr. Call once.
pub fn init(choice: LevelChoice<'_>) -> Result<(), AppError> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = build_filter(choice, rust_log.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}
