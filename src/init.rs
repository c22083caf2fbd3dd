use crate::env::{env_flag, env_or, FLUENT_LOG_FORMAT_ENV, FLUENT_LOG_LEVEL_ENV, FLUENT_LOG_STDOUT_ENV};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Configuration of the global `tracing` subscriber that receives the
/// events of [`crate::tracing_sink::TracingSink`].
///
/// **Fields**
/// - `level`: `EnvFilter` directive, e.g. `info` or `warn,billing=debug`.
/// - `enable_stdout`: if `true`, a `fmt` layer prints events to stdout.
/// - `json`: print one JSON object per event instead of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub enable_stdout: bool,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_stdout: true,
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Read `FLUENT_LOG_LEVEL`, `FLUENT_LOG_STDOUT` and `FLUENT_LOG_FORMAT`,
    /// falling back to [`LoggingConfig::default`] for unset variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            level: env_or(FLUENT_LOG_LEVEL_ENV, &defaults.level),
            enable_stdout: env_flag(FLUENT_LOG_STDOUT_ENV, defaults.enable_stdout),
            json: env_or(FLUENT_LOG_FORMAT_ENV, "text").eq_ignore_ascii_case("json"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install global subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Install a global `tracing` subscriber built from `config`.
///
/// **Effects**
///
/// Installs a [`Registry`] with an [`EnvFilter`] and, when
/// `enable_stdout` is set, a `fmt` layer. Fails instead of panicking if
/// a global subscriber is already installed.
pub fn init_tracing_with_config(config: &LoggingConfig) -> Result<(), InitError> {
    let filter = EnvFilter::try_new(&config.level)?;

    let fmt_layer = if !config.enable_stdout {
        None
    } else if config.json {
        Some(tracing_subscriber::fmt::layer().json().boxed())
    } else {
        Some(tracing_subscriber::fmt::layer().boxed())
    };

    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

/// Initialize tracing from the environment, see [`LoggingConfig::from_env`].
pub fn init_tracing() -> Result<(), InitError> {
    init_tracing_with_config(&LoggingConfig::from_env())
}
