//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Progress and diagnostics go to stderr through `tracing`. Validation
//! warnings are not log events; the warnings sink prints those to stdout.
//!
//! # Levels
//!
//! - `warn`: default, near-silent
//! - `info`: one line per pipeline stage (`-v`)
//! - `debug`: per-table and per-student detail (`-vv`)
//! - `trace`: everything (`-vvv`)

use std::io;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level filter.
    pub level: Level,
    /// Whether to include timestamps.
    pub with_timestamps: bool,
    /// Whether to use ANSI colors.
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_timestamps: false,
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// Map a `-v` count to a level: 0 warn, 1 info, 2 debug, 3+ trace.
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_timestamps(mut self, enable: bool) -> Self {
        self.with_timestamps = enable;
        self
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }
}

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this twice
/// is harmless: the second call leaves the first subscriber in place.
pub fn init_logging(config: &LogConfig) {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(false);

    let registry = tracing_subscriber::registry().with(build_env_filter(config.level));
    let _ = if config.with_timestamps {
        registry.with(layer).try_init()
    } else {
        registry.with(layer.without_time()).try_init()
    };
}

/// Build an `EnvFilter` from the given level, respecting `RUST_LOG`.
fn build_env_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,pfai={level},fitnessgram2pfai={level}")))
}
