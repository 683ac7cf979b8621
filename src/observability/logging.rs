//! Logging configuration and request/response log helpers.

use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Longest response body excerpt written to the log.
const MAX_LOGGED_BODY: usize = 1000;

/// Subscriber settings for applications that don't install their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Level used when `RUST_LOG` is unset.
    pub level: Level,
    /// Output format.
    pub format: LogFormat,
    /// Include the event target (module path).
    pub with_target: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human readable.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
    /// Single-line text.
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Creates the default configuration: `INFO`, pretty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level used when `RUST_LOG` is unset.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets whether events include their target.
    pub fn with_target(mut self, include: bool) -> Self {
        self.with_target = include;
        self
    }

    /// Installs a global subscriber with this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber has already been installed.
    pub fn init(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(self.level).into())
            .from_env_lossy();
        let target = self.with_target;
        let format = self.format;

        tracing_subscriber::registry()
            .with(filter)
            .with((format == LogFormat::Pretty).then(|| fmt::layer().pretty().with_target(target)))
            .with((format == LogFormat::Json).then(|| fmt::layer().json().with_target(target)))
            .with(
                (format == LogFormat::Compact).then(|| fmt::layer().compact().with_target(target)),
            )
            .try_init()?;

        Ok(())
    }
}

/// Logs an outgoing HTTP request. Headers are never logged.
pub fn log_request(method: &str, url: &str, body: Option<&str>) {
    tracing::debug!(
        method = method,
        url = url,
        body = body.unwrap_or("<empty>"),
        "Outgoing request"
    );
}

/// Logs an incoming HTTP response, truncating long bodies.
pub fn log_response(status: u16, duration_ms: u64, body: Option<&str>) {
    tracing::debug!(
        status = status,
        duration_ms = duration_ms,
        body = body.map(truncate_body).unwrap_or("<empty>"),
        "Incoming response"
    );
}

fn truncate_body(body: &str) -> &str {
    if body.len() <= MAX_LOGGED_BODY {
        return body;
    }
    let mut end = MAX_LOGGED_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
