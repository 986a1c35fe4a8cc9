//! Tracing subscriber setup
//!
//! The crate only emits `tracing` events (targets under `url_manager`).
//! Applications that do not install their own subscriber can use the helpers
//! here.
//!
//! ## Example
//!
//! ```rust,ignore
//! use url_manager::telemetry::{init_subscriber, OutputFormat, SubscriberConfig};
//!
//! let config = SubscriberConfig::builder()
//!     .log_level(tracing::Level::DEBUG)
//!     .output_format(OutputFormat::Json)
//!     .build();
//! let _guard = init_subscriber(config)?;
//! ```

use crate::error::{Result, UrlManagerError};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Environment variable holding the log level.
pub const ENV_LOG_LEVEL: &str = "URL_MANAGER_LOG_LEVEL";
/// Environment variable holding the output format.
pub const ENV_LOG_FORMAT: &str = "URL_MANAGER_LOG_FORMAT";
/// Environment variable holding the log file path.
pub const ENV_LOG_FILE: &str = "URL_MANAGER_LOG_FILE";

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format
    Json,
    /// Compact JSON format
    JsonCompact,
}

impl FromStr for OutputFormat {
    type Err = UrlManagerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "json-compact" => Ok(Self::JsonCompact),
            other => Err(UrlManagerError::Custom(format!(
                "invalid log format: {other}. Valid options: text, json, json-compact"
            ))),
        }
    }
}

/// Parse a level name (`trace` .. `error`).
pub fn parse_level(level: &str) -> Result<tracing::Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(tracing::Level::TRACE),
        "debug" => Ok(tracing::Level::DEBUG),
        "info" => Ok(tracing::Level::INFO),
        "warn" => Ok(tracing::Level::WARN),
        "error" => Ok(tracing::Level::ERROR),
        other => Err(UrlManagerError::Custom(format!(
            "invalid log level: {other}. Valid options: trace, debug, info, warn, error"
        ))),
    }
}

/// Configuration for the tracing subscriber
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
    /// Write to stdout when no log file is set.
    pub enable_console: bool,
    /// Write to this file instead of stdout.
    pub log_file: Option<PathBuf>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            output_format: OutputFormat::Text,
            enable_console: true,
            log_file: None,
        }
    }
}

impl SubscriberConfig {
    pub fn builder() -> SubscriberConfigBuilder {
        SubscriberConfigBuilder::default()
    }

    /// Debug-level text output on stdout.
    pub fn debug() -> Self {
        Self {
            log_level: tracing::Level::DEBUG,
            ..Self::default()
        }
    }

    fn filter(&self) -> Result<EnvFilter> {
        let level = self.log_level.as_str().to_lowercase();
        EnvFilter::try_new(format!("url_manager={level}"))
            .map_err(|e| UrlManagerError::Custom(format!("invalid log filter: {e}")))
    }
}

/// Builder for SubscriberConfig
#[derive(Debug, Default)]
pub struct SubscriberConfigBuilder {
    log_level: Option<tracing::Level>,
    output_format: Option<OutputFormat>,
    enable_console: Option<bool>,
    log_file: Option<PathBuf>,
}

impl SubscriberConfigBuilder {
    pub fn log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the log level from a string
    pub fn log_level_str(mut self, level: &str) -> Result<Self> {
        self.log_level = Some(parse_level(level)?);
        Ok(self)
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn enable_console(mut self, enable: bool) -> Self {
        self.enable_console = Some(enable);
        self
    }

    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn build(self) -> SubscriberConfig {
        SubscriberConfig {
            log_level: self.log_level.unwrap_or(tracing::Level::INFO),
            output_format: self.output_format.unwrap_or_default(),
            enable_console: self.enable_console.unwrap_or(true),
            log_file: self.log_file,
        }
    }
}

fn make_writer(config: &SubscriberConfig) -> Result<(BoxMakeWriter, Option<WorkerGuard>)> {
    if let Some(path) = &config.log_file {
        let file_name = path.file_name().ok_or_else(|| {
            UrlManagerError::Io(format!("log file path has no file name: {}", path.display()))
        })?;
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let appender = tracing_appender::rolling::never(directory, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        return Ok((BoxMakeWriter::new(writer), Some(guard)));
    }
    if config.enable_console {
        Ok((BoxMakeWriter::new(std::io::stdout), None))
    } else {
        Ok((BoxMakeWriter::new(std::io::sink), None))
    }
}

/// Install a global `fmt` subscriber built from `config`.
///
/// Returns the file writer's guard when `log_file` is set; keep it alive for
/// as long as logs should be flushed. A subscriber that is already installed
/// is left in place and reported as success.
pub fn init_subscriber(config: SubscriberConfig) -> Result<Option<WorkerGuard>> {
    let filter = config.filter()?;
    let (writer, guard) = make_writer(&config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true);

    let init_result = match config.output_format {
        OutputFormat::Json => builder
            .with_thread_ids(true)
            .with_thread_names(true)
            .json()
            .try_init(),
        OutputFormat::JsonCompact => builder
            .with_thread_ids(true)
            .with_thread_names(true)
            .json()
            .flatten_event(true)
            .try_init(),
        OutputFormat::Text => builder.try_init(),
    };

    match init_result {
        Ok(()) => Ok(guard),
        Err(e) if e.to_string().contains("has already been set") => Ok(None),
        Err(e) => Err(UrlManagerError::Custom(format!(
            "failed to initialize tracing: {e}"
        ))),
    }
}

/// Configuration read from `URL_MANAGER_LOG_LEVEL`, `URL_MANAGER_LOG_FORMAT`
/// and `URL_MANAGER_LOG_FILE`; unset variables keep their defaults.
pub fn config_from_env() -> Result<SubscriberConfig> {
    let mut builder = SubscriberConfig::builder();
    if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
        builder = builder.log_level_str(&level)?;
    }
    if let Ok(format) = std::env::var(ENV_LOG_FORMAT) {
        builder = builder.output_format(format.parse()?);
    }
    if let Ok(file) = std::env::var(ENV_LOG_FILE) {
        builder = builder.log_file(file);
    }
    Ok(builder.build())
}

/// Initialize the subscriber from environment variables.
pub fn init_from_env() -> Result<Option<WorkerGuard>> {
    init_subscriber(config_from_env()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = SubscriberConfig::builder().build();
        assert_eq!(config.log_level, tracing::Level::INFO);
        assert_eq!(config.output_format, OutputFormat::Text);
        assert!(config.enable_console);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn parses_levels_and_formats() {
        assert_eq!(parse_level("DEBUG").unwrap(), tracing::Level::DEBUG);
        assert!(parse_level("loud").is_err());
        assert_eq!("json-compact".parse::<OutputFormat>().unwrap(), OutputFormat::JsonCompact);
        assert!("xml".parse::<OutputFormat>().is_err());

        let config = SubscriberConfig::builder()
            .log_level_str("warn")
            .unwrap()
            .log_file("logs/app.log")
            .build();
        assert_eq!(config.log_level, tracing::Level::WARN);
        assert_eq!(config.log_file, Some(PathBuf::from("logs/app.log")));
    }

    #[test]
    fn filter_targets_the_crate() {
        let filter = SubscriberConfig::debug().filter().unwrap();
        assert_eq!(filter.to_string(), "url_manager=debug");
    }
}
