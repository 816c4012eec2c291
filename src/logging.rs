//! Logging System
//!
//! Structured logging using the `tracing` crate. Level, format and
//! destination come from [`LoggingConfig`] and can be overridden with the
//! `MRD_LOG`, `MRD_LOG_FORMAT` and `MRD_LOG_OUTPUT` environment variables.

use crate::error::MrdError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = MrdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(MrdError::config(format!(
                "Invalid log format: {} (must be 'json' or 'text')",
                other
            ))),
        }
    }
}

/// Where log lines go. Results are printed on stdout, so logs default to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    #[default]
    Stderr,
    File,
}

impl FromStr for LogOutput {
    type Err = MrdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(LogOutput::Stdout),
            "stderr" => Ok(LogOutput::Stderr),
            "file" => Ok(LogOutput::File),
            other => Err(MrdError::config(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr' or 'file')",
                other
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file path, used when `output = "file"`
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// Enable colored output (text format on a terminal stream only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels, e.g. `"mrd::executor" = "debug"`
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from(".mrd/mrd.log")
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file: default_log_file(),
            color: default_true(),
            modules: BTreeMap::new(),
        }
    }
}

/// Initialize the global subscriber.
///
/// Priority order (highest to lowest):
/// 1. Environment variables (MRD_LOG, MRD_LOG_FORMAT, MRD_LOG_OUTPUT)
/// 2. Configuration
/// 3. Defaults
///
/// Calling this twice is an error; the first subscriber stays installed.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), MrdError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);

    let filter = build_env_filter(config)?;
    let format = env_override("MRD_LOG_FORMAT")?.unwrap_or(config.format);
    let output = env_override("MRD_LOG_OUTPUT")?.unwrap_or(config.output);

    let ansi = config.color && format == LogFormat::Text && output != LogOutput::File;
    let writer = make_writer(output, config)?;

    let base_subscriber = Registry::default().with(filter);
    let result = match format {
        LogFormat::Json => base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Text => base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init(),
    };
    result.map_err(|e| MrdError::config(format!("Failed to initialize logging: {}", e)))
}

fn env_override<T: FromStr<Err = MrdError>>(var: &str) -> Result<Option<T>, MrdError> {
    match std::env::var(var) {
        Ok(value) => value.parse().map(Some),
        Err(_) => Ok(None),
    }
}

fn make_writer(output: LogOutput, config: &LoggingConfig) -> Result<BoxMakeWriter, MrdError> {
    Ok(match output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::File => {
            if let Some(parent) = config.file.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    MrdError::config(format!("Failed to create log directory: {}", e))
                })?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.file)
                .map_err(|e| {
                    MrdError::config(format!(
                        "Failed to open log file {:?}: {}",
                        config.file, e
                    ))
                })?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
    })
}

/// `MRD_LOG` wins outright; otherwise the configured level plus module directives.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, MrdError> {
    if let Ok(filter) = EnvFilter::try_from_env("MRD_LOG") {
        return Ok(filter);
    }
    filter_from_config(config)
}

fn filter_from_config(config: &LoggingConfig) -> Result<EnvFilter, MrdError> {
    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| MrdError::config(format!("Invalid log level {}: {}", config.level, e)))?;
    for (module, module_level) in &config.modules {
        let directive = format!("{}={}", module, module_level);
        filter = filter.add_directive(
            directive
                .parse()
                .map_err(|e| MrdError::config(format!("Invalid log directive: {}", e)))?,
        );
    }
    Ok(filter)
}
