//! # Logging Utilities
//!
//! Logging setup for dbgsym using `tracing`.
//!
//! Library crates only emit events through the `tracing` macros; binaries call
//! [`init_logging`] once at startup. Console output goes to stderr so that
//! command results on stdout can be piped without log noise.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dbgsym_utils::{init_logging, LoggingConfig};
//!
//! let _guard = init_logging(&LoggingConfig::from_env()).expect("Failed to initialize logging");
//! tracing::info!("Application started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Filter directives (e.g. `debug`, `dbgsym_core=trace`), used
//!   when no explicit level is configured
//! - `DBGSYM_LOG_FORMAT`: `pretty` (default) or `json`
//! - `DBGSYM_LOG_FILE`: Optional log file; a directory gets a dated
//!   `YYYY-MM-DD-dbgsym.log` file inside it

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use chrono::Utc;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "DBGSYM_LOG_FORMAT";

/// Environment variable naming an optional log file.
pub const LOG_FILE_ENV: &str = "DBGSYM_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Human-readable lines (default)
    #[default]
    Pretty,
    /// One JSON object per event, for log collectors
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" | "dev" => Ok(LogFormat::Pretty),
            "json" | "prod" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(s.to_string())),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel
{
    Error,
    Warn,
    Info,
    Debug,
    /// Most verbose; includes every symbol lookup
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.trim().to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(s.to_string())),
        }
    }
}

/// How the process wants its logs.
///
/// Filter precedence: an explicit `level`, then `RUST_LOG`, then
/// `default_level`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig
{
    pub level: Option<LogLevel>,
    pub default_level: LogLevel,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
    /// Colour console output (never applied to files or JSON).
    pub ansi: bool,
}

impl Default for LoggingConfig
{
    fn default() -> Self
    {
        Self {
            level: None,
            default_level: LogLevel::Warn,
            format: LogFormat::Pretty,
            file: None,
            ansi: true,
        }
    }
}

impl LoggingConfig
{
    /// Defaults overlaid with `DBGSYM_LOG_FORMAT` and `DBGSYM_LOG_FILE`.
    ///
    /// An unparsable format falls back to pretty output.
    pub fn from_env() -> Self
    {
        let format = env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let file = env::var_os(LOG_FILE_ENV).filter(|v| !v.is_empty()).map(PathBuf::from);

        Self {
            format,
            file,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Option<LogLevel>) -> Self
    {
        if level.is_some() {
            self.level = level;
        }
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: Option<LogFormat>) -> Self
    {
        if let Some(format) = format {
            self.format = format;
        }
        self
    }

    #[must_use]
    pub fn with_ansi(mut self, ansi: bool) -> Self
    {
        self.ansi = ansi;
        self
    }

    fn filter(&self) -> EnvFilter
    {
        let fallback = || EnvFilter::new(Level::from(self.default_level).to_string());
        match self.level {
            Some(level) => EnvFilter::new(Level::from(level).to_string()),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback()),
        }
    }
}

/// Keeps the background file writer alive; drop it at the end of `main` to
/// flush buffered log lines.
#[derive(Debug)]
pub struct LoggingGuard
{
    _worker: Option<WorkerGuard>,
    file_path: Option<PathBuf>,
}

impl LoggingGuard
{
    /// Resolved path of the log file, when file logging is on.
    #[must_use]
    pub fn file_path(&self) -> Option<&Path>
    {
        self.file_path.as_deref()
    }
}

/// Install the global subscriber described by `config`.
///
/// ## Errors
///
/// Returns [`LoggingError::FileError`] when the log directory cannot be
/// created and [`LoggingError::InitializationFailed`] when a global subscriber
/// is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError>
{
    let mut layers: Vec<BoxedLayer> = vec![output_layer(config.format, config.ansi, io::stderr)
        .with_filter(config.filter())
        .boxed()];

    let (worker, file_path) = match &config.file {
        Some(requested) => {
            let path = resolve_log_file(requested)?;
            let directory = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            std::fs::create_dir_all(&directory)?;

            let file_name = path.file_name().unwrap_or_default();
            let (writer, worker) = tracing_appender::non_blocking(tracing_appender::rolling::never(&directory, file_name));
            layers.push(output_layer(config.format, false, writer).with_filter(config.filter()).boxed());
            (Some(worker), Some(path))
        }
        None => (None, None),
    };

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    Ok(LoggingGuard {
        _worker: worker,
        file_path,
    })
}

/// Convenience wrapper: environment configuration with an explicit level and
/// format.
///
/// ## Errors
///
/// Same as [`init_logging`].
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    init_logging(&LoggingConfig::from_env().with_level(Some(level)).with_format(Some(format)))
}

fn output_layer<W>(format: LogFormat, ansi: bool, writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_target(true)
        .with_file(false)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(writer);

    match format {
        LogFormat::Pretty => layer.with_ansi(ansi).boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    }
}

/// Directories (existing ones, or paths ending in a separator) get a dated file
/// name; anything else is used as-is.
fn resolve_log_file(requested: &Path) -> Result<PathBuf, LoggingError>
{
    let looks_like_dir = requested.is_dir() || requested.as_os_str().to_string_lossy().ends_with(std::path::MAIN_SEPARATOR);
    if looks_like_dir {
        return Ok(requested.join(dated_file_name()));
    }
    if requested.file_name().is_none() {
        return Err(LoggingError::InvalidFile(requested.display().to_string()));
    }
    Ok(requested.to_path_buf())
}

fn dated_file_name() -> String
{
    format!("{}-dbgsym.log", Utc::now().format("%Y-%m-%d"))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}. Use 'pretty' or 'json'")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}. Use 'error', 'warn', 'info', 'debug', or 'trace'")]
    InvalidLevel(String),

    /// Log file path has no file name
    #[error("Invalid log file path: {0}")]
    InvalidFile(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
