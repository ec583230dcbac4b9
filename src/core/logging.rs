//! Tracing setup.
//!
//! gcall is quiet by default: only `error` events from the `gcall` target are
//! emitted, and classified failures are reported through the diagnostic log
//! rather than through tracing. Set `GCALL_LOG=debug` to follow discovery
//! lookups, token exchanges and dispatch decisions. `RUST_LOG` overrides the
//! whole filter.

use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

pub const LOG_LEVEL_ENV: &str = "GCALL_LOG";
pub const LOG_FORMAT_ENV: &str = "GCALL_LOG_FORMAT";
pub const LOG_FILE_ENV: &str = "GCALL_LOG_FILE";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable logs.
    #[default]
    Human,
    /// One JSON object per event.
    Json,
    /// Single-line terse logs.
    Compact,
}

impl LogFormat {
    /// Parse a format name (case-insensitive).
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Parse a level name. Accepts the usual tracing names plus `verbose`
/// (debug) and `critical` (error).
#[must_use]
pub fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "verbose" | "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" | "critical" | "crit" => Some(Level::ERROR),
        _ => None,
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Level from `GCALL_LOG`.
#[must_use]
pub fn parse_log_level_from_env() -> Option<Level> {
    non_empty_env(LOG_LEVEL_ENV).and_then(|v| parse_level(&v))
}

/// Format from `GCALL_LOG_FORMAT`.
#[must_use]
pub fn parse_log_format_from_env() -> Option<LogFormat> {
    non_empty_env(LOG_FORMAT_ENV).and_then(|v| LogFormat::from_arg(&v))
}

/// Log file from `GCALL_LOG_FILE`.
#[must_use]
pub fn parse_log_file_from_env() -> Option<PathBuf> {
    non_empty_env(LOG_FILE_ENV).map(PathBuf::from)
}

/// Filter directive used when `RUST_LOG` is unset.
#[must_use]
pub fn default_directive(level: Level) -> String {
    format!("gcall={}", level.as_str().to_lowercase())
}

/// Install the global subscriber. Events go to `log_file` when it can be
/// opened for appending, else to stderr. A second call is a no-op.
pub fn init(level: Level, format: LogFormat, log_file: Option<PathBuf>) {
    let file = log_file.and_then(|path| OpenOptions::new().create(true).append(true).open(path).ok());
    let writer = match file {
        Some(file) => BoxMakeWriter::new(file),
        None => BoxMakeWriter::new(std::io::stderr),
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);
    match format {
        LogFormat::Json => builder.json().try_init().ok(),
        LogFormat::Compact => builder.compact().with_target(true).try_init().ok(),
        LogFormat::Human => builder.with_target(false).without_time().try_init().ok(),
    };
}

/// Install the subscriber from `GCALL_LOG*` variables, defaulting to `error`
/// and human format.
pub fn init_from_env() {
    init(
        parse_log_level_from_env().unwrap_or(Level::ERROR),
        parse_log_format_from_env().unwrap_or_default(),
        parse_log_file_from_env(),
    );
}
