//! Pennant Logging
//!
//! Structured logging for the pennant evaluation engine, controlled by the
//! `PENNANT_*` environment variables.
//!
//! # Usage
//!
//! ```rust
//! use pennant_log::{debug, error, info};
//!
//! debug!("Evaluating flag {}", "new-ui");
//! info!(target: "pennant::segment", "Segment {} loaded", "beta");
//! error!("Lookup failed");
//!
//! // Attach structured fields to a single record
//! pennant_log::log_fields(
//!     pennant_log::Level::Debug,
//!     "pennant::evaluator",
//!     "variation resolved",
//!     &[("flag", "new-ui"), ("variation", "on")],
//! );
//! ```
//!
//! # Environment Variables
//!
//! - `PENNANT_DEBUG=1` - Enable debug logging
//! - `PENNANT_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `PENNANT_LOG_FORMAT=json|compact|facade` - Set output format
//! - `PENNANT_LOG_TIMESTAMPS=1|0` - Include timestamps

use once_cell::sync::Lazy;
use std::env;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

// ============================================================================
// Log Levels
// ============================================================================

/// Record severity; `Off` silences everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Off = 5,
}

impl Level {
    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    /// Matching `log` crate level, `None` for [`Level::Off`].
    fn to_log_level(self) -> Option<log::Level> {
        match self {
            Level::Trace => Some(log::Level::Trace),
            Level::Debug => Some(log::Level::Debug),
            Level::Info => Some(log::Level::Info),
            Level::Warn => Some(log::Level::Warn),
            Level::Error => Some(log::Level::Error),
            Level::Off => None,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// One JSON object per line on stderr
    Json,
    /// Single-line human readable output on stderr
    Compact,
    /// Forward records to whatever `log` implementation the host installed
    Facade,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Format::Json),
            "compact" => Some(Format::Compact),
            "facade" | "log" => Some(Format::Facade),
            _ => None,
        }
    }
}

// ============================================================================
// Global Configuration
// ============================================================================

// Runtime overrides; `from_env` seeds them the first time CONFIG is read.
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

/// Settings read from the environment at first use.
#[derive(Debug)]
pub struct LogConfig {
    pub debug: bool,
    pub level: Level,
    pub format: Format,
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            timestamps: true,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

impl LogConfig {
    /// `PENNANT_DEBUG=1` lowers the default level to debug; an explicit
    /// `PENNANT_LOG_LEVEL` still wins.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let debug = env_flag("PENNANT_DEBUG").unwrap_or(defaults.debug);

        let level = env::var("PENNANT_LOG_LEVEL")
            .ok()
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { defaults.level });

        let format = env::var("PENNANT_LOG_FORMAT")
            .ok()
            .and_then(|s| Format::parse(&s))
            .unwrap_or(defaults.format);

        let timestamps = env_flag("PENNANT_LOG_TIMESTAMPS").unwrap_or(defaults.timestamps);

        DEBUG_ENABLED.store(debug, Ordering::SeqCst);
        LOG_LEVEL.store(level as u8, Ordering::SeqCst);

        Self {
            debug,
            level,
            format,
            timestamps,
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Read the environment now instead of on the first level check.
pub fn init() {
    Lazy::force(&CONFIG);
}

pub fn is_debug_enabled() -> bool {
    init();
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Debug records also pass while debug mode is on, whatever the level.
pub fn is_level_enabled(level: Level) -> bool {
    init();
    match level {
        Level::Off => false,
        Level::Debug if DEBUG_ENABLED.load(Ordering::Relaxed) => true,
        _ => level as u8 >= LOG_LEVEL.load(Ordering::Relaxed),
    }
}

pub fn current_level() -> Level {
    init();
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

pub fn set_level(level: Level) {
    init();
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Turning debug mode on also lowers the level to debug if it is higher.
pub fn set_debug(enabled: bool) {
    init();
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}

pub fn config() -> &'static LogConfig {
    &CONFIG
}

// ============================================================================
// Log Output
// ============================================================================

#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    log_fields(level, target, message, &[]);
}

/// Emit one record with structured key/value fields attached.
pub fn log_fields(level: Level, target: &str, message: &str, fields: &[(&str, &str)]) {
    if !is_level_enabled(level) {
        return;
    }

    let config = config();

    match config.format {
        #[cfg(feature = "json")]
        Format::Json => log_json(level, target, message, fields, config),
        #[cfg(not(feature = "json"))]
        Format::Json => log_compact(level, target, message, fields, config),
        Format::Compact => log_compact(level, target, message, fields, config),
        Format::Facade => log_facade(level, target, message, fields),
    }
}

fn render_fields(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

fn log_compact(
    level: Level,
    target: &str,
    message: &str,
    fields: &[(&str, &str)],
    config: &LogConfig,
) {
    let mut line = String::new();
    if config.timestamps {
        line.push_str(&chrono::Local::now().format("%H:%M:%S%.3f ").to_string());
    }
    line.push_str(&format!("{:5} ", level.as_str()));
    if !target.is_empty() {
        line.push_str(target);
        line.push_str(": ");
    }
    line.push_str(message);
    if !fields.is_empty() {
        line.push(' ');
        line.push_str(&render_fields(fields));
    }

    let _ = writeln!(std::io::stderr().lock(), "{}", line);
}

fn log_facade(level: Level, target: &str, message: &str, fields: &[(&str, &str)]) {
    let Some(log_level) = level.to_log_level() else {
        return;
    };

    if fields.is_empty() {
        log::log!(target: target, log_level, "{}", message);
    } else {
        log::log!(target: target, log_level, "{} {}", message, render_fields(fields));
    }
}

#[cfg(feature = "json")]
#[derive(serde::Serialize)]
struct JsonRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    level: &'a str,
    target: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    fields: std::collections::BTreeMap<&'a str, &'a str>,
}

#[cfg(feature = "json")]
fn log_json(
    level: Level,
    target: &str,
    message: &str,
    fields: &[(&str, &str)],
    config: &LogConfig,
) {
    let record = JsonRecord {
        timestamp: config.timestamps.then(|| chrono::Utc::now().to_rfc3339()),
        level: level.as_str(),
        target,
        message,
        fields: fields.iter().copied().collect(),
    };

    if let Ok(json) = serde_json::to_string(&record) {
        let _ = writeln!(std::io::stderr().lock(), "{}", json);
    }
}

// ============================================================================
// Macros
// ============================================================================

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($level:ident, target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::$level) {
            $crate::log($crate::Level::$level, $target, &format!($($arg)+));
        }
    };
    ($level:ident, $($arg:tt)+) => {
        $crate::__log_at!($level, target: module_path!(), $($arg)+)
    };
}

#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::__log_at!(Trace, $($arg)+) };
}

/// `debug!("..")` or `debug!(target: "pennant::rules", "..")`.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::__log_at!(Debug, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::__log_at!(Info, $($arg)+) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::__log_at!(Warn, $($arg)+) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::__log_at!(Error, $($arg)+) };
}

// ============================================================================
// Tracing Integration
// ============================================================================

#[cfg(feature = "tracing")]
pub mod tracing_compat {
    //! Tracing compatibility layer.
    //!
    //! Builds a subscriber whose filter follows `PENNANT_LOG_LEVEL` unless
    //! `RUST_LOG` is set.

    use super::*;

    pub fn subscriber() -> impl tracing::Subscriber {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config().level.as_str().to_lowercase()));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(false))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Off);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(Level::parse("debug"), Some(Level::Debug));
        assert_eq!(Level::parse("DEBUG"), Some(Level::Debug));
        assert_eq!(Level::parse("warning"), Some(Level::Warn));
        assert_eq!(Level::parse("none"), Some(Level::Off));
        assert_eq!(Level::parse("verbose"), None);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(Format::parse("json"), Some(Format::Json));
        assert_eq!(Format::parse("Compact"), Some(Format::Compact));
        assert_eq!(Format::parse("log"), Some(Format::Facade));
        assert_eq!(Format::parse("pretty"), None);
    }

    #[test]
    fn test_off_is_never_enabled() {
        assert!(!is_level_enabled(Level::Off));
    }

    #[test]
    fn test_level_maps_to_log_facade() {
        assert_eq!(Level::Warn.to_log_level(), Some(log::Level::Warn));
        assert_eq!(Level::Off.to_log_level(), None);
    }

    #[test]
    fn test_render_fields() {
        assert_eq!(
            render_fields(&[("flag", "new-ui"), ("variation", "on")]),
            "flag=new-ui variation=on"
        );
        assert_eq!(render_fields(&[]), "");
    }

    #[test]
    fn test_set_level_and_debug() {
        let original = current_level();
        let original_debug = is_debug_enabled();

        set_level(Level::Error);
        assert_eq!(current_level(), Level::Error);

        set_debug(true);
        assert!(is_debug_enabled());
        assert_eq!(current_level(), Level::Debug);

        // debug mode lets debug records through above the level
        set_level(Level::Error);
        assert!(is_level_enabled(Level::Debug));
        assert!(!is_level_enabled(Level::Info));

        set_debug(false);
        assert!(!is_level_enabled(Level::Debug));

        set_debug(original_debug);
        set_level(original);
    }

    #[test]
    fn test_macros_compile() {
        trace!("trace message");
        debug!("debug message");
        info!("info message");
        warn!("warn message");
        error!("error message");

        debug!(target: "pennant::test", "with target {}", 1);
        log_fields(Level::Info, "pennant::test", "fields", &[("k", "v")]);
    }
}
