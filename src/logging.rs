/// Structured logging for the recall monitoring pipeline.
///
/// Provides context-rich logging with data-source tags, timestamps, and
/// severity levels. Supports both console output and file-based logging.
/// User-visible degradation (fallback data in use, dropped records) is
/// reported through here as log lines, never as raw stack traces.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::FetchError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    OpenFda,
    Sample,
    Pipeline,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::OpenFda => write!(f, "OPENFDA"),
            DataSource::Sample => write!(f, "SAMPLE"),
            DataSource::Pipeline => write!(f, "PIPELINE"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - empty result windows, API maintenance
    Expected,
    /// Unexpected failure - indicates service degradation or a contract change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>) {
        let logger = Logger { min_level, log_file };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, source: &DataSource, context: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let context_part = context.map(|c| format!(" [{}]", c)).unwrap_or_default();
        let log_entry = format!("{} {} {}{}: {}", timestamp, level, source, context_part, message);

        match level {
            LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
            LogLevel::Info | LogLevel::Debug => println!("{}", log_entry),
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>) {
    Logger::init(min_level, log_file.map(String::from));
}

/// Log a general informational message
pub fn info(source: DataSource, context: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(LogLevel::Info, &source, context, message);
        }
    }
}

/// Log a warning message
pub fn warn(source: DataSource, context: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(LogLevel::Warning, &source, context, message);
        }
    }
}

/// Log an error message
pub fn error(source: DataSource, context: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(LogLevel::Error, &source, context, message);
        }
    }
}

/// Log a debug message
pub fn debug(source: DataSource, context: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(LogLevel::Debug, &source, context, message);
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a fetch failure by its typed error rather than message text.
pub fn classify_fetch_failure(err: &FetchError) -> FailureType {
    match err {
        // Rate limiting is a documented openFDA behavior for keyless clients.
        FetchError::RateLimited => FailureType::Expected,
        // Server errors and contract changes point at service degradation.
        FetchError::HttpError(code) if *code >= 500 => FailureType::Unexpected,
        FetchError::MalformedResponse(_) => FailureType::Unexpected,
        FetchError::InvalidQuery(_) => FailureType::Unexpected,
        FetchError::FallbackUnavailable(_) => FailureType::Unexpected,
        FetchError::HttpError(_) => FailureType::Unknown,
        FetchError::Network(_) => FailureType::Unknown,
    }
}

/// Log a fetch failure with automatic classification.
pub fn log_fetch_failure(operation: &str, err: &FetchError) {
    let failure_type = classify_fetch_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(DataSource::OpenFda, None, &message),
        FailureType::Unexpected => error(DataSource::OpenFda, None, &message),
        FailureType::Unknown => warn(DataSource::OpenFda, None, &message),
    }
}

// ---------------------------------------------------------------------------
// Pipeline Summary Logging
// ---------------------------------------------------------------------------

/// Log a one-line summary of a completed dataset build: the degraded-data
/// banner when fallback occurred, plus the dropped-record count.
pub fn log_build_summary(total: usize, dropped: usize, used_fallback: bool) {
    let message = format!(
        "dataset built: {} records, {} dropped (unparseable date)",
        total, dropped
    );

    if used_fallback {
        warn(
            DataSource::Pipeline,
            None,
            &format!("{} — FALLBACK DATA IN USE, live API unavailable", message),
        );
    } else if dropped > 0 {
        warn(DataSource::Pipeline, None, &message);
    } else {
        info(DataSource::Pipeline, None, &message);
    }
}
