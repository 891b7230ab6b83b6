use std::sync::{Arc, OnceLock};

/// Trait representing a logger that can log messages at various levels.
///
/// Implemented by the host to receive this library's log output. It is
/// exported via `UniFFI` for use in foreign languages.
///
/// # Examples
///
/// ```rust
/// use secure_storage_core::logger::{LogLevel, Logger};
///
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         eprintln!("[{level:?}] {message}");
///     }
/// }
/// ```
///
/// ## Swift
///
/// ```swift
/// final class SecureStorageLogBridge: SecureStorageCore.Logger {
///     static let shared = SecureStorageLogBridge()
///
///     func log(level: SecureStorageCore.LogLevel, message: String) {
///         os_log("%{public}@", log: .default, type: level.osLogType, message)
///     }
/// }
///
/// SecureStorageCore.setLogger(logger: SecureStorageLogBridge.shared) // once
/// ```
#[uniffi::export(with_foreign)]
pub trait Logger: Sync + Send {
    /// Logs a message at the specified log level.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a forwarded log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, uniffi::Enum)]
pub enum LogLevel {
    /// Very low priority, extremely detailed messages.
    Trace,
    /// Debugging information, including the keys and scopes of each call.
    Debug,
    /// Progress of normal operation.
    Info,
    /// Lenient fallbacks and degraded protection.
    Warn,
    /// Failures.
    Error,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

/// Target prefix shared by the storage crates.
const OWN_TARGET: &str = "secure_storage";

/// Whether a record is forwarded to the host. Dependencies only get to
/// forward info and above.
fn forwards(level: log::Level, target: &str) -> bool {
    level <= log::Level::Info || target.starts_with(OWN_TARGET)
}

struct ForeignLogger;

impl log::Log for ForeignLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        forwards(metadata.level(), metadata.target())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(logger) = HOST_LOGGER.get() {
            logger.log(record.level().into(), record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static HOST_LOGGER: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Installs the host logger and routes storage log output to it at
/// [`LogLevel::Trace`] and above.
///
/// Only the first call takes effect. If another `log` implementation is
/// already installed in the process, records keep going there.
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if HOST_LOGGER.set(logger).is_err() {
        log::warn!("host logger already installed, ignoring replacement");
        return;
    }
    if let Err(err) = init_logger() {
        eprintln!("secure storage logging unavailable: {err}");
    }
}

/// Changes the lowest level forwarded to the host logger.
///
/// Hosts that must keep item keys out of their logs can raise this to
/// [`LogLevel::Info`].
#[uniffi::export]
pub fn set_log_level(level: LogLevel) {
    log::set_max_level(level.into());
}

fn init_logger() -> Result<(), log::SetLoggerError> {
    static LOGGER: ForeignLogger = ForeignLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct CapturingLogger {
        lines: Mutex<Vec<(LogLevel, String)>>,
    }

    impl Logger for CapturingLogger {
        fn log(&self, level: LogLevel, message: String) {
            self.lines.lock().expect("lock").push((level, message));
        }
    }

    #[test]
    fn test_forwards_fallback_warnings() {
        let logger = Arc::new(CapturingLogger::default());
        set_logger(logger.clone());

        let _ = crate::Accessibility::parse_lenient("bogus");

        let lines = logger.lines.lock().expect("lock");
        assert!(lines
            .iter()
            .any(|(level, message)| *level == LogLevel::Warn && message.contains("bogus")));
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(LogLevel::from(log::Level::Warn), LogLevel::Warn);
        assert_eq!(LogLevel::from(log::Level::Trace), LogLevel::Trace);
        assert_eq!(log::LevelFilter::from(LogLevel::Info), log::LevelFilter::Info);
        assert!(LogLevel::Debug < LogLevel::Warn);
    }

    #[test]
    fn test_dependencies_only_forward_info_and_above() {
        assert!(forwards(log::Level::Trace, "secure_storage_core::engine"));
        assert!(forwards(log::Level::Debug, "secure_storage::bridge"));
        assert!(forwards(log::Level::Warn, "uniffi_core"));
        assert!(!forwards(log::Level::Debug, "uniffi_core"));
    }
}
