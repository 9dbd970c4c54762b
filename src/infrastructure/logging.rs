//! Log manager: a private tracing dispatcher with a reloadable level
//!
//! Nothing is installed globally. Code that should log through the manager
//! runs inside [`LogManager::scope`].

use std::fmt::{self, Write as _};
use std::str::FromStr;

use thiserror::Error;
use tracing::{info, warn, Dispatch, Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::{Format, FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{reload, Registry};

use crate::infrastructure::io::Io;

/// Log levels accepted in manifests and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Logging disabled
    Panic,
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid log level: {0}")]
pub struct InvalidLogLevel(pub String);

impl LogLevel {
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Panic => LevelFilter::OFF,
            LogLevel::Fatal | LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = InvalidLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "panic" => Ok(LogLevel::Panic),
            "fatal" => Ok(LogLevel::Fatal),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(InvalidLogLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Panic => "panic",
            LogLevel::Fatal => "fatal",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// Full event format with a fixed prefix in front of each line.
struct PrefixedFormat {
    prefix: String,
    inner: Format,
}

impl<S, N> FormatEvent<S, N> for PrefixedFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{}", self.prefix)?;
        self.inner.format_event(ctx, writer, event)
    }
}

/// Owns the runtime's logger and its current level.
pub struct LogManager {
    dispatch: Dispatch,
    handle: reload::Handle<LevelFilter, Registry>,
    level: LogLevel,
}

impl LogManager {
    /// Create a logger writing to `io`'s stderr.
    ///
    /// An invalid `level` falls back to info and is reported as a warning.
    pub fn new(level: &str, prefix: &str, io: &Io) -> Self {
        let (initial, invalid) = match level.parse::<LogLevel>() {
            Ok(l) => (l, None),
            Err(e) => (LogLevel::Info, Some(e)),
        };

        let (filter, handle) = reload::Layer::new(initial.filter());
        let format = PrefixedFormat {
            prefix: prefix.to_string(),
            inner: Format::default().with_target(false),
        };
        let subscriber = tracing_subscriber::registry().with(filter).with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(io.clone())
                .with_ansi(!io.is_headless()),
        );

        let manager = Self {
            dispatch: Dispatch::new(subscriber),
            handle,
            level: initial,
        };
        if let Some(e) = invalid {
            manager.scope(|| warn!("{}, using {}", e, initial));
        }
        manager
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Run `f` with this manager's logger as the default.
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Switch to `level` if it is valid and differs from the current one.
    ///
    /// The change is announced at info level before it takes effect.
    pub fn try_set_log_level(&mut self, level: &str) {
        if level.is_empty() {
            return;
        }
        let parsed = match level.parse::<LogLevel>() {
            Ok(l) => l,
            Err(e) => {
                self.scope(|| warn!("{}", e));
                return;
            }
        };
        if parsed == self.level {
            return;
        }

        let current = self.level;
        self.scope(|| info!("Changing loglevel to {} (from {})", parsed, current));
        if let Err(e) = self.handle.modify(|filter| *filter = parsed.filter()) {
            self.scope(|| warn!("failed to change log level: {}", e));
            return;
        }
        self.level = parsed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::debug;

    #[test]
    fn test_level_names_round_trip_through_display() {
        for name in ["panic", "fatal", "error", "warn", "info", "debug", "trace"] {
            assert_eq!(name.parse::<LogLevel>().unwrap().to_string(), name);
        }
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_level_change_is_announced_then_applied() {
        let io = Io::headless();
        let mut log = LogManager::new("debug", "[test] ", &io);

        log.try_set_log_level("error");
        log.scope(|| debug!("hidden after change"));

        let stderr = io.captured_stderr().unwrap();
        assert!(stderr.contains("[test] "), "{stderr}");
        assert!(stderr.contains("Changing loglevel to error (from debug)"), "{stderr}");
        assert!(!stderr.contains("hidden after change"), "{stderr}");
        assert_eq!(log.level(), LogLevel::Error);
    }

    #[test]
    fn test_panic_disables_logging() {
        let io = Io::headless();
        let mut log = LogManager::new("info", "", &io);
        log.try_set_log_level("panic");
        log.scope(|| tracing::error!("not shown"));
        assert!(!io.captured_stderr().unwrap().contains("not shown"));
    }

    #[test]
    fn test_invalid_level_keeps_current() {
        let io = Io::headless();
        let mut log = LogManager::new("info", "", &io);
        log.try_set_log_level("loud");
        assert_eq!(log.level(), LogLevel::Info);
        assert!(io.captured_stderr().unwrap().contains("invalid log level: loud"));
    }
}
