//! Routes `log` records into the event-log pane.
//!
//! Writing to stderr would corrupt the alternate screen, so while the
//! dashboard runs the global logger appends to a bounded in-memory ring
//! that the renderer reads from.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Local};
use log::{Level, Log, Metadata, Record};
use pretty_env_logger::env_logger::{self, Env};

/// Filter used when `RUST_LOG` is unset: our own crates at `info`,
/// everything else limited to warnings so HTTP internals do not drown the
/// pane.
const DEFAULT_FILTER: &str = "warn,wildfire_risk=info";

/// A captured log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// When the record was emitted.
    pub time: DateTime<Local>,
    /// Severity.
    pub level: Level,
    /// Formatted message.
    pub message: String,
}

/// Shared ring of recent log lines.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    lines: Arc<Mutex<VecDeque<LogLine>>>,
    capacity: usize,
}

impl LogBuffer {
    /// Creates an empty ring holding at most `capacity` lines.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Appends a line, evicting the oldest when full.
    pub fn push(&self, line: LogLine) {
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// The newest `n` lines, oldest first.
    #[must_use]
    pub fn tail(&self, n: usize) -> Vec<LogLine> {
        let lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        lines.iter().skip(lines.len().saturating_sub(n)).cloned().collect()
    }

    /// Number of lines held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no lines are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct PaneLogger {
    buffer: LogBuffer,
    filter: env_logger::Logger,
}

impl PaneLogger {
    fn new<'a>(buffer: LogBuffer, env: impl Into<Env<'a>>) -> Self {
        let filter = pretty_env_logger::formatted_builder()
            .parse_env(env)
            .build();
        Self { buffer, filter }
    }
}

impl Log for PaneLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.filter.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.buffer.push(LogLine {
                time: Local::now(),
                level: record.level(),
                message: record.args().to_string(),
            });
        }
    }

    fn flush(&self) {}
}

/// Installs the pane logger as the global logger, filtered by `RUST_LOG`
/// with the usual `env_logger` directive syntax.
///
/// # Errors
///
/// Returns [`log::SetLoggerError`] if a global logger is already set.
pub fn install(capacity: usize) -> Result<LogBuffer, log::SetLoggerError> {
    let buffer = LogBuffer::new(capacity);
    let env = Env::new().filter_or("RUST_LOG", DEFAULT_FILTER);
    let logger = PaneLogger::new(buffer.clone(), env);
    let level = logger.filter.filter();

    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(buffer)
}
