//! Logging service and sinks
//!
//! A [`LoggingService`] owns one [`Logger`] and a level threshold. Sinks write
//! either the human-readable line or the JSON form of an event, selected by
//! [`EventFormat`].

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFormat {
    Text,
    Json,
}

impl EventFormat {
    pub fn from_preferences() -> Self {
        if config::use_structured_logging() {
            Self::Json
        } else {
            Self::Text
        }
    }

    fn render(self, event: &LogEvent) -> String {
        match self {
            Self::Text => event.format(),
            Self::Json => event.format_json().unwrap_or_else(|_| event.format()),
        }
    }
}

pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Console service at the configured level and format
    pub fn with_config() -> Self {
        let min_level = config::get_min_log_level();
        let console = ConsoleLogger::new(min_level, EventFormat::from_preferences());
        Self::new(Arc::new(console), min_level)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }
}

/// Errors and warnings go to stderr, everything else to stdout
pub struct ConsoleLogger {
    min_level: LogLevel,
    format: EventFormat,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel, format: EventFormat) -> Self {
        Self { min_level, format }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.level > self.min_level {
            return;
        }
        let line = self.format.render(event);
        match event.level {
            LogLevel::Error | LogLevel::Warning => eprintln!("{}", line),
            _ => println!("{}", line),
        }
    }
}

/// Appends one line per event to a file opened once at construction
pub struct FileLogger {
    file: Mutex<File>,
    min_level: LogLevel,
    format: EventFormat,
}

impl FileLogger {
    pub fn new(path: &Path, min_level: LogLevel, format: EventFormat) -> std::io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            file: Mutex::new(file),
            min_level,
            format,
        })
    }
}

impl Logger for FileLogger {
    fn log(&self, event: &LogEvent) {
        if event.level > self.min_level {
            return;
        }
        let line = self.format.render(event);
        let mut file = self
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // A failed write cannot itself be logged
        let _ = writeln!(file, "{}", line);
    }
}

/// Captures events in memory, keeping at most the configured buffer size
#[derive(Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn event_count(&self) -> usize {
        self.lock().len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn has_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.code == code)
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.lock();
        let capacity = config::get_error_buffer_size();
        if events.len() >= capacity {
            let excess = events.len() + 1 - capacity;
            events.drain(..excess);
        }
        events.push(event.clone());
    }
}

/// Fans every event out to each attached sink
pub struct MultiLogger {
    loggers: Vec<Arc<dyn Logger>>,
    min_level: LogLevel,
}

impl MultiLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            loggers: Vec::new(),
            min_level,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.loggers.push(logger);
        self
    }

    pub fn with_memory(self) -> (Self, Arc<MemoryLogger>) {
        let memory = Arc::new(MemoryLogger::new());
        (self.with_logger(memory.clone()), memory)
    }

    pub fn logger_count(&self) -> usize {
        self.loggers.len()
    }
}

impl Logger for MultiLogger {
    fn log(&self, event: &LogEvent) {
        if event.level > self.min_level {
            return;
        }
        for logger in &self.loggers {
            logger.log(event);
        }
    }
}

pub fn create_configured_service() -> LoggingService {
    LoggingService::with_config()
}

/// Console sink (when enabled) plus an optional log file
pub fn create_configured_multi_logger(log_file: Option<&Path>) -> std::io::Result<MultiLogger> {
    let min_level = config::get_min_log_level();
    let format = EventFormat::from_preferences();
    let mut multi = MultiLogger::new(min_level);

    if config::use_console_logging() {
        multi = multi.with_logger(Arc::new(ConsoleLogger::new(min_level, format)));
    }
    if let Some(path) = log_file {
        multi = multi.with_logger(Arc::new(FileLogger::new(path, min_level, format)?));
    }

    Ok(multi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use tempfile::TempDir;

    #[test]
    fn test_memory_logger_records_events() {
        let logger = MemoryLogger::new();
        logger.log(&LogEvent::info("scanning"));
        logger.log(&LogEvent::error(codes::clause::UNKNOWN_CLAUSE, "unknown clause"));
        logger.log(&LogEvent::warning_with_code(
            codes::clause::EXPECTED_COLON,
            "expected ':'",
        ));

        assert_eq!(logger.event_count(), 3);
        assert!(logger.has_code(codes::clause::UNKNOWN_CLAUSE));
        assert!(logger.has_code(codes::clause::EXPECTED_COLON));

        logger.clear();
        assert_eq!(logger.event_count(), 0);
    }

    #[test]
    fn test_multi_logger_fans_out() {
        let (multi, first) = MultiLogger::new(LogLevel::Debug).with_memory();
        let (multi, second) = multi.with_memory();

        multi.log(&LogEvent::info("parsed"));

        assert_eq!(multi.logger_count(), 2);
        assert_eq!(first.event_count(), 1);
        assert_eq!(second.event_count(), 1);
    }

    #[test]
    fn test_logging_service_filters_by_level() {
        let logger = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(logger.clone(), LogLevel::Warning);

        service.log_event(LogEvent::debug("folded"));
        service.log_event(LogEvent::info("scanning"));
        service.log_event(LogEvent::warning_with_code(
            codes::directive::EXTRA_TOKENS,
            "extra tokens",
        ));
        service.log_event(LogEvent::error(codes::system::INTERNAL_ERROR, "broken"));

        assert_eq!(logger.event_count(), 2);
        assert!(logger.has_code(codes::system::INTERNAL_ERROR));
    }

    #[test]
    fn test_file_logger_appends_json_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("parse.log");
        let logger = FileLogger::new(&path, LogLevel::Info, EventFormat::Json).unwrap();

        logger.log(&LogEvent::success(codes::success::SOURCE_PROCESSED, "done"));
        logger.log(&LogEvent::debug("filtered"));
        drop(logger);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("\"code\":\"I006\""));
    }
}
