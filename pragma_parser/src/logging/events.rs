//! Event system for parser logging

use super::codes::Code;
use crate::utils::Span;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// Core log event structure
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    pub context: HashMap<String, String>,
}

impl LogEvent {
    fn with_level(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: truncate_message(message),
            span: None,
            context: HashMap::new(),
        }
    }

    /// Create a new error event
    pub fn error(error_code: Code, message: &str) -> Self {
        Self::with_level(LogLevel::Error, error_code, message)
    }

    /// Create a new warning event without a specific code
    pub fn warning(message: &str) -> Self {
        Self::with_level(LogLevel::Warning, Code::new("W000"), message)
    }

    /// Create warning with specific code
    pub fn warning_with_code(warning_code: Code, message: &str) -> Self {
        Self::with_level(LogLevel::Warning, warning_code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::with_level(LogLevel::Info, Code::new("I000"), message)
    }

    /// Create a success event (info with success code)
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::with_level(LogLevel::Info, success_code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::with_level(LogLevel::Debug, Code::new("D000"), message)
    }

    /// Add span information
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Add context data
    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    /// Add the name of the source being processed
    pub fn with_source_name(self, name: &str) -> Self {
        self.with_context("source", name)
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    /// Check if this event requires halting
    pub fn requires_halt(&self) -> bool {
        super::codes::requires_halt(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        super::codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        super::codes::get_category(self.code.as_str())
    }

    pub fn description(&self) -> &'static str {
        super::codes::get_description(self.code.as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        super::codes::get_action(self.code.as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        super::codes::is_recoverable(self.code.as_str())
    }

    /// Format for display
    pub fn format(&self) -> String {
        let span_str = self
            .span
            .as_ref()
            .map(|s| format!(" at {}:{}", s.start().line, s.start().column))
            .unwrap_or_default();

        format!(
            "{} [{}] {} - {}{}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.level.as_str(),
            self.code.as_str(),
            self.message,
            span_str
        )
    }

    /// Single-line JSON form used by structured sinks
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let error_metadata = self.is_error().then(|| ErrorMetadata {
            recoverable: self.is_recoverable(),
            requires_halt: self.requires_halt(),
            description: self.description(),
            recommended_action: self.recommended_action(),
        });

        serde_json::to_string(&JsonEvent {
            timestamp: self.timestamp.to_rfc3339(),
            level: self.level.as_str(),
            code: self.code.as_str(),
            message: &self.message,
            category: self.category(),
            severity: self.severity(),
            error_metadata,
            span: self.span.as_ref(),
            context: &self.context,
        })
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    timestamp: String,
    level: &'static str,
    code: &'a str,
    message: &'a str,
    category: &'static str,
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_metadata: Option<ErrorMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    span: Option<&'a Span>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    context: &'a HashMap<String, String>,
}

#[derive(Serialize)]
struct ErrorMetadata {
    recoverable: bool,
    requires_halt: bool,
    description: &'static str,
    recommended_action: &'static str,
}

fn truncate_message(message: &str) -> String {
    let limit = crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
    if message.len() <= limit {
        return message.to_string();
    }
    let mut end = limit;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &message[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_error_event_creation() {
        let event = LogEvent::error(codes::clause::UNKNOWN_CLAUSE, "unknown clause 'foo'");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E070");
        assert_eq!(event.category(), "Clause");
    }

    #[test]
    fn test_event_with_context() {
        let event = LogEvent::error(codes::clause::CLAUSE_NOT_ALLOWED, "not allowed")
            .with_context("clause", "collapse")
            .with_source_name("kernel.c");

        assert_eq!(event.context.get("clause"), Some(&"collapse".to_string()));
        assert_eq!(event.context.get("source"), Some(&"kernel.c".to_string()));
    }

    #[test]
    fn test_event_formatting() {
        let event = LogEvent::error(codes::directive::UNKNOWN_DIRECTIVE, "unknown directive");
        let formatted = event.format();

        assert!(formatted.contains("[ERROR]"));
        assert!(formatted.contains("E060"));
        assert_eq!(event.category(), "Directive");
        assert!(event.is_recoverable());
    }

    #[test]
    fn test_warning_events() {
        let generic = LogEvent::warning("Generic warning");
        assert_eq!(generic.code.as_str(), "W000");

        let coded = LogEvent::warning_with_code(codes::clause::EXPECTED_COLON, "expected ':'");
        assert!(coded.is_warning());
        assert_eq!(coded.severity(), "Low");
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::error(codes::system::INTERNAL_ERROR, "failure")
            .with_span(Span::dummy())
            .with_context("phase", "clauses");

        let json: serde_json::Value =
            serde_json::from_str(&event.format_json().unwrap()).unwrap();
        assert_eq!(json["level"], "ERROR");
        assert_eq!(json["code"], "ERR001");
        assert_eq!(json["error_metadata"]["requires_halt"], true);
        assert_eq!(json["context"]["phase"], "clauses");
        assert_eq!(json["span"]["start"]["line"], 1);
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let limit = crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
        let message = "x".repeat(limit + 10);
        let event = LogEvent::info(&message);
        assert_eq!(event.message.len(), limit + 3);
        assert!(event.message.ends_with("..."));
    }
}
