//! Global logging module for the pragma parser
//!
//! Provides thread-safe global logging with per-source context and a clean
//! macro interface. Logging is optional: every macro is a no-op until
//! [`init_global_logging`] or [`init_global_logging_with_service`] runs.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use crate::utils::Span;
use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{
    ConsoleLogger, EventFormat, FileLogger, Logger, LoggingService, MemoryLogger, MultiLogger,
};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

/// Name of the source being processed on this thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub source_name: String,
    pub events_logged: usize,
}

thread_local! {
    static SOURCE_CONTEXT: RefCell<Option<SourceContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from the configured preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;
    let service = Arc::new(service::create_configured_service());
    install(service)
}

/// Initialize with a custom service (CLI targets, tests)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;
    install(service)
}

fn install(service: Arc<LoggingService>) -> Result<(), String> {
    let sentinel_codes = [
        codes::system::INTERNAL_ERROR,
        codes::directive::UNKNOWN_DIRECTIVE,
        codes::clause::UNKNOWN_CLAUSE,
    ];
    for code in sentinel_codes {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    GLOBAL_LOGGER
        .set(service.clone())
        .map_err(|_| "Global logger already initialized".to_string())?;

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// SOURCE CONTEXT MANAGEMENT
// ============================================================================

pub fn set_source_context(source_name: &str) {
    SOURCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(SourceContext {
            source_name: source_name.to_string(),
            events_logged: 0,
        });
    });
}

pub fn clear_source_context() {
    SOURCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with `source_name` as the current source
pub fn with_source_context<F, R>(source_name: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_source_context();
    set_source_context(source_name);
    let result = f();
    SOURCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = previous;
    });
    result
}

pub fn get_current_source_context() -> Option<SourceContext> {
    SOURCE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Tag an event with the current source name when enabled (used by macros)
pub fn attach_source_context(event: LogEvent) -> LogEvent {
    if !config::include_source_context() {
        return event;
    }
    match get_current_source_context() {
        Some(ctx) => event.with_source_name(&ctx.source_name),
        None => event,
    }
}

/// Per-source event cap; errors are always delivered
fn within_source_budget(event: &LogEvent) -> bool {
    SOURCE_CONTEXT.with(|ctx| {
        let mut ctx = ctx.borrow_mut();
        let Some(source) = ctx.as_mut() else {
            return true;
        };
        if source.events_logged >= config::get_max_log_events_per_source() && !event.is_error()
        {
            return false;
        }
        source.events_logged += 1;
        true
    })
}

fn emit(event: LogEvent) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };
    if !logger.should_log(event.level) {
        return;
    }
    let event = attach_source_context(event);
    if within_source_budget(&event) {
        logger.log_event(event);
    }
}

/// Entry point for the logging macros
///
/// Context values arrive already formatted; the span, when present, is
/// attached before the source context so budget accounting sees the final
/// event.
#[doc(hidden)]
pub fn dispatch(event: LogEvent, span: Option<Span>, context: &[(&str, String)]) {
    let event = match span {
        Some(span) => event.with_span(span),
        None => event,
    };
    let event = context
        .iter()
        .fold(event, |event, (key, value)| event.with_context(key, value));
    emit(event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_context_management() {
        assert!(get_current_source_context().is_none());

        set_source_context("kernel.c");
        let context = get_current_source_context();
        assert_eq!(context.map(|c| c.source_name), Some("kernel.c".to_string()));

        clear_source_context();
        assert!(get_current_source_context().is_none());
    }

    #[test]
    fn test_with_source_context_restores_previous() {
        set_source_context("outer.c");
        let result = with_source_context("inner.c", || {
            let context = get_current_source_context();
            assert_eq!(context.map(|c| c.source_name), Some("inner.c".to_string()));
            42
        });

        assert_eq!(result, 42);
        assert_eq!(
            get_current_source_context().map(|c| c.source_name),
            Some("outer.c".to_string())
        );
        clear_source_context();
    }

    #[test]
    fn test_dispatch_without_logger_is_noop() {
        dispatch(
            LogEvent::error(codes::system::INTERNAL_ERROR, "unreachable sink"),
            Some(Span::dummy()),
            &[("clause", "private".to_string())],
        );
        assert!(!is_initialized() || try_get_global_logger().is_some());
    }
}
