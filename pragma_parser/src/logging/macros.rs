//! Logging macros
//!
//! Every macro accepts trailing `"key" => value` pairs where the value is any
//! `Display` type. Pairs are formatted once and handed to
//! [`dispatch`](crate::logging::dispatch) together with the event.

/// Formats `key => value` pairs into owned context entries
#[doc(hidden)]
#[macro_export]
macro_rules! __log_context {
    () => {
        ::std::vec::Vec::<(&str, ::std::string::String)>::new()
    };
    ($($key:expr => $value:expr),+) => {
        ::std::vec![$(($key, ::std::string::ToString::to_string(&$value))),+]
    };
}

/// Log an error code, optionally with a span
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::dispatch(
            $crate::logging::LogEvent::error($code, $message),
            Some($span),
            &$crate::__log_context!($($key => $value),*),
        )
    };

    ($code:expr, $message:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::dispatch(
            $crate::logging::LogEvent::error($code, $message),
            None,
            &$crate::__log_context!($($key => $value),*),
        )
    };
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::dispatch(
            $crate::logging::LogEvent::success($code, $message),
            None,
            &$crate::__log_context!($($key => $value),*),
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::dispatch(
            $crate::logging::LogEvent::info($message),
            None,
            &$crate::__log_context!($($key => $value),*),
        )
    };
}

/// Log a warning. The `code = ...` form records a diagnostic code and span.
#[macro_export]
macro_rules! log_warning {
    (code = $code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::dispatch(
            $crate::logging::LogEvent::warning_with_code($code, $message),
            Some($span),
            &$crate::__log_context!($($key => $value),*),
        )
    };

    (code = $code:expr, $message:expr) => {
        $crate::logging::dispatch(
            $crate::logging::LogEvent::warning_with_code($code, $message),
            None,
            &$crate::__log_context!(),
        )
    };

    ($message:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::dispatch(
            $crate::logging::LogEvent::warning($message),
            None,
            &$crate::__log_context!($($key => $value),*),
        )
    };
}

/// Log a debug message; context is not formatted unless debug is enabled
#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)*) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            $crate::logging::dispatch(
                $crate::logging::LogEvent::debug($message),
                None,
                &$crate::__log_context!($($key => $value),*),
            )
        }
    };
}

/// Log a success code with elapsed time
#[macro_export]
macro_rules! log_performance {
    ($code:expr, $message:expr, duration = $duration:expr $(, $key:expr => $value:expr)*) => {
        $crate::log_success!($code, $message,
            "duration_ms" => $duration.as_secs_f64() * 1000.0
            $(, $key => $value)*
        )
    };
}
