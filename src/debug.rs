//! Debug call wrappers.
//!
//! These slow down production code, but may be useful still. Each
//! wrapper comes in two shapes: a direct function ([`timeit`],
//! [`log_data`]) and a builder ([`Timeit`], [`LogData`]) that captures
//! an optional [`Logger`] before wrapping.
//!
//! Wrapped callables take a single argument value; bundle several into
//! a tuple. Panics from the wrapped callable propagate untouched and
//! suppress any post-call event.

use std::time::Instant;

use serde_json::Value;

use crate::log::{self, Logger};

/// The name of the given callable, from its type path.
///
/// Closures report the path of their enclosing function; if the type
/// path is somehow empty, falls back to `"unknown name"`.
pub fn callable_name<F: ?Sized>(_func: &F) -> &'static str {
    let mut name = std::any::type_name::<F>();
    while let Some(stripped) = name.strip_suffix("::{{closure}}") {
        name = stripped;
    }

    if name.is_empty() {
        "unknown name"
    } else {
        name
    }
}

/// Wrap a callable so each successful call logs its duration.
///
/// Logging is done to debug level, under a logger named after the
/// callable. Use [`Timeit`] to log to a specific logger instead.
pub fn timeit<A, R, F>(func: F) -> impl Fn(A) -> R
where
    F: Fn(A) -> R,
{
    Timeit::new().wrap(func)
}

/// Wrap a callable so each call logs its argument and result.
///
/// Logging is done to debug level, under a logger named after the
/// callable. Use [`LogData`] to log to a specific logger instead.
pub fn log_data<A, R, F>(func: F) -> impl Fn(A) -> R
where
    A: std::fmt::Debug,
    R: std::fmt::Debug,
    F: Fn(A) -> R,
{
    LogData::new().wrap(func)
}

/// Builder for timing wrappers, capturing an optional logger.
#[derive(Debug, Default, Clone)]
pub struct Timeit {
    logger: Option<Logger>,
}

impl Timeit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log through the given handle instead of one named after the target.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Wrap the callable.
    ///
    /// The wrapper records a start instant, invokes the target with the
    /// original argument, then emits one DEBUG event with `name`,
    /// `duration` (seconds) and `start_time` (epoch milliseconds), and
    /// returns the result unchanged. No event is emitted if the target
    /// panics.
    pub fn wrap<A, R, F>(self, func: F) -> impl Fn(A) -> R
    where
        F: Fn(A) -> R,
    {
        let name = callable_name(&func);
        let logger = self
            .logger
            .unwrap_or_else(|| log::logger(Some(name)));

        move |args: A| {
            let start_time = chrono::Local::now().timestamp_millis();
            let started = Instant::now();
            let result = func(args);

            logger.debug_with(
                "Method timed",
                &[
                    ("name", Value::from(name)),
                    ("duration", Value::from(started.elapsed().as_secs_f64())),
                    ("start_time", Value::from(start_time)),
                ],
            );
            result
        }
    }
}

/// Builder for argument/result wrappers, capturing an optional logger.
#[derive(Debug, Default, Clone)]
pub struct LogData {
    logger: Option<Logger>,
}

impl LogData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log through the given handle instead of one named after the target.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Wrap the callable.
    ///
    /// The wrapper emits one DEBUG event with the argument before the
    /// call and a second with the result after it, then returns the
    /// result unchanged. A panicking target leaves only the first event.
    pub fn wrap<A, R, F>(self, func: F) -> impl Fn(A) -> R
    where
        A: std::fmt::Debug,
        R: std::fmt::Debug,
        F: Fn(A) -> R,
    {
        let name = callable_name(&func);
        let logger = self
            .logger
            .unwrap_or_else(|| log::logger(Some(name)));

        move |args: A| {
            logger.debug_with(
                "Method called, input logged",
                &[
                    ("name", Value::from(name)),
                    ("args", Value::from(format!("{:?}", args))),
                ],
            );

            let result = func(args);

            logger.debug_with(
                "Method results logged",
                &[
                    ("name", Value::from(name)),
                    ("result", Value::from(format!("{:?}", result))),
                ],
            );
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::test_support::Capture;
    use crate::log::{JsonLayer, LogEntry};
    use tracing_subscriber::layer::SubscriberExt;

    fn captured(capture: &Capture) -> Vec<LogEntry> {
        capture
            .contents()
            .lines()
            .map(|line| LogEntry::from_json_line(line).unwrap())
            .collect()
    }

    fn with_capture(f: impl FnOnce()) -> Vec<LogEntry> {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry()
            .with(JsonLayer::with_writer(capture.clone()));
        tracing::subscriber::with_default(subscriber, f);
        captured(&capture)
    }

    fn add((a, b): (i32, i32)) -> i32 {
        a + b
    }

    #[test]
    fn test_callable_name_of_named_fn() {
        let name = callable_name(&add);
        assert!(name.ends_with("add"));
    }

    #[test]
    fn test_callable_name_of_closure_keeps_enclosing_path() {
        let closure = |x: i32| x * 2;
        let name = callable_name(&closure);
        assert!(name.contains("test_callable_name_of_closure_keeps_enclosing_path"));
        assert!(!name.is_empty());
    }

    #[test]
    fn test_timeit_returns_result_and_logs_once() {
        let entries = with_capture(|| {
            let timed = timeit(add);
            assert_eq!(timed((1, 2)), 3);
        });

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.level, "debug");
        assert!(entry.fields["name"].as_str().unwrap().ends_with("add"));
        assert!(entry.fields["duration"].as_f64().unwrap() >= 0.0);
        assert!(entry.fields["start_time"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_timeit_with_explicit_logger() {
        let entries = with_capture(|| {
            let timed = Timeit::new()
                .with_logger(log::logger(Some("bench")))
                .wrap(|x: u32| x + 1);
            assert_eq!(timed(9), 10);
        });

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].logger, "bench");
    }

    #[test]
    fn test_timeit_panic_suppresses_event() {
        let entries = with_capture(|| {
            let timed = timeit(|_: ()| -> i32 { panic!("boom") });
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| timed(())));
            assert!(result.is_err());
        });

        assert!(entries.is_empty());
    }

    #[test]
    fn test_log_data_emits_args_then_result() {
        let entries = with_capture(|| {
            let wrapped = log_data(|x: i32| x * 2);
            assert_eq!(wrapped(5), 10);
        });

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, "debug");
        assert_eq!(entries[0].fields["args"], serde_json::Value::from("5"));
        assert!(!entries[0].fields.contains_key("result"));
        assert_eq!(entries[1].fields["result"], serde_json::Value::from("10"));
    }

    #[test]
    fn test_log_data_panic_leaves_only_first_event() {
        let entries = with_capture(|| {
            let wrapped = log_data(|_: u8| -> u8 { panic!("boom") });
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| wrapped(1)));
            assert!(result.is_err());
        });

        assert_eq!(entries.len(), 1);
        assert!(entries[0].fields.contains_key("args"));
    }
}
