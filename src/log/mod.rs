//! Structured logging facade over `tracing`.
//!
//! One call to [`init`] wires a process-wide pipeline: every event gets a
//! level, a logger name, a local ISO 8601 timestamp, callsite data and any
//! structured fields, then is rendered either for humans or for machines.
//! The renderer is picked once, at init time: colorized multi-line console
//! output when stdout is an interactive terminal, one JSON object per line
//! otherwise (redirect the stream to ship logs elsewhere).
//!
//! Any code path can just ask for a [`logger`]; the first request
//! initializes the pipeline with defaults if nothing did so explicitly.
//!
//! ```ignore
//! use bricklog::log;
//!
//! log::init(true);
//! log::logger(Some("worker")).info_with("job done", &[("jobs", 3.into())]);
//! ```
//!
//! Ambient context comes from `tracing` spans: fields bound on an
//! enclosing span are merged into every JSON record emitted inside it.

pub mod entry;
pub mod layer;
#[cfg(test)]
pub(crate) mod test_support;

pub use entry::LogEntry;
pub use layer::JsonLayer;

use std::io::{self, IsTerminal};

use serde_json::{Map, Value};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the process-wide logging pipeline.
///
/// `debug` sets the minimum level, see [`level`].
///
/// Installs exactly one renderer on the global tracing dispatcher, iff
/// none is installed yet: setting the dispatcher is an atomic set-once,
/// so re-invocation (or a lost race between threads initializing
/// concurrently) is a no-op rather than a duplicate sink.
pub fn init(debug: bool) {
    let filter = LevelFilter::from_level(level(debug));

    if io::stdout().is_terminal() {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_ansi(true))
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(JsonLayer::stdout())
            .try_init();
    }
}

/// The level at and above which messages are logged.
///
/// Lower ranked messages are ignored. `true` enables DEBUG, otherwise
/// INFO is the floor.
pub fn level(debug: bool) -> Level {
    if debug {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Get a logger handle, optionally with the given name.
///
/// If `name` is `None` the package name is used. Requesting a handle
/// before any explicit [`init`] initializes the pipeline with defaults
/// (`debug = false`).
pub fn logger(name: Option<&str>) -> Logger {
    init(false);

    Logger {
        name: name.unwrap_or(env!("CARGO_PKG_NAME")).to_string(),
    }
}

/// A logger handle named for the caller's module.
///
/// Expands to [`log::logger`](logger) with `module_path!()` as the name.
#[macro_export]
macro_rules! module_logger {
    () => {
        $crate::log::logger(Some(module_path!()))
    };
}

/// A named, stateless logger handle.
///
/// Handles are cheap to clone and all forward to the one globally
/// configured pipeline; the name travels with each event as its
/// `logger` field.
#[derive(Debug, Clone)]
pub struct Logger {
    name: String,
}

impl Logger {
    /// The name events from this handle are emitted under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn debug(&self, message: &str) {
        self.emit(Level::DEBUG, message, &[]);
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::INFO, message, &[]);
    }

    pub fn warn(&self, message: &str) {
        self.emit(Level::WARN, message, &[]);
    }

    pub fn error(&self, message: &str) {
        self.emit(Level::ERROR, message, &[]);
    }

    /// Emit at DEBUG with structured fields.
    pub fn debug_with(&self, message: &str, fields: &[(&str, Value)]) {
        self.emit(Level::DEBUG, message, fields);
    }

    /// Emit at INFO with structured fields.
    pub fn info_with(&self, message: &str, fields: &[(&str, Value)]) {
        self.emit(Level::INFO, message, fields);
    }

    /// Emit at WARN with structured fields.
    pub fn warn_with(&self, message: &str, fields: &[(&str, Value)]) {
        self.emit(Level::WARN, message, fields);
    }

    /// Emit at ERROR with structured fields.
    pub fn error_with(&self, message: &str, fields: &[(&str, Value)]) {
        self.emit(Level::ERROR, message, fields);
    }

    /// Emit at ERROR with the error's cause chain attached.
    ///
    /// The chain is flattened to an array of strings under `traceback`,
    /// outermost error first.
    pub fn exception(&self, message: &str, err: &dyn std::error::Error) {
        let mut chain = vec![Value::String(err.to_string())];
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(Value::String(cause.to_string()));
            source = cause.source();
        }

        self.emit(Level::ERROR, message, &[("traceback", Value::Array(chain))]);
    }

    fn emit(&self, level: Level, message: &str, fields: &[(&str, Value)]) {
        let payload = if fields.is_empty() {
            None
        } else {
            let mut map = Map::new();
            for (key, value) in fields {
                map.insert((*key).to_string(), value.clone());
            }
            Some(Value::Object(map).to_string())
        };

        // event! builds a static callsite, so the level argument must be
        // a constant; dispatch on the runtime level here.
        macro_rules! emit_at {
            ($lvl:expr) => {
                match &payload {
                    Some(payload) => {
                        tracing::event!($lvl, logger = %self.name, fields = %payload, "{}", message)
                    }
                    None => tracing::event!($lvl, logger = %self.name, "{}", message),
                }
            };
        }

        if level == Level::ERROR {
            emit_at!(Level::ERROR)
        } else if level == Level::WARN {
            emit_at!(Level::WARN)
        } else if level == Level::INFO {
            emit_at!(Level::INFO)
        } else if level == Level::DEBUG {
            emit_at!(Level::DEBUG)
        } else {
            emit_at!(Level::TRACE)
        }
    }
}
