//! bricklog
//!
//! A small structured-logging facade plus debug call wrappers.
//!
//! ## Overview
//!
//! Initialization happens once per process and picks a renderer for the
//! lifetime of the process: colorized console output when stdout is an
//! interactive terminal, line-delimited JSON when it is piped or
//! redirected. Everything flows through one `tracing` pipeline, so named
//! handles, the debug wrappers and plain `tracing` macros all end up in
//! the same stream. Shipping the stream anywhere (files, collectors) is
//! the environment's job; pipe stdout where it needs to go.
//!
//! ## Quick Start
//!
//! ```ignore
//! use bricklog::log;
//!
//! fn main() {
//!     log::init(false);
//!
//!     let logger = log::logger(Some("app"));
//!     logger.info("started");
//!     logger.info_with("connected", &[("peer", "abc123".into())]);
//! }
//! ```
//!
//! ## Debug wrappers
//!
//! ```ignore
//! use bricklog::debug::timeit;
//!
//! let parse = timeit(|input: &str| input.len());
//! let n = parse("hello"); // emits one DEBUG event with the duration
//! ```

pub mod debug;
pub mod log;

// Re-exports
pub use debug::{callable_name, log_data, timeit, LogData, Timeit};
pub use log::{init, level, logger, JsonLayer, LogEntry, Logger};
