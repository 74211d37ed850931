//! # Observability
//!
//! Structured logging via `tracing`. The simulator crates emit spans and
//! events; [`init_logging`] installs the subscriber that renders them.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
