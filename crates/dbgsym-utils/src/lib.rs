//! # dbgsym utilities
//!
//! Shared helpers for the dbgsym workspace. Today that is the logging setup
//! built on `tracing`; library crates log through the re-exported macros.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingConfig, LoggingError, LoggingGuard};
pub use tracing::{debug, error, info, trace, warn};
