//! # Logging Setup
//!
//! The library itself only logs through the `log` facade. Binaries call
//! [`setup_logging`] once at startup to route those records to stdout and to a
//! timestamped log file.

/// `fern` based logger installation and log file rotation.
pub mod setup;

pub use setup::{parse_level, setup_logging};
