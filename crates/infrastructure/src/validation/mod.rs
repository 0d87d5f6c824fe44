//! Configuration validation module
//!
//! Startup checks that do not stop the server but deserve a log line.

mod config_checks;

pub use config_checks::{ConfigValidator, ConfigWarning, WarningSeverity};
