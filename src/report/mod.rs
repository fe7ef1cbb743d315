//! Reporting: formatted terminal output for audit runs.

pub mod format;

pub use format::*;
