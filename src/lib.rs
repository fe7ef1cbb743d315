//! `benford-audit` library crate.
//!
//! The binary (`benford`) is a thin wrapper around this library so that:
//!
//! - the audit core is testable without spawning processes
//! - modules are reusable (other front-ends, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
