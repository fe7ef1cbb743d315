//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - CSV exports of results and records (`export`)
//! - report JSON read/write (`report`)

pub mod export;
pub mod ingest;
pub mod report;

pub use export::*;
pub use ingest::*;
pub use report::*;
