//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records (`Record`) and the `Digit` newtype
//! - audit configuration (`AuditConfig`, `ZeroPolicy`, `FitBasis`)
//! - per-group outputs (`GroupStatistics`, `SkippedGroup`, `GroupProfile`)
//! - the run summary and the portable JSON report (`AuditSummary`, `ReportFile`)

pub mod types;

pub use types::*;
