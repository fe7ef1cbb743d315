//! The audit core.
//!
//! Responsibilities:
//!
//! - aggregate leading-digit frequencies per group
//! - score fixed-value, repetition and spread heuristics
//! - combine all signals into a verdict and a run summary
//! - partition records by group and evaluate eligible groups (parallel)

pub mod frequency;
pub mod groups;
pub mod heuristics;
pub mod profile;
pub mod verdict;

pub use groups::*;
pub use heuristics::*;
pub use profile::*;
pub use verdict::*;
