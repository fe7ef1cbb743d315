//! Demonstration data sources.

pub mod sample;

pub use sample::{SampleSpec, generate_sample};
