//! Error types.
//!
//! - `AnalysisError`: failures of the pure audit core (digit extraction,
//!   aggregation, fit test, config validation).
//! - `AppError`: what the binary reports, carrying a process exit code.
//!
//! Exit codes: 2 = input/argument/IO, 3 = no usable data, 4 = computation or
//! terminal failure.

use thiserror::Error;

/// Errors raised by the audit core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// `0` has no leading digit in `1..=9`.
    #[error("amount 0 has no leading digit in 1..=9")]
    ZeroAmount,

    #[error("amount {0} is not finite")]
    NonFiniteAmount(f64),

    /// The frequency aggregator was handed no amounts.
    #[error("no amounts to aggregate (empty group)")]
    EmptyGroup,

    /// A zero amount was found while the zero policy is `reject`.
    #[error("group '{group}' contains a zero amount (record id {id})")]
    ZeroAmountInGroup { group: String, id: i64 },

    #[error("expected frequency for digit {digit} must be > 0 (got {value})")]
    InvalidExpected { digit: u8, value: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        let exit_code = match err {
            AnalysisError::InvalidConfig(_) => 2,
            AnalysisError::InvalidExpected { .. } => 4,
            AnalysisError::ZeroAmount
            | AnalysisError::NonFiniteAmount(_)
            | AnalysisError::EmptyGroup
            | AnalysisError::ZeroAmountInGroup { .. } => 3,
        };
        AppError::new(exit_code, format!("Audit failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_errors_map_to_exit_codes() {
        assert_eq!(AppError::from(AnalysisError::EmptyGroup).exit_code(), 3);
        assert_eq!(
            AppError::from(AnalysisError::InvalidConfig("bad".to_string())).exit_code(),
            2
        );
        let err = AppError::from(AnalysisError::ZeroAmountInGroup {
            group: "Vendor A".to_string(),
            id: 7,
        });
        assert!(err.to_string().contains("Vendor A"));
        assert!(err.to_string().contains("7"));
    }
}
