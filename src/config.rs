//! Audit configuration loading.
//!
//! Layering: `AuditConfig::default()` -> optional TOML file (`--config` or
//! `BENFORD_CONFIG`) -> CLI overrides (applied by `app`). A TOML file may set any subset of fields:
//!
//! ```toml
//! min_sample_size = 50
//! suspicious_values = [999, 500]
//! fit_basis = "counts"
//! ```

use std::path::Path;

use tracing::{debug, info};

use crate::domain::AuditConfig;
use crate::error::AppError;

/// Load `.env` from the working directory, if present.
pub fn load_env() {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => debug!(error = %e, "ignoring unreadable .env"),
    }
}

/// Load the audit config from `path`, or defaults when `None`.
pub fn load_audit_config(path: Option<&Path>) -> Result<AuditConfig, AppError> {
    let Some(path) = path else {
        return Ok(AuditConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read config '{}': {e}", path.display())))?;
    let config = parse_audit_config(&text)
        .map_err(|e| AppError::new(2, format!("Invalid config '{}': {e}", path.display())))?;

    info!(path = %path.display(), "loaded audit config");
    Ok(config)
}

/// Parse a (possibly partial) TOML audit config.
pub fn parse_audit_config(text: &str) -> Result<AuditConfig, toml::de::Error> {
    toml::from_str(text)
}
