//! Shared "audit pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest or sample generation -> audit -> outcome
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::PathBuf;

use tracing::info;

use crate::analysis::{AuditOutcome, audit};
use crate::data::{SampleSpec, generate_sample};
use crate::domain::{AuditConfig, Record};
use crate::error::AppError;
use crate::io::ingest::{ColumnMap, RowError, load_records};

/// Where the records of a run come from.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    Csv { path: PathBuf, columns: ColumnMap },
    Sample(SampleSpec),
}

impl InputSource {
    /// Human-readable description for report headers.
    pub fn describe(&self) -> String {
        match self {
            InputSource::Csv { path, .. } => path.display().to_string(),
            InputSource::Sample(spec) => format!("sample(seed={})", spec.seed),
        }
    }
}

/// All computed outputs of a single audit run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub source: String,
    pub records: Vec<Record>,
    pub row_errors: Vec<RowError>,
    pub outcome: AuditOutcome,
}

/// Load records from `source` and audit them.
pub fn run_audit(source: &InputSource, config: &AuditConfig) -> Result<RunOutput, AppError> {
    let (records, row_errors) = match source {
        InputSource::Csv { path, columns } => {
            let data = load_records(path, columns)?;
            (data.records, data.row_errors)
        }
        InputSource::Sample(spec) => (generate_sample(spec)?, Vec::new()),
    };

    run_audit_with_records(source.describe(), records, row_errors, config)
}

/// Audit an already loaded record set.
///
/// This is useful for the TUI where we want to re-audit without re-reading input.
pub fn run_audit_with_records(
    source: String,
    records: Vec<Record>,
    row_errors: Vec<RowError>,
    config: &AuditConfig,
) -> Result<RunOutput, AppError> {
    let outcome = audit(&records, config)?;
    info!(
        %source,
        eligible = outcome.summary.eligible,
        flagged = outcome.summary.flagged,
        skipped = outcome.summary.skipped,
        "audit finished"
    );

    Ok(RunOutput {
        source,
        records,
        row_errors,
        outcome,
    })
}
