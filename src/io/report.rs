//! Read/write audit report JSON files.
//!
//! A report JSON is the portable form of one audit run:
//! - run metadata (source, timestamp, effective config)
//! - per-group statistics, skipped groups and profiles
//! - the overall observed vs expected digit comparison, for re-plotting
//!
//! The schema is defined by `domain::ReportFile`.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::analysis::AuditOutcome;
use crate::domain::{AuditConfig, ReportFile};
use crate::error::AppError;

/// Assemble a report from one audit run.
pub fn build_report(source: &str, config: &AuditConfig, outcome: &AuditOutcome) -> ReportFile {
    ReportFile {
        tool: "benford".to_string(),
        generated_at: Utc::now(),
        source: source.to_string(),
        config: config.clone(),
        dataset: outcome.dataset.clone(),
        overall: outcome.overall.clone(),
        groups: outcome.groups.clone(),
        skipped: outcome.skipped.clone(),
        profiles: outcome.profiles.clone(),
        summary: outcome.summary.clone(),
    }
}

/// Write a report JSON file.
pub fn write_report_json(path: &Path, report: &ReportFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;
    write_report(file, report)?;
    info!(path = %path.display(), groups = report.groups.len(), "wrote report JSON");
    Ok(())
}

pub fn write_report<W: Write>(out: W, report: &ReportFile) -> Result<(), AppError> {
    serde_json::to_writer_pretty(out, report)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))
}

/// Read a report JSON file.
pub fn read_report_json(path: &Path) -> Result<ReportFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open report JSON '{}': {e}", path.display())))?;
    read_report(file)
}

pub fn read_report<R: Read>(input: R) -> Result<ReportFile, AppError> {
    serde_json::from_reader(input).map_err(|e| AppError::new(2, format!("Invalid report JSON: {e}")))
}
