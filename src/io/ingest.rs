//! CSV ingest and normalization.
//!
//! This module is responsible for turning an invoice-list CSV into a clean set
//! of `Record`s that are safe to audit.
//!
//! Design goals:
//! - **Strict schema** for the three required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no audit logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::Record;
use crate::error::AppError;

/// Which CSV columns hold the record fields (matched case-insensitively).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub id: String,
    pub group: String,
    pub amount: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            id: "InvoiceID".to_string(),
            group: "Vendor".to_string(),
            amount: "Amount".to_string(),
        }
    }
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: records + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<Record>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load records from a CSV file.
pub fn load_records(path: &Path, columns: &ColumnMap) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let data = read_records(file, columns)?;
    info!(
        path = %path.display(),
        rows = data.rows_read,
        used = data.records.len(),
        errors = data.row_errors.len(),
        "loaded CSV"
    );
    Ok(data)
}

/// Parse records from any CSV reader.
pub fn read_records<R: Read>(input: R, columns: &ColumnMap) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let idx = ColumnIndex {
        id: require_column(&header_map, &columns.id)?,
        group: require_column(&header_map, &columns.group)?,
        amount: require_column(&header_map, &columns.amount)?,
    };

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (i, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = i + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|row| parse_row(&row, &idx, columns));
        match parsed {
            Ok(record) => records.push(record),
            Err(message) => {
                debug!(line, %message, "skipping row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if !row_errors.is_empty() {
        warn!(count = row_errors.len(), "rows skipped during ingest");
    }

    if records.is_empty() {
        return Err(AppError::new(3, "No valid rows remain after parsing."));
    }

    Ok(IngestedData {
        records,
        row_errors,
        rows_read,
    })
}

struct ColumnIndex {
    id: usize,
    group: usize,
    amount: usize,
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn require_column(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, AppError> {
    header_map
        .get(&normalize_header_name(name))
        .copied()
        .ok_or_else(|| AppError::new(2, format!("Missing required column: `{name}`")))
}

fn parse_row(row: &StringRecord, idx: &ColumnIndex, columns: &ColumnMap) -> Result<Record, String> {
    let id_raw = get_required(row, idx.id, &columns.id)?;
    let id = id_raw
        .parse::<i64>()
        .map_err(|_| format!("Invalid `{}` value '{id_raw}' (expected an integer).", columns.id))?;

    let group_key = get_required(row, idx.group, &columns.group)?.to_string();

    let amount_raw = get_required(row, idx.amount, &columns.amount)?;
    let amount = parse_amount(amount_raw)
        .ok_or_else(|| format!("Invalid `{}` value '{amount_raw}'.", columns.amount))?;

    Ok(Record { id, group_key, amount })
}

fn get_required<'a>(row: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    row.get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

/// Integers parse directly; reals are truncated toward zero.
fn parse_amount(s: &str) -> Option<i64> {
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let v = s.parse::<f64>().ok()?;
    if !v.is_finite() || v.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(v.trunc() as i64)
}
