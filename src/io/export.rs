//! CSV exports.
//!
//! - per-group audit results (spreadsheet-friendly, one row per eligible group)
//! - record lists (used by `benford sample` so generated data can be re-ingested)

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::domain::{FlagKind, GroupStatistics, Record};
use crate::error::AppError;
use crate::io::ingest::ColumnMap;

const GROUP_HEADER: [&str; 13] = [
    "group",
    "n",
    "zero_excluded",
    "chi2",
    "p_value",
    "fixed_value_ratio",
    "repetition_ratio",
    "amount_std",
    "benford",
    "value",
    "repetition",
    "low_std",
    "verdict",
];

/// Write per-group results to a CSV file.
pub fn write_groups_csv(path: &Path, groups: &[GroupStatistics]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_groups(file, groups)?;
    info!(path = %path.display(), rows = groups.len(), "wrote group export");
    Ok(())
}

/// Write per-group results as CSV to any writer.
pub fn write_groups<W: Write>(out: W, groups: &[GroupStatistics]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(GROUP_HEADER).map_err(write_err)?;

    for g in groups {
        let mut row = vec![
            g.group_key.clone(),
            g.sample_size.to_string(),
            g.zero_excluded.to_string(),
            format!("{:.6}", g.chi2_statistic),
            format!("{:.6}", g.p_value),
            format!("{:.6}", g.fixed_value_ratio),
            format!("{:.6}", g.repetition_ratio),
            format!("{:.4}", g.amount_std),
        ];
        row.extend(FlagKind::ALL.iter().map(|&f| g.has(f).to_string()));
        row.push(g.verdict.to_string());
        writer.write_record(&row).map_err(write_err)?;
    }

    writer.flush().map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write records to a CSV file using the given column names.
pub fn write_records_csv(path: &Path, records: &[Record], columns: &ColumnMap) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;
    write_records(file, records, columns)?;
    info!(path = %path.display(), rows = records.len(), "wrote records");
    Ok(())
}

pub fn write_records<W: Write>(out: W, records: &[Record], columns: &ColumnMap) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record([&columns.id, &columns.group, &columns.amount])
        .map_err(write_err)?;
    for r in records {
        writer
            .write_record([r.id.to_string(), r.group_key.clone(), r.amount.to_string()])
            .map_err(write_err)?;
    }
    writer.flush().map_err(|e| AppError::new(2, format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

fn write_err(e: csv::Error) -> AppError {
    AppError::new(2, format!("Failed to write CSV row: {e}"))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::domain::FrequencyTable;
    use crate::io::ingest::read_records;

    #[test]
    fn group_rows_carry_flags_and_verdict() {
        let group = GroupStatistics {
            group_key: "Vendor, Inc".to_string(),
            sample_size: 40,
            zero_excluded: 1,
            chi2_statistic: 0.5,
            p_value: 0.25,
            fixed_value_ratio: 0.3,
            repetition_ratio: 0.1,
            amount_std: 512.0,
            observed: FrequencyTable::from_counts([40, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap(),
            flags: BTreeSet::from([FlagKind::FixedValue]),
            verdict: true,
        };

        let mut buf = Vec::new();
        write_groups(&mut buf, &[group]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "group,n,zero_excluded,chi2,p_value,fixed_value_ratio,repetition_ratio,amount_std,benford,value,repetition,low_std,verdict"
        );
        assert_eq!(
            lines[1],
            "\"Vendor, Inc\",40,1,0.500000,0.250000,0.300000,0.100000,512.0000,false,true,false,false,true"
        );
    }

    #[test]
    fn written_records_read_back() {
        let records = vec![Record::new(1, "Vendor A", 1_250), Record::new(2, "Vendor B", 999)];
        let columns = ColumnMap::default();

        let mut buf = Vec::new();
        write_records(&mut buf, &records, &columns).unwrap();
        let back = read_records(buf.as_slice(), &columns).unwrap();
        assert_eq!(back.records, records);
    }
}
