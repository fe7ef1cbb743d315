//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the audit code stays clean and testable
//! - output changes are localized (the table tests below pin the layout)

use crate::domain::{
    AuditConfig, AuditSummary, DatasetStats, DigitComparison, FitBasis, FlagKind, GroupProfile, GroupStatistics,
    SkippedGroup, ZeroPolicy,
};
use crate::io::ingest::RowError;

/// Format the run header (source, dataset stats, effective thresholds).
pub fn format_run_summary(source: &str, dataset: &DatasetStats, config: &AuditConfig) -> String {
    let mut out = String::new();

    out.push_str("=== benford - Leading-Digit Audit ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!(
        "Records: n={} | groups={} | amount=[{}, {}] | zero amounts={}\n",
        dataset.n_records, dataset.n_groups, dataset.amount_min, dataset.amount_max, dataset.zero_amounts
    ));
    out.push_str(&format!(
        "Thresholds: min n={} | p<{} | fixed>{} | repetition>{} | std<{}\n",
        config.min_sample_size,
        config.p_value_threshold,
        config.fixed_value_threshold,
        config.repetition_threshold,
        config.std_threshold
    ));
    out.push_str(&format!(
        "Suspicious values: {} | zeros: {} | chi2 basis: {}\n",
        fmt_values(&config.suspicious_values),
        match config.zero_policy {
            ZeroPolicy::Exclude => "exclude",
            ZeroPolicy::Reject => "reject",
        },
        match config.fit_basis {
            FitBasis::Frequency => "frequency",
            FitBasis::Counts => "counts",
        },
    ));

    out
}

/// Format the per-group results table.
pub fn format_group_table(groups: &[GroupStatistics]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<20} {:>6} {:>10} {:>9} {:>8} {:>6} {:>10} {:>8} {:>8}",
            "group", "n", "chi2", "p_value", "benford", "value", "repetition", "low_std", "verdict"
        ),
    );
    push_line(
        &mut out,
        format!(
            "{:-<20} {:-<6} {:-<10} {:-<9} {:-<8} {:-<6} {:-<10} {:-<8} {:-<8}",
            "", "", "", "", "", "", "", "", ""
        ),
    );

    for g in groups {
        push_line(
            &mut out,
            format!(
                "{:<20} {:>6} {:>10.4} {:>9.4} {:>8} {:>6} {:>10} {:>8} {:>8}",
                truncate(&g.group_key, 20),
                g.sample_size,
                g.chi2_statistic,
                g.p_value,
                mark(g.has(FlagKind::Benford)),
                mark(g.has(FlagKind::FixedValue)),
                mark(g.has(FlagKind::Repetition)),
                mark(g.has(FlagKind::LowStd)),
                if g.verdict { "FLAGGED" } else { "ok" },
            ),
        );
    }

    out
}

/// "Flagged: X / Y" and "Reliability rate: Z%" lines.
pub fn format_summary(summary: &AuditSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Flagged: {} / {}\n", summary.flagged, summary.eligible));
    out.push_str(&format!(
        "Reliability rate: {}\n",
        summary
            .reliability_rate
            .map(|r| format!("{r:.2}%"))
            .unwrap_or_else(|| "n/a".to_string())
    ));
    out.push_str(&format!(
        "Flags: benford={} value={} repetition={} low_std={}\n",
        summary.benford_flags, summary.fixed_value_flags, summary.repetition_flags, summary.low_std_flags
    ));
    out
}

/// Groups left out of testing; empty string when there are none.
pub fn format_skipped(skipped: &[SkippedGroup]) -> String {
    if skipped.is_empty() {
        return String::new();
    }
    let mut out = String::from("Skipped groups:\n");
    for s in skipped {
        push_line(
            &mut out,
            format!("  {:<20} n={:<6} {}", truncate(&s.group_key, 20), s.sample_size, s.reason),
        );
    }
    out
}

/// Descriptive metrics for every group.
pub fn format_profiles(profiles: &[GroupProfile]) -> String {
    let mut out = String::from("Group profiles:\n");
    push_line(
        &mut out,
        format!(
            "{:<20} {:>6} {:>12} {:>12} {:>8} {:>10}",
            "group", "n", "mean", "std", "lead_9", "suspicious"
        ),
    );
    push_line(
        &mut out,
        format!("{:-<20} {:-<6} {:-<12} {:-<12} {:-<8} {:-<10}", "", "", "", "", "", ""),
    );
    for p in profiles {
        push_line(
            &mut out,
            format!(
                "{:<20} {:>6} {:>12.2} {:>12.2} {:>7.1}% {:>10}",
                truncate(&p.group_key, 20),
                p.count,
                p.mean_amount,
                p.std_amount,
                p.leading_nine_share * 100.0,
                p.suspicious_count,
            ),
        );
    }
    out
}

/// Observed vs expected frequencies per digit, with the overall fit.
pub fn format_digit_comparison(comparison: &DigitComparison) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!("{:<5} {:>8} {:>10} {:>10}", "digit", "count", "observed", "expected"),
    );
    for (digit, observed) in comparison.observed.iter() {
        push_line(
            &mut out,
            format!(
                "{:<5} {:>8} {:>9.2}% {:>9.2}%",
                digit,
                comparison.observed.count(digit),
                observed * 100.0,
                comparison.expected[digit.index()] * 100.0,
            ),
        );
    }
    out.push_str(&format!(
        "Overall: chi2={:.4} p={:.4} (dof={})\n",
        comparison.fit.statistic, comparison.fit.p_value, comparison.fit.dof
    ));
    out
}

/// Row-level ingest problems, capped at `max` lines.
pub fn format_row_errors(errors: &[RowError], max: usize) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let mut out = format!("Skipped {} invalid row(s):\n", errors.len());
    for e in errors.iter().take(max) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if errors.len() > max {
        out.push_str(&format!("  ... and {} more\n", errors.len() - max));
    }
    out
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn mark(flag: bool) -> &'static str {
    if flag { "x" } else { "-" }
}

fn fmt_values(v: &[i64]) -> String {
    let parts: Vec<String> = v.iter().map(i64::to_string).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
