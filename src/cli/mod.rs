//! Command-line parsing for the Benford leading-digit audit.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the audit code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{FitBasis, ZeroPolicy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "benford", version, about = "Benford's Law leading-digit audit")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Audit a CSV (or a synthetic sample), print the report, and optionally plot/export.
    Analyze(AuditArgs),
    /// Print flagged groups only (useful for scripting).
    Flagged(AuditArgs),
    /// Write a synthetic invoice CSV.
    Sample(SampleCommandArgs),
    /// Plot a previously exported report JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying audit pipeline as `benford analyze`, but
    /// renders results in a terminal UI using Ratatui.
    Tui(AuditArgs),
}

/// Options for synthetic sample generation.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Random seed for sample generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of honest (log-normal) invoices.
    #[arg(long, default_value_t = 950)]
    pub honest: usize,

    /// Number of invoices drawn from the suspicious values.
    #[arg(long, default_value_t = 50)]
    pub suspicious: usize,

    /// Number of invoices for a fabricating vendor with high leading digits.
    #[arg(long, default_value_t = 0)]
    pub skewed: usize,

    /// Number of vendors (`Vendor A`, `Vendor B`, ...).
    #[arg(long, default_value_t = 4)]
    pub vendors: usize,
}

/// Common options for auditing.
#[derive(Debug, Args, Clone)]
pub struct AuditArgs {
    /// Input CSV. Without it a synthetic sample is audited.
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Column holding the record id.
    #[arg(long, default_value = "InvoiceID")]
    pub id_column: String,

    /// Column holding the group key.
    #[arg(long, default_value = "Vendor")]
    pub group_column: String,

    /// Column holding the amount.
    #[arg(long, default_value = "Amount")]
    pub amount_column: String,

    /// TOML file with audit thresholds.
    #[arg(long, env = "BENFORD_CONFIG", value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Minimum group size for testing.
    #[arg(long)]
    pub min_sample: Option<usize>,

    /// Benford flag when p-value is below this.
    #[arg(long)]
    pub p_value: Option<f64>,

    /// Fixed-value flag when the ratio exceeds this.
    #[arg(long)]
    pub fixed_ratio: Option<f64>,

    /// Repetition flag when the ratio exceeds this.
    #[arg(long)]
    pub repetition_ratio: Option<f64>,

    /// Low-std flag when the amount std is below this.
    #[arg(long)]
    pub std_threshold: Option<f64>,

    /// Comma-separated "round" amounts (e.g. 999,888,777,666).
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub suspicious_values: Option<Vec<i64>>,

    /// What to do with zero amounts.
    #[arg(long, value_enum)]
    pub zero_policy: Option<ZeroPolicy>,

    /// Compute chi-square on frequencies (default) or counts.
    #[arg(long, value_enum)]
    pub fit_basis: Option<FitBasis>,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 50)]
    pub width: usize,

    /// Export per-group results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the full report to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub sample: SampleArgs,
}

/// Options for `benford sample`.
#[derive(Debug, Args)]
pub struct SampleCommandArgs {
    /// Where to write the CSV.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: PathBuf,

    #[command(flatten)]
    pub sample: SampleArgs,

    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Options for plotting a saved report.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Report JSON file produced by `benford analyze --export-json`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,

    /// Plot one group instead of the overall distribution.
    #[arg(long)]
    pub group: Option<String>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 50)]
    pub width: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_audit_flags() {
        let cli = Cli::try_parse_from([
            "benford",
            "analyze",
            "-i",
            "data.csv",
            "--suspicious-values",
            "999,500",
            "--zero-policy",
            "reject",
            "--fit-basis",
            "counts",
            "--min-sample",
            "50",
            "-vv",
        ])
        .unwrap();
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.input, Some(PathBuf::from("data.csv")));
        assert_eq!(args.suspicious_values, Some(vec![999, 500]));
        assert_eq!(args.zero_policy, Some(ZeroPolicy::Reject));
        assert_eq!(args.fit_basis, Some(FitBasis::Counts));
        assert_eq!(args.min_sample, Some(50));
        assert_eq!(args.verbose, 2);
        assert_eq!(args.sample.seed, 42);
    }

    #[test]
    fn plot_requires_report() {
        assert!(Cli::try_parse_from(["benford", "plot"]).is_err());
        let cli = Cli::try_parse_from(["benford", "plot", "--report", "r.json", "--group", "Vendor A"]).unwrap();
        let Command::Plot(args) = cli.command else {
            panic!("expected plot");
        };
        assert_eq!(args.group.as_deref(), Some("Vendor A"));
    }
}
