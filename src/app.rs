//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and layers the audit config
//! - loads a CSV or generates a synthetic sample
//! - runs the audit
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{AuditArgs, Command, PlotArgs, SampleArgs, SampleCommandArgs};
use crate::data::SampleSpec;
use crate::data::sample::default_vendors;
use crate::domain::{AuditConfig, GoodnessOfFit};
use crate::error::AppError;
use crate::io::ingest::ColumnMap;
use crate::math::{DIGIT_DOF, benford_distribution};

pub mod pipeline;

use pipeline::InputSource;

/// Row errors printed before the report; the rest are summarized.
const MAX_ROW_ERRORS: usize = 10;

/// Entry point for the `benford` binary.
pub fn run() -> Result<(), AppError> {
    crate::config::load_env();

    // We want `benford` to open the TUI and `benford -i x.csv` to behave like
    // `benford analyze -i x.csv`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Analyze(args) => handle_audit(args, OutputMode::Full),
        Command::Flagged(args) => handle_audit(args, OutputMode::FlaggedOnly),
        Command::Sample(args) => handle_sample(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    FlaggedOnly,
}

fn handle_audit(args: AuditArgs, mode: OutputMode) -> Result<(), AppError> {
    init_logging(args.verbose);

    let config = audit_config_from_args(&args)?;
    let source = input_source_from_args(&args, &config);
    let run = pipeline::run_audit(&source, &config)?;
    let outcome = &run.outcome;

    if !run.row_errors.is_empty() {
        eprint!("{}", crate::report::format_row_errors(&run.row_errors, MAX_ROW_ERRORS));
    }

    match mode {
        OutputMode::Full => {
            println!(
                "{}",
                crate::report::format_run_summary(&run.source, &outcome.dataset, &config)
            );
            println!("{}", crate::report::format_group_table(&outcome.groups));
            println!("{}", crate::report::format_summary(&outcome.summary));

            let skipped = crate::report::format_skipped(&outcome.skipped);
            if !skipped.is_empty() {
                println!("{skipped}");
            }
            println!("{}", crate::report::format_profiles(&outcome.profiles));

            if let Some(overall) = &outcome.overall {
                println!("{}", crate::report::format_digit_comparison(overall));
                if !args.no_plot {
                    println!("{}", crate::plot::render_comparison(overall, args.width));
                }
            }
        }
        OutputMode::FlaggedOnly => {
            let flagged: Vec<_> = outcome.groups.iter().filter(|g| g.verdict).cloned().collect();
            println!("{}", crate::report::format_group_table(&flagged));
            println!("Flagged: {} / {}", outcome.summary.flagged, outcome.summary.eligible);
        }
    }

    // Optional exports.
    if let Some(path) = &args.export {
        crate::io::export::write_groups_csv(path, &outcome.groups)?;
    }
    if let Some(path) = &args.export_json {
        let report = crate::io::report::build_report(&run.source, &config, outcome);
        crate::io::report::write_report_json(path, &report)?;
    }

    Ok(())
}

fn handle_sample(args: SampleCommandArgs) -> Result<(), AppError> {
    init_logging(args.verbose);

    let spec = sample_spec_from_args(&args.sample, &AuditConfig::default().suspicious_values);
    let records = crate::data::generate_sample(&spec)?;
    crate::io::export::write_records_csv(&args.output, &records, &ColumnMap::default())?;

    println!("Wrote {} records to {}", records.len(), args.output.display());
    Ok(())
}

fn handle_tui(args: AuditArgs) -> Result<(), AppError> {
    // No subscriber here: log lines would corrupt the alternate screen.
    let config = audit_config_from_args(&args)?;
    let source = input_source_from_args(&args, &config);
    crate::tui::run(source, config)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let report = crate::io::report::read_report_json(&args.report)?;

    let expected = report
        .overall
        .as_ref()
        .map(|o| o.expected)
        .unwrap_or_else(|| *benford_distribution().probabilities());

    let plot = match &args.group {
        Some(key) => {
            let group = report
                .groups
                .iter()
                .find(|g| &g.group_key == key)
                .ok_or_else(|| AppError::new(2, format!("Group '{key}' not found in report (only tested groups are saved).")))?;
            let fit = GoodnessOfFit {
                statistic: group.chi2_statistic,
                p_value: group.p_value,
                dof: DIGIT_DOF,
            };
            crate::plot::render_digit_chart(key, &group.observed, &expected, Some(&fit), args.width)
        }
        None => {
            let overall = report
                .overall
                .as_ref()
                .ok_or_else(|| AppError::new(3, "Report has no overall digit comparison."))?;
            crate::plot::render_comparison(overall, args.width)
        }
    };

    println!("{plot}");
    Ok(())
}

/// Layer defaults, the optional TOML file and CLI overrides.
pub fn audit_config_from_args(args: &AuditArgs) -> Result<AuditConfig, AppError> {
    let mut config = crate::config::load_audit_config(args.config.as_deref())?;

    if let Some(v) = args.min_sample {
        config.min_sample_size = v;
    }
    if let Some(v) = args.p_value {
        config.p_value_threshold = v;
    }
    if let Some(v) = args.fixed_ratio {
        config.fixed_value_threshold = v;
    }
    if let Some(v) = args.repetition_ratio {
        config.repetition_threshold = v;
    }
    if let Some(v) = args.std_threshold {
        config.std_threshold = v;
    }
    if let Some(v) = &args.suspicious_values {
        config.suspicious_values = v.clone();
    }
    if let Some(v) = args.zero_policy {
        config.zero_policy = v;
    }
    if let Some(v) = args.fit_basis {
        config.fit_basis = v;
    }

    config.validate()?;
    Ok(config)
}

fn input_source_from_args(args: &AuditArgs, config: &AuditConfig) -> InputSource {
    match &args.input {
        Some(path) => InputSource::Csv {
            path: path.clone(),
            columns: ColumnMap {
                id: args.id_column.clone(),
                group: args.group_column.clone(),
                amount: args.amount_column.clone(),
            },
        },
        None => InputSource::Sample(sample_spec_from_args(&args.sample, &config.suspicious_values)),
    }
}

fn sample_spec_from_args(args: &SampleArgs, suspicious_values: &[i64]) -> SampleSpec {
    SampleSpec {
        seed: args.seed,
        honest_count: args.honest,
        suspicious_count: args.suspicious,
        skewed_count: args.skewed,
        vendors: default_vendors(args.vendors),
        suspicious_values: suspicious_values.to_vec(),
        ..SampleSpec::default()
    }
}

/// Install the stderr log subscriber (`RUST_LOG` wins over `-v`).
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "benford_audit=warn",
        1 => "benford_audit=info",
        _ => "benford_audit=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Rewrite argv so `benford` defaults to `benford tui`.
///
/// Rules:
/// - `benford`                      -> `benford tui`
/// - `benford -i x.csv ...`         -> `benford analyze -i x.csv ...`
/// - `benford --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "analyze" | "flagged" | "sample" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "analyze flags".
    if arg1.starts_with('-') {
        argv.insert(1, "analyze".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
