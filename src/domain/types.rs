//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the audit
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// One invoice-like observation.
///
/// Created by ingest or the sample generator and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    /// Partition key, e.g. a vendor name.
    pub group_key: String,
    /// Signed amount; only the magnitude matters for digit analysis.
    pub amount: i64,
}

impl Record {
    pub fn new(id: i64, group_key: impl Into<String>, amount: i64) -> Self {
        Self {
            id,
            group_key: group_key.into(),
            amount,
        }
    }
}

/// A leading digit, guaranteed to be in `1..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digit(u8);

impl Digit {
    /// All nine digits in order.
    pub const ALL: [Digit; 9] = [
        Digit(1),
        Digit(2),
        Digit(3),
        Digit(4),
        Digit(5),
        Digit(6),
        Digit(7),
        Digit(8),
        Digit(9),
    ];

    pub fn new(value: u8) -> Option<Self> {
        (1..=9).contains(&value).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Position in nine-entry vectors (`1 -> 0`, ..., `9 -> 8`).
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<u8> for Digit {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Digit::new(value).ok_or_else(|| format!("digit {value} is outside 1..=9"))
    }
}

impl From<Digit> for u8 {
    fn from(d: Digit) -> Self {
        d.0
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Observed leading-digit frequencies for one set of amounts.
///
/// Always total: all nine digits are present, absent digits carry `0.0`.
/// Built by `FrequencyTable::from_amounts` / `from_counts`; deserialization
/// rebuilds through `from_counts` so reloaded tables keep the same invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFrequencyTable")]
pub struct FrequencyTable {
    pub(crate) counts: [u64; 9],
    pub(crate) total: u64,
    pub(crate) frequencies: [f64; 9],
}

/// Wire shape of a `FrequencyTable` before validation.
#[derive(Deserialize)]
struct RawFrequencyTable {
    counts: [u64; 9],
    total: u64,
    frequencies: [f64; 9],
}

impl TryFrom<RawFrequencyTable> for FrequencyTable {
    type Error = String;

    fn try_from(raw: RawFrequencyTable) -> Result<Self, Self::Error> {
        let table = FrequencyTable::from_counts(raw.counts).map_err(|e| e.to_string())?;
        if raw.total != table.total {
            return Err(format!("total {} does not match counts (sum {})", raw.total, table.total));
        }
        let consistent = raw
            .frequencies
            .iter()
            .zip(table.frequencies.iter())
            .all(|(a, b)| (a - b).abs() <= 1e-9);
        if !consistent {
            return Err("frequencies do not match counts".to_string());
        }
        Ok(table)
    }
}

impl FrequencyTable {
    pub fn counts(&self) -> &[u64; 9] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn frequencies(&self) -> &[f64; 9] {
        &self.frequencies
    }

    pub fn frequency(&self, digit: Digit) -> f64 {
        self.frequencies[digit.index()]
    }

    pub fn count(&self, digit: Digit) -> u64 {
        self.counts[digit.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Digit, f64)> + '_ {
        Digit::ALL.into_iter().map(|d| (d, self.frequency(d)))
    }
}

/// Result of a chi-square goodness-of-fit test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoodnessOfFit {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: u32,
}

/// What to do with records whose amount is exactly zero.
///
/// Zero has no leading digit in `1..=9`, so it can never enter the digit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ZeroPolicy {
    /// Drop zero-amount records from their group before analysis (counted per group).
    #[default]
    Exclude,
    /// Fail the audit on the first zero-amount record.
    Reject,
}

/// Which vectors the chi-square statistic is computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FitBasis {
    /// Relative frequencies (both vectors sum to 1).
    ///
    /// This is not the textbook convention and shrinks the statistic by a factor
    /// of `n`; it is kept as the default so flags stay comparable with earlier
    /// reports.
    #[default]
    Frequency,
    /// Observed and expected counts (textbook chi-square).
    Counts,
}

/// Thresholds and policies for one audit run.
///
/// Every threshold is an input. Defaults: minimum sample 30, p < 0.05,
/// fixed-value ratio > 0.2, repetition ratio > 0.2, std < 200.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Groups smaller than this are excluded from testing.
    pub min_sample_size: usize,
    /// Benford flag when `p_value < p_value_threshold`.
    pub p_value_threshold: f64,
    /// Fixed-value flag when the ratio is strictly greater than this.
    pub fixed_value_threshold: f64,
    /// Repetition flag when the ratio is strictly greater than this.
    pub repetition_threshold: f64,
    /// Low-std flag when the amount std is strictly below this.
    pub std_threshold: f64,
    /// Amounts considered "round suspicious" values.
    pub suspicious_values: Vec<i64>,
    pub zero_policy: ZeroPolicy,
    pub fit_basis: FitBasis,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            min_sample_size: 30,
            p_value_threshold: 0.05,
            fixed_value_threshold: 0.2,
            repetition_threshold: 0.2,
            std_threshold: 200.0,
            suspicious_values: vec![999, 888, 777, 666],
            zero_policy: ZeroPolicy::Exclude,
            fit_basis: FitBasis::Frequency,
        }
    }
}

impl AuditConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.min_sample_size == 0 {
            return Err(AnalysisError::InvalidConfig(
                "min_sample_size must be at least 1".to_string(),
            ));
        }
        if !(self.p_value_threshold.is_finite() && (0.0..=1.0).contains(&self.p_value_threshold)) {
            return Err(AnalysisError::InvalidConfig(format!(
                "p_value_threshold must be in [0, 1] (got {})",
                self.p_value_threshold
            )));
        }
        for (name, value) in [
            ("fixed_value_threshold", self.fixed_value_threshold),
            ("repetition_threshold", self.repetition_threshold),
        ] {
            if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "{name} must be a ratio in [0, 1] (got {value})"
                )));
            }
        }
        if !(self.std_threshold.is_finite() && self.std_threshold >= 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "std_threshold must be finite and >= 0 (got {})",
                self.std_threshold
            )));
        }
        Ok(())
    }
}

/// One independent suspicion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    /// Leading digits do not conform to Benford's Law.
    Benford,
    /// Too many amounts equal one of the configured suspicious values.
    FixedValue,
    /// A single amount value dominates the group.
    Repetition,
    /// Amount spread is unusually low.
    LowStd,
}

impl FlagKind {
    pub const ALL: [FlagKind; 4] = [
        FlagKind::Benford,
        FlagKind::FixedValue,
        FlagKind::Repetition,
        FlagKind::LowStd,
    ];

    /// Short column label for terminal/CSV output.
    pub fn label(self) -> &'static str {
        match self {
            FlagKind::Benford => "benford",
            FlagKind::FixedValue => "value",
            FlagKind::Repetition => "repetition",
            FlagKind::LowStd => "low_std",
        }
    }
}

/// Auxiliary suspicion metrics for one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeuristicScores {
    pub fixed_value_ratio: f64,
    pub repetition_ratio: f64,
    pub amount_std: f64,
}

/// Full statistics for one group that met the minimum sample size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStatistics {
    pub group_key: String,
    pub sample_size: usize,
    /// Records dropped from this group by `ZeroPolicy::Exclude`.
    pub zero_excluded: usize,
    pub chi2_statistic: f64,
    pub p_value: f64,
    pub fixed_value_ratio: f64,
    pub repetition_ratio: f64,
    pub amount_std: f64,
    pub observed: FrequencyTable,
    pub flags: BTreeSet<FlagKind>,
    pub verdict: bool,
}

impl GroupStatistics {
    pub fn has(&self, flag: FlagKind) -> bool {
        self.flags.contains(&flag)
    }
}

/// Why a group was left out of testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SkipReason {
    BelowMinimumSample { minimum: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::BelowMinimumSample { minimum } => {
                write!(f, "below minimum sample size ({minimum})")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedGroup {
    pub group_key: String,
    pub sample_size: usize,
    pub reason: SkipReason,
}

/// Descriptive metrics for every group, tested or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupProfile {
    pub group_key: String,
    pub count: usize,
    pub mean_amount: f64,
    pub std_amount: f64,
    /// Share of amounts whose leading digit is 9.
    pub leading_nine_share: f64,
    /// Number of amounts equal to a configured suspicious value.
    pub suspicious_count: usize,
}

/// Observed vs expected digit frequencies over a whole record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitComparison {
    pub observed: FrequencyTable,
    pub expected: [f64; 9],
    pub fit: GoodnessOfFit,
}

/// Run-level verdict counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub eligible: usize,
    pub flagged: usize,
    pub skipped: usize,
    /// `(eligible - flagged) / eligible * 100`; `None` when nothing was eligible.
    pub reliability_rate: Option<f64>,
    pub benford_flags: usize,
    pub fixed_value_flags: usize,
    pub repetition_flags: usize,
    pub low_std_flags: usize,
}

/// Summary stats about the records that went into a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub n_records: usize,
    pub n_groups: usize,
    pub amount_min: i64,
    pub amount_max: i64,
    pub zero_amounts: usize,
}

/// A saved audit report (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    /// Input description: a CSV path or `sample(seed=N)`.
    pub source: String,
    pub config: AuditConfig,
    pub dataset: DatasetStats,
    pub overall: Option<DigitComparison>,
    pub groups: Vec<GroupStatistics>,
    pub skipped: Vec<SkippedGroup>,
    pub profiles: Vec<GroupProfile>,
    pub summary: AuditSummary,
}
