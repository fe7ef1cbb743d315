//! Group partitioning and per-group evaluation.
//!
//! Workflow:
//! records -> zero policy -> partition by key -> skip undersized groups ->
//! evaluate eligible groups (parallel) -> sort -> profiles + overall + summary
//!
//! Groups never interact, so evaluating them on rayon's pool gives the same
//! result as a sequential loop once the output is sorted.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::analysis::heuristics::score_amounts;
use crate::analysis::profile::profile_group;
use crate::analysis::verdict::{evaluate_flags, summarize, verdict};
use crate::domain::{
    AuditConfig, AuditSummary, DatasetStats, DigitComparison, FitBasis, FrequencyTable, GoodnessOfFit,
    GroupProfile, GroupStatistics, Record, SkipReason, SkippedGroup, ZeroPolicy,
};
use crate::error::AnalysisError;
use crate::math::benford::{DigitDistribution, benford_distribution};
use crate::math::chi2::chi_square_test;

/// Everything one audit run computes.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditOutcome {
    /// Eligible groups, flagged first, then by group key.
    pub groups: Vec<GroupStatistics>,
    /// Groups left out of testing, by group key.
    pub skipped: Vec<SkippedGroup>,
    /// Profiles for every group, by group key.
    pub profiles: Vec<GroupProfile>,
    /// Digit comparison over all non-zero amounts.
    pub overall: Option<DigitComparison>,
    pub summary: AuditSummary,
    pub dataset: DatasetStats,
}

/// Amounts of one group after the zero policy was applied.
#[derive(Debug, Default)]
struct GroupAmounts {
    amounts: Vec<i64>,
    zero_excluded: usize,
}

/// Run the full audit over an in-memory record set.
///
/// Pure function of `records` and `config`.
pub fn audit(records: &[Record], config: &AuditConfig) -> Result<AuditOutcome, AnalysisError> {
    config.validate()?;

    let partitions = partition(records, config.zero_policy)?;
    let expected = benford_distribution();

    let mut eligible = Vec::new();
    let mut skipped = Vec::new();
    for (key, group) in &partitions {
        let n = group.amounts.len();
        if n < config.min_sample_size {
            debug!(group = %key, n, "skipping undersized group");
            skipped.push(SkippedGroup {
                group_key: (*key).to_string(),
                sample_size: n,
                reason: SkipReason::BelowMinimumSample {
                    minimum: config.min_sample_size,
                },
            });
        } else {
            eligible.push((*key, group));
        }
    }

    let mut groups = eligible
        .par_iter()
        .map(|(key, group)| evaluate_group(key, &group.amounts, group.zero_excluded, &expected, config))
        .collect::<Result<Vec<_>, _>>()?;
    groups.sort_by(|a, b| b.verdict.cmp(&a.verdict).then_with(|| a.group_key.cmp(&b.group_key)));

    let profiles = partitions
        .iter()
        .map(|(key, group)| profile_group(key, &group.amounts, &config.suspicious_values))
        .collect();

    let all_amounts: Vec<i64> = partitions.values().flat_map(|g| g.amounts.iter().copied()).collect();
    let overall = if all_amounts.is_empty() {
        None
    } else {
        let observed = FrequencyTable::from_amounts(&all_amounts)?;
        let fit = compare_to_distribution(&observed, &expected, config.fit_basis)?;
        Some(DigitComparison {
            observed,
            expected: *expected.probabilities(),
            fit,
        })
    };

    let summary = summarize(&groups, skipped.len());
    let dataset = dataset_stats(records, partitions.len());

    info!(
        records = dataset.n_records,
        groups = dataset.n_groups,
        eligible = summary.eligible,
        flagged = summary.flagged,
        skipped = summary.skipped,
        "audit complete"
    );

    Ok(AuditOutcome {
        groups,
        skipped,
        profiles,
        overall,
        summary,
        dataset,
    })
}

/// Evaluate one group's digit fit and heuristics.
///
/// `amounts` must be non-empty and free of zeros.
pub fn evaluate_group(
    group_key: &str,
    amounts: &[i64],
    zero_excluded: usize,
    expected: &DigitDistribution,
    config: &AuditConfig,
) -> Result<GroupStatistics, AnalysisError> {
    let observed = FrequencyTable::from_amounts(amounts)?;
    let fit = compare_to_distribution(&observed, expected, config.fit_basis)?;
    let scores = score_amounts(amounts, &config.suspicious_values);
    let flags = evaluate_flags(fit.p_value, &scores, config);
    let verdict = verdict(&flags);

    debug!(
        group = %group_key,
        n = amounts.len(),
        chi2 = fit.statistic,
        p = fit.p_value,
        ?flags,
        "evaluated group"
    );

    Ok(GroupStatistics {
        group_key: group_key.to_string(),
        sample_size: amounts.len(),
        zero_excluded,
        chi2_statistic: fit.statistic,
        p_value: fit.p_value,
        fixed_value_ratio: scores.fixed_value_ratio,
        repetition_ratio: scores.repetition_ratio,
        amount_std: scores.amount_std,
        observed,
        flags,
        verdict,
    })
}

/// Chi-square test of an observed table against a reference distribution.
pub fn compare_to_distribution(
    observed: &FrequencyTable,
    expected: &DigitDistribution,
    basis: FitBasis,
) -> Result<GoodnessOfFit, AnalysisError> {
    match basis {
        FitBasis::Frequency => chi_square_test(&observed.as_vector(), &expected.as_vector()),
        FitBasis::Counts => {
            let n = observed.total() as f64;
            chi_square_test(&(observed.as_vector() * n), &(expected.as_vector() * n))
        }
    }
}

fn partition(records: &[Record], policy: ZeroPolicy) -> Result<BTreeMap<&str, GroupAmounts>, AnalysisError> {
    let mut out: BTreeMap<&str, GroupAmounts> = BTreeMap::new();
    for r in records {
        let group = out.entry(r.group_key.as_str()).or_default();
        if r.amount != 0 {
            group.amounts.push(r.amount);
            continue;
        }
        match policy {
            ZeroPolicy::Exclude => group.zero_excluded += 1,
            ZeroPolicy::Reject => {
                return Err(AnalysisError::ZeroAmountInGroup {
                    group: r.group_key.clone(),
                    id: r.id,
                });
            }
        }
    }
    Ok(out)
}

fn dataset_stats(records: &[Record], n_groups: usize) -> DatasetStats {
    DatasetStats {
        n_records: records.len(),
        n_groups,
        amount_min: records.iter().map(|r| r.amount).min().unwrap_or(0),
        amount_max: records.iter().map(|r| r.amount).max().unwrap_or(0),
        zero_amounts: records.iter().filter(|r| r.amount == 0).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FlagKind;

    fn push_group(out: &mut Vec<Record>, key: &str, amounts: &[i64]) {
        for &a in amounts {
            let id = out.len() as i64 + 1;
            out.push(Record::new(id, key, a));
        }
    }

    /// `d * scale + k * step` for each digit `d` repeated `counts[d-1]` times.
    fn digit_amounts(counts: [usize; 9], scale: i64, step: i64) -> Vec<i64> {
        let mut out = Vec::new();
        for (i, &c) in counts.iter().enumerate() {
            let d = i as i64 + 1;
            out.extend((0..c as i64).map(|k| d * scale + k * step));
        }
        out
    }

    /// alpha: Benford-like, wide spread, one zero amount (30 usable)
    /// bravo: 40% suspicious fixed values
    /// charlie: 20 records (undersized)
    /// delta: Benford-ish digits but a narrow 100..217 range
    fn literal_records() -> Vec<Record> {
        let mut records = Vec::new();

        let mut alpha = digit_amounts([9, 5, 4, 3, 3, 2, 2, 1, 1], 1_000, 13);
        alpha.push(0);
        push_group(&mut records, "alpha", &alpha);

        let mut bravo = vec![999, 888, 777, 666, 999, 888, 777, 666, 999, 888, 777, 666];
        bravo.extend(digit_amounts([6, 3, 2, 2, 1, 1, 1, 1, 1], 1_000, 7));
        push_group(&mut records, "bravo", &bravo);

        let charlie: Vec<i64> = (0..20).map(|i| 1_000 + 321 * i).collect();
        push_group(&mut records, "charlie", &charlie);

        let delta: Vec<i64> = (0..40).map(|i| 100 + 3 * i).collect();
        push_group(&mut records, "delta", &delta);

        records
    }

    #[test]
    fn end_to_end_literal_records() {
        let outcome = audit(&literal_records(), &AuditConfig::default()).unwrap();

        let keys: Vec<&str> = outcome.groups.iter().map(|g| g.group_key.as_str()).collect();
        assert_eq!(keys, vec!["bravo", "delta", "alpha"]);

        let bravo = &outcome.groups[0];
        assert!(bravo.verdict);
        assert_eq!(bravo.flags.iter().copied().collect::<Vec<_>>(), vec![FlagKind::FixedValue]);
        assert!((bravo.fixed_value_ratio - 0.4).abs() < 1e-12);

        let delta = &outcome.groups[1];
        assert!(delta.verdict);
        assert_eq!(delta.flags.iter().copied().collect::<Vec<_>>(), vec![FlagKind::LowStd]);
        assert!(delta.amount_std < 200.0);

        let alpha = &outcome.groups[2];
        assert!(!alpha.verdict);
        assert!(alpha.flags.is_empty());
        assert_eq!(alpha.sample_size, 30);
        assert_eq!(alpha.zero_excluded, 1);
        assert!(alpha.p_value > 0.99);

        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].group_key, "charlie");
        assert_eq!(outcome.skipped[0].sample_size, 20);

        let s = &outcome.summary;
        assert_eq!((s.eligible, s.flagged, s.skipped), (3, 2, 1));
        assert!((s.reliability_rate.unwrap() - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(s.fixed_value_flags, 1);
        assert_eq!(s.low_std_flags, 1);
        assert_eq!(s.benford_flags, 0);

        assert_eq!(outcome.profiles.len(), 4);
        assert_eq!(outcome.dataset.zero_amounts, 1);
        assert_eq!(outcome.overall.as_ref().unwrap().observed.total(), 120);
    }

    #[test]
    fn audit_is_deterministic() {
        let records = literal_records();
        let cfg = AuditConfig::default();
        let a = audit(&records, &cfg).unwrap();
        let b = audit(&records, &cfg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn minimum_sample_size_is_inclusive() {
        let mut records = Vec::new();
        let mut at_min = vec![100; 25];
        at_min.extend([200; 5]);
        push_group(&mut records, "at-min", &at_min);
        let below: Vec<i64> = (0..29).map(|i| 9_000 + i).collect();
        push_group(&mut records, "below", &below);

        let outcome = audit(&records, &AuditConfig::default()).unwrap();
        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.groups[0].group_key, "at-min");
        assert_eq!(outcome.groups[0].sample_size, 30);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].group_key, "below");
        assert_eq!(
            outcome.skipped[0].reason,
            SkipReason::BelowMinimumSample { minimum: 30 }
        );
    }

    #[test]
    fn zeros_do_not_count_toward_sample_size() {
        let mut records = Vec::new();
        let mut amounts: Vec<i64> = (0..29).map(|i| 1_000 + 500 * i).collect();
        amounts.push(0);
        push_group(&mut records, "v", &amounts);
        let outcome = audit(&records, &AuditConfig::default()).unwrap();
        assert!(outcome.groups.is_empty());
        assert_eq!(outcome.skipped[0].sample_size, 29);
    }

    #[test]
    fn reject_policy_fails_on_zero() {
        let cfg = AuditConfig {
            zero_policy: ZeroPolicy::Reject,
            ..AuditConfig::default()
        };
        let err = audit(&literal_records(), &cfg).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::ZeroAmountInGroup {
                group: "alpha".to_string(),
                id: 31,
            }
        );
    }

    #[test]
    fn single_leading_nine_group_fails_benford() {
        let mut records = Vec::new();
        let amounts: Vec<i64> = (0..30).map(|i| 9_000 + 31 * i).collect();
        push_group(&mut records, "nines", &amounts);
        let outcome = audit(&records, &AuditConfig::default()).unwrap();
        let g = &outcome.groups[0];
        assert!(g.p_value < 0.05, "p={}", g.p_value);
        assert!(g.has(FlagKind::Benford));
        assert!(g.verdict);
    }

    #[test]
    fn counts_basis_scales_the_statistic() {
        let records = literal_records();
        let freq = audit(&records, &AuditConfig::default()).unwrap();
        let counts = audit(
            &records,
            &AuditConfig {
                fit_basis: FitBasis::Counts,
                ..AuditConfig::default()
            },
        )
        .unwrap();

        let f = freq.groups.iter().find(|g| g.group_key == "delta").unwrap();
        let c = counts.groups.iter().find(|g| g.group_key == "delta").unwrap();
        assert!((c.chi2_statistic - f.chi2_statistic * 40.0).abs() < 1e-9);
        // Narrow 1xx amounts are clearly non-Benford on counts.
        assert!(c.has(FlagKind::Benford));
        assert!(!f.has(FlagKind::Benford));
    }

    #[test]
    fn single_record_group_is_low_std() {
        let cfg = AuditConfig {
            min_sample_size: 1,
            ..AuditConfig::default()
        };
        let outcome = audit(&[Record::new(1, "solo", 5_000)], &cfg).unwrap();

        assert!(outcome.skipped.is_empty());
        let solo = &outcome.groups[0];
        assert_eq!(solo.sample_size, 1);
        assert_eq!(solo.amount_std, 0.0);
        assert!(solo.has(FlagKind::LowStd));
        assert!(solo.verdict);
        assert_eq!(outcome.summary.flagged, 1);
        assert_eq!(outcome.summary.reliability_rate, Some(0.0));
    }

    #[test]
    fn empty_input_gives_empty_outcome() {
        let outcome = audit(&[], &AuditConfig::default()).unwrap();
        assert!(outcome.groups.is_empty());
        assert!(outcome.overall.is_none());
        assert_eq!(outcome.summary.reliability_rate, None);
    }

    #[test]
    fn invalid_config_is_rejected_before_work() {
        let cfg = AuditConfig {
            p_value_threshold: -1.0,
            ..AuditConfig::default()
        };
        assert!(matches!(audit(&[], &cfg), Err(AnalysisError::InvalidConfig(_))));
    }
}
