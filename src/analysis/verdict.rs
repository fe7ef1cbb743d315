//! Flag combination and run summary.
//!
//! A group is flagged when *any* signal fires (logical OR). Comparisons are
//! written so that a `NaN` input fires its flag instead of silently passing.

use std::collections::BTreeSet;

use crate::domain::{AuditConfig, AuditSummary, FlagKind, GroupStatistics, HeuristicScores};

/// Evaluate every signal for one group.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub fn evaluate_flags(p_value: f64, scores: &HeuristicScores, config: &AuditConfig) -> BTreeSet<FlagKind> {
    let mut flags = BTreeSet::new();

    if !(p_value >= config.p_value_threshold) {
        flags.insert(FlagKind::Benford);
    }
    if !(scores.fixed_value_ratio <= config.fixed_value_threshold) {
        flags.insert(FlagKind::FixedValue);
    }
    if !(scores.repetition_ratio <= config.repetition_threshold) {
        flags.insert(FlagKind::Repetition);
    }
    if !(scores.amount_std >= config.std_threshold) {
        flags.insert(FlagKind::LowStd);
    }

    flags
}

pub fn verdict(flags: &BTreeSet<FlagKind>) -> bool {
    !flags.is_empty()
}

/// Reliability rate in percent; `None` when no group was eligible.
pub fn reliability_rate(eligible: usize, flagged: usize) -> Option<f64> {
    if eligible == 0 {
        return None;
    }
    Some((eligible - flagged.min(eligible)) as f64 / eligible as f64 * 100.0)
}

/// Summarize evaluated groups.
pub fn summarize(groups: &[GroupStatistics], skipped: usize) -> AuditSummary {
    let eligible = groups.len();
    let flagged = groups.iter().filter(|g| g.verdict).count();
    let count = |flag: FlagKind| groups.iter().filter(|g| g.has(flag)).count();

    AuditSummary {
        eligible,
        flagged,
        skipped,
        reliability_rate: reliability_rate(eligible, flagged),
        benford_flags: count(FlagKind::Benford),
        fixed_value_flags: count(FlagKind::FixedValue),
        repetition_flags: count(FlagKind::Repetition),
        low_std_flags: count(FlagKind::LowStd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_scores() -> HeuristicScores {
        HeuristicScores {
            fixed_value_ratio: 0.0,
            repetition_ratio: 0.05,
            amount_std: 1_500.0,
        }
    }

    #[test]
    fn clean_group_has_no_flags() {
        let flags = evaluate_flags(0.9, &clean_scores(), &AuditConfig::default());
        assert!(flags.is_empty());
        assert!(!verdict(&flags));
    }

    #[test]
    fn each_signal_flags_independently() {
        let cfg = AuditConfig::default();

        let flags = evaluate_flags(0.01, &clean_scores(), &cfg);
        assert_eq!(flags.into_iter().collect::<Vec<_>>(), vec![FlagKind::Benford]);

        let scores = HeuristicScores {
            fixed_value_ratio: 0.25,
            ..clean_scores()
        };
        assert!(evaluate_flags(0.9, &scores, &cfg).contains(&FlagKind::FixedValue));

        let scores = HeuristicScores {
            repetition_ratio: 0.3,
            ..clean_scores()
        };
        assert!(evaluate_flags(0.9, &scores, &cfg).contains(&FlagKind::Repetition));

        let scores = HeuristicScores {
            amount_std: 150.0,
            ..clean_scores()
        };
        let flags = evaluate_flags(0.9, &scores, &cfg);
        assert!(flags.contains(&FlagKind::LowStd));
        assert!(verdict(&flags));
    }

    #[test]
    fn thresholds_are_strict() {
        let cfg = AuditConfig::default();
        let scores = HeuristicScores {
            fixed_value_ratio: 0.2,
            repetition_ratio: 0.2,
            amount_std: 200.0,
        };
        assert!(evaluate_flags(0.05, &scores, &cfg).is_empty());
    }

    #[test]
    fn thresholds_come_from_config() {
        let cfg = AuditConfig {
            p_value_threshold: 0.5,
            std_threshold: 2_000.0,
            ..AuditConfig::default()
        };
        let flags = evaluate_flags(0.4, &clean_scores(), &cfg);
        assert!(flags.contains(&FlagKind::Benford));
        assert!(flags.contains(&FlagKind::LowStd));
    }

    #[test]
    fn nan_inputs_fire_their_flags() {
        let scores = HeuristicScores {
            fixed_value_ratio: f64::NAN,
            repetition_ratio: f64::NAN,
            amount_std: f64::NAN,
        };
        let flags = evaluate_flags(f64::NAN, &scores, &AuditConfig::default());
        assert_eq!(flags.len(), 4);
    }

    #[test]
    fn reliability_rate_handles_empty_runs() {
        assert_eq!(reliability_rate(0, 0), None);
        assert_eq!(reliability_rate(4, 1), Some(75.0));
        assert_eq!(reliability_rate(3, 3), Some(0.0));
    }
}
