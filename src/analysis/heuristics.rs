//! Auxiliary suspicion metrics that do not depend on the digit test.
//!
//! All functions are total: an empty slice yields `0.0`, never `NaN`.

use std::collections::HashMap;

use crate::domain::HeuristicScores;

/// Share of amounts equal to one of `suspicious_values`.
pub fn fixed_value_ratio(amounts: &[i64], suspicious_values: &[i64]) -> f64 {
    if amounts.is_empty() {
        return 0.0;
    }
    let hits = amounts.iter().filter(|a| suspicious_values.contains(a)).count();
    hits as f64 / amounts.len() as f64
}

/// Share of amounts equal to the group's most frequent amount.
///
/// When several amounts tie for the maximum count the ratio is the same
/// whichever one is picked.
pub fn repetition_ratio(amounts: &[i64]) -> f64 {
    if amounts.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for &a in amounts {
        *counts.entry(a).or_default() += 1;
    }
    let top = counts.values().copied().max().unwrap_or(0);
    top as f64 / amounts.len() as f64
}

/// Sample standard deviation (`n - 1` denominator).
///
/// Fewer than two amounts have no sample spread; this returns `0.0`, which
/// always trips the low-std flag.
pub fn amount_std(amounts: &[i64]) -> f64 {
    let n = amounts.len();
    if n < 2 {
        return 0.0;
    }
    let mean = mean_amount(amounts);
    let ss: f64 = amounts
        .iter()
        .map(|&a| {
            let d = a as f64 - mean;
            d * d
        })
        .sum();
    let std = (ss / (n as f64 - 1.0)).sqrt();
    if std.is_finite() { std } else { 0.0 }
}

pub fn mean_amount(amounts: &[i64]) -> f64 {
    if amounts.is_empty() {
        return 0.0;
    }
    amounts.iter().map(|&a| a as f64).sum::<f64>() / amounts.len() as f64
}

/// Compute all three heuristics for one group.
pub fn score_amounts(amounts: &[i64], suspicious_values: &[i64]) -> HeuristicScores {
    HeuristicScores {
        fixed_value_ratio: fixed_value_ratio(amounts, suspicious_values),
        repetition_ratio: repetition_ratio(amounts),
        amount_std: amount_std(amounts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUSPICIOUS: [i64; 4] = [999, 888, 777, 666];

    fn with_share(value: i64, hits: usize, total: usize) -> Vec<i64> {
        let mut out = vec![value; hits];
        out.extend((0..total - hits).map(|i| 1_000 + 17 * i as i64));
        out
    }

    #[test]
    fn fixed_value_ratio_counts_any_configured_value() {
        let amounts = [999, 888, 5, 777, 666, 12, 13, 14];
        assert!((fixed_value_ratio(&amounts, &SUSPICIOUS) - 0.5).abs() < 1e-12);
        assert_eq!(fixed_value_ratio(&amounts, &[]), 0.0);
        assert_eq!(fixed_value_ratio(&[], &SUSPICIOUS), 0.0);
    }

    #[test]
    fn fixed_value_ratio_uses_configured_set() {
        let amounts = [500, 500, 1, 2];
        assert_eq!(fixed_value_ratio(&amounts, &SUSPICIOUS), 0.0);
        assert!((fixed_value_ratio(&amounts, &[500]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn twenty_five_vs_fifteen_percent_fixed_values() {
        let high = with_share(999, 25, 100);
        let low = with_share(999, 15, 100);
        assert!(fixed_value_ratio(&high, &SUSPICIOUS) > 0.2);
        assert!(fixed_value_ratio(&low, &SUSPICIOUS) <= 0.2);
    }

    #[test]
    fn repetition_ratio_uses_top_count() {
        let amounts = with_share(4_200, 30, 100);
        assert!((repetition_ratio(&amounts) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn repetition_ratio_ties_are_irrelevant() {
        let amounts = [5, 5, 7, 7, 9];
        assert!((repetition_ratio(&amounts) - 0.4).abs() < 1e-12);
        assert_eq!(repetition_ratio(&[]), 0.0);
    }

    #[test]
    fn std_is_sample_std() {
        // mean 5, squared deviations sum 32, n-1 = 7
        let amounts = [2, 4, 4, 4, 5, 5, 7, 9];
        assert!((amount_std(&amounts) - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn std_of_tiny_groups_is_zero() {
        assert_eq!(amount_std(&[]), 0.0);
        assert_eq!(amount_std(&[12_345]), 0.0);
        assert_eq!(amount_std(&[700, 700, 700]), 0.0);
    }

    #[test]
    fn score_amounts_bundles_all_three() {
        let s = score_amounts(&[999, 999, 10, 20], &SUSPICIOUS);
        assert!((s.fixed_value_ratio - 0.5).abs() < 1e-12);
        assert!((s.repetition_ratio - 0.5).abs() < 1e-12);
        assert!(s.amount_std > 200.0);
    }
}
