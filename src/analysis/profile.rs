//! Per-group descriptive metrics (the numbers behind the vendor heatmap).
//!
//! Profiles are computed for every group, including the ones too small to be
//! tested, and use the same zero-filtered amounts as the audit.

use crate::analysis::heuristics::{amount_std, mean_amount};
use crate::domain::GroupProfile;
use crate::math::digits::leading_digit;

pub fn profile_group(group_key: &str, amounts: &[i64], suspicious_values: &[i64]) -> GroupProfile {
    let count = amounts.len();
    let nines = amounts
        .iter()
        .filter(|&&a| leading_digit(a).map(|d| d.get() == 9).unwrap_or(false))
        .count();
    let leading_nine_share = if count == 0 { 0.0 } else { nines as f64 / count as f64 };

    GroupProfile {
        group_key: group_key.to_string(),
        count,
        mean_amount: mean_amount(amounts),
        std_amount: amount_std(amounts),
        leading_nine_share,
        suspicious_count: amounts.iter().filter(|a| suspicious_values.contains(a)).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_basic() {
        let p = profile_group("Vendor A", &[999, 9_100, 120, 400], &[999, 888]);
        assert_eq!(p.group_key, "Vendor A");
        assert_eq!(p.count, 4);
        assert!((p.mean_amount - 2_654.75).abs() < 1e-9);
        assert!((p.leading_nine_share - 0.5).abs() < 1e-12);
        assert_eq!(p.suspicious_count, 1);
        assert!(p.std_amount > 0.0);
    }

    #[test]
    fn empty_profile_has_no_nan() {
        let p = profile_group("X", &[], &[999]);
        assert_eq!(p.count, 0);
        assert_eq!(p.mean_amount, 0.0);
        assert_eq!(p.std_amount, 0.0);
        assert_eq!(p.leading_nine_share, 0.0);
    }
}
