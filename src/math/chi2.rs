//! Chi-square goodness-of-fit over the nine leading-digit categories.
//!
//! ```text
//! X² = Σ (O_d - E_d)² / E_d,   p = P(χ²(8) ≥ X²)
//! ```
//!
//! The caller decides whether `O`/`E` are frequencies or counts (`FitBasis`).
//! With frequencies the statistic is `n` times smaller than the textbook one;
//! the audit keeps that convention by default.

use crate::domain::GoodnessOfFit;
use crate::error::AnalysisError;
use crate::math::benford::DigitVector;
use crate::math::gamma::regularized_gamma_q;

/// Degrees of freedom for nine categories.
pub const DIGIT_DOF: u32 = 8;

/// Upper-tail probability of the chi-square distribution.
pub fn chi_square_sf(statistic: f64, dof: u32) -> f64 {
    if dof == 0 {
        return 1.0;
    }
    regularized_gamma_q(f64::from(dof) / 2.0, statistic / 2.0)
}

/// Run the test on two aligned nine-entry vectors.
pub fn chi_square_test(observed: &DigitVector, expected: &DigitVector) -> Result<GoodnessOfFit, AnalysisError> {
    if let Some((idx, &value)) = expected.iter().enumerate().find(|(_, e)| !(e.is_finite() && **e > 0.0)) {
        return Err(AnalysisError::InvalidExpected {
            digit: idx as u8 + 1,
            value,
        });
    }

    let diff = observed - expected;
    let statistic = diff.component_mul(&diff).component_div(expected).sum();
    let p_value = chi_square_sf(statistic, DIGIT_DOF);

    Ok(GoodnessOfFit {
        statistic,
        p_value,
        dof: DIGIT_DOF,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::benford::benford_distribution;

    fn one_hot(digit: usize) -> DigitVector {
        let mut v = DigitVector::zeros();
        v[digit - 1] = 1.0;
        v
    }

    #[test]
    fn critical_value_for_eight_dof() {
        // 15.507 is the 5% critical value for χ²(8).
        let p = chi_square_sf(15.507, 8);
        assert!((p - 0.05).abs() < 1e-3, "p={p}");
    }

    #[test]
    fn perfect_fit_gives_zero_statistic() {
        let expected = benford_distribution().as_vector();
        let fit = chi_square_test(&expected, &expected).unwrap();
        assert!(fit.statistic.abs() < 1e-12);
        assert!((fit.p_value - 1.0).abs() < 1e-9);
        assert_eq!(fit.dof, 8);
    }

    #[test]
    fn all_nines_is_significant() {
        let expected = benford_distribution().as_vector();
        let fit = chi_square_test(&one_hot(9), &expected).unwrap();
        assert!(fit.statistic > 15.507, "stat={}", fit.statistic);
        assert!(fit.p_value < 0.05, "p={}", fit.p_value);
    }

    // Known approximation of the frequency basis: a group made only of 2s is
    // far from Benford but its frequency statistic stays small.
    #[test]
    fn frequency_basis_misses_low_single_digit() {
        let expected = benford_distribution().as_vector();
        let fit = chi_square_test(&one_hot(2), &expected).unwrap();
        assert!(fit.p_value > 0.05, "p={}", fit.p_value);

        // The same shape on counts (n = 30) is overwhelmingly significant.
        let n = 30.0;
        let counts = chi_square_test(&(one_hot(2) * n), &(expected * n)).unwrap();
        assert!((counts.statistic - fit.statistic * n).abs() < 1e-9);
        assert!(counts.p_value < 1e-6);
    }

    #[test]
    fn statistic_is_non_negative_and_p_in_unit_interval() {
        let expected = benford_distribution().as_vector();
        for d in 1..=9 {
            let fit = chi_square_test(&one_hot(d), &expected).unwrap();
            assert!(fit.statistic >= 0.0);
            assert!((0.0..=1.0).contains(&fit.p_value));
        }
    }

    #[test]
    fn rejects_non_positive_expected() {
        let mut expected = benford_distribution().as_vector();
        expected[4] = 0.0;
        let err = chi_square_test(&one_hot(1), &expected).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidExpected { digit: 5, .. }));
    }
}
