//! Leading-digit extraction.
//!
//! Zero has no leading digit in `1..=9` and is reported as
//! `AnalysisError::ZeroAmount` instead of being reduced forever.

use crate::domain::Digit;
use crate::error::AnalysisError;

/// Most significant decimal digit of `|amount|`.
pub fn leading_digit(amount: i64) -> Result<Digit, AnalysisError> {
    // `unsigned_abs` keeps `i64::MIN` representable.
    let mut x = amount.unsigned_abs();
    if x == 0 {
        return Err(AnalysisError::ZeroAmount);
    }
    while x >= 10 {
        x /= 10;
    }
    // x is in 1..=9 here.
    Digit::new(x as u8).ok_or(AnalysisError::ZeroAmount)
}

/// Leading digit of an integer-valued real.
///
/// The value is truncated toward zero first, so `0.75` counts as zero and
/// `-1234.9` has leading digit 1.
pub fn leading_digit_f64(amount: f64) -> Result<Digit, AnalysisError> {
    if !amount.is_finite() {
        return Err(AnalysisError::NonFiniteAmount(amount));
    }
    let mut x = amount.abs().trunc();
    if x < 1.0 {
        return Err(AnalysisError::ZeroAmount);
    }
    while x >= 10.0 {
        x = (x / 10.0).trunc();
    }
    Digit::new(x as u8).ok_or(AnalysisError::ZeroAmount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_digits_are_unchanged() {
        for d in 1..=9i64 {
            assert_eq!(leading_digit(d).unwrap().get() as i64, d);
            assert_eq!(leading_digit(-d).unwrap().get() as i64, d);
        }
    }

    #[test]
    fn multi_digit_amounts() {
        assert_eq!(leading_digit(10).unwrap().get(), 1);
        assert_eq!(leading_digit(999).unwrap().get(), 9);
        assert_eq!(leading_digit(-4_321).unwrap().get(), 4);
        assert_eq!(leading_digit(i64::MAX).unwrap().get(), 9);
        assert_eq!(leading_digit(i64::MIN).unwrap().get(), 9);
    }

    #[test]
    fn every_nonzero_amount_yields_a_digit_in_range() {
        let mut x: i64 = 1;
        for step in 0..5_000i64 {
            x = x.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(step | 1);
            if x == 0 {
                continue;
            }
            let d = leading_digit(x).unwrap().get();
            assert!((1..=9).contains(&d), "{x} -> {d}");
            let text = x.unsigned_abs().to_string();
            assert_eq!(text.as_bytes()[0] - b'0', d);
        }
    }

    #[test]
    fn zero_is_an_explicit_error() {
        assert_eq!(leading_digit(0), Err(AnalysisError::ZeroAmount));
        assert_eq!(leading_digit_f64(0.0), Err(AnalysisError::ZeroAmount));
        assert_eq!(leading_digit_f64(-0.5), Err(AnalysisError::ZeroAmount));
    }

    #[test]
    fn reals_are_truncated() {
        assert_eq!(leading_digit_f64(1_234.99).unwrap().get(), 1);
        assert_eq!(leading_digit_f64(-987.1).unwrap().get(), 9);
        assert_eq!(leading_digit_f64(9.999).unwrap().get(), 9);
        assert!(matches!(
            leading_digit_f64(f64::NAN),
            Err(AnalysisError::NonFiniteAmount(_))
        ));
        assert!(leading_digit_f64(f64::INFINITY).is_err());
    }
}
