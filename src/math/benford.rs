//! Benford's Law reference distribution.
//!
//! `P(d) = log10(1 + 1/d)` for `d` in `1..=9`.

use nalgebra::SVector;

use crate::domain::Digit;

/// Nine-entry vector aligned to digits `1..=9`.
pub type DigitVector = SVector<f64, 9>;

/// The Benford leading-digit distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DigitDistribution {
    probabilities: [f64; 9],
}

impl DigitDistribution {
    /// Probability of `digit` as the leading digit.
    pub fn probability(&self, digit: Digit) -> f64 {
        self.probabilities[digit.index()]
    }

    pub fn probabilities(&self) -> &[f64; 9] {
        &self.probabilities
    }

    pub fn as_vector(&self) -> DigitVector {
        DigitVector::from(self.probabilities)
    }
}

/// Build the Benford distribution.
pub fn benford_distribution() -> DigitDistribution {
    let mut probabilities = [0.0; 9];
    for d in Digit::ALL {
        probabilities[d.index()] = (1.0 + 1.0 / f64::from(d.get())).log10();
    }
    DigitDistribution { probabilities }
}
