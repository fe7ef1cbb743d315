//! Leading-digit frequency aggregation.

use crate::domain::{FrequencyTable, Record};
use crate::error::AnalysisError;
use crate::math::benford::DigitVector;
use crate::math::digits::leading_digit;

impl FrequencyTable {
    /// Count leading digits of `amounts` and normalize by the total.
    ///
    /// Fails on an empty slice and on any zero amount.
    pub fn from_amounts(amounts: &[i64]) -> Result<Self, AnalysisError> {
        let mut counts = [0u64; 9];
        for &amount in amounts {
            counts[leading_digit(amount)?.index()] += 1;
        }
        Self::from_counts(counts)
    }

    pub fn from_records(records: &[&Record]) -> Result<Self, AnalysisError> {
        let amounts: Vec<i64> = records.iter().map(|r| r.amount).collect();
        Self::from_amounts(&amounts)
    }

    pub fn from_counts(counts: [u64; 9]) -> Result<Self, AnalysisError> {
        let total: u64 = counts.iter().sum();
        if total == 0 {
            return Err(AnalysisError::EmptyGroup);
        }
        let mut frequencies = [0.0; 9];
        for (f, &c) in frequencies.iter_mut().zip(counts.iter()) {
            *f = c as f64 / total as f64;
        }
        Ok(Self {
            counts,
            total,
            frequencies,
        })
    }

    pub fn as_vector(&self) -> DigitVector {
        DigitVector::from(self.frequencies)
    }
}
