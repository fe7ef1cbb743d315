//! Synthetic invoice generation for demonstrations.
//!
//! The generator mixes:
//! - honest invoices: log-normal amounts (μ = 7, σ = 0.5), truncated to integers
//! - suspicious invoices: drawn from the configured "round" values
//! - optionally, a fabricating vendor whose amounts cluster on high leading digits
//!
//! Honest and suspicious invoices get a vendor drawn uniformly from `vendors`;
//! skewed invoices all go to `skewed_vendor`. Everything is driven by one
//! explicit seed, so the same spec always yields the same records.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::LogNormal;
use tracing::info;

use crate::domain::Record;
use crate::error::AppError;

/// Amounts used by the skewed (fabricating) vendor.
pub const SKEWED_AMOUNTS: [i64; 6] = [900, 950, 980, 999, 890, 970];

#[derive(Debug, Clone, PartialEq)]
pub struct SampleSpec {
    pub seed: u64,
    pub honest_count: usize,
    pub suspicious_count: usize,
    pub skewed_count: usize,
    pub vendors: Vec<String>,
    pub skewed_vendor: String,
    /// Parameters of the underlying normal for honest amounts.
    pub log_mean: f64,
    pub log_sigma: f64,
    pub suspicious_values: Vec<i64>,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            seed: 42,
            honest_count: 950,
            suspicious_count: 50,
            skewed_count: 0,
            vendors: default_vendors(4),
            skewed_vendor: "Vendor X".to_string(),
            log_mean: 7.0,
            log_sigma: 0.5,
            suspicious_values: vec![999, 888, 777, 666],
        }
    }
}

/// `Vendor A`, `Vendor B`, ... (wrapping to `Vendor AA`-style names past 26).
pub fn default_vendors(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let letter = char::from(b'A' + (i % 26) as u8);
            if i < 26 {
                format!("Vendor {letter}")
            } else {
                format!("Vendor {letter}{}", i / 26)
            }
        })
        .collect()
}

/// Generate records according to `spec`.
pub fn generate_sample(spec: &SampleSpec) -> Result<Vec<Record>, AppError> {
    if spec.honest_count + spec.suspicious_count + spec.skewed_count == 0 {
        return Err(AppError::new(2, "Sample must contain at least one record."));
    }
    if spec.vendors.is_empty() && spec.honest_count + spec.suspicious_count > 0 {
        return Err(AppError::new(2, "Sample needs at least one vendor."));
    }
    if spec.suspicious_count > 0 && spec.suspicious_values.is_empty() {
        return Err(AppError::new(2, "Suspicious invoices requested but no suspicious values configured."));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let lognormal = LogNormal::new(spec.log_mean, spec.log_sigma)
        .map_err(|e| AppError::new(2, format!("Invalid log-normal parameters: {e}")))?;

    let mut amounts = Vec::with_capacity(spec.honest_count + spec.suspicious_count);
    for _ in 0..spec.honest_count {
        // Truncation toward zero, as an integer cast of the draw.
        amounts.push(lognormal.sample(&mut rng) as i64);
    }
    for _ in 0..spec.suspicious_count {
        let v = spec
            .suspicious_values
            .choose(&mut rng)
            .copied()
            .ok_or_else(|| AppError::new(2, "No suspicious values to draw from."))?;
        amounts.push(v);
    }

    let mut records = Vec::with_capacity(amounts.len() + spec.skewed_count);
    for amount in amounts {
        let vendor = spec
            .vendors
            .choose(&mut rng)
            .ok_or_else(|| AppError::new(2, "Sample needs at least one vendor."))?;
        let id = records.len() as i64 + 1;
        records.push(Record::new(id, vendor.clone(), amount));
    }

    for _ in 0..spec.skewed_count {
        let amount = SKEWED_AMOUNTS.choose(&mut rng).copied().unwrap_or(999);
        let id = records.len() as i64 + 1;
        records.push(Record::new(id, spec.skewed_vendor.clone(), amount));
    }

    info!(
        seed = spec.seed,
        records = records.len(),
        vendors = spec.vendors.len(),
        skewed = spec.skewed_count,
        "generated synthetic sample"
    );

    Ok(records)
}
