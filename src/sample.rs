//! Seeded random parameter sets.
//!
//! Used by `check` to compare the closed-form model against the simulator on
//! many systems at once. All values are whole clock-cycle counts; thresholds
//! never exceed the batch length so the notify protocol cannot dead-lock.

use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::domain::{Parameters, RawParameters};
use crate::error::AppError;

/// Upper bounds (inclusive) for each drawn quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
    /// `Wp`, `Wc` in `1..=max_work`.
    pub max_work: u64,
    /// `Sp`, `Sc` in `0..=max_startup`.
    pub max_startup: u64,
    /// `Np`, `Nc` in `0..=max_overhead`.
    pub max_overhead: u64,
    /// `Kp`, `Kc` in `1..=min(max_threshold, L)`.
    pub max_threshold: u64,
    /// `L` in `2..=max_batch`.
    pub max_batch: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            count: 200,
            seed: 42,
            max_work: 100,
            max_startup: 500,
            max_overhead: 200,
            max_threshold: 8,
            max_batch: 256,
        }
    }
}

pub fn sample_parameters(config: &SampleConfig) -> Result<Vec<Parameters>, AppError> {
    if config.count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }
    if config.max_work == 0 {
        return Err(AppError::new(2, "max_work must be >= 1."));
    }
    if config.max_threshold == 0 {
        return Err(AppError::new(2, "max_threshold must be >= 1."));
    }
    if config.max_batch < 2 {
        return Err(AppError::new(2, "max_batch must be >= 2."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut out = Vec::with_capacity(config.count);

    for _ in 0..config.count {
        let l = rng.gen_range(2..=config.max_batch);
        let k_max = config.max_threshold.min(l);
        let raw = RawParameters {
            wp: rng.gen_range(1..=config.max_work) as f64,
            wc: rng.gen_range(1..=config.max_work) as f64,
            sp: rng.gen_range(0..=config.max_startup) as f64,
            sc: rng.gen_range(0..=config.max_startup) as f64,
            np: rng.gen_range(0..=config.max_overhead) as f64,
            nc: rng.gen_range(0..=config.max_overhead) as f64,
            kp: rng.gen_range(1..=k_max) as f64,
            kc: rng.gen_range(1..=k_max) as f64,
            l: l as f64,
        };
        out.push(raw.validate()?);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_samples() {
        let config = SampleConfig { count: 25, ..SampleConfig::default() };
        let a = sample_parameters(&config).unwrap();
        let b = sample_parameters(&config).unwrap();
        assert_eq!(a, b);

        let c = sample_parameters(&SampleConfig { seed: 7, ..config }).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn samples_respect_bounds() {
        let config = SampleConfig { count: 300, max_batch: 4, max_threshold: 10, ..SampleConfig::default() };
        for p in sample_parameters(&config).unwrap() {
            assert!(p.wp() >= 1.0 && p.wp() <= 100.0);
            assert!(p.l() >= 2.0 && p.l() <= 4.0);
            assert!(p.kp() >= 1.0 && p.kp() <= p.l());
            assert!(p.kc() >= 1.0 && p.kc() <= p.l());
            assert_eq!(p.sc().fract(), 0.0);
        }
    }

    #[test]
    fn rejects_empty_request() {
        let config = SampleConfig { count: 0, ..SampleConfig::default() };
        assert_eq!(sample_parameters(&config).unwrap_err().exit_code(), 2);
    }
}
