//! Model vs. simulation cross-check.
//!
//! For each sampled system we compare the closed-form throughput estimate with
//! the average time per item measured by the notify simulator, and summarise
//! the relative error per regime.

use std::collections::BTreeMap;

use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{Algorithm, Parameters, Regime};
use crate::error::AppError;
use crate::model::estimate;
use crate::sample::{SampleConfig, sample_parameters};
use crate::sim::{SimConfig, simulate};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CheckConfig {
    pub sample: SampleConfig,
    /// Items consumed per simulation.
    pub sim_items: u64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            sample: SampleConfig::default(),
            sim_items: 5_000,
        }
    }
}

/// Outcome for one sampled system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CheckSample {
    pub params: Parameters,
    pub regime: Regime,
    pub model: f64,
    /// `None` when the simulation consumed nothing.
    pub simulated: Option<f64>,
    pub rel_error: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RegimeSummary {
    pub count: usize,
    pub mean_rel_error: f64,
    pub max_rel_error: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub config: CheckConfig,
    pub samples: Vec<CheckSample>,
    pub per_regime: BTreeMap<Regime, RegimeSummary>,
    pub overall: RegimeSummary,
    /// Samples whose simulation produced no items.
    pub stalled: usize,
}

impl CheckReport {
    /// The `n` samples with the largest relative error, worst first.
    pub fn worst(&self, n: usize) -> Vec<CheckSample> {
        let mut sorted: Vec<CheckSample> =
            self.samples.iter().filter(|s| s.rel_error.is_some()).copied().collect();
        sorted.sort_by(|a, b| {
            b.rel_error
                .unwrap_or(0.0)
                .partial_cmp(&a.rel_error.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted.truncate(n);
        sorted
    }
}

/// Evaluate one system both ways.
pub fn check_one(p: &Parameters, sim_items: u64) -> Result<CheckSample, AppError> {
    let est = estimate(p);
    let sim_config = SimConfig {
        algorithm: Algorithm::Notify,
        max_items: sim_items,
        ..SimConfig::default()
    };
    let outcome = simulate(p, &sim_config)?;
    let simulated = outcome.stats.avg_item_time;
    let rel_error = simulated
        .filter(|_| est.throughput > 0.0)
        .map(|s| (s - est.throughput).abs() / est.throughput);

    Ok(CheckSample {
        params: *p,
        regime: est.regime,
        model: est.throughput,
        simulated,
        rel_error,
    })
}

pub fn check(config: &CheckConfig) -> Result<CheckReport, AppError> {
    if config.sim_items == 0 {
        return Err(AppError::new(2, "Simulated items per sample must be > 0."));
    }
    let params = sample_parameters(&config.sample)?;
    info!(
        "checking {} sampled systems (seed {}, {} items each)",
        params.len(),
        config.sample.seed,
        config.sim_items
    );

    let samples = params
        .par_iter()
        .map(|p| check_one(p, config.sim_items))
        .collect::<Result<Vec<_>, AppError>>()?;

    let mut per_regime: BTreeMap<Regime, RegimeSummary> = BTreeMap::new();
    let mut overall = RegimeSummary::default();
    let mut stalled = 0;

    for s in &samples {
        let Some(err) = s.rel_error else {
            stalled += 1;
            continue;
        };
        accumulate(per_regime.entry(s.regime).or_default(), err);
        accumulate(&mut overall, err);
    }
    for summary in per_regime.values_mut() {
        finish(summary);
    }
    finish(&mut overall);

    debug!("check done: {} regimes, {} stalled", per_regime.len(), stalled);

    Ok(CheckReport {
        config: *config,
        samples,
        per_regime,
        overall,
        stalled,
    })
}

// mean_rel_error holds the running sum until `finish`.
fn accumulate(summary: &mut RegimeSummary, err: f64) {
    summary.count += 1;
    summary.mean_rel_error += err;
    summary.max_rel_error = summary.max_rel_error.max(err);
}

fn finish(summary: &mut RegimeSummary) {
    if summary.count > 0 {
        summary.mean_rel_error /= summary.count as f64;
    }
}
