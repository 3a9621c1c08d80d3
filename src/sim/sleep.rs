//! Sleep-protocol metrics and sweeps over the sleep periods.
//!
//! Longer sleeps mean fewer wake-ups (less energy per item, bigger batches)
//! but more idle time per item. [`sleep_sweep`] traces that trade-off by
//! simulating one run per sleep period.

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{Algorithm, Parameters, SleepField, SleepTimes};
use crate::error::AppError;
use crate::model::{SleepBounds, sleep_time_bounds};
use crate::sim::{SimConfig, SimStats, simulate};
use crate::sweep::grid::MAX_POINTS;

/// Averages over one sleep-protocol run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepMetrics {
    /// Per-item time as seen by the producer: `Wp + sleeps*Yp/items`.
    pub producer_time: f64,
    /// Per-item time as seen by the consumer: `Wc + sleeps*Yc/items`.
    pub consumer_time: f64,
    /// `(Wp + Wc) + (sleeps * Ye) / items`.
    pub energy: f64,
    /// Items per sleep; `None` if nobody slept.
    pub batch: Option<f64>,
}

/// `None` when nothing was consumed.
pub fn sleep_metrics(p: &Parameters, y: &SleepTimes, stats: &SimStats) -> Option<SleepMetrics> {
    if stats.items == 0 {
        return None;
    }
    let items = stats.items as f64;
    let sleeps = stats.producer_sleeps + stats.consumer_sleeps;

    Some(SleepMetrics {
        producer_time: p.wp() + stats.producer_sleeps as f64 * y.yp / items,
        consumer_time: p.wc() + stats.consumer_sleeps as f64 * y.yc / items,
        energy: ((p.wp() + p.wc()) * items + sleeps as f64 * y.ye) / items,
        batch: (sleeps > 0).then(|| items / sleeps as f64),
    })
}

/// One row of a sleep sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SleepSweepPoint {
    /// Value of the swept sleep period(s).
    pub y: f64,
    pub sleep: SleepTimes,
    pub metrics: Option<SleepMetrics>,
    pub bounds: SleepBounds,
}

/// Simulate the sleep protocol for `points` sleep periods from `Ye` up to
/// `y_max` (exclusive).
///
/// The periods that are not swept are raised to at least `Ye`.
pub fn sleep_sweep(
    p: &Parameters,
    base: &SimConfig,
    field: SleepField,
    y_max: f64,
    points: usize,
) -> Result<Vec<SleepSweepPoint>, AppError> {
    let ye = base.sleep.ye;
    if !(ye.is_finite() && ye > 0.0) {
        return Err(AppError::new(2, format!("Sleep sweep starts at Ye, which must be > 0 (got {ye}).")));
    }
    if !(y_max.is_finite() && y_max > ye) {
        return Err(AppError::new(
            2,
            format!("Sleep sweep end must be finite and greater than Ye={ye} (got {y_max})."),
        ));
    }
    if points == 0 || points > MAX_POINTS {
        return Err(AppError::new(2, format!("Sleep sweep points must be in 1..={MAX_POINTS} (got {points}).")));
    }

    let start = SleepTimes {
        yp: base.sleep.yp.max(ye),
        yc: base.sleep.yc.max(ye),
        ye,
    };
    let step = (y_max - ye) / points as f64;
    let values: Vec<f64> = (0..points)
        .map(|i| ye + step * i as f64)
        .filter(|&y| y < y_max)
        .collect();
    debug!("sleep sweep over {} from {ye} to {y_max}: {} runs", field.symbol(), values.len());

    values
        .par_iter()
        .map(|&y| -> Result<SleepSweepPoint, AppError> {
            let sleep = field.apply(start, y);
            let config = SimConfig {
                algorithm: Algorithm::Sleep,
                sleep,
                ..*base
            };
            let outcome = simulate(p, &config)?;
            Ok(SleepSweepPoint {
                y,
                sleep,
                metrics: outcome.sleep,
                bounds: sleep_time_bounds(p, &sleep),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_params as params;

    fn sleep_config(max_items: u64, yp: f64, yc: f64) -> SimConfig {
        SimConfig {
            algorithm: Algorithm::Sleep,
            max_items,
            sleep: SleepTimes { yp, yc, ye: 2.5 },
            ..SimConfig::default()
        }
    }

    #[test]
    fn metrics_from_counters() {
        let p = params(2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 3.0);
        let outcome = simulate(&p, &sleep_config(100, 5.0, 5.0)).unwrap();
        let s = &outcome.stats;
        let m = outcome.sleep.unwrap();
        let items = s.items as f64;
        assert!((m.producer_time - (2.0 + s.producer_sleeps as f64 * 5.0 / items)).abs() < 1e-12);
        assert!((m.energy - (3.0 + (s.producer_sleeps + s.consumer_sleeps) as f64 * 2.5 / items)).abs() < 1e-12);
        assert!(s.consumer_sleeps > 0);
    }

    #[test]
    fn no_metrics_without_items() {
        let p = params(2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 3.0);
        let stats = simulate(&p, &sleep_config(100, 5.0, 5.0)).unwrap().stats;
        let empty = SimStats { items: 0, ..stats };
        assert_eq!(sleep_metrics(&p, &SleepTimes::default(), &empty), None);
    }

    #[test]
    fn sweep_grid_and_bounds() {
        let p = params(2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 3.0);
        let base = sleep_config(200, 1.0, 1.0);
        let rows = sleep_sweep(&p, &base, SleepField::Yc, 12.5, 4).unwrap();
        let ys: Vec<f64> = rows.iter().map(|r| r.y).collect();
        assert_eq!(ys, vec![2.5, 5.0, 7.5, 10.0]);
        for r in &rows {
            assert_eq!(r.sleep.yc, r.y);
            // Non-swept period raised to Ye.
            assert_eq!(r.sleep.yp, 2.5);
            assert!(r.metrics.is_some());
            assert!(r.bounds.lower <= r.bounds.upper);
        }
    }

    #[test]
    fn longer_consumer_sleeps_mean_bigger_batches() {
        let p = params(2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 16.0);
        let base = sleep_config(2000, 2.5, 2.5);
        let rows = sleep_sweep(&p, &base, SleepField::Y, 22.5, 2).unwrap();
        let short = rows[0].metrics.unwrap().batch.unwrap();
        let long = rows[1].metrics.unwrap().batch.unwrap();
        assert!(long > short, "batch {long} <= {short}");
    }

    #[test]
    fn rejects_bad_sweeps() {
        let p = params(2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 3.0);
        let base = sleep_config(10, 5.0, 5.0);
        assert!(sleep_sweep(&p, &base, SleepField::Yp, 2.0, 10).is_err());
        assert!(sleep_sweep(&p, &base, SleepField::Yp, 10.0, 0).is_err());
        let no_energy = SimConfig { sleep: SleepTimes { ye: 0.0, ..base.sleep }, ..base };
        assert_eq!(sleep_sweep(&p, &no_energy, SleepField::Yp, 10.0, 5).unwrap_err().exit_code(), 2);
    }
}
