//! Curve sweeps over one parameter.
//!
//! Each sweep point is evaluated on its own `Parameters` copy built with
//! `Parameters::with`; the caller's value is never touched. Points are
//! independent, so they are computed in parallel and returned in grid order.

use log::debug;
use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{CriticalPoint, Field, Parameters, Regime, SweepRange, ThroughputPoint};
use crate::error::{AppError, ModelError};
use crate::model::{
    classify, critical_length, critical_length_combined, ideal_throughput, max_work_time,
    throughput,
};

pub mod grid;

pub use grid::{default_range, sweep_values};

/// Both curves for one sweep.
#[derive(Debug, Clone, Serialize)]
pub struct Curves {
    pub range: SweepRange,
    pub throughput: Vec<ThroughputPoint>,
    pub critical: Vec<CriticalPoint>,
}

/// `{max_work_time, ideal_throughput, throughput}` at each swept value.
pub fn throughput_curve(p: &Parameters, range: &SweepRange) -> Result<Vec<ThroughputPoint>, AppError> {
    let values = sweep_values(range)?;
    let points = values
        .par_iter()
        .map(|&x| -> Result<ThroughputPoint, ModelError> {
            let q = p.with(range.field, x)?;
            Ok(ThroughputPoint {
                x,
                max_work_time: max_work_time(&q),
                ideal_throughput: ideal_throughput(&q),
                throughput: throughput(&q),
                regime: classify(&q),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(points)
}

/// `{critical_length_combined, critical_length}` at each swept value.
pub fn critical_curve(p: &Parameters, range: &SweepRange) -> Result<Vec<CriticalPoint>, AppError> {
    let values = sweep_values(range)?;
    let points = values
        .par_iter()
        .map(|&x| -> Result<CriticalPoint, ModelError> {
            let q = p.with(range.field, x)?;
            Ok(CriticalPoint {
                x,
                critical_length_combined: critical_length_combined(&q),
                critical_length: critical_length(&q),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(points)
}

/// Compute both curves.
pub fn sweep(p: &Parameters, range: &SweepRange) -> Result<Curves, AppError> {
    debug!(
        "sweeping {} over [{}, {}) step {}",
        range.field.symbol(),
        range.start,
        range.end,
        range.step
    );
    let throughput = throughput_curve(p, range)?;
    let critical = critical_curve(p, range)?;
    debug!("sweep produced {} points", throughput.len());
    Ok(Curves {
        range: *range,
        throughput,
        critical,
    })
}

/// Regime at a single highlighted value of `field`.
pub fn regime_at(p: &Parameters, field: Field, x: f64) -> Result<Regime, AppError> {
    let q = p.with(field, x)?;
    Ok(classify(&q))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_params as params;

    #[test]
    fn curves_follow_grid_and_leave_params_alone() {
        let p = params(5.0, 10.0, 20.0, 30.0, 40.0, 50.0, 1.0, 1.0, 64.0);
        let before = p;
        let range = default_range(&p, Field::Wp);
        let curves = sweep(&p, &range).unwrap();

        assert_eq!(p, before);
        assert_eq!(curves.throughput.len(), 39);
        assert_eq!(curves.critical.len(), 39);
        for (i, (t, c)) in curves.throughput.iter().zip(&curves.critical).enumerate() {
            assert_eq!(t.x, i as f64);
            assert_eq!(c.x, i as f64);
        }
    }

    #[test]
    fn points_match_direct_evaluation() {
        let p = params(5.0, 10.0, 20.0, 30.0, 40.0, 50.0, 1.0, 1.0, 64.0);
        let range = SweepRange { field: Field::Wp, start: 0.0, end: 40.0, step: 3.0 };
        let curve = throughput_curve(&p, &range).unwrap();
        for point in &curve {
            let q = p.with(Field::Wp, point.x).unwrap();
            assert_eq!(point.throughput, throughput(&q));
            assert_eq!(point.regime, classify(&q));
            assert!(point.max_work_time >= q.wc());
        }
        let lockstep = regime_at(&p, Field::Wp, 10.0).unwrap();
        assert_eq!(lockstep, classify(&p.with(Field::Wp, 10.0).unwrap()));
    }

    #[test]
    fn invalid_swept_value_is_reported() {
        let p = params(5.0, 10.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 64.0);
        let range = SweepRange { field: Field::L, start: 0.0, end: 4.0, step: 1.0 };
        let err = critical_curve(&p, &range).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
