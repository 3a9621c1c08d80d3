//! Bounds for the periodic-sleep protocol.
//!
//! Under [`crate::domain::Algorithm::Sleep`] an idle side does not wait for a
//! notification; it sleeps for `Yp` (producer, queue full) or `Yc` (consumer,
//! queue empty) and looks again. These bounds depend on the sleep periods,
//! which is why they take [`SleepTimes`] next to the model parameters.

use serde::Serialize;

use crate::domain::{Parameters, SleepTimes};

/// Range of the average per-item time as seen by the sleeping side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SleepBounds {
    /// Only the slower side's neighbour ever sleeps, once per run-ahead.
    pub lower: f64,
    /// Both sides alternate sleeping once per batch.
    pub upper: f64,
}

pub fn sleep_time_bounds(p: &Parameters, y: &SleepTimes) -> SleepBounds {
    let (wp, wc, l) = (p.wp(), p.wc(), p.l());

    let lower = if wc < wp {
        let m = run_ahead(wp, wc, l);
        ((l + m) * wc + y.yc) / (l + m)
    } else if wp < wc {
        let m = run_ahead(wc, wp, l);
        ((l + m) * wp + y.yp) / (l + m)
    } else {
        // Lockstep: the run-ahead is unbounded and the sleep term vanishes.
        wp
    };

    SleepBounds {
        lower,
        upper: (wp + y.yp / l).max(wc + y.yc / l),
    }
}

// Items the fast side gets ahead of a full/empty queue, at least one.
fn run_ahead(slow: f64, fast: f64, l: f64) -> f64 {
    ((((l - 1.0) * fast - slow) / (slow - fast)).floor() + 1.0).max(1.0)
}

/// Worst-case service latency under the sleep protocol (`Kp = 1`, `L > 1`).
///
/// Unbounded when `Yp` is zero on the long-sleep path.
pub fn sleep_latency_bound(p: &Parameters, y: &SleepTimes) -> f64 {
    let (wp, wc, l) = (p.wp(), p.wc(), p.l());

    if wc < wp && y.yc < (l - 1.0) * wp - wc {
        return 2.0 * wp + y.yc + wc;
    }
    if wp < wc && y.yp < (l - 1.0) * wc - wp {
        return wc * (l + 1.0);
    }
    if y.yp <= 0.0 {
        return f64::INFINITY;
    }

    let h = ((y.yc + l * wc - (l - 1.0) * wp) / y.yp).floor() + 1.0;
    2.0 * wp + wc + y.yc + h * y.yp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_params as params;

    fn sleeps(yp: f64, yc: f64) -> SleepTimes {
        SleepTimes { yp, yc, ye: 2.5 }
    }

    #[test]
    fn time_bounds_fast_consumer() {
        let p = params(2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 3.0);
        let b = sleep_time_bounds(&p, &sleeps(5.0, 5.0));
        // m = floor((2*1 - 2) / 1) + 1 = 1 -> (4*1 + 5) / 4
        assert!((b.lower - 2.25).abs() < 1e-12);
        assert!((b.upper - (2.0 + 5.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn time_bounds_fast_producer_and_lockstep() {
        let p = params(1.0, 3.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 10.0);
        let b = sleep_time_bounds(&p, &sleeps(4.0, 6.0));
        // m = floor((9*1 - 3) / 2) + 1 = 4 -> (14*1 + 4) / 14
        assert!((b.lower - 18.0 / 14.0).abs() < 1e-12);
        assert!((b.upper - 3.6).abs() < 1e-12);

        let q = params(2.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 10.0);
        assert_eq!(sleep_time_bounds(&q, &sleeps(4.0, 6.0)).lower, 2.0);
    }

    #[test]
    fn time_bounds_short_queue_keeps_run_ahead_positive() {
        let p = params(10.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        let b = sleep_time_bounds(&p, &sleeps(5.0, 5.0));
        assert!(b.lower.is_finite());
        assert!(b.lower <= b.upper);
    }

    #[test]
    fn latency_bound_paths() {
        // Fast consumer, short sleeps: 2*2 + 5 + 1.
        let p = params(2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 10.0);
        assert_eq!(sleep_latency_bound(&p, &sleeps(5.0, 5.0)), 10.0);

        // Fast producer, short sleeps: 2 * 11.
        let p = params(1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 10.0);
        assert_eq!(sleep_latency_bound(&p, &sleeps(5.0, 5.0)), 22.0);

        // Long sleeps: h = floor((5 + 3 - 4) / 5) + 1 = 1 -> 4 + 1 + 5 + 5.
        let p = params(2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 3.0);
        assert_eq!(sleep_latency_bound(&p, &sleeps(5.0, 5.0)), 15.0);
        assert_eq!(sleep_latency_bound(&p, &sleeps(0.0, 5.0)), f64::INFINITY);
    }
}
