//! Throughput estimator: average time between two consecutive output items.
//!
//! Lower is better. The estimate depends on the regime:
//!
//! - `SS`: everything is amortised over the batch,
//!   `(Kp*Wp + Kc*Wc + Np + Nc + Sp + Sc) / L`
//! - lockstep (`Wp == Wc`): `Wc`
//! - `G1`: `Wp + Np/m`, `m = floor((Sc + (Kp-1)*Wc) / (Wp-Wc)) + Kp`
//! - `SC`: `(Sc + Wc*Kc + Nc + Sp + (m+Kp)*Wp + Np) / (L+m)`,
//!   `m = floor(((L-Kc)*Wc - (Sp+Wp)) / (Wp-Wc)) + 1`
//! - `G2` / `SP`: the same formulas on the mirrored system (producer and
//!   consumer roles exchanged)
//!
//! `m` counts the items the faster side runs ahead before queue effects take
//! over. It is clamped to at least one item; pathological inputs (e.g.
//! `Kp = 0` in `G1`) would otherwise make it zero or negative.
//!
//! Lockstep is tested before any `(Wp - Wc)` division, so the divisor is never
//! zero on the `G1`/`SC`/`G2`/`SP` paths.

use serde::Serialize;

use crate::domain::{Parameters, Regime};
use crate::model::regime::{classify, slow_consumer_startup, slow_producer_startup};

/// Throughput estimate plus the branch that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub regime: Regime,
    /// `Wp == Wc` short-circuit was taken.
    pub lockstep: bool,
    /// Run-ahead count `m` (only for `G1`/`SC`/`G2`/`SP`).
    pub run_ahead: Option<u64>,
    pub throughput: f64,
}

/// Steady-state average time between two output items.
pub fn throughput(p: &Parameters) -> f64 {
    estimate(p).throughput
}

/// Throughput with the regime and run-ahead count that produced it.
pub fn estimate(p: &Parameters) -> Estimate {
    let regime = classify(p);

    if slow_consumer_startup(p) && slow_producer_startup(p) {
        return Estimate {
            regime,
            lockstep: false,
            run_ahead: None,
            throughput: short_queue_both(p),
        };
    }

    if p.wp() == p.wc() {
        return Estimate {
            regime,
            lockstep: true,
            run_ahead: None,
            throughput: p.wc(),
        };
    }

    let (m, value) = if p.wc() < p.wp() {
        fast_consumer(p)
    } else {
        // Producer-side regimes are the consumer-side formulas on the mirrored system.
        fast_consumer(&p.mirrored())
    };

    Estimate {
        regime,
        lockstep: false,
        run_ahead: Some(m as u64),
        throughput: value,
    }
}

fn short_queue_both(p: &Parameters) -> f64 {
    (p.kp() * p.wp() + p.kc() * p.wc() + p.np() + p.nc() + p.sp() + p.sc()) / p.l()
}

/// `G1` / `SC` evaluation. Requires `Wc < Wp`.
fn fast_consumer(p: &Parameters) -> (f64, f64) {
    let gap = p.wp() - p.wc();

    if slow_consumer_startup(p) {
        let m = (((p.l() - p.kc()) * p.wc() - (p.sp() + p.wp())) / gap).floor() + 1.0;
        let m = m.max(1.0);
        let total = p.sc() + p.wc() * p.kc() + p.nc() + p.sp() + (m + p.kp()) * p.wp() + p.np();
        return (m, total / (p.l() + m));
    }

    let m = ((p.sc() + (p.kp() - 1.0) * p.wc()) / gap).floor() + p.kp();
    let m = m.max(1.0);
    (m, p.wp() + p.np() / m)
}

/// Best case ignoring startup and queue costs: the slower stage's work time.
pub fn max_work_time(p: &Parameters) -> f64 {
    p.wp().max(p.wc())
}

/// Best-case amortised throughput assuming perfect overlap.
pub fn ideal_throughput(p: &Parameters) -> f64 {
    (p.np() + p.nc() + (p.wp() + p.wc()) * (p.l() - 1.0)) / p.l()
}
