//! Worst-case service latency bounds.
//!
//! Latency of an item is measured from the moment the producer started the
//! preceding item until the consumer finished this one. The bounds hold for
//! `Kp = 1` and `L > 1`.

use crate::domain::{Algorithm, Parameters, SleepTimes};
use crate::model::sleep::sleep_latency_bound;

/// `sleep` is only read for [`Algorithm::Sleep`].
pub fn latency_bound(p: &Parameters, algorithm: Algorithm, sleep: &SleepTimes) -> f64 {
    match algorithm {
        Algorithm::Notify => notify_latency_bound(p),
        Algorithm::Poll => poll_latency_bound(p),
        Algorithm::Sleep => sleep_latency_bound(p, sleep),
    }
}

/// Bound for the notification protocol.
///
/// The larger of the "both sides asleep" path and, for a fast producer, the
/// path where the consumer drains a full queue interleaved with notifications.
pub fn notify_latency_bound(p: &Parameters) -> f64 {
    let (wp, wc, l) = (p.wp(), p.wc(), p.l());

    let both_asleep = wp.max(p.sc() - (l - 2.0) * wp)
        + p.kc() * wc
        + p.nc()
        + p.sp()
        + wp
        + p.np()
        + p.sc()
        + wc;

    let fast_producer = if wc < wp {
        0.0
    } else {
        // With Wc == Wp the producer never gains a full batch on the consumer:
        // (L-1)/m vanishes.
        let batches = if wc == wp {
            0.0
        } else {
            let m = ((p.sp() + (p.kc() - 1.0) * wp) / (wc - wp)).floor() + 1.0;
            ((l - 1.0) / m.max(1.0)).floor()
        };
        wp + (l + p.kc()) * wc + (1.0 + batches) * p.nc()
    };

    both_asleep.max(fast_producer)
}

/// Bound for the polling protocol.
pub fn poll_latency_bound(p: &Parameters) -> f64 {
    if p.wp() < p.wc() {
        (p.l() + 1.0) * p.wc()
    } else {
        2.0 * p.wp() + p.wc()
    }
}
