//! Regime classification.
//!
//! Two startup predicates decide whether a stage can get its first item done
//! before the other side has exhausted its share of the batch:
//!
//! - slow consumer startup: `Sc + Wc > (L - Kp) * Wp`
//! - slow producer startup: `Sp + Wp > (L - Kc) * Wc`
//!
//! Decision order (first match wins):
//!
//! 1. both predicates hold -> `SS`
//! 2. `Wc < Wp` (fast consumer) -> `SC` if the consumer starts slowly, else `G1`
//! 3. otherwise (fast producer) -> `SP` if the producer starts slowly, else `G2`

use crate::domain::{Parameters, Regime};

pub fn slow_consumer_startup(p: &Parameters) -> bool {
    p.sc() + p.wc() > (p.l() - p.kp()) * p.wp()
}

pub fn slow_producer_startup(p: &Parameters) -> bool {
    p.sp() + p.wp() > (p.l() - p.kc()) * p.wc()
}

/// Classify the steady-state behaviour of `p`.
pub fn classify(p: &Parameters) -> Regime {
    let scs = slow_consumer_startup(p);
    let sps = slow_producer_startup(p);

    if scs && sps {
        return Regime::Ss;
    }

    if p.wc() < p.wp() {
        if scs { Regime::Sc } else { Regime::G1 }
    } else if sps {
        Regime::Sp
    } else {
        Regime::G2
    }
}
