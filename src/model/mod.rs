//! Closed-form producer/consumer pipeline model.
//!
//! Every function here is pure: it reads a `Parameters` value and returns a
//! scalar or a label. Nothing is cached and nothing is mutated, so callers may
//! evaluate from as many threads as they like.

pub mod critical;
pub mod latency;
pub mod regime;
pub mod sleep;
pub mod throughput;

pub use critical::*;
pub use latency::*;
pub use regime::*;
pub use sleep::*;
pub use throughput::*;

#[cfg(test)]
#[allow(clippy::too_many_arguments)]
pub(crate) fn test_params(
    wp: f64,
    wc: f64,
    sp: f64,
    sc: f64,
    np: f64,
    nc: f64,
    kp: f64,
    kc: f64,
    l: f64,
) -> crate::domain::Parameters {
    crate::domain::RawParameters { wp, wc, sp, sc, np, nc, kp, kc, l }
        .validate()
        .unwrap()
}
