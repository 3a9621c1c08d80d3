//! Terminal reports for evaluations, sweeps, simulations and checks.

pub mod format;

pub use format::*;
