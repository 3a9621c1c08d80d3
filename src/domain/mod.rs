//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the validated parameter record (`Parameters`) and its raw form
//! - parameter names (`Field`), regimes (`Regime`), protocols (`Algorithm`)
//! - sweep inputs and curve rows (`SweepRange`, `ThroughputPoint`, `CriticalPoint`)

pub mod types;

pub use types::*;
