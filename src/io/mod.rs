//! Input/output helpers.
//!
//! - parameter files (JSON) (`params`)
//! - curve and timeline exports (CSV/JSON) (`export`)

pub mod export;
pub mod params;

pub use export::*;
pub use params::*;
