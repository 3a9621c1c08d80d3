//! `prodcon-model` library crate.
//!
//! Closed-form throughput and critical-queue-length model of a two-stage
//! producer/consumer pipeline, plus a discrete-event simulator to check it
//! against.
//!
//! The binary (`pcm`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the model can be used directly from other tools

pub mod app;
pub mod check;
pub mod cli;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod model;
pub mod report;
pub mod sample;
pub mod sim;
pub mod sweep;
