//! Command-line parsing for the `pcm` pipeline model tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the model/simulation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Algorithm, Field, RawParameters, SleepField, SleepTimes};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pcm", version, about = "Producer/consumer pipeline throughput model")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate the model for one parameter set.
    Eval(EvalArgs),
    /// Sweep one parameter and print throughput and critical-length curves.
    Sweep(SweepArgs),
    /// Run the discrete-event simulator.
    Simulate(SimArgs),
    /// Simulate the sleep protocol over a range of sleep periods.
    SleepSweep(SleepSweepArgs),
    /// Compare model throughput against simulation on random systems.
    Check(CheckArgs),
}

/// The nine model parameters, or a JSON file holding them.
#[derive(Debug, Args, Clone)]
pub struct ParamArgs {
    /// Producer work time per item.
    #[arg(long, default_value_t = 80.0)]
    pub wp: f64,

    /// Consumer work time per item.
    #[arg(long, default_value_t = 100.0)]
    pub wc: f64,

    /// Producer startup latency.
    #[arg(long, default_value_t = 400.0)]
    pub sp: f64,

    /// Consumer startup latency.
    #[arg(long, default_value_t = 400.0)]
    pub sc: f64,

    /// Producer notification overhead.
    #[arg(long, default_value_t = 200.0)]
    pub np: f64,

    /// Consumer notification overhead.
    #[arg(long, default_value_t = 200.0)]
    pub nc: f64,

    /// Producer threshold (queued items before the producer wakes the consumer).
    #[arg(long, default_value_t = 1.0)]
    pub kp: f64,

    /// Consumer threshold (free slots before the consumer wakes the producer).
    #[arg(long, default_value_t = 1.0)]
    pub kc: f64,

    /// Batch length / queue size.
    #[arg(short = 'l', long = "len", default_value_t = 64.0)]
    pub l: f64,

    /// Load parameters from a JSON file (overrides the flags above).
    #[arg(long, value_name = "JSON")]
    pub params: Option<PathBuf>,

    /// Write the effective parameters to a JSON file.
    #[arg(long = "save-params", value_name = "JSON")]
    pub save_params: Option<PathBuf>,
}

impl ParamArgs {
    /// Flag values, unvalidated.
    pub fn raw(&self) -> RawParameters {
        RawParameters {
            wp: self.wp,
            wc: self.wc,
            sp: self.sp,
            sc: self.sc,
            np: self.np,
            nc: self.nc,
            kp: self.kp,
            kc: self.kc,
            l: self.l,
        }
    }
}

/// Sleep periods and per-sleep energy for the sleep protocol.
#[derive(Debug, Args, Clone)]
pub struct SleepArgs {
    /// Producer sleep period when the queue is full.
    #[arg(long, default_value_t = 5.0)]
    pub yp: f64,

    /// Consumer sleep period when the queue is empty.
    #[arg(long, default_value_t = 5.0)]
    pub yc: f64,

    /// Energy cost of one sleep, in work-time units.
    #[arg(long, default_value_t = 2.5)]
    pub ye: f64,
}

impl SleepArgs {
    pub fn times(&self) -> SleepTimes {
        SleepTimes { yp: self.yp, yc: self.yc, ye: self.ye }
    }
}

#[derive(Debug, Args, Clone)]
pub struct EvalArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    #[command(flatten)]
    pub sleep: SleepArgs,
}

#[derive(Debug, Args, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    /// Parameter to sweep.
    #[arg(long, value_enum, default_value_t = Field::Wp)]
    pub field: Field,

    /// First value (default 0).
    #[arg(long)]
    pub start: Option<f64>,

    /// End value, exclusive (default 4*Wc - 1).
    #[arg(long)]
    pub end: Option<f64>,

    /// Step between values (default 1).
    #[arg(long)]
    pub step: Option<f64>,

    /// Report the regime at this value of the swept field.
    #[arg(long)]
    pub at: Option<f64>,

    /// Export both curves to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Export parameters and curves to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Write a markdown debug bundle under `debug/`.
    #[arg(long = "debug-bundle")]
    pub debug_bundle: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SimArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    /// Synchronisation protocol.
    #[arg(long, value_enum, default_value_t = Algorithm::Notify)]
    pub algorithm: Algorithm,

    /// Stop after this many consumed items.
    #[arg(long, default_value_t = 10_000)]
    pub max_items: u64,

    /// Stop at this simulated time.
    #[arg(long)]
    pub max_time: Option<f64>,

    /// Delay before the consumer first looks at the queue.
    #[arg(long, default_value_t = 0.0)]
    pub cons_offset: f64,

    /// Stop after processing this many events.
    #[arg(long, default_value_t = 1_000_000)]
    pub max_events: u64,

    #[command(flatten)]
    pub sleep: SleepArgs,

    /// Export the producer/consumer timeline to CSV.
    #[arg(long = "export-timeline", value_name = "CSV")]
    pub export_timeline: Option<PathBuf>,

    /// Export configuration, statistics and timeline to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Write a markdown debug bundle under `debug/`.
    #[arg(long = "debug-bundle")]
    pub debug_bundle: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SleepSweepArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    #[command(flatten)]
    pub sleep: SleepArgs,

    /// Which sleep period to vary (`y` varies both).
    #[arg(long, value_enum, default_value_t = SleepField::Y)]
    pub depends: SleepField,

    /// End of the sleep range, exclusive. The range starts at Ye.
    #[arg(long = "y-max", default_value_t = 100.0)]
    pub y_max: f64,

    /// Number of sleep periods to simulate.
    #[arg(long, default_value_t = 150)]
    pub points: usize,

    /// Stop each run after this many consumed items.
    #[arg(long, default_value_t = 10_000)]
    pub max_items: u64,

    /// Stop each run after processing this many events.
    #[arg(long, default_value_t = 1_000_000)]
    pub max_events: u64,

    /// Export the sweep to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    /// Number of random systems.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Upper bound for Wp and Wc.
    #[arg(long, default_value_t = 100)]
    pub max_work: u64,

    /// Upper bound for Sp and Sc.
    #[arg(long, default_value_t = 500)]
    pub max_startup: u64,

    /// Upper bound for Np and Nc.
    #[arg(long, default_value_t = 200)]
    pub max_overhead: u64,

    /// Upper bound for Kp and Kc.
    #[arg(long, default_value_t = 8)]
    pub max_threshold: u64,

    /// Upper bound for L.
    #[arg(long, default_value_t = 256)]
    pub max_batch: u64,

    /// Items consumed per simulation.
    #[arg(long, default_value_t = 5_000)]
    pub sim_items: u64,

    /// Show the N worst samples.
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}
