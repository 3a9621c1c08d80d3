//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - resolves the parameter set
//! - runs the model, a sweep, the simulator, a sleep sweep or a check
//! - prints reports and writes optional exports

use std::path::Path;

use clap::Parser;
use log::{LevelFilter, info, warn};

use crate::check::CheckConfig;
use crate::cli::{CheckArgs, Cli, Command, EvalArgs, SimArgs, SleepSweepArgs, SweepArgs};
use crate::domain::{Algorithm, SweepRange};
use crate::error::AppError;
use crate::sample::SampleConfig;
use crate::sim::SimConfig;

pub mod pipeline;

/// Environment variable holding an `env_logger` filter, e.g. `PCM_LOG=debug`.
pub const LOG_ENV: &str = "PCM_LOG";

/// Entry point for the `pcm` binary.
pub fn run() -> Result<(), AppError> {
    // A local `.env` may set PCM_LOG.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Eval(args) => handle_eval(args),
        Command::Sweep(args) => handle_sweep(args),
        Command::Simulate(args) => handle_simulate(args),
        Command::SleepSweep(args) => handle_sleep_sweep(args),
        Command::Check(args) => handle_check(args),
    }
}

/// `-v` flags win over `PCM_LOG`; with neither only warnings are shown.
fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Warn);
    builder.parse_env(env_logger::Env::new().filter(LOG_ENV));
    if verbose > 0 {
        builder.filter_level(level_for(verbose));
    }
    // A second init (e.g. from tests) is harmless.
    builder.format_timestamp(None).try_init().ok();
}

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn handle_eval(args: EvalArgs) -> Result<(), AppError> {
    let p = pipeline::resolve_params(&args.params)?;
    println!("{}", crate::report::format_evaluation(&p, &args.sleep.times()));
    Ok(())
}

fn handle_sweep(args: SweepArgs) -> Result<(), AppError> {
    let p = pipeline::resolve_params(&args.params)?;
    let range = sweep_range_from_args(&p, &args);
    let curves = crate::sweep::sweep(&p, &range)?;

    let highlight = match args.at {
        Some(x) => Some((x, crate::sweep::regime_at(&p, range.field, x)?)),
        None => None,
    };
    println!("{}", crate::report::format_sweep(&curves, highlight));

    if let Some(path) = &args.export_csv {
        crate::io::write_curves_csv(path, &curves)?;
        info!("wrote {}", path.display());
    }
    if let Some(path) = &args.export_json {
        crate::io::write_curves_json(path, &p, &curves)?;
        info!("wrote {}", path.display());
    }
    if args.debug_bundle {
        let path = crate::debug::write_debug_bundle(Path::new("debug"), &p, Some(&curves), None)?;
        println!("Debug bundle: {}", path.display());
    }

    Ok(())
}

/// Default range for the swept field with any flag overrides applied.
pub fn sweep_range_from_args(p: &crate::domain::Parameters, args: &SweepArgs) -> SweepRange {
    let base = crate::sweep::default_range(p, args.field);
    SweepRange {
        field: args.field,
        start: args.start.unwrap_or(base.start),
        end: args.end.unwrap_or(base.end),
        step: args.step.unwrap_or(base.step),
    }
}

fn handle_simulate(args: SimArgs) -> Result<(), AppError> {
    let p = pipeline::resolve_params(&args.params)?;
    let config = sim_config_from_args(&args);
    let outcome = crate::sim::simulate(&p, &config)?;
    println!("{}", crate::report::format_simulation(&p, &outcome));

    if let Some(path) = &args.export_timeline {
        crate::io::write_timeline_csv(path, &outcome)?;
        info!("wrote {}", path.display());
    }
    if let Some(path) = &args.export_json {
        crate::io::write_outcome_json(path, &p, &outcome)?;
        info!("wrote {}", path.display());
    }
    if args.debug_bundle {
        let path = crate::debug::write_debug_bundle(Path::new("debug"), &p, None, Some(&outcome))?;
        println!("Debug bundle: {}", path.display());
    }

    Ok(())
}

pub fn sim_config_from_args(args: &SimArgs) -> SimConfig {
    SimConfig {
        algorithm: args.algorithm,
        max_items: args.max_items,
        max_time: args.max_time,
        cons_offset: args.cons_offset,
        max_events: args.max_events,
        sleep: args.sleep.times(),
    }
}

fn handle_sleep_sweep(args: SleepSweepArgs) -> Result<(), AppError> {
    let p = pipeline::resolve_params(&args.params)?;
    let base = SimConfig {
        algorithm: Algorithm::Sleep,
        max_items: args.max_items,
        max_events: args.max_events,
        sleep: args.sleep.times(),
        ..SimConfig::default()
    };
    let rows = crate::sim::sleep_sweep(&p, &base, args.depends, args.y_max, args.points)?;
    println!("{}", crate::report::format_sleep_sweep(args.depends, &rows));

    if let Some(path) = &args.export_csv {
        crate::io::write_sleep_sweep_csv(path, args.depends, &rows)?;
        info!("wrote {}", path.display());
    }

    Ok(())
}

pub fn check_config_from_args(args: &CheckArgs) -> CheckConfig {
    CheckConfig {
        sample: SampleConfig {
            count: args.count,
            seed: args.seed,
            max_work: args.max_work,
            max_startup: args.max_startup,
            max_overhead: args.max_overhead,
            max_threshold: args.max_threshold,
            max_batch: args.max_batch,
        },
        sim_items: args.sim_items,
    }
}

fn handle_check(args: CheckArgs) -> Result<(), AppError> {
    let config = check_config_from_args(&args);
    let report = crate::check::check(&config)?;
    if report.stalled > 0 {
        warn!("{} sampled systems stalled in simulation", report.stalled);
    }
    println!("{}", crate::report::format_check(&report, args.top));
    Ok(())
}
