//! Export sweep curves, simulation timelines and sleep sweeps.
//!
//! CSV is meant to be easy to consume in spreadsheets or plotting scripts;
//! JSON carries the inputs alongside the results.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::{Parameters, SleepField};
use crate::error::AppError;
use crate::sim::{Actor, SimOutcome, SleepSweepPoint, SliceKind};
use crate::sweep::Curves;

/// Write both curves as one CSV table (one row per swept value).
pub fn write_curves_csv(path: &Path, curves: &Curves) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    writeln!(
        out,
        "{},max_work_time,ideal_throughput,throughput,regime,critical_length_combined,critical_length",
        curves.range.field.symbol().to_lowercase()
    )
    .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (t, c) in curves.throughput.iter().zip(&curves.critical) {
        writeln!(
            out,
            "{},{:.6},{:.6},{:.6},{},{},{}",
            t.x,
            t.max_work_time,
            t.ideal_throughput,
            t.throughput,
            t.regime.code(),
            c.critical_length_combined,
            c.critical_length,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[derive(Serialize)]
struct CurvesFile<'a> {
    tool: &'static str,
    params: &'a Parameters,
    #[serde(flatten)]
    curves: &'a Curves,
}

/// Write the base parameters and both curves as JSON.
pub fn write_curves_json(path: &Path, p: &Parameters, curves: &Curves) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;
    let doc = CurvesFile {
        tool: "pcm",
        params: p,
        curves,
    };
    serde_json::to_writer_pretty(BufWriter::new(file), &doc)
        .map_err(|e| AppError::new(4, format!("Failed to write curve JSON: {e}")))?;
    Ok(())
}

/// Write the producer and consumer strips as CSV (`actor,start,duration,kind,item`).
pub fn write_timeline_csv(path: &Path, outcome: &SimOutcome) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create timeline CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "actor,start,duration,kind,item")
        .map_err(|e| AppError::new(2, format!("Failed to write timeline CSV header: {e}")))?;

    for actor in [Actor::Producer, Actor::Consumer] {
        let name = match actor {
            Actor::Producer => "producer",
            Actor::Consumer => "consumer",
        };
        for slice in outcome.timeline.strip(actor) {
            let (kind, item) = match slice.kind {
                SliceKind::Work(n) => ("work", n.to_string()),
                SliceKind::Notify => ("notify", String::new()),
                SliceKind::Startup => ("startup", String::new()),
                SliceKind::Sleep => ("sleep", String::new()),
            };
            writeln!(out, "{name},{},{},{kind},{item}", slice.start, slice.duration)
                .map_err(|e| AppError::new(2, format!("Failed to write timeline CSV row: {e}")))?;
        }
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush timeline CSV: {e}")))?;
    Ok(())
}

/// Write a full simulation outcome (config, stats, timeline) as JSON.
pub fn write_outcome_json(path: &Path, p: &Parameters, outcome: &SimOutcome) -> Result<(), AppError> {
    #[derive(Serialize)]
    struct OutcomeFile<'a> {
        tool: &'static str,
        params: &'a Parameters,
        #[serde(flatten)]
        outcome: &'a SimOutcome,
    }

    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create simulation JSON '{}': {e}", path.display())))?;
    let doc = OutcomeFile {
        tool: "pcm",
        params: p,
        outcome,
    };
    serde_json::to_writer_pretty(BufWriter::new(file), &doc)
        .map_err(|e| AppError::new(4, format!("Failed to write simulation JSON: {e}")))?;
    Ok(())
}

/// Write a sleep sweep as CSV; runs that consumed nothing leave the metric columns empty.
pub fn write_sleep_sweep_csv(path: &Path, field: SleepField, rows: &[SleepSweepPoint]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create sleep sweep CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    writeln!(
        out,
        "{},yp,yc,ye,producer_time,consumer_time,energy,batch,time_lower,time_upper",
        field.symbol().to_lowercase()
    )
    .map_err(|e| AppError::new(2, format!("Failed to write sleep sweep CSV header: {e}")))?;

    for row in rows {
        let metrics = match &row.metrics {
            Some(m) => format!(
                "{:.6},{:.6},{:.6},{}",
                m.producer_time,
                m.consumer_time,
                m.energy,
                m.batch.map_or_else(String::new, |b| format!("{b:.6}"))
            ),
            None => ",,,".to_string(),
        };
        writeln!(
            out,
            "{},{},{},{},{metrics},{:.6},{:.6}",
            row.y, row.sleep.yp, row.sleep.yc, row.sleep.ye, row.bounds.lower, row.bounds.upper
        )
        .map_err(|e| AppError::new(2, format!("Failed to write sleep sweep CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush sleep sweep CSV: {e}")))?;
    Ok(())
}
