//! Debug bundle writer for inspecting a parameter set and what was computed from it.
//!
//! The bundle is a single markdown file: inputs, the full model breakdown, the
//! sweep table (if any) and the simulator statistics plus a timeline excerpt
//! (if any).

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::domain::{Algorithm, Field, Parameters, SleepTimes};
use crate::error::AppError;
use crate::model::{
    critical_length, critical_length_combined, critical_length_consumer_side,
    critical_length_producer_side, estimate, ideal_throughput, latency_bound, max_work_time,
};
use crate::sim::{Actor, SimOutcome, SliceKind};
use crate::sweep::Curves;

/// Timeline rows per actor in the bundle.
const TIMELINE_ROWS: usize = 40;

pub fn write_debug_bundle(
    dir: &Path,
    p: &Parameters,
    curves: Option<&Curves>,
    outcome: Option<&SimOutcome>,
) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("pcm_debug_{ts}.md"));

    let body = render_bundle(p, curves, outcome);

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;
    file.write_all(body.as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;

    Ok(path)
}

fn render_bundle(p: &Parameters, curves: Option<&Curves>, outcome: Option<&SimOutcome>) -> String {
    let mut out = String::new();

    out.push_str("# pcm debug bundle\n");
    out.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    out.push_str(&format!("- crate: {} {}\n", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")));

    out.push_str("\n## Parameters\n");
    out.push_str("| field | value | meaning |\n| - | - | - |\n");
    for field in Field::ALL {
        out.push_str(&format!("| {} | {} | {} |\n", field.symbol(), p.get(field), field.description()));
    }

    let est = estimate(p);
    out.push_str("\n## Model\n");
    out.push_str(&format!("- regime: {}\n", est.regime.label()));
    out.push_str(&format!("- lockstep: {}\n", est.lockstep));
    out.push_str(&format!("- run_ahead: {}\n", fmt_opt_u64(est.run_ahead)));
    out.push_str(&format!("- throughput: {:.6}\n", est.throughput));
    out.push_str(&format!("- max_work_time: {:.6}\n", max_work_time(p)));
    out.push_str(&format!("- ideal_throughput: {:.6}\n", ideal_throughput(p)));
    out.push_str(&format!(
        "- critical_length: consumer_side={} producer_side={} critical={} combined={}\n",
        critical_length_consumer_side(p),
        critical_length_producer_side(p),
        critical_length(p),
        critical_length_combined(p)
    ));
    let sleep = outcome.map_or_else(SleepTimes::default, |o| o.config.sleep);
    out.push_str(&format!(
        "- latency_bound: notify={:.3} poll={:.3} sleep={:.3} (Yp={} Yc={})\n",
        latency_bound(p, Algorithm::Notify, &sleep),
        latency_bound(p, Algorithm::Poll, &sleep),
        latency_bound(p, Algorithm::Sleep, &sleep),
        sleep.yp,
        sleep.yc
    ));

    if let Some(curves) = curves {
        let r = &curves.range;
        out.push_str(&format!(
            "\n## Sweep {} in [{}, {}) step {}\n",
            r.field.symbol(),
            r.start,
            r.end,
            r.step
        ));
        out.push_str("| x | max_work_time | ideal_throughput | throughput | regime | combined | critical |\n");
        out.push_str("| - | - | - | - | - | - | - |\n");
        for (t, c) in curves.throughput.iter().zip(&curves.critical) {
            out.push_str(&format!(
                "| {} | {:.3} | {:.3} | {:.3} | {} | {} | {} |\n",
                t.x,
                t.max_work_time,
                t.ideal_throughput,
                t.throughput,
                t.regime,
                c.critical_length_combined,
                c.critical_length
            ));
        }
    }

    if let Some(outcome) = outcome {
        let c = &outcome.config;
        let s = &outcome.stats;
        out.push_str("\n## Simulation\n");
        out.push_str(&format!(
            "- config: algorithm={:?} max_items={} max_time={} max_events={} cons_offset={}\n",
            c.algorithm,
            c.max_items,
            fmt_opt_f64(c.max_time),
            c.max_events,
            c.cons_offset
        ));
        out.push_str(&format!(
            "- stats: items={} elapsed={:.3} avg_item_time={} kicks(p/c)={}/{} sleeps(p/c)={}/{} stalled={} truncated={}\n",
            s.items,
            s.elapsed,
            fmt_opt_f64(s.avg_item_time),
            s.producer_kicks,
            s.consumer_kicks,
            s.producer_sleeps,
            s.consumer_sleeps,
            s.stalled,
            s.truncated
        ));
        if let Some(m) = &outcome.sleep {
            out.push_str(&format!(
                "- sleep: producer_time={:.3} consumer_time={:.3} energy={:.3} batch={}\n",
                m.producer_time,
                m.consumer_time,
                m.energy,
                fmt_opt_f64(m.batch)
            ));
        }
        out.push_str(&format!(
            "- worst_latency: {:.3} at items {:?}\n",
            s.worst_latency, s.worst_latency_items
        ));

        for actor in [Actor::Producer, Actor::Consumer] {
            let strip = outcome.timeline.strip(actor);
            out.push_str(&format!("\n### {actor:?} timeline (first {TIMELINE_ROWS} of {})\n", strip.len()));
            out.push_str("| start | duration | kind |\n| - | - | - |\n");
            for slice in strip.iter().take(TIMELINE_ROWS) {
                let kind = match slice.kind {
                    SliceKind::Work(n) => format!("work #{n}"),
                    SliceKind::Notify => "notify".to_string(),
                    SliceKind::Startup => "startup".to_string(),
                    SliceKind::Sleep => "sleep".to_string(),
                };
                out.push_str(&format!("| {:.3} | {:.3} | {kind} |\n", slice.start, slice.duration));
            }
        }
    }

    out
}

fn fmt_opt_f64(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.3}"),
        _ => "-".to_string(),
    }
}

fn fmt_opt_u64(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
