//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the model/simulation code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::check::CheckReport;
use crate::domain::{Algorithm, Field, Parameters, Regime, SleepField, SleepTimes};
use crate::model::{
    critical_length, critical_length_combined, critical_length_consumer_side,
    critical_length_producer_side, estimate, ideal_throughput, latency_bound, max_work_time,
    sleep_time_bounds,
};
use crate::sim::{SimOutcome, SleepSweepPoint};
use crate::sweep::Curves;

/// One line per parameter.
pub fn format_params(p: &Parameters) -> String {
    let mut out = String::from("Parameters:\n");
    for field in Field::ALL {
        out.push_str(&format!(
            "  {:<3} = {:>10}   {}\n",
            field.symbol(),
            fmt_num(p.get(field)),
            field.description()
        ));
    }
    out
}

/// Full single-point evaluation.
pub fn format_evaluation(p: &Parameters, sleep: &SleepTimes) -> String {
    let est = estimate(p);
    let mut out = String::new();

    out.push_str("=== pcm - producer/consumer pipeline model ===\n");
    out.push_str(&format_params(p));
    out.push('\n');

    out.push_str(&format!("Regime: {}\n", est.regime.label()));
    if est.lockstep {
        out.push_str("Lockstep: Wp == Wc\n");
    }
    if let Some(m) = est.run_ahead {
        out.push_str(&format!("Run-ahead items (m): {m}\n"));
    }
    out.push('\n');

    out.push_str("Time per item (clock cycles):\n");
    out.push_str(&format!("  throughput       {:>12.3}\n", est.throughput));
    out.push_str(&format!("  max_work_time    {:>12.3}\n", max_work_time(p)));
    out.push_str(&format!("  ideal_throughput {:>12.3}\n", ideal_throughput(p)));
    out.push('\n');

    out.push_str("Critical batch length:\n");
    out.push_str(&format!("  consumer side    {:>12}\n", fmt_num(critical_length_consumer_side(p))));
    out.push_str(&format!("  producer side    {:>12}\n", fmt_num(critical_length_producer_side(p))));
    out.push_str(&format!("  critical_length  {:>12}\n", fmt_num(critical_length(p))));
    out.push_str(&format!("  combined         {:>12}\n", fmt_num(critical_length_combined(p))));
    out.push('\n');

    out.push_str("Worst-case latency bound:\n");
    out.push_str(&format!("  notify           {:>12.3}\n", latency_bound(p, Algorithm::Notify, sleep)));
    out.push_str(&format!("  poll             {:>12.3}\n", latency_bound(p, Algorithm::Poll, sleep)));
    out.push_str(&format!("  sleep            {:>12.3}\n", latency_bound(p, Algorithm::Sleep, sleep)));
    if p.kp() != 1.0 {
        out.push_str("  (bounds assume Kp = 1)\n");
    }
    out.push('\n');

    let bounds = sleep_time_bounds(p, sleep);
    out.push_str(&format!(
        "Sleep protocol (Yp={} Yc={} Ye={}):\n",
        fmt_num(sleep.yp),
        fmt_num(sleep.yc),
        fmt_num(sleep.ye)
    ));
    out.push_str(&format!("  time lower bound {:>12.3}\n", bounds.lower));
    out.push_str(&format!("  time upper bound {:>12.3}\n", bounds.upper));

    out
}

/// Sweep table, optionally with the regime at one highlighted value.
pub fn format_sweep(curves: &Curves, highlight: Option<(f64, Regime)>) -> String {
    let mut out = String::new();
    let symbol = curves.range.field.symbol();

    out.push_str(&format!(
        "Sweep: {symbol} in [{}, {}) step {} ({} points)\n",
        fmt_num(curves.range.start),
        fmt_num(curves.range.end),
        fmt_num(curves.range.step),
        curves.throughput.len()
    ));
    out.push_str(
        format!(
            "{:>10} {:>12} {:>12} {:>12} {:<6} {:>10} {:>10}\n",
            symbol, "T_max_work", "T_ideal", "T", "regime", "L_crit_SS", "L_crit"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:->10} {:->12} {:->12} {:->12} {:-<6} {:->10} {:->10}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (t, c) in curves.throughput.iter().zip(&curves.critical) {
        out.push_str(&format!(
            "{:>10} {:>12.3} {:>12.3} {:>12.3} {:<6} {:>10} {:>10}\n",
            fmt_num(t.x),
            t.max_work_time,
            t.ideal_throughput,
            t.throughput,
            t.regime.code(),
            fmt_num(c.critical_length_combined),
            fmt_num(c.critical_length),
        ));
    }

    if let Some((x, regime)) = highlight {
        out.push_str(&format!("\nRegime at {symbol}={}: {}\n", fmt_num(x), regime.label()));
    }

    out
}

/// Simulation summary.
pub fn format_simulation(p: &Parameters, outcome: &SimOutcome) -> String {
    let stats = &outcome.stats;
    let est = estimate(p);
    let mut out = String::new();

    out.push_str(&format!("Simulation ({:?}):\n", outcome.config.algorithm).to_lowercase());
    out.push_str(&format!("  items consumed    {}\n", stats.items));
    out.push_str(&format!("  elapsed           {:.3}\n", stats.elapsed));
    match stats.avg_item_time {
        Some(avg) => out.push_str(&format!(
            "  time per item     {avg:.3} (model {:.3}, {})\n",
            est.throughput,
            est.regime.code()
        )),
        None => out.push_str("  time per item     -\n"),
    }
    out.push_str(&format!("  producer kicks    {}\n", stats.producer_kicks));
    out.push_str(&format!("  consumer kicks    {}\n", stats.consumer_kicks));
    if let Some(m) = &outcome.sleep {
        out.push_str(&format!("  producer sleeps   {}\n", stats.producer_sleeps));
        out.push_str(&format!("  consumer sleeps   {}\n", stats.consumer_sleeps));
        out.push_str(&format!("  producer time     {:.3}\n", m.producer_time));
        out.push_str(&format!("  consumer time     {:.3}\n", m.consumer_time));
        out.push_str(&format!("  energy per item   {:.3}\n", m.energy));
        match m.batch {
            Some(batch) => out.push_str(&format!("  items per sleep   {batch:.3}\n")),
            None => out.push_str("  items per sleep   -\n"),
        }
    }
    out.push_str(&format!(
        "  worst latency     {:.3} (bound {:.3}), items {}\n",
        stats.worst_latency,
        latency_bound(p, outcome.config.algorithm, &outcome.config.sleep),
        fmt_items(&stats.worst_latency_items, 5)
    ));
    if stats.stalled {
        out.push_str("  STALLED: both sides idle with no pending wake-up\n");
    }
    if stats.truncated {
        out.push_str(&format!(
            "  TRUNCATED: event budget of {} reached\n",
            outcome.config.max_events
        ));
    }

    out
}

/// Sleep sweep table: per-item times, energy and batch size against the
/// closed-form time bounds.
pub fn format_sleep_sweep(field: SleepField, rows: &[SleepSweepPoint]) -> String {
    let symbol = field.symbol();
    let mut out = String::new();

    out.push_str(&format!("Sleep sweep: {symbol} ({} points)\n", rows.len()));
    out.push_str(&format!(
        "{:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
        symbol, "T_prod", "T_cons", "energy", "batch", "T_lower", "T_upper"
    ));
    out.push_str(&format!(
        "{:->10} {:->10} {:->10} {:->10} {:->10} {:->10} {:->10}\n",
        "", "", "", "", "", "", ""
    ));
    for row in rows {
        let (prod, cons, energy, batch) = match &row.metrics {
            Some(m) => (
                format!("{:.3}", m.producer_time),
                format!("{:.3}", m.consumer_time),
                format!("{:.3}", m.energy),
                m.batch.map_or_else(|| "-".to_string(), |b| format!("{b:.3}")),
            ),
            None => ("-".into(), "-".into(), "-".into(), "-".into()),
        };
        out.push_str(&format!(
            "{:>10} {:>10} {:>10} {:>10} {:>10} {:>10.3} {:>10.3}\n",
            fmt_num(row.y),
            prod,
            cons,
            energy,
            batch,
            row.bounds.lower,
            row.bounds.upper
        ));
    }

    out
}

/// Model-vs-simulation summary with the `top` worst samples.
pub fn format_check(report: &CheckReport, top: usize) -> String {
    let mut out = String::new();
    let sample = &report.config.sample;

    out.push_str(&format!(
        "Check: {} samples (seed {}), {} items per simulation\n",
        report.samples.len(),
        sample.seed,
        report.config.sim_items
    ));
    out.push_str(&format!("{:<8} {:>6} {:>12} {:>12}\n", "regime", "n", "mean_err%", "max_err%"));
    out.push_str(&format!("{:-<8} {:->6} {:->12} {:->12}\n", "", "", "", ""));
    for (regime, s) in &report.per_regime {
        out.push_str(&format!(
            "{:<8} {:>6} {:>12.2} {:>12.2}\n",
            regime.code(),
            s.count,
            100.0 * s.mean_rel_error,
            100.0 * s.max_rel_error
        ));
    }
    out.push_str(&format!(
        "{:<8} {:>6} {:>12.2} {:>12.2}\n",
        "all",
        report.overall.count,
        100.0 * report.overall.mean_rel_error,
        100.0 * report.overall.max_rel_error
    ));
    if report.stalled > 0 {
        out.push_str(&format!("({} samples stalled and were skipped)\n", report.stalled));
    }

    let worst = report.worst(top);
    if !worst.is_empty() {
        out.push_str("\nLargest deviations:\n");
        for s in worst {
            let r = s.params.raw();
            out.push_str(&format!(
                "  {:<3} err={:>7.2}% model={:>10.3} sim={:>10.3} | Wp={} Wc={} Sp={} Sc={} Np={} Nc={} Kp={} Kc={} L={}\n",
                s.regime.code(),
                100.0 * s.rel_error.unwrap_or(0.0),
                s.model,
                s.simulated.unwrap_or(f64::NAN),
                fmt_num(r.wp),
                fmt_num(r.wc),
                fmt_num(r.sp),
                fmt_num(r.sc),
                fmt_num(r.np),
                fmt_num(r.nc),
                fmt_num(r.kp),
                fmt_num(r.kc),
                fmt_num(r.l),
            ));
        }
    }

    out
}

/// Whole numbers without a fractional part, others with three decimals.
fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v:.3}")
    }
}

fn fmt_items(items: &[u64], max: usize) -> String {
    let mut parts: Vec<String> = items.iter().take(max).map(|i| i.to_string()).collect();
    if items.len() > max {
        parts.push(format!("... (+{})", items.len() - max));
    }
    format!("[{}]", parts.join(", "))
}
