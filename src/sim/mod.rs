//! Discrete-event simulation of a producer and a consumer sharing a queue.
//!
//! The queue holds at most `L` items. With [`Algorithm::Notify`] an idle side
//! has to be woken explicitly:
//!
//! - the producer notifies an idle consumer (cost `Np`) once `Kp` items are
//!   queued; the consumer then pays `Sc` before it starts draining
//! - the consumer notifies an idle producer (cost `Nc`) once `Kc` slots are
//!   free; the producer then pays `Sp` before it resumes
//!
//! With [`Algorithm::Poll`] both sides notice new work for free. With
//! [`Algorithm::Sleep`] nobody notifies anybody: a producer facing a full queue
//! sleeps `Yp`, a consumer facing an empty one sleeps `Yc`, and each looks
//! again when it wakes.
//!
//! Every run is bounded by `max_events` as well as by `max_items` and
//! `max_time`: with `Wp = 0` the producer fills the whole queue without
//! simulated time moving.
//!
//! The simulator is the empirical counterpart of the closed-form model in
//! `crate::model`: `SimStats::avg_item_time` is what `model::throughput`
//! estimates.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::domain::{Algorithm, Parameters, SleepTimes};
use crate::error::AppError;

mod engine;
pub mod queue;
pub mod sleep;

pub use sleep::{SleepMetrics, SleepSweepPoint, sleep_metrics, sleep_sweep};

/// Simulation limits and knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub algorithm: Algorithm,
    /// Stop once this many items have been consumed.
    pub max_items: u64,
    /// Stop before processing any event later than this.
    pub max_time: Option<f64>,
    /// Delay before the consumer first looks at the queue.
    pub cons_offset: f64,
    /// Stop after processing this many events.
    pub max_events: u64,
    /// Sleep periods, read by [`Algorithm::Sleep`] only.
    pub sleep: SleepTimes,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Notify,
            max_items: 10_000,
            max_time: None,
            cons_offset: 0.0,
            max_events: 1_000_000,
            sleep: SleepTimes::default(),
        }
    }
}

/// Who occupies a time slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Producer,
    Consumer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceKind {
    /// Producing or consuming item `n` (0-based).
    Work(u64),
    /// Paying the notification overhead to wake the other side.
    Notify,
    /// Paying the startup latency after being woken.
    Startup,
    /// Sleeping on a full (producer) or empty (consumer) queue.
    Sleep,
}

/// A busy interval on one actor's strip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub start: f64,
    pub duration: f64,
    pub kind: SliceKind,
}

/// Busy intervals of both actors, in start order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub producer: Vec<Slice>,
    pub consumer: Vec<Slice>,
}

impl Timeline {
    pub fn strip(&self, actor: Actor) -> &[Slice] {
        match actor {
            Actor::Producer => &self.producer,
            Actor::Consumer => &self.consumer,
        }
    }

    fn push(&mut self, actor: Actor, start: f64, duration: f64, kind: SliceKind) {
        let strip = match actor {
            Actor::Producer => &mut self.producer,
            Actor::Consumer => &mut self.consumer,
        };
        strip.push(Slice { start, duration, kind });
    }
}

/// Aggregate results of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimStats {
    /// Items fully consumed.
    pub items: u64,
    /// End time of the last consumed item.
    pub elapsed: f64,
    /// `elapsed / items`; `None` when nothing was consumed.
    pub avg_item_time: Option<f64>,
    /// Notifications sent by the producer.
    pub producer_kicks: u64,
    /// Notifications sent by the consumer.
    pub consumer_kicks: u64,
    /// Sleeps taken by the producer (sleep protocol).
    pub producer_sleeps: u64,
    /// Sleeps taken by the consumer (sleep protocol).
    pub consumer_sleeps: u64,
    /// The event list ran dry before hitting a limit (both sides idle for good).
    pub stalled: bool,
    /// The event budget ran out before `max_items` / `max_time`.
    pub truncated: bool,
    /// Largest per-item service latency observed.
    pub worst_latency: f64,
    /// Items that hit `worst_latency`.
    pub worst_latency_items: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimOutcome {
    pub config: SimConfig,
    pub stats: SimStats,
    /// Per-item time, energy and batch; sleep protocol runs that consumed something.
    pub sleep: Option<SleepMetrics>,
    pub timeline: Timeline,
}

/// Run one simulation.
pub fn simulate(p: &Parameters, config: &SimConfig) -> Result<SimOutcome, AppError> {
    if config.max_items == 0 {
        return Err(AppError::new(2, "max_items must be > 0."));
    }
    if !(config.cons_offset.is_finite() && config.cons_offset >= 0.0) {
        return Err(AppError::new(
            2,
            format!("Consumer offset must be finite and >= 0 (got {}).", config.cons_offset),
        ));
    }
    if let Some(t) = config.max_time {
        if !(t.is_finite() && t > 0.0) {
            return Err(AppError::new(2, format!("max_time must be finite and > 0 (got {t}).")));
        }
    }
    if config.max_events == 0 {
        return Err(AppError::new(2, "max_events must be > 0."));
    }
    if config.algorithm == Algorithm::Sleep {
        let SleepTimes { yp, yc, ye } = config.sleep;
        if !(yp.is_finite() && yp > 0.0 && yc.is_finite() && yc > 0.0) {
            return Err(AppError::new(
                2,
                format!("Sleep periods must be finite and > 0 (got Yp={yp}, Yc={yc})."),
            ));
        }
        if !(ye.is_finite() && ye >= 0.0) {
            return Err(AppError::new(2, format!("Sleep energy must be finite and >= 0 (got Ye={ye}).")));
        }
    }
    debug!(
        "simulate {:?}: max_items={} max_time={:?} cons_offset={}",
        config.algorithm, config.max_items, config.max_time, config.cons_offset
    );

    let (stats, timeline) = engine::run(p, config);

    if stats.stalled {
        warn!(
            "simulation stalled after {} items at t={} (no pending events)",
            stats.items, stats.elapsed
        );
    }
    if stats.truncated {
        warn!(
            "simulation hit the event budget ({}) after {} items",
            config.max_events, stats.items
        );
    }

    let sleep = match config.algorithm {
        Algorithm::Sleep => sleep_metrics(p, &config.sleep, &stats),
        Algorithm::Notify | Algorithm::Poll => None,
    };

    Ok(SimOutcome {
        config: *config,
        stats,
        sleep,
        timeline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_params as params;

    fn config(algorithm: Algorithm, max_items: u64) -> SimConfig {
        SimConfig {
            algorithm,
            max_items,
            ..SimConfig::default()
        }
    }

    #[test]
    fn poll_runs_at_slower_stage_speed() {
        let p = params(10.0, 4.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 8.0);
        let out = simulate(&p, &config(Algorithm::Poll, 1000)).unwrap();
        assert_eq!(out.stats.items, 1000);
        assert!(!out.stats.stalled);
        // Item n is consumed at 10*(n+1) + 4.
        assert!((out.stats.elapsed - 10_004.0).abs() < 1e-9);
        let avg = out.stats.avg_item_time.unwrap();
        assert!((avg - 10.004).abs() < 1e-9);
        assert_eq!(out.stats.producer_kicks, 0);
        assert_eq!(out.stats.consumer_kicks, 0);
    }

    #[test]
    fn notify_fast_consumer_kicks_every_item() {
        // Consumer drains each item before the next one arrives, so every
        // enqueue has to wake it.
        let p = params(10.0, 2.0, 0.0, 1.0, 0.5, 0.5, 1.0, 1.0, 4.0);
        let out = simulate(&p, &config(Algorithm::Notify, 50)).unwrap();
        assert_eq!(out.stats.items, 50);
        assert_eq!(out.stats.producer_kicks, 50);
        assert_eq!(out.stats.consumer_kicks, 0);
        // Each cycle costs Wp + Np on the producer.
        let avg = out.stats.avg_item_time.unwrap();
        assert!(avg > 10.0 && avg < 11.0, "avg={avg}");
    }

    #[test]
    fn notify_stalls_when_threshold_exceeds_queue() {
        let p = params(1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 5.0, 1.0, 3.0);
        let out = simulate(&p, &config(Algorithm::Notify, 100)).unwrap();
        assert!(out.stats.stalled);
        assert_eq!(out.stats.items, 0);
        assert_eq!(out.stats.avg_item_time, None);
        assert_eq!(out.timeline.producer.len(), 3);
    }

    #[test]
    fn max_time_stops_early() {
        let p = params(10.0, 4.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 8.0);
        let cfg = SimConfig {
            max_time: Some(100.0),
            ..config(Algorithm::Poll, 1_000_000)
        };
        let out = simulate(&p, &cfg).unwrap();
        assert!(!out.stats.stalled);
        assert!(out.stats.items < 11);
        assert!(out.stats.elapsed <= 100.0);
    }

    #[test]
    fn timeline_work_slices_are_ordered() {
        let p = params(3.0, 5.0, 2.0, 2.0, 1.0, 1.0, 1.0, 2.0, 6.0);
        let out = simulate(&p, &config(Algorithm::Notify, 200)).unwrap();
        for strip in [Actor::Producer, Actor::Consumer] {
            let slices = out.timeline.strip(strip);
            for pair in slices.windows(2) {
                assert!(pair[0].start + pair[0].duration <= pair[1].start + 1e-9);
            }
        }
        let consumed: Vec<u64> = out
            .timeline
            .consumer
            .iter()
            .filter_map(|s| match s.kind {
                SliceKind::Work(n) => Some(n),
                _ => None,
            })
            .collect();
        assert!(consumed.windows(2).all(|w| w[1] == w[0] + 1));
    }

    #[test]
    fn worst_latency_within_notify_bound() {
        let p = params(3.0, 5.0, 2.0, 2.0, 1.0, 1.0, 1.0, 2.0, 6.0);
        let out = simulate(&p, &config(Algorithm::Notify, 500)).unwrap();
        let bound = crate::model::notify_latency_bound(&p);
        assert!(out.stats.worst_latency > 0.0);
        assert!(out.stats.worst_latency <= bound + 1e-6, "{} > {bound}", out.stats.worst_latency);
        assert!(!out.stats.worst_latency_items.is_empty());
    }

    #[test]
    fn zero_producer_work_is_bounded_by_event_budget() {
        // Wp = 0 fills the queue without time moving, so only the event
        // budget can stop it.
        let p = params(0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 2e6);
        let cfg = SimConfig {
            max_items: 1,
            max_time: Some(0.5),
            max_events: 10_000,
            ..SimConfig::default()
        };
        let out = simulate(&p, &cfg).unwrap();
        assert!(out.stats.truncated);
        assert!(!out.stats.stalled);
        assert_eq!(out.stats.items, 0);
        assert!(out.timeline.producer.len() as u64 <= cfg.max_events);
        assert!(out.timeline.consumer.len() as u64 <= cfg.max_events);
    }

    #[test]
    fn sleep_protocol_counts_sleeps() {
        let p = params(2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 3.0);
        let cfg = SimConfig {
            sleep: SleepTimes { yp: 5.0, yc: 5.0, ye: 2.5 },
            ..config(Algorithm::Sleep, 100)
        };
        let out = simulate(&p, &cfg).unwrap();
        assert_eq!(out.stats.items, 100);
        assert!((out.stats.elapsed - 300.0).abs() < 1e-9);
        assert_eq!(out.stats.producer_sleeps, 20);
        assert_eq!(out.stats.consumer_sleeps, 40);
        assert_eq!(out.stats.producer_kicks + out.stats.consumer_kicks, 0);
        assert!(!out.stats.stalled && !out.stats.truncated);

        let m = out.sleep.unwrap();
        assert!((m.producer_time - 3.0).abs() < 1e-12);
        assert!((m.consumer_time - 3.0).abs() < 1e-12);
        assert_eq!(m.batch, Some(100.0 / 60.0));
        assert!(out.timeline.producer.iter().any(|s| s.kind == SliceKind::Sleep));
    }

    #[test]
    fn worst_latency_within_sleep_bound() {
        let cases = [
            (2.0, 1.0, 3.0, 5.0, 5.0),
            (2.0, 1.0, 10.0, 5.0, 5.0),
            (1.0, 2.0, 10.0, 5.0, 5.0),
            (1.0, 3.0, 4.0, 7.0, 2.0),
            (3.0, 5.0, 6.0, 2.0, 2.0),
        ];
        for (wp, wc, l, yp, yc) in cases {
            let p = params(wp, wc, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, l);
            let sleep = SleepTimes { yp, yc, ye: 1.0 };
            let cfg = SimConfig { sleep, ..config(Algorithm::Sleep, 100) };
            let out = simulate(&p, &cfg).unwrap();
            let bound = crate::model::sleep_latency_bound(&p, &sleep);
            assert!(out.stats.worst_latency <= bound + 1e-6, "{:?}: {} > {bound}", (wp, wc, l), out.stats.worst_latency);
        }
    }

    #[test]
    fn sleep_consumer_offset_shows_as_sleep() {
        let p = params(2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 3.0);
        let cfg = SimConfig { cons_offset: 4.0, ..config(Algorithm::Sleep, 10) };
        let out = simulate(&p, &cfg).unwrap();
        let first = out.timeline.consumer[0];
        assert_eq!((first.start, first.duration, first.kind), (0.0, 4.0, SliceKind::Sleep));
        assert!(out.sleep.is_some());
        assert!(simulate(&p, &SimConfig { cons_offset: 4.0, ..config(Algorithm::Notify, 10) })
            .unwrap()
            .timeline
            .consumer
            .iter()
            .all(|s| s.kind != SliceKind::Sleep));
    }

    #[test]
    fn rejects_bad_sleep_config() {
        let p = params(2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 3.0);
        let zero = SimConfig {
            sleep: SleepTimes { yp: 0.0, yc: 5.0, ye: 1.0 },
            ..config(Algorithm::Sleep, 10)
        };
        assert_eq!(simulate(&p, &zero).unwrap_err().exit_code(), 2);
        // Notify ignores the sleep periods.
        assert!(simulate(&p, &SimConfig { algorithm: Algorithm::Notify, ..zero }).is_ok());
        let no_budget = SimConfig { max_events: 0, ..SimConfig::default() };
        assert!(simulate(&p, &no_budget).is_err());
    }

    #[test]
    fn rejects_bad_config() {
        let p = params(3.0, 5.0, 2.0, 2.0, 1.0, 1.0, 1.0, 2.0, 6.0);
        assert!(simulate(&p, &config(Algorithm::Poll, 0)).is_err());
        let cfg = SimConfig {
            cons_offset: -1.0,
            ..SimConfig::default()
        };
        assert_eq!(simulate(&p, &cfg).unwrap_err().exit_code(), 2);
    }
}
