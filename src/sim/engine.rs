//! Event handlers for the notify, poll and sleep protocols.
//!
//! Each side alternates between a *front* step (look at the queue, start
//! working, go idle or sleep) and a *back* step (work done, update the queue,
//! maybe wake the other side). Under sleep, back steps are scheduled with
//! `push_first` so that a queue update lands before anyone looks at the queue
//! at the same instant.

use crate::domain::{Algorithm, Parameters, SleepTimes};
use crate::sim::queue::EventQueue;
use crate::sim::{Actor, SimConfig, SimStats, SliceKind, Timeline};

/// Two latencies closer than this count as equal when collecting worst cases.
const LATENCY_EPS: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    ProducerFront,
    ProducerBack,
    ConsumerFront,
    ConsumerBack,
    /// The consumer's delayed first look at the queue.
    ConsumerFirst,
}

struct State<'a> {
    p: &'a Parameters,
    algorithm: Algorithm,
    sleep: SleepTimes,
    t: f64,
    queued: u64,
    produced: u64,
    consumed: u64,
    producer_active: bool,
    consumer_active: bool,
    producer_kicks: u64,
    consumer_kicks: u64,
    producer_sleeps: u64,
    consumer_sleeps: u64,
    last_consumed_at: f64,
    producer_starts: Vec<f64>,
    consumer_starts: Vec<f64>,
    future: EventQueue<Step>,
    timeline: Timeline,
}

impl<'a> State<'a> {
    fn new(p: &'a Parameters, config: &SimConfig) -> Self {
        Self {
            p,
            algorithm: config.algorithm,
            sleep: config.sleep,
            t: 0.0,
            queued: 0,
            produced: 0,
            consumed: 0,
            producer_active: true,
            consumer_active: false,
            producer_kicks: 0,
            consumer_kicks: 0,
            producer_sleeps: 0,
            consumer_sleeps: 0,
            last_consumed_at: 0.0,
            producer_starts: Vec::new(),
            consumer_starts: Vec::new(),
            future: EventQueue::new(),
            timeline: Timeline::default(),
        }
    }

    fn has_room(&self) -> bool {
        (self.queued as f64) < self.p.l()
    }

    fn free_slots(&self) -> f64 {
        self.p.l() - self.queued as f64
    }

    fn handle(&mut self, step: Step) {
        match step {
            Step::ProducerFront => self.producer_front(),
            Step::ProducerBack => self.producer_back(),
            Step::ConsumerFront => self.consumer_front(),
            Step::ConsumerBack => self.consumer_back(),
            Step::ConsumerFirst => {
                if !self.consumer_active {
                    self.consumer_active = true;
                    self.consumer_front();
                }
            }
        }
    }

    fn producer_front(&mut self) {
        if self.has_room() {
            let wp = self.p.wp();
            self.timeline
                .push(Actor::Producer, self.t, wp, SliceKind::Work(self.produced));
            self.producer_starts.push(self.t);
            self.schedule_back(self.t + wp, Step::ProducerBack);
        } else if self.algorithm == Algorithm::Sleep {
            let yp = self.sleep.yp;
            self.timeline.push(Actor::Producer, self.t, yp, SliceKind::Sleep);
            self.future.push(self.t + yp, Step::ProducerFront);
            self.producer_sleeps += 1;
        } else {
            self.producer_active = false;
        }
    }

    fn schedule_back(&mut self, ts: f64, step: Step) {
        if self.algorithm == Algorithm::Sleep {
            self.future.push_first(ts, step);
        } else {
            self.future.push(ts, step);
        }
    }

    fn producer_back(&mut self) {
        self.queued += 1;
        self.produced += 1;
        let mut next = self.t;

        match self.algorithm {
            Algorithm::Sleep => self.future.push(next, Step::ProducerFront),
            Algorithm::Notify => {
                if !self.consumer_active && self.queued as f64 >= self.p.kp() {
                    self.consumer_active = true;
                    let (np, sc) = (self.p.np(), self.p.sc());
                    self.timeline.push(Actor::Producer, self.t, np, SliceKind::Notify);
                    self.timeline
                        .push(Actor::Consumer, self.t + np, sc, SliceKind::Startup);
                    self.future.push(self.t + np + sc, Step::ConsumerFront);
                    self.producer_kicks += 1;
                    next += np;
                }
                self.future.push(next, Step::ProducerFront);
            }
            Algorithm::Poll => {
                self.future.push(next, Step::ProducerFront);
                if !self.consumer_active {
                    self.consumer_active = true;
                    self.future.push(next, Step::ConsumerFront);
                }
            }
        }
    }

    fn consumer_front(&mut self) {
        if self.queued > 0 {
            let wc = self.p.wc();
            self.timeline
                .push(Actor::Consumer, self.t, wc, SliceKind::Work(self.consumed));
            self.consumer_starts.push(self.t);
            self.schedule_back(self.t + wc, Step::ConsumerBack);
        } else if self.algorithm == Algorithm::Sleep {
            let yc = self.sleep.yc;
            self.timeline.push(Actor::Consumer, self.t, yc, SliceKind::Sleep);
            self.future.push(self.t + yc, Step::ConsumerFront);
            self.consumer_sleeps += 1;
        } else {
            self.consumer_active = false;
        }
    }

    fn consumer_back(&mut self) {
        self.queued -= 1;
        self.consumed += 1;
        self.last_consumed_at = self.t;
        let mut next = self.t;

        match self.algorithm {
            Algorithm::Sleep => self.future.push(next, Step::ConsumerFront),
            Algorithm::Notify => {
                if !self.producer_active && self.free_slots() >= self.p.kc() {
                    self.producer_active = true;
                    let (nc, sp) = (self.p.nc(), self.p.sp());
                    self.timeline.push(Actor::Consumer, self.t, nc, SliceKind::Notify);
                    self.timeline
                        .push(Actor::Producer, self.t + nc, sp, SliceKind::Startup);
                    self.future.push(self.t + nc + sp, Step::ProducerFront);
                    self.consumer_kicks += 1;
                    next += nc;
                }
                self.future.push(next, Step::ConsumerFront);
            }
            Algorithm::Poll => {
                self.future.push(next, Step::ConsumerFront);
                if !self.producer_active {
                    self.producer_active = true;
                    self.future.push(next, Step::ProducerFront);
                }
            }
        }
    }

    /// Worst per-item latency and the items that reach it.
    ///
    /// Item `i` is measured from the start of item `i-1` on the producer (time
    /// zero for the first item) to the end of its consumption.
    fn worst_latency(&self) -> (f64, Vec<u64>) {
        let wc = self.p.wc();
        let mut worst = 0.0;
        let mut items = Vec::new();
        let mut reference = 0.0;

        for (i, &consumed_at) in self.consumer_starts.iter().enumerate() {
            if i as u64 >= self.consumed {
                break;
            }
            let latency = consumed_at + wc - reference;
            if let Some(&produced_at) = self.producer_starts.get(i) {
                reference = produced_at;
            }

            if (latency - worst).abs() < LATENCY_EPS {
                items.push(i as u64);
            } else if latency > worst {
                worst = latency;
                items = vec![i as u64];
            }
        }

        (worst, items)
    }
}

/// Run the event loop until a limit is hit or nothing is left to do.
pub(super) fn run(p: &Parameters, config: &SimConfig) -> (SimStats, Timeline) {
    let mut state = State::new(p, config);
    state.future.push(0.0, Step::ProducerFront);
    if config.algorithm == Algorithm::Sleep && config.cons_offset > 0.0 {
        state
            .timeline
            .push(Actor::Consumer, 0.0, config.cons_offset, SliceKind::Sleep);
    }
    state.future.push(config.cons_offset, Step::ConsumerFirst);

    let mut stalled = false;
    let mut truncated = false;
    let mut events = 0u64;
    loop {
        if events >= config.max_events {
            truncated = true;
            break;
        }
        let Some(ts) = state.future.peek_time() else {
            stalled = true;
            break;
        };
        if config.max_time.is_some_and(|limit| ts > limit) {
            break;
        }
        let Some((ts, step)) = state.future.pop() else {
            break;
        };
        state.t = ts;
        state.handle(step);
        events += 1;

        if state.consumed >= config.max_items {
            break;
        }
    }

    let (worst_latency, worst_latency_items) = state.worst_latency();
    let items = state.consumed;
    let elapsed = state.last_consumed_at;
    let stats = SimStats {
        items,
        elapsed,
        avg_item_time: (items > 0).then(|| elapsed / items as f64),
        producer_kicks: state.producer_kicks,
        consumer_kicks: state.consumer_kicks,
        producer_sleeps: state.producer_sleeps,
        consumer_sleeps: state.consumer_sleeps,
        stalled,
        truncated,
        worst_latency,
        worst_latency_items,
    };

    (stats, state.timeline)
}
