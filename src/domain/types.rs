//! Shared domain types.
//!
//! These types are kept small and `Copy` where possible so they can be:
//!
//! - handed to the model by value (no shared mutable state)
//! - evaluated in parallel during sweeps
//! - exported to JSON/CSV

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// One of the nine model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Wp,
    Wc,
    Sp,
    Sc,
    Np,
    Nc,
    Kp,
    Kc,
    L,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Wp,
        Field::Wc,
        Field::Sp,
        Field::Sc,
        Field::Np,
        Field::Nc,
        Field::Kp,
        Field::Kc,
        Field::L,
    ];

    /// Conventional symbol (`Wp`, `Kc`, `L`, ...).
    pub fn symbol(self) -> &'static str {
        match self {
            Field::Wp => "Wp",
            Field::Wc => "Wc",
            Field::Sp => "Sp",
            Field::Sc => "Sc",
            Field::Np => "Np",
            Field::Nc => "Nc",
            Field::Kp => "Kp",
            Field::Kc => "Kc",
            Field::L => "L",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Field::Wp => "producer work time per item",
            Field::Wc => "consumer work time per item",
            Field::Sp => "producer startup latency",
            Field::Sc => "consumer startup latency",
            Field::Np => "producer per-batch overhead",
            Field::Nc => "consumer per-batch overhead",
            Field::Kp => "producer-side queue threshold",
            Field::Kc => "consumer-side queue threshold",
            Field::L => "batch length",
        }
    }
}

/// Unvalidated parameter record.
///
/// This is the on-disk/JSON shape and the input to validation. The model only
/// ever sees a validated [`Parameters`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawParameters {
    pub wp: f64,
    pub wc: f64,
    pub sp: f64,
    pub sc: f64,
    pub np: f64,
    pub nc: f64,
    pub kp: f64,
    pub kc: f64,
    pub l: f64,
}

impl RawParameters {
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Wp => self.wp,
            Field::Wc => self.wc,
            Field::Sp => self.sp,
            Field::Sc => self.sc,
            Field::Np => self.np,
            Field::Nc => self.nc,
            Field::Kp => self.kp,
            Field::Kc => self.kc,
            Field::L => self.l,
        }
    }

    fn set(&mut self, field: Field, value: f64) {
        let slot = match field {
            Field::Wp => &mut self.wp,
            Field::Wc => &mut self.wc,
            Field::Sp => &mut self.sp,
            Field::Sc => &mut self.sc,
            Field::Np => &mut self.np,
            Field::Nc => &mut self.nc,
            Field::Kp => &mut self.kp,
            Field::Kc => &mut self.kc,
            Field::L => &mut self.l,
        };
        *slot = value;
    }

    /// Check every field and produce a [`Parameters`] value.
    ///
    /// Rules: finite, non-negative, and `L >= 1`.
    pub fn validate(self) -> Result<Parameters, ModelError> {
        for field in Field::ALL {
            let value = self.get(field);
            if !value.is_finite() {
                return Err(ModelError::invalid(field, value, "must be a finite number"));
            }
            if value < 0.0 {
                return Err(ModelError::invalid(field, value, "must be non-negative"));
            }
        }
        if self.l < 1.0 {
            return Err(ModelError::invalid(Field::L, self.l, "must be >= 1"));
        }
        Ok(Parameters(self))
    }
}

/// Validated, immutable model parameters.
///
/// Fields are read through accessors. Evaluating the model at a different
/// value of one field goes through [`Parameters::with`], which returns a new
/// value and leaves `self` untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameters", into = "RawParameters")]
pub struct Parameters(RawParameters);

impl TryFrom<RawParameters> for Parameters {
    type Error = ModelError;

    fn try_from(raw: RawParameters) -> Result<Self, Self::Error> {
        raw.validate()
    }
}

impl From<Parameters> for RawParameters {
    fn from(p: Parameters) -> Self {
        p.0
    }
}

impl Parameters {
    pub fn wp(&self) -> f64 {
        self.0.wp
    }
    pub fn wc(&self) -> f64 {
        self.0.wc
    }
    pub fn sp(&self) -> f64 {
        self.0.sp
    }
    pub fn sc(&self) -> f64 {
        self.0.sc
    }
    pub fn np(&self) -> f64 {
        self.0.np
    }
    pub fn nc(&self) -> f64 {
        self.0.nc
    }
    pub fn kp(&self) -> f64 {
        self.0.kp
    }
    pub fn kc(&self) -> f64 {
        self.0.kc
    }
    pub fn l(&self) -> f64 {
        self.0.l
    }

    pub fn get(&self, field: Field) -> f64 {
        self.0.get(field)
    }

    pub fn raw(&self) -> RawParameters {
        self.0
    }

    /// A validated copy with `field` set to `value`.
    pub fn with(&self, field: Field, value: f64) -> Result<Parameters, ModelError> {
        let mut raw = self.0;
        raw.set(field, value);
        raw.validate()
    }

    /// The same system seen from the other end of the queue.
    ///
    /// Producer and consumer quantities are exchanged (`Wp`<->`Wc`,
    /// `Sp`<->`Sc`, `Np`<->`Nc`, `Kp`<->`Kc`); `L` is kept. The result is valid
    /// whenever `self` is.
    pub fn mirrored(&self) -> Parameters {
        let r = self.0;
        Parameters(RawParameters {
            wp: r.wc,
            wc: r.wp,
            sp: r.sc,
            sc: r.sp,
            np: r.nc,
            nc: r.np,
            kp: r.kc,
            kc: r.kp,
            l: r.l,
        })
    }
}

/// Steady-state behaviour class of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Regime {
    /// Slow producer and consumer startup.
    Ss,
    /// Fast consumer, slow consumer startup (short queue).
    Sc,
    /// Fast consumer, no short-queue effects.
    G1,
    /// Fast producer, slow producer startup (short queue).
    Sp,
    /// Fast producer, no short-queue effects.
    G2,
}

impl Regime {
    pub const ALL: [Regime; 5] = [Regime::Ss, Regime::Sc, Regime::G1, Regime::Sp, Regime::G2];

    pub fn code(self) -> &'static str {
        match self {
            Regime::Ss => "SS",
            Regime::Sc => "SC",
            Regime::G1 => "G1",
            Regime::Sp => "SP",
            Regime::G2 => "G2",
        }
    }

    /// Human-readable label for terminal output.
    pub fn label(self) -> &'static str {
        match self {
            Regime::Ss => "(SS) Slow producer and consumer startup",
            Regime::Sc => "(SC) Slow consumer startup",
            Regime::G1 => "(G1) Fast consumer",
            Regime::Sp => "(SP) Slow producer startup",
            Regime::G2 => "(G2) Fast producer",
        }
    }

    /// True for the two short-queue regimes plus `SS`.
    pub fn is_short_queue(self) -> bool {
        matches!(self, Regime::Ss | Regime::Sc | Regime::Sp)
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Producer/consumer synchronisation protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Idle sides are woken by an explicit notification (costs `N` and `S`).
    Notify,
    /// Idle sides notice new work immediately, no notification costs.
    Poll,
    /// Idle sides sleep for a fixed period (`Yp`/`Yc`) and look again.
    Sleep,
}

/// Sleep periods and per-sleep energy for [`Algorithm::Sleep`].
///
/// Kept apart from [`Parameters`]: the closed-form model does not use them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepTimes {
    /// Producer sleep period when the queue is full.
    pub yp: f64,
    /// Consumer sleep period when the queue is empty.
    pub yc: f64,
    /// Energy cost of one sleep, in work-time units.
    pub ye: f64,
}

impl Default for SleepTimes {
    fn default() -> Self {
        Self { yp: 5.0, yc: 5.0, ye: 2.5 }
    }
}

/// Which sleep period a sleep sweep varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SleepField {
    Yp,
    Yc,
    /// Both periods together.
    Y,
}

impl SleepField {
    pub fn symbol(self) -> &'static str {
        match self {
            SleepField::Yp => "Yp",
            SleepField::Yc => "Yc",
            SleepField::Y => "Y",
        }
    }

    /// `times` with the swept period(s) set to `value`.
    pub fn apply(self, times: SleepTimes, value: f64) -> SleepTimes {
        match self {
            SleepField::Yp => SleepTimes { yp: value, ..times },
            SleepField::Yc => SleepTimes { yc: value, ..times },
            SleepField::Y => SleepTimes { yp: value, yc: value, ..times },
        }
    }
}

/// A half-open range of values for one swept field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRange {
    pub field: Field,
    pub start: f64,
    /// Exclusive.
    pub end: f64,
    pub step: f64,
}

/// One row of the throughput curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThroughputPoint {
    pub x: f64,
    pub max_work_time: f64,
    pub ideal_throughput: f64,
    pub throughput: f64,
    pub regime: Regime,
}

/// One row of the critical-length curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalPoint {
    pub x: f64,
    pub critical_length_combined: f64,
    pub critical_length: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawParameters {
        RawParameters {
            wp: 5.0,
            wc: 10.0,
            sp: 1.0,
            sc: 2.0,
            np: 3.0,
            nc: 4.0,
            kp: 1.0,
            kc: 2.0,
            l: 20.0,
        }
    }

    #[test]
    fn validate_rejects_negative_field() {
        let bad = RawParameters { sc: -1.0, ..raw() };
        let err = bad.validate().unwrap_err();
        assert_eq!(err.field(), Field::Sc);
    }

    #[test]
    fn validate_rejects_zero_batch_length() {
        let bad = RawParameters { l: 0.0, ..raw() };
        assert_eq!(bad.validate().unwrap_err().field(), Field::L);
    }

    #[test]
    fn validate_rejects_non_finite() {
        let bad = RawParameters { wp: f64::NAN, ..raw() };
        assert_eq!(bad.validate().unwrap_err().field(), Field::Wp);
        let bad = RawParameters { kc: f64::INFINITY, ..raw() };
        assert_eq!(bad.validate().unwrap_err().field(), Field::Kc);
    }

    #[test]
    fn with_returns_copy_and_leaves_original() {
        let p = raw().validate().unwrap();
        let q = p.with(Field::Wp, 42.0).unwrap();
        assert_eq!(q.wp(), 42.0);
        assert_eq!(p.wp(), 5.0);
        assert!(p.with(Field::L, 0.0).is_err());
    }

    #[test]
    fn mirrored_twice_is_identity() {
        let p = raw().validate().unwrap();
        let m = p.mirrored();
        assert_eq!(m.wp(), p.wc());
        assert_eq!(m.kc(), p.kp());
        assert_eq!(m.mirrored(), p);
    }

    #[test]
    fn json_roundtrip_validates() {
        let p = raw().validate().unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"wp\":5.0"));
        let back: Parameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);

        let bad = json.replace("\"l\":20.0", "\"l\":0.0");
        assert!(serde_json::from_str::<Parameters>(&bad).is_err());
    }
}
