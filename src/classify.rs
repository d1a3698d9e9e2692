//! Threshold classification and alert tracking.
//!
//! Two independent outputs are produced from the same live values:
//!
//! * [`TankState`] — a single discrete condition, evaluated with the
//!   legacy first-match precedence (the "Ok" band is tested before the
//!   individual Low/High branches).
//! * [`AlertSet`] — three independent strict comparisons.
//!
//! The two are *allowed* to disagree when thresholds are misconfigured
//! (e.g. `low > high`); the classifier must stay total and non-panicking
//! there, not reconcile them.

use log::{error, info};
use serde::{Deserialize, Serialize};

/// Classification thresholds.  Independently adjustable; no
/// cross-validation (low may legally exceed high).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Low-fill alert threshold (percent of capacity).
    pub low_percent: f64,
    /// High-fill alert threshold (percent of capacity).
    pub high_percent: f64,
    /// Fast-drain alert threshold (litres per minute, positive = draining).
    pub drain_lpm: f64,
}

/// Discrete tank condition.  Exactly one value at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TankState {
    Ok,
    Low,
    High,
    Draining,
}

/// Independent alert flags, each from a plain strict comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AlertSet {
    pub low: bool,
    pub high: bool,
    pub fast_drain: bool,
}

impl AlertSet {
    pub fn any(&self) -> bool {
        self.low || self.high || self.fast_drain
    }
}

/// Largest summary is "LOW & HIGH & DRAIN ALERT" (24 bytes).
pub type Summary = heapless::String<32>;

/// Legacy-precedence state classification.  First match wins; the
/// fallback covers boundary equalities.
pub fn classify(fill_percent: f64, drain_lpm: f64, thr: &Thresholds) -> TankState {
    if fill_percent > thr.low_percent && fill_percent < thr.high_percent && drain_lpm < thr.drain_lpm
    {
        TankState::Ok
    } else if fill_percent < thr.low_percent {
        TankState::Low
    } else if fill_percent > thr.high_percent {
        TankState::High
    } else if drain_lpm > thr.drain_lpm {
        TankState::Draining
    } else {
        TankState::Ok
    }
}

/// Alert flags from live values, independent of the [`classify`] branch.
pub fn alerts(fill_percent: f64, drain_lpm: f64, thr: &Thresholds) -> AlertSet {
    AlertSet {
        low: fill_percent < thr.low_percent,
        high: fill_percent > thr.high_percent,
        fast_drain: drain_lpm > thr.drain_lpm,
    }
}

/// Human-readable summary: active alert names joined with `&`, or "OK".
pub fn summary(alerts: AlertSet) -> Summary {
    let mut out = Summary::new();
    if !alerts.any() {
        let _ = out.push_str("OK");
        return out;
    }
    for name in [
        alerts.low.then_some("LOW"),
        alerts.high.then_some("HIGH"),
        alerts.fast_drain.then_some("DRAIN"),
    ]
    .into_iter()
    .flatten()
    {
        if !out.is_empty() {
            let _ = out.push_str(" & ");
        }
        let _ = out.push_str(name);
    }
    let _ = out.push_str(" ALERT");
    out
}

// ── Alert edge tracking ───────────────────────────────────────

const ALERT_LOW: u8 = 0b0000_0001;
const ALERT_HIGH: u8 = 0b0000_0010;
const ALERT_DRAIN: u8 = 0b0000_0100;

/// Tracks the alert bitmask across ticks and logs set/clear edges, so
/// transitions are observable without polling the flags.
#[derive(Debug, Default)]
pub struct AlertMonitor {
    flags: u8,
}

impl AlertMonitor {
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Fold a fresh [`AlertSet`] into the mask, logging each edge.
    pub fn update(&mut self, set: AlertSet) {
        self.eval_flag(ALERT_LOW, "LOW", set.low);
        self.eval_flag(ALERT_HIGH, "HIGH", set.high);
        self.eval_flag(ALERT_DRAIN, "DRAIN", set.fast_drain);
    }

    pub fn current(&self) -> AlertSet {
        AlertSet {
            low: self.flags & ALERT_LOW != 0,
            high: self.flags & ALERT_HIGH != 0,
            fast_drain: self.flags & ALERT_DRAIN != 0,
        }
    }

    pub fn any(&self) -> bool {
        self.flags != 0
    }

    fn eval_flag(&mut self, mask: u8, name: &str, condition: bool) {
        if condition {
            if self.flags & mask == 0 {
                error!("ALERT SET: {name}");
            }
            self.flags |= mask;
        } else {
            if self.flags & mask != 0 {
                info!("ALERT CLEARED: {name}");
            }
            self.flags &= !mask;
        }
    }
}
