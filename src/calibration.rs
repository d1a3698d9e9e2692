//! Field calibration references.
//!
//! Two discrete events — "mark empty" and "mark full" — each capture the
//! most recent raw distance sample as the new reference.  No ordering is
//! enforced between the two: an inverted pair (`empty ≤ full`) is legal
//! here and is treated downstream as a degenerate zero-capacity tank
//! (see [`GeometryModel`](crate::geometry::GeometryModel)).

use log::{info, warn};

/// Mutable empty/full reference distances (cm).
#[derive(Debug, Clone, Copy)]
pub struct CalibrationStore {
    empty_cm: f64,
    full_cm: f64,
}

impl CalibrationStore {
    pub fn new(empty_cm: f64, full_cm: f64) -> Self {
        Self { empty_cm, full_cm }
    }

    /// Capture `raw_cm` as the empty-tank reference.
    /// Ignores non-finite samples (sensor fault mid-calibration).
    pub fn mark_empty(&mut self, raw_cm: f64) {
        if !raw_cm.is_finite() {
            warn!("Calibration: ignoring non-finite empty mark");
            return;
        }
        self.empty_cm = raw_cm;
        info!("Calibration: empty reference = {raw_cm:.1} cm");
        if self.is_degenerate() {
            warn!("Calibration: empty ≤ full — tank reads zero capacity until recalibrated");
        }
    }

    /// Capture `raw_cm` as the full-tank reference.
    pub fn mark_full(&mut self, raw_cm: f64) {
        if !raw_cm.is_finite() {
            warn!("Calibration: ignoring non-finite full mark");
            return;
        }
        self.full_cm = raw_cm;
        info!("Calibration: full reference = {raw_cm:.1} cm");
        if self.is_degenerate() {
            warn!("Calibration: empty ≤ full — tank reads zero capacity until recalibrated");
        }
    }

    pub fn empty_cm(&self) -> f64 {
        self.empty_cm
    }

    pub fn full_cm(&self) -> f64 {
        self.full_cm
    }

    /// True when the pair cannot describe a usable fill span.
    pub fn is_degenerate(&self) -> bool {
        self.empty_cm <= self.full_cm
    }
}
