//! Horizontal-cylinder tank geometry.
//!
//! Converts a raw ultrasonic distance into liquid height, partial volume,
//! capacity, and fill percent using the closed-form circular-segment
//! formula:
//!
//! ```text
//! θ = acos((r − h) / r)
//! A = r² · (θ − sin 2θ / 2)
//! V = A · L
//! ```
//!
//! All distances are centimetres, volumes litres.  The maximum fill
//! height comes from calibration (`empty − full`) and is clamped into
//! `(0, 2r]` before it ever reaches the trigonometry; a degenerate
//! calibration or geometry collapses to a zero-capacity tank rather
//! than a panic or a NaN.

use serde::{Deserialize, Serialize};

/// Physical tank dimensions (tunable at runtime).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TankGeometry {
    /// Cylinder cross-section radius (cm).
    pub radius_cm: f64,
    /// Cylinder length along the horizontal axis (cm).
    pub length_cm: f64,
}

impl TankGeometry {
    /// A geometry the segment formula can act on.
    pub fn is_valid(&self) -> bool {
        self.radius_cm > 0.0 && self.length_cm > 0.0
    }
}

/// Derived per-sample quantities.  Recomputed every metric tick, never
/// persisted.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FillState {
    pub height_cm: f64,
    pub volume_l: f64,
    pub capacity_l: f64,
    /// `None` when capacity is zero or undefined ("no data", not 0 %).
    pub fill_percent: Option<f64>,
}

/// Geometry model with a cached capacity.
///
/// The capacity is recomputed only when geometry or calibration changes,
/// so the per-tick path is a clamp, one `acos`, and one `sin`.
#[derive(Debug, Clone, Copy)]
pub struct GeometryModel {
    geometry: TankGeometry,
    /// Empty-tank reference distance (cm), from calibration.
    empty_cm: f64,
    /// Usable fill height (cm), already clamped into `(0, 2r]`.
    /// Zero for degenerate calibration/geometry.
    max_height_cm: f64,
    /// Cached full-tank volume (litres).  Zero when degenerate.
    capacity_l: f64,
}

impl GeometryModel {
    pub fn new(geometry: TankGeometry, empty_cm: f64, full_cm: f64) -> Self {
        let mut model = Self {
            geometry,
            empty_cm,
            max_height_cm: 0.0,
            capacity_l: 0.0,
        };
        model.rebuild(empty_cm, full_cm);
        model
    }

    /// Replace the tank dimensions and recompute the cached capacity.
    pub fn set_geometry(&mut self, geometry: TankGeometry, empty_cm: f64, full_cm: f64) {
        self.geometry = geometry;
        self.rebuild(empty_cm, full_cm);
    }

    /// Replace the calibration references and recompute the cached capacity.
    pub fn set_calibration(&mut self, empty_cm: f64, full_cm: f64) {
        self.rebuild(empty_cm, full_cm);
    }

    fn rebuild(&mut self, empty_cm: f64, full_cm: f64) {
        self.empty_cm = empty_cm;
        let span = empty_cm - full_cm;

        if !self.geometry.is_valid() || !span.is_finite() || span <= 0.0 {
            // Degenerate tank: zero capacity, every fill reads "no data".
            self.max_height_cm = 0.0;
            self.capacity_l = 0.0;
            return;
        }

        // The segment formula is only physical up to the full diameter.
        self.max_height_cm = span.min(2.0 * self.geometry.radius_cm);
        self.capacity_l = self.segment_volume_l(self.max_height_cm);
    }

    pub fn geometry(&self) -> TankGeometry {
        self.geometry
    }

    pub fn max_height_cm(&self) -> f64 {
        self.max_height_cm
    }

    pub fn capacity_l(&self) -> f64 {
        self.capacity_l
    }

    /// Liquid height above the tank floor for a raw sensor distance.
    /// Out-of-range distances clamp to `[0, max_height]` so a sensor
    /// fault can never push a negative height downstream.
    pub fn height_cm(&self, distance_cm: f64) -> f64 {
        (self.empty_cm - distance_cm).clamp(0.0, self.max_height_cm)
    }

    /// Partial volume at `height_cm`.
    ///
    /// Returns the cached capacity *exactly* at (or above) the maximum
    /// height — the trig formula would drift a few ULPs there.
    pub fn volume_l(&self, height_cm: f64) -> f64 {
        if self.max_height_cm <= 0.0 || height_cm <= 0.0 {
            return 0.0;
        }
        if height_cm >= self.max_height_cm {
            return self.capacity_l;
        }
        self.segment_volume_l(height_cm)
    }

    /// Fill percent, or `None` when capacity is undefined.
    pub fn fill_percent(&self, volume_l: f64) -> Option<f64> {
        if self.capacity_l > 0.0 {
            Some(volume_l / self.capacity_l * 100.0)
        } else {
            None
        }
    }

    /// Full derived snapshot for one raw distance sample.
    pub fn fill_state(&self, distance_cm: f64) -> FillState {
        let height_cm = self.height_cm(distance_cm);
        let volume_l = self.volume_l(height_cm);
        FillState {
            height_cm,
            volume_l,
            capacity_l: self.capacity_l,
            fill_percent: self.fill_percent(volume_l),
        }
    }

    /// Raw circular-segment volume.  Caller guarantees a valid geometry;
    /// the acos argument is clamped against float slop at the boundaries.
    fn segment_volume_l(&self, height_cm: f64) -> f64 {
        let r = self.geometry.radius_cm;
        let cos_theta = ((r - height_cm) / r).clamp(-1.0, 1.0);
        let theta = cos_theta.acos();
        let area_cm2 = r * r * (theta - (2.0 * theta).sin() / 2.0);
        // cm³ → litres
        area_cm2 * self.geometry.length_cm / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn model() -> GeometryModel {
        // radius 50 cm, length 200 cm, full diameter usable (max height 100).
        GeometryModel::new(
            TankGeometry {
                radius_cm: 50.0,
                length_cm: 200.0,
            },
            120.0,
            20.0,
        )
    }

    #[test]
    fn capacity_matches_full_cylinder() {
        let m = model();
        let expected = PI * 50.0 * 50.0 * 200.0 / 1000.0;
        assert!((m.capacity_l() - expected).abs() < 1e-6);
    }

    #[test]
    fn volume_zero_at_floor_and_capacity_at_top() {
        let m = model();
        assert_eq!(m.volume_l(0.0), 0.0);
        // Exactly the cached capacity, not the trig result.
        assert_eq!(m.volume_l(m.max_height_cm()), m.capacity_l());
        assert_eq!(m.volume_l(m.max_height_cm() + 5.0), m.capacity_l());
    }

    #[test]
    fn half_height_is_half_capacity() {
        let m = model();
        let half = m.volume_l(50.0);
        assert!((half - m.capacity_l() / 2.0).abs() < 1e-6);
    }

    #[test]
    fn height_clamps_sensor_faults() {
        let m = model();
        // Sensor reading beyond the empty reference → height 0, not negative.
        assert_eq!(m.height_cm(500.0), 0.0);
        // Reading closer than the full reference → clamped to max height.
        assert_eq!(m.height_cm(0.0), m.max_height_cm());
    }

    #[test]
    fn inverted_calibration_degrades_to_zero_capacity() {
        let mut m = model();
        m.set_calibration(20.0, 120.0); // empty < full
        assert_eq!(m.capacity_l(), 0.0);
        assert_eq!(m.volume_l(40.0), 0.0);
        assert_eq!(m.fill_percent(0.0), None);
    }

    #[test]
    fn invalid_radius_degrades_to_zero_capacity() {
        let m = GeometryModel::new(
            TankGeometry {
                radius_cm: 0.0,
                length_cm: 200.0,
            },
            120.0,
            20.0,
        );
        assert_eq!(m.capacity_l(), 0.0);
        assert_eq!(m.fill_state(60.0).fill_percent, None);
    }

    #[test]
    fn max_height_clamped_to_diameter() {
        // Calibration span 300 cm on a 50 cm-radius tank → clamp to 100.
        let m = GeometryModel::new(
            TankGeometry {
                radius_cm: 50.0,
                length_cm: 200.0,
            },
            320.0,
            20.0,
        );
        assert!((m.max_height_cm() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn volume_is_monotone_on_a_coarse_grid() {
        let m = model();
        let mut prev = 0.0;
        for i in 0..=100 {
            let v = m.volume_l(f64::from(i));
            assert!(v >= prev, "volume regressed at height {i}");
            prev = v;
        }
    }
}
