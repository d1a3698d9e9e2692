//! System configuration parameters
//!
//! All tunable parameters for the tank monitor: geometry, thresholds,
//! actuator behaviour, night windows, and cadence periods.  Every field
//! is adjustable at runtime through
//! [`AppCommand`](crate::app::commands::AppCommand) set-value operations;
//! the documented ranges below are enforced there.

use serde::{Deserialize, Serialize};

use crate::actuators::buzzer::MelodyId;
use crate::actuators::led::{AlertLedMode, DEFAULT_BLINK_PERIOD_MS};
use crate::classify::Thresholds;
use crate::geometry::TankGeometry;
use crate::night::NightWindow;

/// Accepted tank radius (cm).
pub const RADIUS_RANGE_CM: core::ops::RangeInclusive<f64> = 1.0..=500.0;
/// Accepted tank length (cm).
pub const LENGTH_RANGE_CM: core::ops::RangeInclusive<f64> = 1.0..=2000.0;
/// Accepted fill-percent thresholds.
pub const PERCENT_RANGE: core::ops::RangeInclusive<f64> = 0.0..=100.0;
/// Accepted fast-drain threshold (litres/minute).
pub const DRAIN_RANGE_LPM: core::ops::RangeInclusive<f64> = 0.0..=1000.0;
/// Accepted blink period (ms).  Non-positive values fall back to the
/// default instead of being rejected.
pub const BLINK_RANGE_MS: core::ops::RangeInclusive<u32> = 100..=5000;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankConfig {
    // --- Tank ---
    /// Cylinder dimensions.
    pub geometry: TankGeometry,
    /// Power-on empty-tank reference distance (cm).
    pub default_empty_cm: f64,
    /// Power-on full-tank reference distance (cm).
    pub default_full_cm: f64,

    // --- Classification ---
    /// Low/high fill and fast-drain thresholds.
    pub thresholds: Thresholds,

    // --- LED ---
    /// Alert indicator blink period (ms).
    pub blink_period_ms: u32,
    /// Alert indicator control mode.
    pub alert_led_mode: AlertLedMode,
    /// LED sleep window (all five channels forced off while active).
    pub led_night: NightWindow,

    // --- Buzzer ---
    /// Melody played when an alert fires.
    pub melody: MelodyId,
    /// User mute toggle.
    pub buzzer_muted: bool,
    /// Buzzer sleep window (suppresses alert triggering while active).
    pub buzzer_night: NightWindow,

    // --- Timing ---
    /// Blink / melody animation tick (milliseconds).
    pub blink_tick_ms: u32,
    /// Alert-buzzer trigger check interval (milliseconds).
    pub buzzer_check_ms: u32,
    /// Derived-metric recompute interval (milliseconds).
    pub metric_interval_ms: u32,
    /// Display page rotation interval (milliseconds).
    pub display_rotate_ms: u32,
    /// Night-window enforcement interval (milliseconds).
    pub night_check_ms: u32,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            // Tank: 100 cm diameter, 200 cm long, mounted so the sensor
            // reads 120 cm at empty and 20 cm at full.
            geometry: TankGeometry {
                radius_cm: 50.0,
                length_cm: 200.0,
            },
            default_empty_cm: 120.0,
            default_full_cm: 20.0,

            // Classification
            thresholds: Thresholds {
                low_percent: 10.0,
                high_percent: 98.0,
                drain_lpm: 50.0,
            },

            // LED
            blink_period_ms: DEFAULT_BLINK_PERIOD_MS,
            alert_led_mode: AlertLedMode::Auto,
            led_night: NightWindow {
                start_min: 1320, // 22:00
                end_min: 390,    // 06:30
                enabled: false,
            },

            // Buzzer
            melody: MelodyId::Alarm,
            buzzer_muted: false,
            buzzer_night: NightWindow {
                start_min: 1320,
                end_min: 390,
                enabled: false,
            },

            // Timing
            blink_tick_ms: 200,        // 5 Hz animation
            buzzer_check_ms: 1000,     // 1 Hz alert re-trigger
            metric_interval_ms: 2000,  // 0.5 Hz recompute
            display_rotate_ms: 10_000, // page flip every 10 s
            night_check_ms: 60_000,    // minute-resolution windows
        }
    }
}
