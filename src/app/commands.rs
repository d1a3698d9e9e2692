//! Inbound commands to the application service.
//!
//! These represent discrete events requested by the outside world
//! (buttons, serial console, remote UI) that the
//! [`MonitorService`](super::service::MonitorService) interprets and acts
//! upon.  Set-value commands are validated against the ranges documented
//! in [`config`](crate::config); out-of-range values are rejected with a
//! typed error and leave the running configuration untouched.

use crate::actuators::buzzer::MelodyId;
use crate::actuators::led::AlertLedMode;
use crate::config::TankConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    // ── Calibration ───────────────────────────────────────
    /// Capture the current raw distance as the empty-tank reference.
    MarkEmpty,
    /// Capture the current raw distance as the full-tank reference.
    MarkFull,

    // ── Geometry ──────────────────────────────────────────
    /// Set the tank radius (cm, within `RADIUS_RANGE_CM`).
    SetRadiusCm(f64),
    /// Set the tank length (cm, within `LENGTH_RANGE_CM`).
    SetLengthCm(f64),

    // ── Thresholds ────────────────────────────────────────
    /// Set the low-fill threshold (percent).
    SetLowPercent(f64),
    /// Set the high-fill threshold (percent).
    SetHighPercent(f64),
    /// Set the fast-drain threshold (litres/minute).
    SetDrainLpm(f64),

    // ── LED ───────────────────────────────────────────────
    /// Set the alert blink period (ms).  Zero falls back to the default.
    SetBlinkPeriodMs(u32),
    /// Switch the alert indicator between auto and manual control.
    SetAlertLedMode(AlertLedMode),
    /// Manual-mode toggle of the alert indicator.
    ToggleAlertLed,
    /// Set the LED sleep window bounds (minutes of day).
    SetLedNight { start_min: u16, end_min: u16 },
    /// Enable or disable the LED sleep window.
    SetLedNightEnabled(bool),

    // ── Buzzer ────────────────────────────────────────────
    /// Select the alert melody.
    SetMelody(MelodyId),
    /// Mute or unmute the buzzer (independent of the sleep window).
    SetBuzzerMuted(bool),
    /// Set the buzzer sleep window bounds (minutes of day).
    SetBuzzerNight { start_min: u16, end_min: u16 },
    /// Enable or disable the buzzer sleep window.
    SetBuzzerNightEnabled(bool),

    // ── Display ───────────────────────────────────────────
    /// Advance the display rotation to the next page.
    AdvanceDisplayPage,

    // ── Configuration ─────────────────────────────────────
    /// Hot-reload the whole configuration (e.g. from a remote UI).
    UpdateConfig(TankConfig),
}
