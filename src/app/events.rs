//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them — log to serial, refresh a
//! display page, push to a remote UI.

use serde::Serialize;

use crate::classify::{AlertSet, Summary, TankState};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic telemetry snapshot (display rotation cadence).
    Telemetry(TelemetrySnapshot),

    /// The classified tank state changed.
    StateChanged { from: TankState, to: TankState },

    /// One or more alert flags changed.
    AlertsChanged(AlertSet),

    /// A calibration reference was captured.
    CalibrationUpdated { empty_cm: f64, full_cm: f64 },

    /// The display rotation advanced.
    DisplayPageChanged(u8),

    /// The application service has started.
    Started,
}

/// A point-in-time snapshot of every named signal the core produces,
/// suitable for logging or transmission.  `None` fields mean
/// "insufficient data", never zero.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetrySnapshot {
    /// Last valid raw distance (cm).
    pub distance_cm: Option<f64>,
    /// Derived liquid height (cm).
    pub height_cm: Option<f64>,
    /// Derived volume (litres).
    pub volume_l: Option<f64>,
    /// Tank capacity (litres); zero for a degenerate tank.
    pub capacity_l: f64,
    /// Fill percent of capacity.
    pub fill_percent: Option<f64>,
    /// Drain rate (litres/minute, positive while draining).
    pub drain_lpm: f64,
    /// Classified condition.
    pub state: TankState,
    /// Independent alert flags.
    pub alerts: AlertSet,
    /// Human-readable alert summary ("OK" / "LOW & DRAIN ALERT" / …).
    pub summary: Summary,
    /// Ladder tier outputs currently commanded.
    pub tiers: [bool; 4],
    /// Alert indicator output currently commanded.
    pub alert_led: bool,
    /// Whether a melody is in flight.
    pub buzzer_playing: bool,
    /// Current display rotation page.
    pub display_page: u8,
}
