//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (the distance sensor, the wall clock, LED/buzzer
//! drivers, event sinks) implement these traits.  The
//! [`MonitorService`](super::service::MonitorService) consumes them via
//! generics, so the domain core never touches hardware directly.

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain the latest raw
/// distance sample.
///
/// The value is expected to be unit-converted (cm) and already
/// median-filtered upstream.  `None` means no fresh sample is available;
/// the domain retains its last valid derived state in that case.
pub trait SensorPort {
    fn read_distance_cm(&mut self) -> Option<f64>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: wall clock → domain)
// ───────────────────────────────────────────────────────────────

/// Wall-clock time-of-day, used only for the night windows.
pub trait ClockPort {
    /// Current local time as (hour 0–23, minute 0–59).
    fn time_of_day(&self) -> (u8, u8);
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Set one ladder tier (0 = base tier, 1–3 = fill tiers).
    fn set_tier_led(&mut self, tier: usize, on: bool);

    /// Set the blinking/steady alert indicator.
    fn set_alert_led(&mut self, on: bool);

    /// Drive the buzzer at `freq_hz`, or silence it with `None`.
    fn set_tone(&mut self, freq_hz: Option<u16>);

    /// Kill all channels — safe shutdown.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go (serial log, display driver, remote UI).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
