//! Application service — the hexagonal core.
//!
//! [`MonitorService`] owns the geometry model, calibration references,
//! classifier, alert monitor, and both actuator state machines.  It
//! exposes a clean, hardware-agnostic API.  All I/O flows through port
//! traits injected at call sites, making the entire service testable
//! with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!  ClockPort  ──▶ │       MonitorService       │
//! ActuatorPort ◀──│ Geometry · Classify · LEDs │
//!                 └────────────────────────────┘
//! ```
//!
//! ## Cadences
//!
//! One cooperative [`tick`](MonitorService::tick) drives five
//! independently-clocked actions through per-cadence accumulators
//! (defaults in parentheses): blink animation (200 ms), buzzer alert
//! check (1 s), derived-metric recompute (2 s), display rotation (10 s),
//! night-window enforcement (60 s).  Melody playback is sequenced
//! non-blocking on every tick, so a playing melody can never starve the
//! other actions.
//!
//! ## Concurrency
//!
//! The service is single-writer by construction: every mutation happens
//! inside `tick`/`handle_command` on the caller's thread.  A threaded
//! embedding must wrap the service in its own lock (or funnel sensor and
//! command traffic through the event queue) to keep that atomicity.

use log::{debug, info, warn};

use crate::actuators::buzzer::BuzzerController;
use crate::actuators::led::{LedController, LedOutput};
use crate::calibration::CalibrationStore;
use crate::classify::{self, AlertMonitor, AlertSet, TankState};
use crate::config::{
    BLINK_RANGE_MS, DRAIN_RANGE_LPM, LENGTH_RANGE_CM, PERCENT_RANGE, RADIUS_RANGE_CM, TankConfig,
};
use crate::error::{Error, Result, SensorError};
use crate::events::Event;
use crate::geometry::{FillState, GeometryModel};
use crate::night::{self, MINUTES_PER_DAY};

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetrySnapshot};
use super::ports::{ActuatorPort, ClockPort, EventSink, SensorPort};

/// Display rotation page count (distance, volume, fill, status).
const DISPLAY_PAGES: u8 = 4;

/// The application service orchestrates all domain logic.
pub struct MonitorService {
    config: TankConfig,
    calibration: CalibrationStore,
    model: GeometryModel,
    alert_monitor: AlertMonitor,
    led: LedController,
    buzzer: BuzzerController,

    state: TankState,
    /// Last valid derived snapshot; `None` until the first usable sample.
    fill: Option<FillState>,
    /// Last valid raw distance — also the value captured by calibration marks.
    last_distance_cm: Option<f64>,
    /// Volume change across the last two metric ticks (L/min, positive = draining).
    drain_lpm: f64,

    led_suppressed: bool,
    buzzer_window_active: bool,
    display_page: u8,
    /// Frame most recently pushed to the LED channels.
    last_led: LedOutput,

    // Cadence accumulators (ms since each cadence last fired).
    // Preloaded to their periods so the first tick evaluates everything once.
    blink_acc_ms: u32,
    buzzer_acc_ms: u32,
    metric_acc_ms: u32,
    display_acc_ms: u32,
    night_acc_ms: u32,

    tick_count: u64,
}

impl MonitorService {
    /// Construct the service from configuration.
    ///
    /// Does **not** emit anything — call [`start`](Self::start) next.
    pub fn new(config: TankConfig) -> Self {
        let calibration = CalibrationStore::new(config.default_empty_cm, config.default_full_cm);
        let model = GeometryModel::new(
            config.geometry,
            calibration.empty_cm(),
            calibration.full_cm(),
        );
        let mut led = LedController::new(config.blink_period_ms);
        led.set_mode(config.alert_led_mode);
        let mut buzzer = BuzzerController::new(config.melody);
        buzzer.set_muted(config.buzzer_muted);

        Self {
            blink_acc_ms: 0,
            buzzer_acc_ms: config.buzzer_check_ms,
            metric_acc_ms: config.metric_interval_ms,
            display_acc_ms: 0,
            night_acc_ms: config.night_check_ms,
            config,
            calibration,
            model,
            alert_monitor: AlertMonitor::new(),
            led,
            buzzer,
            state: TankState::Ok,
            fill: None,
            last_distance_cm: None,
            drain_lpm: 0.0,
            led_suppressed: false,
            buzzer_window_active: false,
            display_page: 0,
            last_led: LedOutput::default(),
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
        info!(
            "MonitorService started: capacity {:.1} L, max height {:.1} cm",
            self.model.capacity_l(),
            self.model.max_height_cm()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Advance all cadences by `delta_ms` and apply actuator outputs.
    ///
    /// The `hw` parameter satisfies the sensor, clock, and actuator
    /// ports at once — this avoids a triple mutable borrow while keeping
    /// the port boundary explicit.
    pub fn tick(
        &mut self,
        delta_ms: u32,
        hw: &mut (impl SensorPort + ClockPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Night-window enforcement first, so a suppression change
        //    applies to this tick's outputs.
        self.night_acc_ms = self.night_acc_ms.saturating_add(delta_ms);
        if self.night_acc_ms >= self.config.night_check_ms {
            self.night_acc_ms = 0;
            self.refresh_night(hw);
        }

        // 2. Derived metrics.
        self.metric_acc_ms = self.metric_acc_ms.saturating_add(delta_ms);
        if self.metric_acc_ms >= self.config.metric_interval_ms {
            self.metric_acc_ms = 0;
            self.recompute_metrics(hw, sink);
        }

        // 3. Melody sequencing: advance any in-flight playback by the
        //    elapsed time before considering a fresh trigger.
        let _ = self.buzzer.tick(delta_ms);

        // 4. Buzzer alert check.  Only starts a melody when idle; the
        //    restart-from-the-top semantic belongs to explicit triggers.
        self.buzzer_acc_ms = self.buzzer_acc_ms.saturating_add(delta_ms);
        if self.buzzer_acc_ms >= self.config.buzzer_check_ms {
            self.buzzer_acc_ms = 0;
            if self.alert_monitor.any() && !self.buzzer_window_active && !self.buzzer.is_playing()
            {
                self.buzzer.trigger();
            }
        }
        hw.set_tone(self.buzzer.current_tone());

        // 5. Blink animation / ladder refresh.
        self.blink_acc_ms = self.blink_acc_ms.saturating_add(delta_ms);
        if self.blink_acc_ms >= self.config.blink_tick_ms {
            let elapsed = self.blink_acc_ms;
            self.blink_acc_ms = 0;
            self.apply_leds(elapsed, hw);
        }

        // 6. Display rotation (read-only consumer of derived values).
        self.display_acc_ms = self.display_acc_ms.saturating_add(delta_ms);
        if self.display_acc_ms >= self.config.display_rotate_ms {
            self.display_acc_ms = 0;
            self.advance_display(sink);
        }
    }

    /// Map a queue event onto a domain operation.
    pub fn handle_event(
        &mut self,
        event: Event,
        hw: &mut (impl SensorPort + ClockPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        match event {
            Event::ControlTick => self.tick(self.config.blink_tick_ms, hw, sink),
            Event::ButtonShortPress => {
                if let Err(e) = self.handle_command(AppCommand::MarkEmpty, sink) {
                    warn!("Button: mark empty rejected: {e}");
                }
            }
            Event::ButtonLongPress => {
                if let Err(e) = self.handle_command(AppCommand::MarkFull, sink) {
                    warn!("Button: mark full rejected: {e}");
                }
            }
            Event::ButtonDoublePress => {
                let _ = self.handle_command(AppCommand::ToggleAlertLed, sink);
            }
            Event::CommandReceived => {
                // Payloads travel on the embedding's own channel.
                debug!("Command notification received");
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (button, serial console, remote UI).
    ///
    /// Rejected set-value commands leave the running configuration
    /// untouched and return a typed error.
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) -> Result<()> {
        match cmd {
            AppCommand::MarkEmpty => {
                let raw = self.usable_sample()?;
                self.calibration.mark_empty(raw);
                self.after_calibration(sink);
            }
            AppCommand::MarkFull => {
                let raw = self.usable_sample()?;
                self.calibration.mark_full(raw);
                self.after_calibration(sink);
            }

            AppCommand::SetRadiusCm(v) => {
                check_range(v, &RADIUS_RANGE_CM, "radius out of range")?;
                self.config.geometry.radius_cm = v;
                info!("Config: radius = {v:.1} cm");
                self.rebuild_model(sink);
            }
            AppCommand::SetLengthCm(v) => {
                check_range(v, &LENGTH_RANGE_CM, "length out of range")?;
                self.config.geometry.length_cm = v;
                info!("Config: length = {v:.1} cm");
                self.rebuild_model(sink);
            }

            AppCommand::SetLowPercent(v) => {
                check_range(v, &PERCENT_RANGE, "low threshold out of range")?;
                self.config.thresholds.low_percent = v;
                info!("Config: low threshold = {v:.1} %");
                self.reclassify(sink);
            }
            AppCommand::SetHighPercent(v) => {
                check_range(v, &PERCENT_RANGE, "high threshold out of range")?;
                self.config.thresholds.high_percent = v;
                info!("Config: high threshold = {v:.1} %");
                self.reclassify(sink);
            }
            AppCommand::SetDrainLpm(v) => {
                check_range(v, &DRAIN_RANGE_LPM, "drain threshold out of range")?;
                self.config.thresholds.drain_lpm = v;
                info!("Config: drain threshold = {v:.1} L/min");
                self.reclassify(sink);
            }

            AppCommand::SetBlinkPeriodMs(ms) => {
                if ms != 0 && !BLINK_RANGE_MS.contains(&ms) {
                    return Err(Error::Config("blink period out of range"));
                }
                // Zero falls back to the default inside the controller.
                self.led.set_blink_period_ms(ms);
                self.config.blink_period_ms = self.led.blink_period_ms();
                info!("Config: blink period = {} ms", self.config.blink_period_ms);
            }
            AppCommand::SetAlertLedMode(mode) => {
                self.led.set_mode(mode);
                self.config.alert_led_mode = mode;
                info!("Config: alert LED mode = {mode:?}");
            }
            AppCommand::ToggleAlertLed => {
                self.led.toggle_manual();
            }
            AppCommand::SetLedNight { start_min, end_min } => {
                check_minutes(start_min, end_min)?;
                self.config.led_night.start_min = start_min;
                self.config.led_night.end_min = end_min;
                info!("Config: LED night window {start_min}–{end_min} min");
                self.rearm_night_check();
            }
            AppCommand::SetLedNightEnabled(enabled) => {
                self.config.led_night.enabled = enabled;
                info!("Config: LED night window enabled = {enabled}");
                if enabled {
                    self.rearm_night_check();
                } else {
                    self.led_suppressed = false;
                }
            }

            AppCommand::SetMelody(melody) => {
                self.buzzer.select_melody(melody);
                self.config.melody = melody;
                info!("Config: melody = {melody:?}");
            }
            AppCommand::SetBuzzerMuted(muted) => {
                self.buzzer.set_muted(muted);
                self.config.buzzer_muted = muted;
                info!("Config: buzzer muted = {muted}");
            }
            AppCommand::SetBuzzerNight { start_min, end_min } => {
                check_minutes(start_min, end_min)?;
                self.config.buzzer_night.start_min = start_min;
                self.config.buzzer_night.end_min = end_min;
                info!("Config: buzzer night window {start_min}–{end_min} min");
                self.rearm_night_check();
            }
            AppCommand::SetBuzzerNightEnabled(enabled) => {
                self.config.buzzer_night.enabled = enabled;
                info!("Config: buzzer night window enabled = {enabled}");
                if enabled {
                    self.rearm_night_check();
                } else {
                    self.buzzer_window_active = false;
                }
            }

            AppCommand::AdvanceDisplayPage => {
                self.advance_display(sink);
            }

            AppCommand::UpdateConfig(config) => {
                self.apply_config(config, sink);
                info!("Configuration updated at runtime");
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a snapshot of every named signal the core produces.
    pub fn build_telemetry(&self) -> TelemetrySnapshot {
        let alerts = self.alert_monitor.current();
        TelemetrySnapshot {
            distance_cm: self.last_distance_cm,
            height_cm: self.fill.map(|f| f.height_cm),
            volume_l: self.fill.map(|f| f.volume_l),
            capacity_l: self.model.capacity_l(),
            fill_percent: self.fill.and_then(|f| f.fill_percent),
            drain_lpm: self.drain_lpm,
            state: self.state,
            alerts,
            summary: classify::summary(alerts),
            tiers: self.last_led.tiers,
            alert_led: self.last_led.alert,
            buzzer_playing: self.buzzer.is_playing(),
            display_page: self.display_page,
        }
    }

    pub fn state(&self) -> TankState {
        self.state
    }

    pub fn alerts(&self) -> AlertSet {
        self.alert_monitor.current()
    }

    pub fn fill(&self) -> Option<FillState> {
        self.fill
    }

    pub fn drain_lpm(&self) -> f64 {
        self.drain_lpm
    }

    pub fn display_page(&self) -> u8 {
        self.display_page
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Clone of the live configuration (for read-back or delta updates).
    pub fn current_config(&self) -> TankConfig {
        self.config.clone()
    }

    pub fn calibration(&self) -> &CalibrationStore {
        &self.calibration
    }

    pub fn is_led_suppressed(&self) -> bool {
        self.led_suppressed
    }

    // ── Internal ──────────────────────────────────────────────

    fn usable_sample(&self) -> Result<f64> {
        let raw = self
            .last_distance_cm
            .ok_or(Error::Sensor(SensorError::NoSample))?;
        if raw.is_finite() {
            Ok(raw)
        } else {
            Err(Error::Sensor(SensorError::NotFinite))
        }
    }

    fn recompute_metrics(&mut self, hw: &mut impl SensorPort, sink: &mut impl EventSink) {
        match hw.read_distance_cm() {
            Some(d) if d.is_finite() && d > 0.0 => {
                self.last_distance_cm = Some(d);
                let next = self.model.fill_state(d);
                if let Some(prev) = self.fill {
                    let dt_min = f64::from(self.config.metric_interval_ms) / 60_000.0;
                    if dt_min > 0.0 {
                        self.drain_lpm = (prev.volume_l - next.volume_l) / dt_min;
                    }
                }
                self.fill = Some(next);
                self.reclassify(sink);
            }
            Some(_) => {
                warn!("Metrics: unusable distance sample — retaining last derived state");
            }
            None => {
                debug!("Metrics: no fresh sample");
            }
        }
    }

    /// Re-run classification against the current fill and thresholds.
    /// A fill with no defined percent (degenerate tank, no data yet)
    /// leaves state and alerts untouched.
    fn reclassify(&mut self, sink: &mut impl EventSink) {
        let Some(pct) = self.fill.and_then(|f| f.fill_percent) else {
            return;
        };
        let thresholds = self.config.thresholds;
        let new_state = classify::classify(pct, self.drain_lpm, &thresholds);
        let new_alerts = classify::alerts(pct, self.drain_lpm, &thresholds);

        let prev_alerts = self.alert_monitor.current();
        self.alert_monitor.update(new_alerts);
        if new_alerts != prev_alerts {
            sink.emit(&AppEvent::AlertsChanged(new_alerts));
        }
        if new_state != self.state {
            info!("Tank state {:?} → {:?}", self.state, new_state);
            sink.emit(&AppEvent::StateChanged {
                from: self.state,
                to: new_state,
            });
            self.state = new_state;
        }
    }

    fn refresh_night(&mut self, hw: &impl ClockPort) {
        let (hour, minute) = hw.time_of_day();
        let now = night::minute_of_day(hour, minute);

        let led_active = self.config.led_night.is_active(now);
        if led_active != self.led_suppressed {
            info!(
                "Night: LED suppression {}",
                if led_active { "active" } else { "lifted" }
            );
            self.led_suppressed = led_active;
        }

        let buzzer_active = self.config.buzzer_night.is_active(now);
        if buzzer_active != self.buzzer_window_active {
            info!(
                "Night: buzzer window {}",
                if buzzer_active { "active" } else { "lifted" }
            );
            self.buzzer_window_active = buzzer_active;
        }
    }

    fn apply_leds(&mut self, elapsed_ms: u32, hw: &mut impl ActuatorPort) {
        let fill_percent = self.fill.and_then(|f| f.fill_percent);
        let out = self.led.tick(
            elapsed_ms,
            fill_percent,
            self.alert_monitor.any(),
            self.led_suppressed,
        );
        for (tier, on) in out.tiers.iter().enumerate() {
            hw.set_tier_led(tier, *on);
        }
        hw.set_alert_led(out.alert);
        self.last_led = out;
    }

    fn advance_display(&mut self, sink: &mut impl EventSink) {
        self.display_page = (self.display_page + 1) % DISPLAY_PAGES;
        sink.emit(&AppEvent::DisplayPageChanged(self.display_page));
        sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
    }

    fn after_calibration(&mut self, sink: &mut impl EventSink) {
        self.model
            .set_calibration(self.calibration.empty_cm(), self.calibration.full_cm());
        sink.emit(&AppEvent::CalibrationUpdated {
            empty_cm: self.calibration.empty_cm(),
            full_cm: self.calibration.full_cm(),
        });
        self.refresh_fill(sink);
    }

    fn rebuild_model(&mut self, sink: &mut impl EventSink) {
        self.model.set_geometry(
            self.config.geometry,
            self.calibration.empty_cm(),
            self.calibration.full_cm(),
        );
        self.refresh_fill(sink);
    }

    /// Recompute the derived snapshot from the last valid distance after
    /// a geometry or calibration change.  Drain rate is left alone — it
    /// still describes the last two sensor samples.
    fn refresh_fill(&mut self, sink: &mut impl EventSink) {
        if let Some(d) = self.last_distance_cm {
            self.fill = Some(self.model.fill_state(d));
            self.reclassify(sink);
        }
    }

    /// Force the night windows to be re-evaluated on the next tick.
    fn rearm_night_check(&mut self) {
        self.night_acc_ms = self.config.night_check_ms;
    }

    fn apply_config(&mut self, config: TankConfig, sink: &mut impl EventSink) {
        self.led.set_blink_period_ms(config.blink_period_ms);
        self.led.set_mode(config.alert_led_mode);
        self.buzzer.select_melody(config.melody);
        self.buzzer.set_muted(config.buzzer_muted);
        self.config = config;
        // Calibration references are runtime state; only geometry and
        // behaviour settings are re-applied here.
        self.rebuild_model(sink);
        self.rearm_night_check();
    }
}

fn check_range(
    v: f64,
    range: &core::ops::RangeInclusive<f64>,
    msg: &'static str,
) -> Result<()> {
    if v.is_finite() && range.contains(&v) {
        Ok(())
    } else {
        Err(Error::Config(msg))
    }
}

fn check_minutes(start_min: u16, end_min: u16) -> Result<()> {
    if start_min < MINUTES_PER_DAY && end_min < MINUTES_PER_DAY {
        Ok(())
    } else {
        Err(Error::Config("window minute out of range"))
    }
}
