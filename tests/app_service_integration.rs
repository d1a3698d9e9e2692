//! Integration tests: MonitorService → classifier → actuators.

use tankmon::app::commands::AppCommand;
use tankmon::app::events::AppEvent;
use tankmon::app::ports::{ActuatorPort, ClockPort, EventSink, SensorPort};
use tankmon::app::service::MonitorService;
use tankmon::classify::TankState;
use tankmon::config::TankConfig;
use tankmon::error::{Error, SensorError};

// ── Mock implementations ──────────────────────────────────────

struct MockHw {
    distance_cm: Option<f64>,
    time: (u8, u8),
    tiers: [bool; 4],
    alert_led: bool,
    tone: Option<u16>,
}

impl MockHw {
    fn new() -> Self {
        Self {
            distance_cm: None,
            time: (12, 0),
            tiers: [false; 4],
            alert_led: false,
            tone: None,
        }
    }
}

impl SensorPort for MockHw {
    fn read_distance_cm(&mut self) -> Option<f64> {
        self.distance_cm
    }
}

impl ClockPort for MockHw {
    fn time_of_day(&self) -> (u8, u8) {
        self.time
    }
}

impl ActuatorPort for MockHw {
    fn set_tier_led(&mut self, tier: usize, on: bool) {
        self.tiers[tier] = on;
    }
    fn set_alert_led(&mut self, on: bool) {
        self.alert_led = on;
    }
    fn set_tone(&mut self, freq_hz: Option<u16>) {
        self.tone = freq_hz;
    }
    fn all_off(&mut self) {
        self.tiers = [false; 4];
        self.alert_led = false;
        self.tone = None;
    }
}

struct RecordingSink {
    events: Vec<AppEvent>,
}

impl RecordingSink {
    fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, e: &AppEvent) {
        self.events.push(e.clone());
    }
}

fn make_app() -> (MonitorService, MockHw, RecordingSink) {
    let mut app = MonitorService::new(TankConfig::default());
    let hw = MockHw::new();
    let mut sink = RecordingSink::new();
    app.start(&mut sink);
    (app, hw, sink)
}

/// Run enough 200 ms ticks to cover one metric interval.
fn run_metric_interval(app: &mut MonitorService, hw: &mut MockHw, sink: &mut RecordingSink) {
    for _ in 0..10 {
        app.tick(200, hw, sink);
    }
}

// ── Derived metrics and the LED ladder ────────────────────────

#[test]
fn ladder_tracks_fill_percent() {
    let (mut app, mut hw, mut sink) = make_app();
    // Default tank: empty = 120 cm, so distance 60 → height 60 cm,
    // ≈ 62.7 % of capacity: tiers 1–3 on, tier 4 off.
    hw.distance_cm = Some(60.0);
    app.tick(200, &mut hw, &mut sink);

    let fill = app.fill().expect("first tick derives a fill state");
    let pct = fill.fill_percent.expect("capacity is defined");
    assert!(pct > 50.0 && pct < 75.0, "unexpected fill {pct}");
    assert_eq!(hw.tiers, [true, true, true, false]);
    assert_eq!(app.state(), TankState::Ok);
    assert!(hw.alert_led, "alert LED holds steady on when no alert");
}

#[test]
fn no_sample_lights_base_tier_only() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.distance_cm = None;
    app.tick(200, &mut hw, &mut sink);
    assert!(app.fill().is_none());
    assert_eq!(hw.tiers, [true, false, false, false]);
}

#[test]
fn garbage_sample_retains_last_derived_state() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.distance_cm = Some(60.0);
    app.tick(200, &mut hw, &mut sink);
    let before = app.fill().unwrap().volume_l;

    hw.distance_cm = Some(f64::NAN);
    run_metric_interval(&mut app, &mut hw, &mut sink);
    let after = app.fill().unwrap().volume_l;
    assert!((before - after).abs() < f64::EPSILON, "NaN must not propagate");
}

// ── Alerts, state, and the blink animation ────────────────────

#[test]
fn low_fill_raises_alert_and_blinks() {
    let (mut app, mut hw, mut sink) = make_app();
    // Height 2 cm → well under the 10 % low threshold.
    hw.distance_cm = Some(118.0);

    // Tick 1: alert raised, blink accumulator at 200 ms — indicator on.
    app.tick(200, &mut hw, &mut sink);
    assert_eq!(app.state(), TankState::Low);
    assert!(app.alerts().low);
    assert!(hw.alert_led);

    // Tick 2: 400 ms — still on.  Tick 3: 600 ms ≥ 500 ms — toggles off.
    app.tick(200, &mut hw, &mut sink);
    assert!(hw.alert_led);
    app.tick(200, &mut hw, &mut sink);
    assert!(!hw.alert_led);

    assert!(
        sink.events
            .iter()
            .any(|e| matches!(e, AppEvent::StateChanged { to: TankState::Low, .. })),
        "state change must be emitted"
    );
}

#[test]
fn fast_drain_is_detected_across_metric_ticks() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.distance_cm = Some(60.0);
    app.tick(200, &mut hw, &mut sink);

    // Drop 2 cm of height (~39 L) in one 2 s interval → far beyond
    // the 50 L/min threshold.
    hw.distance_cm = Some(62.0);
    run_metric_interval(&mut app, &mut hw, &mut sink);

    assert!(app.drain_lpm() > 50.0, "drain {}", app.drain_lpm());
    assert!(app.alerts().fast_drain);
    assert_eq!(app.state(), TankState::Draining);
}

// ── Buzzer behaviour ──────────────────────────────────────────

#[test]
fn alert_starts_melody_and_playback_is_non_blocking() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.distance_cm = Some(118.0); // low alert
    app.tick(200, &mut hw, &mut sink);

    // Buzzer check fires on the first tick and the first tone sounds.
    assert_eq!(hw.tone, Some(880));

    // Metrics and LEDs keep updating while the melody plays.
    hw.distance_cm = Some(60.0);
    run_metric_interval(&mut app, &mut hw, &mut sink);
    assert_eq!(app.state(), TankState::Ok);
    assert_eq!(hw.tiers, [true, true, true, false]);
}

#[test]
fn muted_buzzer_never_sounds() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::SetBuzzerMuted(true), &mut sink)
        .unwrap();
    hw.distance_cm = Some(118.0);
    for _ in 0..20 {
        app.tick(200, &mut hw, &mut sink);
        assert_eq!(hw.tone, None);
    }
}

#[test]
fn buzzer_night_window_suppresses_triggering() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(
        AppCommand::SetBuzzerNight {
            start_min: 1320,
            end_min: 390,
        },
        &mut sink,
    )
    .unwrap();
    app.handle_command(AppCommand::SetBuzzerNightEnabled(true), &mut sink)
        .unwrap();

    hw.time = (23, 0); // inside the window
    hw.distance_cm = Some(118.0);
    for _ in 0..20 {
        app.tick(200, &mut hw, &mut sink);
        assert_eq!(hw.tone, None);
    }
}

// ── Night window and the LED channels ─────────────────────────

#[test]
fn led_night_window_forces_all_channels_off() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(
        AppCommand::SetLedNight {
            start_min: 1320,
            end_min: 390,
        },
        &mut sink,
    )
    .unwrap();
    app.handle_command(AppCommand::SetLedNightEnabled(true), &mut sink)
        .unwrap();

    hw.time = (22, 30);
    hw.distance_cm = Some(60.0);
    app.tick(200, &mut hw, &mut sink);
    assert!(app.is_led_suppressed());
    assert_eq!(hw.tiers, [false; 4]);
    assert!(!hw.alert_led);

    // Morning: suppression lifts on the next window check.
    hw.time = (8, 0);
    for _ in 0..301 {
        app.tick(200, &mut hw, &mut sink);
    }
    assert!(!app.is_led_suppressed());
    assert_eq!(hw.tiers, [true, true, true, false]);
}

// ── Calibration ───────────────────────────────────────────────

#[test]
fn calibration_marks_capture_current_sample() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.distance_cm = Some(119.0);
    app.tick(200, &mut hw, &mut sink);
    app.handle_command(AppCommand::MarkEmpty, &mut sink).unwrap();

    hw.distance_cm = Some(21.0);
    run_metric_interval(&mut app, &mut hw, &mut sink);
    app.handle_command(AppCommand::MarkFull, &mut sink).unwrap();

    assert!((app.calibration().empty_cm() - 119.0).abs() < f64::EPSILON);
    assert!((app.calibration().full_cm() - 21.0).abs() < f64::EPSILON);
    assert_eq!(
        sink.events
            .iter()
            .filter(|e| matches!(e, AppEvent::CalibrationUpdated { .. }))
            .count(),
        2
    );
    // Sensor currently at the full mark → 100 %.
    let pct = app.fill().unwrap().fill_percent.unwrap();
    assert!((pct - 100.0).abs() < 1e-9);
}

#[test]
fn mark_without_sample_is_a_typed_error() {
    let (mut app, _hw, mut sink) = make_app();
    assert_eq!(
        app.handle_command(AppCommand::MarkFull, &mut sink),
        Err(Error::Sensor(SensorError::NoSample))
    );
}

#[test]
fn inverted_calibration_degrades_without_panicking() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.distance_cm = Some(30.0);
    app.tick(200, &mut hw, &mut sink);
    app.handle_command(AppCommand::MarkEmpty, &mut sink).unwrap();

    hw.distance_cm = Some(110.0);
    run_metric_interval(&mut app, &mut hw, &mut sink);
    app.handle_command(AppCommand::MarkFull, &mut sink).unwrap();

    assert!(app.calibration().is_degenerate());
    let t = app.build_telemetry();
    assert_eq!(t.capacity_l, 0.0);
    assert!(t.fill_percent.is_none(), "degenerate tank reports no data");

    // The core keeps running.
    run_metric_interval(&mut app, &mut hw, &mut sink);
}

// ── Display rotation and telemetry ────────────────────────────

#[test]
fn display_rotates_and_emits_telemetry() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.distance_cm = Some(60.0);
    // 10 s of 200 ms ticks → one rotation.
    for _ in 0..50 {
        app.tick(200, &mut hw, &mut sink);
    }
    assert_eq!(app.display_page(), 1);
    let telemetry = sink
        .events
        .iter()
        .rev()
        .find_map(|e| match e {
            AppEvent::Telemetry(t) => Some(t.clone()),
            _ => None,
        })
        .expect("telemetry emitted on rotation");
    assert_eq!(telemetry.summary.as_str(), "OK");
    assert!(telemetry.fill_percent.is_some());
    assert_eq!(telemetry.tiers, [true, true, true, false]);

    // Snapshots serialize for remote consumers.
    let json = serde_json::to_string(&telemetry).unwrap();
    assert!(json.contains("\"summary\":\"OK\""));
}

// ── Event queue → domain dispatch ─────────────────────────────

#[test]
fn queue_events_drive_calibration_and_ticks() {
    use tankmon::events::{self, Event};

    let (mut app, mut hw, mut sink) = make_app();
    hw.distance_cm = Some(119.5);

    assert!(events::push_event(Event::ControlTick));
    assert!(events::push_event(Event::ButtonShortPress));
    events::drain_events(|e| app.handle_event(e, &mut hw, &mut sink));

    assert!(events::queue_is_empty());
    assert!(app.tick_count() > 0);
    assert!((app.calibration().empty_cm() - 119.5).abs() < f64::EPSILON);
}
