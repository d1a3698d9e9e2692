//! LED ladder and alert indicator.
//!
//! Five logical channels: a four-tier fill ladder plus one blinking /
//! steady alert indicator.  The controller is re-evaluated on every
//! fill update and advanced on the blink polling tick; the caller
//! applies the returned [`LedOutput`] to the hardware port.
//!
//! ## Blink timing
//!
//! An elapsed-time accumulator, not a modulo of the poll tick: each tick
//! adds `delta_ms`, and on reaching the configured period the indicator
//! toggles and the accumulator resets to zero.  With the 500 ms default
//! and 200 ms ticks the first toggle lands on the third tick (600 ms),
//! and a retuned period takes exact effect from the next cycle.

use log::warn;
use serde::{Deserialize, Serialize};

/// Default alert-blink period.
pub const DEFAULT_BLINK_PERIOD_MS: u32 = 500;

/// Ladder tier thresholds (percent of capacity) for tiers 2–4.
/// Tier 1 is the "base" tier and lights whenever not suppressed.
const TIER_THRESHOLDS: [f64; 3] = [25.0, 50.0, 75.0];

/// Alert indicator control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLedMode {
    /// Blink while any alert is active, steady on otherwise, forced off
    /// while suppressed.
    Auto,
    /// External toggle only — automatic control (and suppression) bypassed.
    Manual,
}

/// One frame of LED state, ready to push to the hardware port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedOutput {
    /// Ladder tiers 1–4 (index 0 = base tier).
    pub tiers: [bool; 4],
    /// Alert indicator channel.
    pub alert: bool,
}

/// Ladder + alert indicator state machine.
pub struct LedController {
    mode: AlertLedMode,
    blink_period_ms: u32,
    /// Elapsed time since the last blink toggle.
    acc_ms: u32,
    blink_on: bool,
    /// Manual-mode output latch.
    manual_on: bool,
}

impl LedController {
    pub fn new(blink_period_ms: u32) -> Self {
        let mut led = Self {
            mode: AlertLedMode::Auto,
            blink_period_ms: DEFAULT_BLINK_PERIOD_MS,
            acc_ms: 0,
            blink_on: true,
            manual_on: false,
        };
        led.set_blink_period_ms(blink_period_ms);
        led
    }

    /// Set the blink period.  A non-positive value falls back to the
    /// default rather than producing a degenerate always-toggling blink.
    pub fn set_blink_period_ms(&mut self, period_ms: u32) {
        if period_ms == 0 {
            warn!("LED: non-positive blink period — falling back to {DEFAULT_BLINK_PERIOD_MS} ms");
            self.blink_period_ms = DEFAULT_BLINK_PERIOD_MS;
        } else {
            self.blink_period_ms = period_ms;
        }
    }

    pub fn blink_period_ms(&self) -> u32 {
        self.blink_period_ms
    }

    pub fn set_mode(&mut self, mode: AlertLedMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> AlertLedMode {
        self.mode
    }

    /// Manual-mode toggle (no effect on the output until the mode is
    /// [`AlertLedMode::Manual`]).
    pub fn toggle_manual(&mut self) {
        self.manual_on = !self.manual_on;
    }

    /// Advance one polling tick and compute the frame to display.
    ///
    /// * `fill_percent` — `None` means "no data": only the base tier lights.
    /// * `alert_active` — any alert flag set.
    /// * `suppressed` — LED night window currently active.
    pub fn tick(
        &mut self,
        delta_ms: u32,
        fill_percent: Option<f64>,
        alert_active: bool,
        suppressed: bool,
    ) -> LedOutput {
        LedOutput {
            tiers: Self::ladder(fill_percent, suppressed),
            alert: self.alert_channel(delta_ms, alert_active, suppressed),
        }
    }

    fn ladder(fill_percent: Option<f64>, suppressed: bool) -> [bool; 4] {
        if suppressed {
            return [false; 4];
        }
        let mut tiers = [true, false, false, false];
        if let Some(fill) = fill_percent {
            for (tier, threshold) in tiers[1..].iter_mut().zip(TIER_THRESHOLDS) {
                *tier = fill >= threshold;
            }
        }
        tiers
    }

    fn alert_channel(&mut self, delta_ms: u32, alert_active: bool, suppressed: bool) -> bool {
        if self.mode == AlertLedMode::Manual {
            return self.manual_on;
        }
        if suppressed {
            return false;
        }
        if !alert_active {
            // Steady on; park the blink phase so a fresh alert starts
            // from "on" and runs one full period before toggling.
            self.acc_ms = 0;
            self.blink_on = true;
            return true;
        }
        self.acc_ms = self.acc_ms.saturating_add(delta_ms);
        if self.acc_ms >= self.blink_period_ms {
            self.blink_on = !self.blink_on;
            self.acc_ms = 0;
        }
        self.blink_on
    }
}
