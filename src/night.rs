//! Night-window suppression.
//!
//! A recurring daily minute-of-day interval, possibly wrapping past
//! midnight, behind its own enable switch.  Two independent instances
//! exist at runtime: one sleeps the LEDs, one mutes the buzzer.

use serde::{Deserialize, Serialize};

/// Minutes per day; window bounds live in `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: u16 = 1440;

/// Time-of-day suppression window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightWindow {
    /// Window start, minutes after midnight (0–1439).
    pub start_min: u16,
    /// Window end, minutes after midnight (0–1439), exclusive.
    pub end_min: u16,
    /// When false the window test is never evaluated.
    pub enabled: bool,
}

impl NightWindow {
    /// Check whether `now_min` falls inside the window.
    ///
    /// `start < end` is a same-day interval `[start, end)`; `start ≥ end`
    /// wraps past midnight (e.g. 22:00–06:30).
    pub fn is_active(&self, now_min: u16) -> bool {
        if !self.enabled {
            return false;
        }
        if self.start_min < self.end_min {
            now_min >= self.start_min && now_min < self.end_min
        } else {
            now_min >= self.start_min || now_min < self.end_min
        }
    }
}

/// Fold wall-clock hour/minute into a minute-of-day.
pub fn minute_of_day(hour: u8, minute: u8) -> u16 {
    (u16::from(hour) * 60 + u16::from(minute)) % MINUTES_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overnight() -> NightWindow {
        // 22:00 → 06:30
        NightWindow {
            start_min: 1320,
            end_min: 390,
            enabled: true,
        }
    }

    #[test]
    fn wraps_past_midnight() {
        let w = overnight();
        assert!(w.is_active(1350)); // 22:30
        assert!(!w.is_active(500)); // 08:20
        assert!(w.is_active(100)); // 01:40
    }

    #[test]
    fn same_day_interval() {
        let w = NightWindow {
            start_min: 540,
            end_min: 1020,
            enabled: true,
        };
        assert!(w.is_active(540));
        assert!(w.is_active(1019));
        assert!(!w.is_active(1020));
        assert!(!w.is_active(100));
    }

    #[test]
    fn disabled_window_is_never_active() {
        let mut w = overnight();
        w.enabled = false;
        assert!(!w.is_active(1350));
    }

    #[test]
    fn minute_of_day_folds_wall_clock() {
        assert_eq!(minute_of_day(0, 0), 0);
        assert_eq!(minute_of_day(22, 30), 1350);
        assert_eq!(minute_of_day(23, 59), 1439);
    }
}
