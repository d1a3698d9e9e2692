//! Buzzer melody playback.
//!
//! A non-blocking sequencer: the controller never sleeps or busy-waits
//! through a tone.  Each polling tick advances the current step by the
//! elapsed time and returns the frequency to drive (or silence), so a
//! playing melody can never starve fill updates, alert re-evaluation,
//! or the blink animation.
//!
//! Triggering while already playing restarts from the first step
//! (retriggerable, not queued).

use serde::{Deserialize, Serialize};

/// One melody step: drive `freq_hz` for `on_ms`, then stay silent for
/// `off_ms` before the next step.
#[derive(Debug, Clone, Copy)]
pub struct ToneStep {
    pub freq_hz: u16,
    pub on_ms: u32,
    pub off_ms: u32,
}

const fn step(freq_hz: u16, on_ms: u32, off_ms: u32) -> ToneStep {
    ToneStep {
        freq_hz,
        on_ms,
        off_ms,
    }
}

/// Urgent two-note alarm (A5/B5 alternation).
pub const MELODY_ALARM: &[ToneStep] = &[
    step(880, 200, 100),
    step(988, 200, 100),
    step(880, 200, 100),
    step(988, 200, 300),
];

/// Softer ascending chime (C5–E5–G5–C6).
pub const MELODY_CHIME: &[ToneStep] = &[
    step(523, 150, 50),
    step(659, 150, 50),
    step(784, 150, 50),
    step(1046, 300, 400),
];

/// Selectable melody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MelodyId {
    Alarm,
    Chime,
}

impl MelodyId {
    pub fn steps(self) -> &'static [ToneStep] {
        match self {
            Self::Alarm => MELODY_ALARM,
            Self::Chime => MELODY_CHIME,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Tone,
    Silence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayState {
    Idle,
    Playing {
        step: usize,
        phase: Phase,
        remaining_ms: u32,
    },
}

/// Melody playback state machine.
pub struct BuzzerController {
    melody: MelodyId,
    /// Sequence latched at trigger time, so a melody re-selection does
    /// not corrupt an in-flight playback.
    active: &'static [ToneStep],
    /// User mute toggle, independent of the LED night window.
    muted: bool,
    state: PlayState,
}

impl BuzzerController {
    pub fn new(melody: MelodyId) -> Self {
        Self {
            melody,
            active: melody.steps(),
            muted: false,
            state: PlayState::Idle,
        }
    }

    /// Select the melody used by the *next* trigger; an in-flight
    /// playback keeps its current sequence.
    pub fn select_melody(&mut self, melody: MelodyId) {
        self.melody = melody;
    }

    pub fn melody(&self) -> MelodyId {
        self.melody
    }

    /// Mute or unmute.  Muting cuts an in-flight melody immediately.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.state = PlayState::Idle;
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_playing(&self) -> bool {
        self.state != PlayState::Idle
    }

    /// Frequency for the current phase without advancing time.
    pub fn current_tone(&self) -> Option<u16> {
        match self.state {
            PlayState::Playing {
                step,
                phase: Phase::Tone,
                ..
            } => Some(self.active[step].freq_hz),
            _ => None,
        }
    }

    /// (Re)start playback from the first step.  In-flight state is
    /// discarded; a muted buzzer ignores the trigger.
    pub fn trigger(&mut self) {
        if self.muted {
            return;
        }
        self.active = self.melody.steps();
        if self.active.is_empty() {
            return;
        }
        self.state = PlayState::Playing {
            step: 0,
            phase: Phase::Tone,
            remaining_ms: self.active[0].on_ms,
        };
    }

    /// Advance by `delta_ms` and return the frequency to drive, or
    /// `None` for silence.  Consumes whole steps when the tick is
    /// coarser than the step durations.
    pub fn tick(&mut self, delta_ms: u32) -> Option<u16> {
        let steps = self.active;
        let mut budget = delta_ms;
        loop {
            match self.state {
                PlayState::Idle => return None,
                PlayState::Playing {
                    step,
                    phase,
                    remaining_ms,
                } => {
                    if remaining_ms > budget {
                        self.state = PlayState::Playing {
                            step,
                            phase,
                            remaining_ms: remaining_ms - budget,
                        };
                        return match phase {
                            Phase::Tone => Some(steps[step].freq_hz),
                            Phase::Silence => None,
                        };
                    }
                    budget -= remaining_ms;
                    self.state = Self::advance(steps, step, phase);
                }
            }
        }
    }

    fn advance(steps: &[ToneStep], step: usize, phase: Phase) -> PlayState {
        match phase {
            Phase::Tone if steps[step].off_ms > 0 => PlayState::Playing {
                step,
                phase: Phase::Silence,
                remaining_ms: steps[step].off_ms,
            },
            Phase::Tone | Phase::Silence => {
                let next = step + 1;
                if next < steps.len() {
                    PlayState::Playing {
                        step: next,
                        phase: Phase::Tone,
                        remaining_ms: steps[next].on_ms,
                    }
                } else {
                    PlayState::Idle
                }
            }
        }
    }
}
