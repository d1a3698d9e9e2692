//! Unified error types for the monitor core.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! embedding's error handling uniform.  All variants are `Copy` so they
//! can be passed through the control loop without allocation.  Note that
//! most degraded inputs here are *not* errors: a degenerate calibration
//! or geometry collapses to a "no data" fill state by design, and only
//! rejected commands and unusable samples surface as `Err`.

use core::fmt;

/// Every fallible operation in the core funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A raw distance sample was missing or unusable.
    Sensor(SensorError),
    /// A set-value command carried an out-of-range value.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

/// Raw-sample problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No sample has been delivered yet (needed for calibration marks).
    NoSample,
    /// Sample was NaN or infinite.
    NotFinite,
    /// Sample is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSample => write!(f, "no sample available"),
            Self::NotFinite => write!(f, "sample not finite"),
            Self::OutOfRange => write!(f, "sample out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

/// Core-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
