//! TankMon control core library.
//!
//! The runtime control core of a liquid-level monitor for a horizontal
//! cylindrical tank: raw distance in, derived physical quantities and
//! actuator commands out.  Hardware acquisition and rendering live
//! behind the port traits in [`app::ports`]; everything here is pure
//! logic and runs on the host.

#![deny(unused_must_use)]

pub mod actuators;
pub mod app;
pub mod calibration;
pub mod classify;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod night;
