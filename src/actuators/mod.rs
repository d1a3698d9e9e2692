//! Actuator state machines (pure logic — the GPIO/PWM side lives behind
//! [`ActuatorPort`](crate::app::ports::ActuatorPort)).

pub mod buzzer;
pub mod led;
