//! Hardware driver implementations
//!
//! Concrete implementations of the traits defined in freno-core for the
//! actuator board:
//!
//! - Motor driver (BTN7971B half bridge)
//! - Position sensor (potentiometer on a 12-bit ADC)
//!
//! The drivers are pure pin-state and value models; applying levels to
//! GPIOs and duty cycles to timers stays with the board layer.

#![no_std]
#![deny(unsafe_code)]

pub mod motor;
pub mod sensor;
