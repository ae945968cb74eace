//! Board-agnostic core logic for the brake actuator firmware
//!
//! This crate contains all control logic that does not depend on specific
//! hardware implementations:
//!
//! - Hardware abstraction traits (motor drive, position feedback)
//! - Bounded CAN frame transport between the receive interrupt and the
//!   polling loop
//! - Heartbeat/watchdog protocol with peer liveness tracking
//! - Brake actuator state machine with operation timing and fault detection
//! - The controller that ties the pieces to the bus messages
//!
//! All timing is driven by a caller-supplied monotonic millisecond tick;
//! nothing here reads a clock, blocks, or panics on faults.

#![no_std]
#![deny(unsafe_code)]

pub mod brake;
pub mod controller;
pub mod indicator;
pub mod traits;
pub mod transport;
pub mod watchdog;
