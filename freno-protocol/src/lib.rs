//! CAN protocol for the Freno brake actuator
//!
//! This crate defines the frames exchanged between the actuator MCU and the
//! supervising host on a 29-bit extended CAN bus, plus the byte-exact codec
//! for each of them. Three fixed-format messages exist, each carrying exactly
//! 8 data bytes with multi-byte fields in little-endian order:
//!
//! | Message    | Frame id     | Direction     | Period  |
//! |------------|--------------|---------------|---------|
//! | Heartbeat  | `0x98FF0D00` | bidirectional | 50 ms   |
//! | Command    | `0x98FF0D09` | host → MCU    | demand  |
//! | Telemetry  | `0x98FF0D0A` | MCU → host    | 100 ms  |
//!
//! Both sides send the heartbeat on the same frame id; the `node_id` byte
//! distinguishes the origin (MCU `0xF0`, host `0x10`).
//!
//! The control logic in `freno-core` never touches raw bytes: it consumes
//! and produces the decoded structs defined here.

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;
pub mod status;

pub use frame::{CanFrame, FrameError, EXTENDED_ID_FLAG, MAX_DLC};
pub use messages::{
    BrakeCommand, BrakeTelemetry, Heartbeat, ProtocolError, FRAME_ID_BRAKE_COMMAND,
    FRAME_ID_BRAKE_TELEMETRY, FRAME_ID_HEARTBEAT, HEALTH_WIRE_MAX, NODE_ID_HOST, NODE_ID_MCU,
};
pub use status::{BrakeRequest, Health};
