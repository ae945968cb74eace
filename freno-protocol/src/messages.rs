//! The three fixed-format protocol messages and their codec
//!
//! Each message occupies exactly 8 data bytes. Multi-byte fields are
//! little-endian. Padding bytes are transmitted as zero and ignored on
//! receive.

use crate::frame::CanFrame;
use crate::status::BrakeRequest;

/// Heartbeat frame id, shared by both bus nodes
pub const FRAME_ID_HEARTBEAT: u32 = 0x98FF_0D00;
/// Brake command frame id (host to MCU)
pub const FRAME_ID_BRAKE_COMMAND: u32 = 0x98FF_0D09;
/// Brake telemetry frame id (MCU to host)
pub const FRAME_ID_BRAKE_TELEMETRY: u32 = 0x98FF_0D0A;

/// Origin id of the actuator MCU
pub const NODE_ID_MCU: u8 = 0xF0;
/// Origin id of the supervising host
pub const NODE_ID_HOST: u8 = 0x10;

/// Highest health byte value defined on the bus
///
/// The bus specification defines six severity choices (0-5); the local
/// node only ever reports the four [`Health`] variants, but peers may
/// legally announce the remaining two.
pub const HEALTH_WIRE_MAX: u8 = 5;

/// Errors that can occur when decoding a frame into a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Frame id does not match this message type
    UnexpectedId,
    /// Frame carries fewer than the required 8 data bytes
    UnexpectedDlc,
    /// Health byte above the bus-defined range
    InvalidHealth,
    /// Brake-state byte outside the defined choices
    InvalidRequest,
}

/// Liveness announcement sent by both nodes every 50 ms
///
/// Layout: byte 0 node id, bytes 1-4 counter, byte 5 health (0-5),
/// bytes 6-7 timestamp.
///
/// The health byte stays raw: any bus-defined value must keep the
/// announcement usable for liveness tracking, including severities the
/// local [`Health`] enum never produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Heartbeat {
    /// Origin node id (`NODE_ID_MCU` or `NODE_ID_HOST`)
    pub node_id: u8,
    /// Monotonically incrementing announcement counter
    pub count: u32,
    /// Health byte as reported by the origin node (wire range 0-5)
    pub health: u8,
    /// Origin system time, truncated to 16 bits
    pub stamp: u16,
}

impl Heartbeat {
    /// Encode this message into a CAN frame
    pub fn to_frame(&self) -> CanFrame {
        let mut data = [0u8; 8];
        data[0] = self.node_id;
        data[1..5].copy_from_slice(&self.count.to_le_bytes());
        data[5] = self.health;
        data[6..8].copy_from_slice(&self.stamp.to_le_bytes());
        CanFrame::from_data(FRAME_ID_HEARTBEAT, data)
    }

    /// Decode a heartbeat from a received frame
    ///
    /// Health bytes anywhere in the bus-defined 0-5 range are accepted,
    /// so announcements carrying severities the local node never uses
    /// still count toward peer liveness.
    pub fn from_frame(frame: &CanFrame) -> Result<Self, ProtocolError> {
        if frame.id() != FRAME_ID_HEARTBEAT {
            return Err(ProtocolError::UnexpectedId);
        }
        let d = frame.data();
        if d.len() < 8 {
            return Err(ProtocolError::UnexpectedDlc);
        }
        if d[5] > HEALTH_WIRE_MAX {
            return Err(ProtocolError::InvalidHealth);
        }
        Ok(Self {
            node_id: d[0],
            count: u32::from_le_bytes([d[1], d[2], d[3], d[4]]),
            health: d[5],
            stamp: u16::from_le_bytes([d[6], d[7]]),
        })
    }
}

/// Brake command from the host
///
/// Layout: byte 0 message counter, bytes 1-2 timestamp, byte 3 padding,
/// byte 4 requested brake state, bytes 5-7 padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BrakeCommand {
    /// Host command counter
    pub msg_id: u8,
    /// Host time when the command was formed, truncated to 16 bits
    pub stamp: u16,
    /// Commanded end-state
    pub request: BrakeRequest,
}

impl BrakeCommand {
    /// Encode this message into a CAN frame (used by host-side tooling
    /// and tests; the MCU only ever decodes commands)
    pub fn to_frame(&self) -> CanFrame {
        let mut data = [0u8; 8];
        data[0] = self.msg_id;
        data[1..3].copy_from_slice(&self.stamp.to_le_bytes());
        data[4] = self.request.to_raw();
        CanFrame::from_data(FRAME_ID_BRAKE_COMMAND, data)
    }

    /// Decode a command from a received frame
    ///
    /// A brake-state byte outside the two defined choices yields
    /// `InvalidRequest`; callers treat that as a no-op.
    pub fn from_frame(frame: &CanFrame) -> Result<Self, ProtocolError> {
        if frame.id() != FRAME_ID_BRAKE_COMMAND {
            return Err(ProtocolError::UnexpectedId);
        }
        let d = frame.data();
        if d.len() < 8 {
            return Err(ProtocolError::UnexpectedDlc);
        }
        let request = BrakeRequest::from_raw(d[4]).ok_or(ProtocolError::InvalidRequest)?;
        Ok(Self {
            msg_id: d[0],
            stamp: u16::from_le_bytes([d[1], d[2]]),
            request,
        })
    }
}

/// Actuator status report sent to the host every 100 ms
///
/// Layout: byte 0 message counter, bytes 1-2 timestamp, byte 3 state
/// bitflags (bit 0 releasing, bit 1 released, bit 2 pushing, bit 3 pushed),
/// bytes 4-5 padding, bytes 6-7 estimated time to operation end in ms.
///
/// At most one state flag is set; none is set while the actuator is in the
/// stopped fault state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BrakeTelemetry {
    /// MCU telemetry counter
    pub msg_id: u8,
    /// MCU system time, truncated to 16 bits
    pub stamp: u16,
    /// Actuator is moving toward the released position
    pub releasing: bool,
    /// Actuator rests at the released position
    pub released: bool,
    /// Actuator is moving toward the pushed position
    pub pushing: bool,
    /// Actuator rests at the pushed position
    pub pushed: bool,
    /// Estimated remaining operation time in milliseconds
    pub time_to_end_ms: u16,
}

impl BrakeTelemetry {
    const FLAG_RELEASING: u8 = 1 << 0;
    const FLAG_RELEASED: u8 = 1 << 1;
    const FLAG_PUSHING: u8 = 1 << 2;
    const FLAG_PUSHED: u8 = 1 << 3;

    /// Encode this message into a CAN frame
    pub fn to_frame(&self) -> CanFrame {
        let mut flags = 0u8;
        if self.releasing {
            flags |= Self::FLAG_RELEASING;
        }
        if self.released {
            flags |= Self::FLAG_RELEASED;
        }
        if self.pushing {
            flags |= Self::FLAG_PUSHING;
        }
        if self.pushed {
            flags |= Self::FLAG_PUSHED;
        }

        let mut data = [0u8; 8];
        data[0] = self.msg_id;
        data[1..3].copy_from_slice(&self.stamp.to_le_bytes());
        data[3] = flags;
        data[6..8].copy_from_slice(&self.time_to_end_ms.to_le_bytes());
        CanFrame::from_data(FRAME_ID_BRAKE_TELEMETRY, data)
    }

    /// Decode telemetry from a received frame (used by host-side tooling
    /// and tests)
    pub fn from_frame(frame: &CanFrame) -> Result<Self, ProtocolError> {
        if frame.id() != FRAME_ID_BRAKE_TELEMETRY {
            return Err(ProtocolError::UnexpectedId);
        }
        let d = frame.data();
        if d.len() < 8 {
            return Err(ProtocolError::UnexpectedDlc);
        }
        let flags = d[3];
        Ok(Self {
            msg_id: d[0],
            stamp: u16::from_le_bytes([d[1], d[2]]),
            releasing: flags & Self::FLAG_RELEASING != 0,
            released: flags & Self::FLAG_RELEASED != 0,
            pushing: flags & Self::FLAG_PUSHING != 0,
            pushed: flags & Self::FLAG_PUSHED != 0,
            time_to_end_ms: u16::from_le_bytes([d[6], d[7]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Health;
    use proptest::prelude::*;

    #[test]
    fn test_heartbeat_layout() {
        let hb = Heartbeat {
            node_id: NODE_ID_MCU,
            count: 0x1234_5678,
            health: Health::On.to_raw(),
            stamp: 0xBEEF,
        };
        let frame = hb.to_frame();
        assert_eq!(frame.id(), FRAME_ID_HEARTBEAT);
        assert_eq!(frame.dlc(), 8);
        assert_eq!(
            frame.data(),
            &[0xF0, 0x78, 0x56, 0x34, 0x12, 0x01, 0xEF, 0xBE]
        );
    }

    #[test]
    fn test_heartbeat_roundtrip() {
        let hb = Heartbeat {
            node_id: NODE_ID_HOST,
            count: 42,
            health: Health::Warning.to_raw(),
            stamp: 1000,
        };
        let decoded = Heartbeat::from_frame(&hb.to_frame()).unwrap();
        assert_eq!(decoded, hb);
    }

    #[test]
    fn test_heartbeat_accepts_full_wire_health_range() {
        // Severities 4 and 5 are bus-defined but never produced locally;
        // they must still decode
        for raw in 0..=HEALTH_WIRE_MAX {
            let mut data = [0u8; 8];
            data[0] = NODE_ID_HOST;
            data[5] = raw;
            let frame = CanFrame::from_data(FRAME_ID_HEARTBEAT, data);
            let decoded = Heartbeat::from_frame(&frame).unwrap();
            assert_eq!(decoded.health, raw);
        }
    }

    #[test]
    fn test_heartbeat_rejects_wrong_id() {
        let frame = CanFrame::from_data(FRAME_ID_BRAKE_COMMAND, [0; 8]);
        assert_eq!(
            Heartbeat::from_frame(&frame),
            Err(ProtocolError::UnexpectedId)
        );
    }

    #[test]
    fn test_heartbeat_rejects_short_frame() {
        let frame = CanFrame::new(FRAME_ID_HEARTBEAT, &[0; 4]).unwrap();
        assert_eq!(
            Heartbeat::from_frame(&frame),
            Err(ProtocolError::UnexpectedDlc)
        );
    }

    #[test]
    fn test_heartbeat_rejects_health_above_wire_range() {
        let mut data = [0u8; 8];
        data[5] = 6;
        let frame = CanFrame::from_data(FRAME_ID_HEARTBEAT, data);
        assert_eq!(
            Heartbeat::from_frame(&frame),
            Err(ProtocolError::InvalidHealth)
        );
    }

    #[test]
    fn test_command_layout() {
        let cmd = BrakeCommand {
            msg_id: 9,
            stamp: 0x0102,
            request: BrakeRequest::Push,
        };
        let frame = cmd.to_frame();
        assert_eq!(frame.id(), FRAME_ID_BRAKE_COMMAND);
        assert_eq!(frame.data(), &[9, 0x02, 0x01, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_command_rejects_invalid_brake_state() {
        let mut data = [0u8; 8];
        data[4] = 5;
        let frame = CanFrame::from_data(FRAME_ID_BRAKE_COMMAND, data);
        assert_eq!(
            BrakeCommand::from_frame(&frame),
            Err(ProtocolError::InvalidRequest)
        );
    }

    #[test]
    fn test_telemetry_layout() {
        let tm = BrakeTelemetry {
            msg_id: 3,
            stamp: 0x2040,
            pushing: true,
            time_to_end_ms: 1500,
            ..Default::default()
        };
        let frame = tm.to_frame();
        assert_eq!(frame.id(), FRAME_ID_BRAKE_TELEMETRY);
        // bit 2 = pushing, 1500 = 0x05DC little-endian
        assert_eq!(frame.data(), &[3, 0x40, 0x20, 0b0100, 0, 0, 0xDC, 0x05]);
    }

    #[test]
    fn test_telemetry_no_flags_when_stopped() {
        let tm = BrakeTelemetry {
            msg_id: 0,
            stamp: 0,
            time_to_end_ms: 0,
            ..Default::default()
        };
        assert_eq!(tm.to_frame().data()[3], 0);
    }

    #[test]
    fn test_telemetry_roundtrip() {
        let tm = BrakeTelemetry {
            msg_id: 200,
            stamp: 65535,
            released: true,
            time_to_end_ms: 0,
            ..Default::default()
        };
        let decoded = BrakeTelemetry::from_frame(&tm.to_frame()).unwrap();
        assert_eq!(decoded, tm);
    }

    proptest! {
        #[test]
        fn heartbeat_counter_survives_roundtrip(
            count in any::<u32>(),
            stamp in any::<u16>(),
            health in 0u8..=HEALTH_WIRE_MAX,
        ) {
            let hb = Heartbeat {
                node_id: NODE_ID_MCU,
                count,
                health,
                stamp,
            };
            let decoded = Heartbeat::from_frame(&hb.to_frame()).unwrap();
            prop_assert_eq!(decoded.count, count);
            prop_assert_eq!(decoded.stamp, stamp);
        }
    }
}
