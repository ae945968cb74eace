//! Wire-value enums carried inside protocol messages
//!
//! The raw byte values are fixed by the bus specification and must survive
//! round-trips unchanged; everything above the codec works with the typed
//! variants only.

/// Node health as reported in the heartbeat message
///
/// The variants are ordered by severity, so `health < Health::Failure`
/// reads as "below failure severity".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Health {
    /// Boot-time state, before the grace period has elapsed
    Init = 0,
    /// Normal operation
    On = 1,
    /// Degraded: peer heartbeats have gone silent
    Warning = 2,
    /// Latched fault; never left by automatic evaluation
    Failure = 3,
}

impl Health {
    /// Decode the wire value, rejecting anything outside the four
    /// defined choices.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Health::Init),
            1 => Some(Health::On),
            2 => Some(Health::Warning),
            3 => Some(Health::Failure),
            _ => None,
        }
    }

    /// Wire value of this variant
    pub fn to_raw(self) -> u8 {
        self as u8
    }
}

/// The commanded brake end-state carried in a command message
///
/// Wire values other than the two defined choices are invalid; the codec
/// rejects them and the controller treats such commands as no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BrakeRequest {
    /// Drive toward the released end position
    Release = 0,
    /// Drive toward the pushed end position
    Push = 1,
}

impl BrakeRequest {
    /// Decode the wire value
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(BrakeRequest::Release),
            1 => Some(BrakeRequest::Push),
            _ => None,
        }
    }

    /// Wire value of this variant
    pub fn to_raw(self) -> u8 {
        self as u8
    }
}
