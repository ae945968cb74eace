//! CAN frame type shared by the codec and the transport queues.
//!
//! Frame ids follow the DBC convention where bit 31 marks a 29-bit extended
//! identifier; the three protocol frames all carry that flag. A frame is
//! immutable once constructed and owned by whichever queue slot holds it.

/// Bit 31 of a frame id marks a 29-bit extended identifier.
pub const EXTENDED_ID_FLAG: u32 = 0x8000_0000;

/// Maximum CAN data length in bytes.
pub const MAX_DLC: usize = 8;

/// Errors that can occur when constructing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Data length exceeds the 8-byte CAN limit
    DlcTooLarge,
}

/// A single CAN frame: identifier, up to 8 data bytes, and length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CanFrame {
    id: u32,
    data: [u8; MAX_DLC],
    dlc: u8,
}

impl CanFrame {
    /// Create a frame from an id and a data slice
    pub fn new(id: u32, data: &[u8]) -> Result<Self, FrameError> {
        if data.len() > MAX_DLC {
            return Err(FrameError::DlcTooLarge);
        }
        let mut buf = [0u8; MAX_DLC];
        buf[..data.len()].copy_from_slice(data);
        Ok(Self {
            id,
            data: buf,
            dlc: data.len() as u8,
        })
    }

    /// Create a full-length frame from a fixed 8-byte payload
    pub fn from_data(id: u32, data: [u8; MAX_DLC]) -> Self {
        Self {
            id,
            data,
            dlc: MAX_DLC as u8,
        }
    }

    /// Raw frame id, including the extended flag bit when present
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The 29-bit arbitration id with the flag bit stripped
    pub fn arbitration_id(&self) -> u32 {
        self.id & !EXTENDED_ID_FLAG
    }

    /// Whether this frame uses a 29-bit extended identifier
    pub fn is_extended(&self) -> bool {
        self.id & EXTENDED_ID_FLAG != 0
    }

    /// Data length code (0-8)
    pub fn dlc(&self) -> u8 {
        self.dlc
    }

    /// The valid portion of the data bytes
    pub fn data(&self) -> &[u8] {
        &self.data[..self.dlc as usize]
    }
}
