//! Bus status codes reported by the phy after each phase.
//!
//! The numeric values are the master-mode status codes of the classic
//! AVR TWI status register, so a phy backed by that peripheral can
//! report its register contents unchanged.

/// Outcome of one bus phase as reported by the phy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TwiStatus {
    /// Bus error: illegal START/STOP seen, or a pin could not be driven.
    BusFault = 0x00,
    Start = 0x08,
    RepeatedStart = 0x10,
    SlaWriteAck = 0x18,
    /// Device did not answer its write address (busy or absent).
    SlaWriteNack = 0x20,
    DataWriteAck = 0x28,
    DataWriteNack = 0x30,
    /// Another master won contention for the bus.
    ArbitrationLost = 0x38,
    SlaReadAck = 0x40,
    SlaReadNack = 0x48,
    DataReadAck = 0x50,
    DataReadNack = 0x58,
    /// No relevant state information (idle bus).
    NoInfo = 0xF8,
}

impl TwiStatus {
    /// Raw status register value.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a raw status register value (prescaler bits masked off).
    pub fn from_code(code: u8) -> Self {
        match code & 0xF8 {
            0x08 => Self::Start,
            0x10 => Self::RepeatedStart,
            0x18 => Self::SlaWriteAck,
            0x20 => Self::SlaWriteNack,
            0x28 => Self::DataWriteAck,
            0x30 => Self::DataWriteNack,
            0x38 => Self::ArbitrationLost,
            0x40 => Self::SlaReadAck,
            0x48 => Self::SlaReadNack,
            0x50 => Self::DataReadAck,
            0x58 => Self::DataReadNack,
            0xF8 => Self::NoInfo,
            _ => Self::BusFault,
        }
    }

    /// Either a fresh or a repeated START.
    pub const fn is_start(self) -> bool {
        matches!(self, Self::Start | Self::RepeatedStart)
    }
}

impl core::fmt::Display for TwiStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}(0x{:02x})", self, self.code())
    }
}
