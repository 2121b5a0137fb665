//! Relay expander on the shared bus (PCF8574-class quasi-bidirectional port).
//!
//! ## Port layout
//!
//! | Bit | Direction | Line                       |
//! |-----|-----------|----------------------------|
//! | 7   | out       | heater relay               |
//! | 6   | out       | pump relay                 |
//! | 5   | out       | output valve               |
//! | 4   | out       | input valve                |
//! | 3-0 | in        | feedback of bits 7-4       |
//!
//! Relays are active-low, so outputs go on the wire inverted.  Input
//! pins of this port class only read correctly while written high.

use embedded_hal::i2c::I2c;
use log::warn;

use crate::bus::{BusConnectionState, BusError};

/// One switched output of the heater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Actuator {
    ValveIn = 4,
    ValveOut = 5,
    Pump = 6,
    Heater = 7,
}

impl Actuator {
    pub const ALL: [Actuator; 4] = [Self::ValveIn, Self::ValveOut, Self::Pump, Self::Heater];

    pub const fn name(self) -> &'static str {
        match self {
            Self::ValveIn => "valve-in",
            Self::ValveOut => "valve-out",
            Self::Pump => "pump",
            Self::Heater => "heater",
        }
    }

    const fn output_bit(self) -> u8 {
        1 << (self as u8)
    }

    const fn feedback_bit(self) -> u8 {
        1 << (self as u8 - 4)
    }
}

// ───────────────────────────────────────────────────────────────
// RelayMask
// ───────────────────────────────────────────────────────────────

const OUTPUTS: u8 = 0xF0;
const FEEDBACK: u8 = 0x0F;

/// Commanded outputs (upper nibble) plus last-read feedback (lower nibble).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct RelayMask(u8);

impl RelayMask {
    /// Everything de-energised.
    pub const OFF: Self = Self(0);
    /// Pump and heater: warming up or holding temperature.
    pub const PUMP_HEATER: Self = Self::OFF.with(Actuator::Pump).with(Actuator::Heater);
    /// Pump, heater and both valves open: oil circulating.
    pub const OIL_FLOW: Self = Self::PUMP_HEATER
        .with(Actuator::ValveIn)
        .with(Actuator::ValveOut);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Same mask with `actuator` commanded on.
    pub const fn with(self, actuator: Actuator) -> Self {
        Self(self.0 | actuator.output_bit())
    }

    pub const fn commanded(self, actuator: Actuator) -> bool {
        self.0 & actuator.output_bit() != 0
    }

    /// Feedback line for `actuator` as last read (raw pin level).
    pub const fn feedback(self, actuator: Actuator) -> bool {
        self.0 & actuator.feedback_bit() != 0
    }

    /// Commanded outputs only, feedback cleared.
    pub const fn outputs(self) -> Self {
        Self(self.0 & OUTPUTS)
    }

    /// Replace the outputs with those of `commanded`, keeping feedback.
    pub const fn with_outputs(self, commanded: Self) -> Self {
        Self((commanded.0 & OUTPUTS) | (self.0 & FEEDBACK))
    }

    /// Replace the feedback with the input nibble of a port read, keeping
    /// the commanded outputs.
    pub const fn with_feedback(self, port: u8) -> Self {
        Self((self.0 & OUTPUTS) | (port & FEEDBACK))
    }

    /// Port byte to write: active-low outputs, inputs released high.
    pub const fn to_wire(self) -> u8 {
        !self.0 | FEEDBACK
    }
}

impl core::fmt::Display for RelayMask {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

// ───────────────────────────────────────────────────────────────
// RelayExpander
// ───────────────────────────────────────────────────────────────

pub struct RelayExpander<I> {
    bus: I,
    address: u8,
    mask: RelayMask,
    state: BusConnectionState,
}

impl<I: I2c<Error = BusError>> RelayExpander<I> {
    pub fn new(bus: I, address: u8) -> Self {
        Self {
            bus,
            address,
            mask: RelayMask::OFF,
            state: BusConnectionState::Ok,
        }
    }

    /// Command a new output set.  Only the output nibble is replaced; the
    /// port is written on the next [`refresh`](Self::refresh).
    pub fn set(&mut self, commanded: RelayMask) {
        self.mask = self.mask.with_outputs(commanded);
    }

    /// Current mask (commanded outputs and last feedback).
    pub fn mask(&self) -> RelayMask {
        self.mask
    }

    pub fn connection_state(&self) -> BusConnectionState {
        self.state
    }

    /// Write the outputs, then read the feedback back.  One attempt each;
    /// the outcome is recorded as the connection state.
    pub fn refresh(&mut self) -> BusConnectionState {
        let written = self.bus.write(self.address, &[self.mask.to_wire()]);
        self.state = BusConnectionState::of(&written);
        if let Err(e) = written {
            warn!("relay: write failed: {}", e);
            return self.state;
        }

        let mut port = [0u8; 1];
        let read = self.bus.read(self.address, &mut port);
        self.state = BusConnectionState::of(&read);
        match read {
            Ok(()) => self.mask = self.mask.with_feedback(port[0]),
            Err(e) => warn!("relay: feedback read failed: {}", e),
        }
        self.state
    }

    /// Write one raw port byte, bypassing the mask.
    pub fn raw_write(&mut self, byte: u8) -> Result<(), BusError> {
        self.bus.write(self.address, &[byte])
    }

    /// Read the raw port byte.
    pub fn raw_read(&mut self) -> Result<u8, BusError> {
        let mut port = [0u8; 1];
        self.bus.read(self.address, &mut port)?;
        Ok(port[0])
    }
}
