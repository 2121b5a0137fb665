//! ADS1115 16-bit ADC on the shared bus, sampling the oil probe.
//!
//! Single-shot conversion on AIN1 vs GND, ±2.048 V, 8 SPS.  Each sample
//! rewrites the config register (which starts a conversion), reads it
//! back, points at the conversion register and reads the result.  The
//! result is therefore the conversion started one sample earlier.

use embedded_hal::i2c::I2c;
use log::debug;

use super::AnalogSource;
use crate::bus::{BusConnectionState, BusError};

const REG_CONVERSION: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;

/// OS=1, MUX=AIN1/GND, PGA=±2.048 V, single-shot, 8 SPS, comparator off.
pub const CONFIG_AIN1_SINGLE_SHOT: u16 = 0xD503;

pub struct Ads1115<I> {
    bus: I,
    address: u8,
    state: BusConnectionState,
    last_raw: i16,
}

impl<I: I2c<Error = BusError>> Ads1115<I> {
    pub fn new(bus: I, address: u8) -> Self {
        Self {
            bus,
            address,
            state: BusConnectionState::Ok,
            last_raw: 0,
        }
    }

    /// Latest full-scale 16-bit conversion.
    pub fn last_raw(&self) -> i16 {
        self.last_raw
    }

    fn step<T>(&mut self, result: Result<T, BusError>) -> Result<T, BusError> {
        self.state = BusConnectionState::of(&result);
        result
    }

    /// One full sample sequence.  Every bus step updates the connection state.
    pub fn sample(&mut self) -> Result<i16, BusError> {
        let [hi, lo] = CONFIG_AIN1_SINGLE_SHOT.to_be_bytes();
        let written = self.bus.write(self.address, &[REG_CONFIG, hi, lo]);
        self.step(written)?;

        let mut config = [0u8; 2];
        let read = self.bus.read(self.address, &mut config);
        self.step(read)?;
        let readback = u16::from_be_bytes(config);
        if readback != CONFIG_AIN1_SINGLE_SHOT {
            debug!("ads1115: config readback 0x{:04x}", readback);
        }

        let pointed = self.bus.write(self.address, &[REG_CONVERSION]);
        self.step(pointed)?;

        let mut conversion = [0u8; 2];
        let read = self.bus.read(self.address, &mut conversion);
        self.step(read)?;
        self.last_raw = i16::from_be_bytes(conversion);
        Ok(self.last_raw)
    }
}

impl<I: I2c<Error = BusError>> AnalogSource for Ads1115<I> {
    type Error = BusError;

    /// Top 8 bits of the positive range.
    fn convert(&mut self) -> Result<u8, BusError> {
        let raw = self.sample()?;
        Ok((raw.max(0) >> 7) as u8)
    }

    fn connection_state(&self) -> BusConnectionState {
        self.state
    }
}
