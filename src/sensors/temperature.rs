//! Oil probe conversion and smoothing.
//!
//! `T = offset - raw / 2` on an 8-bit sample, then two successive
//! halvings toward the new value:
//!
//! ```text
//! m1   = (prev + T)  / 2
//! m2   = (prev + m1) / 2
//! prev = m2
//! ```
//!
//! The heating thresholds were tuned against exactly this recurrence.

use core::fmt;

use log::warn;

use super::{AnalogSource, Thermometer};
use crate::bus::BusConnectionState;
use crate::config::SystemConfig;

/// One temperature reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Temperature {
    pub celsius: i16,
    /// Supplied by the operator override rather than the probe.
    pub simulated: bool,
}

impl Temperature {
    pub const fn measured(celsius: i16) -> Self {
        Self { celsius, simulated: false }
    }

    pub const fn simulated(celsius: i16) -> Self {
        Self { celsius, simulated: true }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.simulated {
            write!(f, "{} (sim)", self.celsius)
        } else {
            write!(f, "{}", self.celsius)
        }
    }
}

pub struct OilThermometer<A> {
    source: A,
    offset: i16,
    smoothed: i16,
    sim: Option<i16>,
    last: Temperature,
}

impl<A: AnalogSource> OilThermometer<A> {
    pub fn new(source: A, config: &SystemConfig) -> Self {
        Self {
            source,
            offset: config.adc_offset_c,
            smoothed: config.initial_oil_temp_c,
            sim: None,
            last: Temperature::measured(config.initial_oil_temp_c),
        }
    }

    /// Probe temperature for one raw sample, before smoothing.
    pub fn convert(&self, raw: u8) -> i16 {
        self.offset - i16::from(raw / 2)
    }

    fn smooth(&mut self, celsius: i16) -> i16 {
        let prev = i32::from(self.smoothed);
        let m1 = (prev + i32::from(celsius)) / 2;
        let m2 = (prev + m1) / 2;
        self.smoothed = m2 as i16;
        self.smoothed
    }
}

impl<A: AnalogSource> Thermometer for OilThermometer<A> {
    fn read(&mut self) -> Temperature {
        // The converter is sampled even under an override so its bus
        // health tracks the current tick.
        let sample = self.source.convert();
        self.last = match (self.sim, sample) {
            (Some(celsius), _) => Temperature::simulated(celsius),
            (None, Ok(raw)) => {
                let celsius = self.convert(raw);
                Temperature::measured(self.smooth(celsius))
            }
            (None, Err(e)) => {
                warn!("thermometer: sample failed ({}), keeping {}", e, self.smoothed);
                Temperature::measured(self.smoothed)
            }
        };
        self.last
    }

    fn last(&self) -> Temperature {
        self.last
    }

    fn set_override(&mut self, celsius: Option<i16>) {
        self.sim = celsius;
    }

    fn connection_state(&self) -> BusConnectionState {
        self.source.connection_state()
    }
}
