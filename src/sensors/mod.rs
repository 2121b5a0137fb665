//! Oil temperature sensing.
//!
//! An [`AnalogSource`] yields 8-bit probe samples; the
//! [`OilThermometer`](temperature::OilThermometer) converts and smooths
//! them and is what the heating logic reads through [`Thermometer`].

pub mod ads1115;
pub mod temperature;

use core::fmt;

use crate::bus::BusConnectionState;
use temperature::Temperature;

/// Source of raw 8-bit probe samples.
pub trait AnalogSource {
    type Error: fmt::Display;

    /// Take one sample.
    fn convert(&mut self) -> Result<u8, Self::Error>;

    /// Connectivity of the converter, if it sits on the shared bus.
    fn connection_state(&self) -> BusConnectionState {
        BusConnectionState::Ok
    }
}

/// The temperature collaborator as seen by the heating logic.
pub trait Thermometer {
    /// Current temperature: the operator override if set, otherwise a
    /// fresh smoothed sample.  The source is sampled on every call so its
    /// connection state stays current under an override.
    fn read(&mut self) -> Temperature;

    /// Result of the last [`read`](Self::read), without sampling.
    fn last(&self) -> Temperature;

    /// Replace sensor input entirely (`Some`) or return to the probe (`None`).
    fn set_override(&mut self, celsius: Option<i16>);

    fn connection_state(&self) -> BusConnectionState;
}
