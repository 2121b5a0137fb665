//! RGB gauge light next to the oil thermometer.
//!
//! Colour follows the temperature band.  The common line is driven low
//! while lit; colour channels are active-low.

use embedded_hal::digital::OutputPin;

use super::GaugeLight;
use crate::fsm::context::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GaugeColour {
    #[default]
    Off,
    Blue,
    Green,
    Yellow,
    Red,
}

impl GaugeColour {
    /// Band colour: cold, in band, near the limit, over the limit.
    pub fn for_temperature(celsius: i16, limits: &Thresholds) -> Self {
        if celsius < limits.min {
            Self::Blue
        } else if celsius <= limits.max - limits.tolerance {
            Self::Green
        } else if celsius <= limits.max {
            Self::Yellow
        } else {
            Self::Red
        }
    }

    /// (red, green, blue) channels enabled for this colour.
    pub const fn channels(self) -> (bool, bool, bool) {
        match self {
            Self::Off => (false, false, false),
            Self::Blue => (false, false, true),
            Self::Green => (false, true, false),
            Self::Yellow => (true, true, false),
            Self::Red => (true, false, false),
        }
    }
}

pub struct RgbGauge<R, G, B, C> {
    red: R,
    green: G,
    blue: B,
    common: C,
    colour: GaugeColour,
}

impl<R, G, B, C> RgbGauge<R, G, B, C>
where
    R: OutputPin,
    G: OutputPin,
    B: OutputPin,
    C: OutputPin,
{
    pub fn new(red: R, green: G, blue: B, common: C) -> Self {
        let mut gauge = Self {
            red,
            green,
            blue,
            common,
            colour: GaugeColour::Off,
        };
        gauge.show(GaugeColour::Off);
        gauge
    }

    pub fn colour(&self) -> GaugeColour {
        self.colour
    }
}

impl<R, G, B, C> GaugeLight for RgbGauge<R, G, B, C>
where
    R: OutputPin,
    G: OutputPin,
    B: OutputPin,
    C: OutputPin,
{
    fn show(&mut self, colour: GaugeColour) {
        let (r, g, b) = colour.channels();
        let _ = self.common.set_state((colour == GaugeColour::Off).into());
        let _ = self.red.set_state((!r).into());
        let _ = self.green.set_state((!g).into());
        let _ = self.blue.set_state((!b).into());
        self.colour = colour;
    }
}
