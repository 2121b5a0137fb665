//! Tri-colour status indicator (green / orange / red).
//!
//! Three active-low channel lines share one common line.  A channel is
//! lit while it is driven low and the common line is high; blinking
//! toggles the common line once per tick from the `leds` hook.

use embedded_hal::digital::OutputPin;

use super::Indicator;

const BLINK_MASK: u8 = 0x80;
const GREEN: u8 = 0x01;
const ORANGE: u8 = 0x02;
const RED: u8 = 0x04;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum IndicatorMode {
    #[default]
    AllOff = 0x00,
    AllBlink = 0x80,
    GreenOn = 0x01,
    GreenBlink = 0x81,
    OrangeOn = 0x02,
    OrangeBlink = 0x82,
    RedOn = 0x04,
    RedBlink = 0x84,
}

impl IndicatorMode {
    pub const fn blinks(self) -> bool {
        self as u8 & BLINK_MASK != 0
    }

    /// (green, orange, red) channels enabled in this mode.
    pub const fn channels(self) -> (bool, bool, bool) {
        match self {
            Self::AllBlink => (true, true, true),
            other => {
                let code = other as u8;
                (code & GREEN != 0, code & ORANGE != 0, code & RED != 0)
            }
        }
    }
}

pub struct TriColorLed<G, O, R, C> {
    green: G,
    orange: O,
    red: R,
    common: C,
    mode: IndicatorMode,
    common_high: bool,
}

impl<G, O, R, C> TriColorLed<G, O, R, C>
where
    G: OutputPin,
    O: OutputPin,
    R: OutputPin,
    C: OutputPin,
{
    pub fn new(green: G, orange: O, red: R, common: C) -> Self {
        let mut led = Self {
            green,
            orange,
            red,
            common,
            mode: IndicatorMode::AllOff,
            common_high: true,
        };
        led.apply();
        led
    }

    /// Whether any channel is currently emitting light.
    pub fn is_lit(&self) -> bool {
        let (g, o, r) = self.mode.channels();
        self.common_high && (g || o || r)
    }

    // GPIO writes to configured outputs do not fail on this target.
    fn apply(&mut self) {
        let (g, o, r) = self.mode.channels();
        let _ = self.green.set_state((!g).into());
        let _ = self.orange.set_state((!o).into());
        let _ = self.red.set_state((!r).into());
        let _ = self.common.set_state(self.common_high.into());
    }
}

impl<G, O, R, C> Indicator for TriColorLed<G, O, R, C>
where
    G: OutputPin,
    O: OutputPin,
    R: OutputPin,
    C: OutputPin,
{
    fn set_mode(&mut self, mode: IndicatorMode) {
        self.mode = mode;
        self.common_high = true;
        self.apply();
    }

    fn mode(&self) -> IndicatorMode {
        self.mode
    }

    fn blink_tick(&mut self) {
        if self.mode.blinks() {
            self.common_high = !self.common_high;
            let _ = self.common.set_state(self.common_high.into());
        }
    }
}
