//! Peripheral drivers, hardware initialisation, and tick source.
//!
//! The traits below are the seams [`HardwareAdapter`](crate::adapters::hardware::HardwareAdapter)
//! is generic over, so host tests can swap any peripheral for a recorder.

pub mod button;
pub mod buzzer;
pub mod gauge;
pub mod hw_init;
pub mod hw_timer;
pub mod relay;
pub mod status_led;

use buzzer::Melody;
use gauge::GaugeColour;
use status_led::IndicatorMode;

/// Tri-colour status indicator.
pub trait Indicator {
    fn set_mode(&mut self, mode: IndicatorMode);
    fn mode(&self) -> IndicatorMode;
    /// Advance the blink phase by one tick.
    fn blink_tick(&mut self);
}

/// Temperature-band gauge light.
pub trait GaugeLight {
    fn show(&mut self, colour: GaugeColour);
}

/// Audible feedback.  Blocks for the melody's duration.
pub trait Chime {
    fn play(&mut self, melody: Melody);
}
