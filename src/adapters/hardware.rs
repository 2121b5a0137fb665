//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the relay expander, thermometer, indicator, gauge and buzzer, and
//! borrows the interrupt-shared [`ButtonPanel`].  Every peripheral is a
//! generic so host tests can substitute recorders; on the device they are
//! the embedded-hal drivers in [`crate::drivers`] and [`crate::sensors`].

use embedded_hal::i2c::I2c;

use crate::app::ports::{ActuatorPort, DebugPort, PeripheralPort, SensorPort};
use crate::bus::{BusConnectionState, BusError, BusHealth};
use crate::drivers::button::{Action, ButtonPanel};
use crate::drivers::buzzer::Melody;
use crate::drivers::gauge::GaugeColour;
use crate::drivers::relay::{RelayExpander, RelayMask};
use crate::drivers::status_led::IndicatorMode;
use crate::drivers::{Chime, GaugeLight, Indicator};
use crate::sensors::Thermometer;
use crate::sensors::temperature::Temperature;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<R, T, L, G, Z> {
    relay: RelayExpander<R>,
    thermometer: T,
    indicator: L,
    gauge: G,
    buzzer: Z,
    buttons: &'static ButtonPanel,
}

impl<R, T, L, G, Z> HardwareAdapter<R, T, L, G, Z>
where
    R: I2c<Error = BusError>,
    T: Thermometer,
    L: Indicator,
    G: GaugeLight,
    Z: Chime,
{
    pub fn new(
        relay: RelayExpander<R>,
        thermometer: T,
        indicator: L,
        gauge: G,
        buzzer: Z,
        buttons: &'static ButtonPanel,
    ) -> Self {
        Self {
            relay,
            thermometer,
            indicator,
            gauge,
            buzzer,
            buttons,
        }
    }

    pub fn relay(&self) -> &RelayExpander<R> {
        &self.relay
    }

    pub fn thermometer_mut(&mut self) -> &mut T {
        &mut self.thermometer
    }

    pub fn indicator(&self) -> &L {
        &self.indicator
    }

    pub fn buttons(&self) -> &'static ButtonPanel {
        self.buttons
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<R, T, L, G, Z> SensorPort for HardwareAdapter<R, T, L, G, Z>
where
    R: I2c<Error = BusError>,
    T: Thermometer,
{
    fn read_temperature(&mut self) -> Temperature {
        self.thermometer.read()
    }

    fn take_action(&mut self) -> Action {
        self.buttons.take_action()
    }

    fn bus_health(&self) -> BusHealth {
        BusHealth {
            relay: self.relay.connection_state(),
            adc: self.thermometer.connection_state(),
        }
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<R, T, L, G, Z> ActuatorPort for HardwareAdapter<R, T, L, G, Z>
where
    R: I2c<Error = BusError>,
    L: Indicator,
    G: GaugeLight,
    Z: Chime,
{
    fn set_relays(&mut self, mask: RelayMask) {
        self.relay.set(mask);
    }

    fn set_indicator(&mut self, mode: IndicatorMode) {
        self.indicator.set_mode(mode);
    }

    fn play(&mut self, melody: Melody) {
        self.buzzer.play(melody);
    }

    fn set_gauge(&mut self, colour: GaugeColour) {
        self.gauge.show(colour);
    }
}

// ── PeripheralPort implementation ─────────────────────────────

impl<R, T, L, G, Z> PeripheralPort for HardwareAdapter<R, T, L, G, Z>
where
    R: I2c<Error = BusError>,
    L: Indicator,
{
    fn poll_buttons(&mut self) {
        self.buttons.tick();
    }

    fn blink_indicator(&mut self) {
        self.indicator.blink_tick();
    }

    fn refresh_relays(&mut self) -> BusConnectionState {
        self.relay.refresh()
    }

    fn relay_mask(&self) -> RelayMask {
        self.relay.mask()
    }
}

// ── DebugPort implementation ──────────────────────────────────

impl<R, T, L, G, Z> DebugPort for HardwareAdapter<R, T, L, G, Z>
where
    R: I2c<Error = BusError>,
    T: Thermometer,
{
    fn set_temperature_override(&mut self, celsius: Option<i16>) {
        self.thermometer.set_override(celsius);
    }

    fn last_temperature(&self) -> Temperature {
        self.thermometer.last()
    }

    fn write_relay_port(&mut self, byte: u8) -> Result<(), BusError> {
        self.relay.raw_write(byte)
    }

    fn read_relay_port(&mut self) -> Result<u8, BusError> {
        self.relay.raw_read()
    }
}
