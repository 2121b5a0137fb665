//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ HeatingService (domain)
//! ```
//!
//! Driven adapters (bus devices, indicators, buzzer, event sinks)
//! implement these traits.  The [`HeatingService`](super::service::HeatingService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::bus::{BusConnectionState, BusError, BusHealth};
use crate::drivers::button::Action;
use crate::drivers::buzzer::Melody;
use crate::drivers::gauge::GaugeColour;
use crate::drivers::relay::RelayMask;
use crate::drivers::status_led::IndicatorMode;
use crate::sensors::temperature::Temperature;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the inputs of one heating tick.
pub trait SensorPort {
    /// Sample the oil temperature.  Performs the ADC transaction, so the
    /// ADC connection state is current afterwards.
    fn read_temperature(&mut self) -> Temperature;

    /// Take the pending operator action, leaving the mailbox empty.
    fn take_action(&mut self) -> Action;

    /// Connection state of every bus device, as last observed.
    fn bus_health(&self) -> BusHealth;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command outputs.
pub trait ActuatorPort {
    /// Command a relay set.  Reaches the expander on the next relay
    /// refresh.
    fn set_relays(&mut self, mask: RelayMask);

    fn set_indicator(&mut self, mode: IndicatorMode);

    /// Play a melody to completion.
    fn play(&mut self, melody: Melody);

    fn set_gauge(&mut self, colour: GaugeColour);
}

// ───────────────────────────────────────────────────────────────
// Peripheral port (periodic housekeeping run from the scheduler)
// ───────────────────────────────────────────────────────────────

/// Bodies of the hardware hooks that run ahead of the heating tick.
pub trait PeripheralPort {
    /// Advance button hold counters.
    fn poll_buttons(&mut self);

    /// Advance the indicator blink phase.
    fn blink_indicator(&mut self);

    /// Write the commanded relays and read their feedback back.
    fn refresh_relays(&mut self) -> BusConnectionState;

    /// Commanded outputs plus last feedback.
    fn relay_mask(&self) -> RelayMask;
}

// ───────────────────────────────────────────────────────────────
// Debug port (console maintenance commands)
// ───────────────────────────────────────────────────────────────

pub trait DebugPort {
    /// Replace the measured temperature with `celsius`; `None` goes back
    /// to measuring.
    fn set_temperature_override(&mut self, celsius: Option<i16>);

    /// Last temperature returned, without a new conversion.
    fn last_temperature(&self) -> Temperature;

    /// Write one raw byte to the relay expander, bypassing the mask.
    fn write_relay_port(&mut self, byte: u8) -> Result<(), BusError>;

    fn read_relay_port(&mut self) -> Result<u8, BusError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
