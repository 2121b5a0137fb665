//! Outbound application events.
//!
//! The [`HeatingService`](super::service::HeatingService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.

use crate::bus::BusConnectionState;
use crate::fsm::HeatingMode;
use crate::sensors::temperature::Temperature;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries the initial mode).
    Started(HeatingMode),

    /// The heating mode changed.
    ModeChanged { from: HeatingMode, to: HeatingMode },

    /// A bus device went from connected to broken.
    BusFault {
        relay: BusConnectionState,
        adc: BusConnectionState,
    },

    /// Every bus device is connected again.
    BusRecovered,

    /// Per-tick temperature, only while report mode is on.
    Report(Temperature),
}
