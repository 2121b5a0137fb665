//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                       |
//! |------------|----------------|-----------------------------------|
//! | `hardware` | SensorPort     | ADC thermometer, button mailbox   |
//! |            | ActuatorPort   | relay expander, LEDs, gauge, buzzer |
//! |            | PeripheralPort | per-tick housekeeping             |
//! |            | DebugPort      | console maintenance commands      |
//! | `log_sink` | EventSink      | Serial log output                 |

pub mod hardware;
pub mod log_sink;
