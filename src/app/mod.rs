//! Application core: pure domain logic, zero I/O.
//!
//! The heating service drives the FSM and translates its effects into
//! port calls.  All interaction with hardware happens through the
//! **port traits** in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
