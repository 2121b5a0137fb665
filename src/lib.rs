//! Waste-oil heater controller firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the
//! embedded-hal drivers the binary wires together.  All ESP-IDF-specific
//! code is guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod bus;
pub mod config;
pub mod fsm;
pub mod scheduler;
pub mod shell;
pub mod system;

pub mod error;
pub mod pins;

pub mod adapters;
pub mod drivers;
pub mod sensors;
