//! System configuration parameters
//!
//! All tunable design constants for the heater.  Compiled-in defaults;
//! the `config` console command prints the live values as JSON.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Oil temperature band ---
    /// Lower safe bound (Celsius).  Below it the burner falls back to Heating.
    pub min_oil_temp_c: i16,
    /// Upper safe bound (Celsius).  Above it the heater enters Emergency.
    pub max_oil_temp_c: i16,
    /// Hysteresis applied when leaving Heating and when leaving Emergency.
    pub tolerance_c: i16,

    // --- Thermometer ---
    /// Seed of the smoothing filter (Celsius).
    pub initial_oil_temp_c: i16,
    /// Probe offset: temperature = offset - raw / 2.
    pub adc_offset_c: i16,

    // --- Bus ---
    /// SCL frequency (Hz).
    pub bus_clock_hz: u32,
    /// Select attempts before a transaction times out.
    pub bus_max_iter: u16,
    /// Bytes per write transaction.
    pub bus_page_size: usize,
    /// SCL polls before clock stretching is treated as a fault.
    pub clock_stretch_limit: u32,

    // --- Timing ---
    /// Scheduler tick period (milliseconds)
    pub tick_interval_ms: u32,

    // --- Console ---
    /// List debug commands in `help`.
    pub debug_commands: bool,
    /// Log the temperature every tick.
    pub report_mode: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Oil band
            min_oil_temp_c: 59,
            max_oil_temp_c: 94,
            tolerance_c: 3,

            // Thermometer
            initial_oil_temp_c: 20,
            adc_offset_c: 185,

            // Bus
            bus_clock_hz: 100_000,
            bus_max_iter: crate::bus::MAX_ITER,
            bus_page_size: crate::bus::PAGE_SIZE,
            clock_stretch_limit: crate::bus::bitbang::DEFAULT_STRETCH_LIMIT,

            // Timing
            tick_interval_ms: 1000, // 1 Hz

            // Console
            debug_commands: true,
            report_mode: false,
        }
    }
}

/// A configuration value out of range, with the rule it broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigError(pub &'static str);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl core::error::Error for ConfigError {}

impl SystemConfig {
    /// Reject configurations whose hysteresis bands overlap or whose bus
    /// and timing constants are zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance_c <= 0 {
            return Err(ConfigError("tolerance must be positive"));
        }
        if self.min_oil_temp_c + self.tolerance_c >= self.max_oil_temp_c - self.tolerance_c {
            return Err(ConfigError("ready band is empty: min + tol must be below max - tol"));
        }
        if self.bus_clock_hz == 0 || self.bus_max_iter == 0 || self.bus_page_size == 0 {
            return Err(ConfigError("bus clock, retry budget and page size must be non-zero"));
        }
        if self.clock_stretch_limit == 0 {
            return Err(ConfigError("clock stretch limit must be non-zero"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError("tick interval must be non-zero"));
        }
        Ok(())
    }
}
