//! GPIO / peripheral pin assignments for the heater controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Two-wire bus (open-drain, external 4.7 kΩ pull-ups)
// ---------------------------------------------------------------------------

pub const BUS_SDA_GPIO: i32 = 8;
pub const BUS_SCL_GPIO: i32 = 9;

/// Relay expander (PCF8574), 7-bit address.
pub const RELAY_EXPANDER_ADDR: u8 = 0x20;
/// Oil probe ADC (ADS1115, ADDR tied to GND), 7-bit address.
pub const ADC_ADDR: u8 = 0x48;

// ---------------------------------------------------------------------------
// Operator buttons (active-low, internal pull-up, both edges)
// ---------------------------------------------------------------------------

pub const DASHBOARD_BUTTON_GPIO: i32 = 4;
pub const GAUGE_BUTTON_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Tri-colour status indicator (active-low channels + common line)
// ---------------------------------------------------------------------------

pub const LED_GREEN_GPIO: i32 = 10;
pub const LED_ORANGE_GPIO: i32 = 11;
pub const LED_RED_GPIO: i32 = 12;
pub const LED_COMMON_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// RGB gauge light
// ---------------------------------------------------------------------------

pub const GAUGE_RED_GPIO: i32 = 14;
pub const GAUGE_GREEN_GPIO: i32 = 15;
pub const GAUGE_BLUE_GPIO: i32 = 16;
pub const GAUGE_COMMON_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// Buzzer
// ---------------------------------------------------------------------------

pub const BUZZER_GPIO: i32 = 18;
