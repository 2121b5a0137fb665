//! One-shot GPIO interrupt setup for the operator buttons.
//!
//! Lines driven through `esp-idf-hal` pin drivers (bus, indicators,
//! buzzer) are configured in `main()`; the buttons use raw ESP-IDF sys
//! calls so their edge handlers can be plain `extern "C"` functions that
//! only touch [`BUTTONS`](crate::drivers::button::BUTTONS).

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    TimerFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::TimerFailed(rc) => write!(f, "tick timer failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

// ── Button ISRs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::drivers::button::BUTTONS;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
unsafe extern "C" fn dashboard_button_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: gpio_get_level is a register read; safe in ISR context.
    let pressed = unsafe { gpio_get_level(pins::DASHBOARD_BUTTON_GPIO) } == 0;
    BUTTONS.dashboard_edge(pressed);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn gauge_button_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: gpio_get_level is a register read; safe in ISR context.
    let pressed = unsafe { gpio_get_level(pins::GAUGE_BUTTON_GPIO) } == 0;
    BUTTONS.gauge_edge(pressed);
}

/// Configure both button inputs and register their edge handlers.
/// Call before the main loop starts.
#[cfg(target_os = "espidf")]
pub fn init_button_isrs() -> Result<(), HwInitError> {
    let buttons: [(i32, unsafe extern "C" fn(*mut core::ffi::c_void)); 2] = [
        (pins::DASHBOARD_BUTTON_GPIO, dashboard_button_isr),
        (pins::GAUGE_BUTTON_GPIO, gauge_button_isr),
    ];

    // SAFETY: called once from main() before the main loop; the handlers
    // registered below only update the critical-section guarded latches.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        for (pin, handler) in buttons {
            let cfg = gpio_config_t {
                pin_bit_mask: 1u64 << pin,
                mode: gpio_mode_t_GPIO_MODE_INPUT,
                pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
                pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
                intr_type: gpio_int_type_t_GPIO_INTR_ANYEDGE,
            };
            let ret = gpio_config(&cfg);
            if ret != ESP_OK as i32 {
                return Err(HwInitError::GpioConfigFailed(ret));
            }
            let ret = gpio_isr_handler_add(pin, Some(handler), core::ptr::null_mut());
            if ret != ESP_OK as i32 {
                return Err(HwInitError::IsrInstallFailed(ret));
            }
        }
    }
    info!("hw_init: button ISRs installed (dashboard, gauge)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_button_isrs() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): button ISRs skipped");
    Ok(())
}
