//! Scheduler tick source using ESP-IDF's esp_timer API.
//!
//! One periodic timer whose callback only calls
//! [`scheduler::signal_tick`](crate::scheduler::signal_tick).  The main
//! loop drains the pending count and runs the hooks.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR); the
//! callback still does nothing but an atomic increment.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
static mut TICK_TIMER: esp_timer_handle_t = core::ptr::null_mut();

/// SAFETY: TICK_TIMER is written once in `start_tick_timer()` before any
/// timer callbacks fire.  Only called from the single main task.
#[cfg(target_os = "espidf")]
unsafe fn tick_timer() -> esp_timer_handle_t { unsafe { TICK_TIMER } }

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(_arg: *mut core::ffi::c_void) {
    crate::scheduler::signal_tick();
}

use super::hw_init::HwInitError;

/// Start the periodic scheduler tick (`period_ms`, 1000 for 1 Hz).
#[cfg(target_os = "espidf")]
pub fn start_tick_timer(period_ms: u32) -> Result<(), HwInitError> {
    // SAFETY: TICK_TIMER is written here once at boot from the single
    // main-task context before any timer callbacks fire.  The callback
    // itself only performs an atomic increment.
    unsafe {
        let args = esp_timer_create_args_t {
            callback: Some(tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"sched\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&args, &raw mut TICK_TIMER);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::TimerFailed(ret));
        }
        let ret = esp_timer_start_periodic(tick_timer(), u64::from(period_ms) * 1_000);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::TimerFailed(ret));
        }
    }
    info!("hw_timer: scheduler tick every {} ms", period_ms);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn start_tick_timer(_period_ms: u32) -> Result<(), HwInitError> {
    log::info!("hw_timer(sim): tick timer not started (ticks signalled by caller)");
    Ok(())
}
