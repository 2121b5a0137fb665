//! Concrete mode handler functions and table builder.
//!
//! Each mode is two plain `fn` pointers: the entry action and the per-tick
//! update.  Exits have no side effects of their own; the next mode's entry
//! fully decides the outputs.
//!
//! Heating tests the overheat limit before the ready threshold, so oil
//! already above MAX goes straight to EMERGENCY without the ready chime.
//!
//! ```text
//!        ┌──────[power]──────┐
//!        ▼                   │
//!       OFF ──[power]──▶ HEATING ◀──[t < MIN]──┬──────────┐
//!                            │                 │          │
//!                  [t > MIN+TOL]               │          │
//!                            ▼                 │          │
//!                          READY ──[confirm]──▶ OIL       │
//!                            ▲ ◀──[confirm]──── │         │
//!                            │                  │         │
//!                  [t < MAX-TOL]        [t > MAX] (Heating, Ready, Oil)
//!                            │                  ▼
//!                            └────────────── EMERGENCY
//!
//!  Any mode but OFF ──[bus broken]──▶ ERROR ──[bus ok]──▶ previous mode
//!  Any mode but OFF ──[power]──▶ OFF
//! ```

use super::context::{Effect, FsmContext, Transition};
use super::{AlerterMode, HeatingMode, ModeDescriptor};
use crate::bus::BusConnectionState;
use crate::drivers::button::Action;
use crate::drivers::buzzer::Melody;
use crate::drivers::relay::RelayMask;
use crate::drivers::status_led::IndicatorMode;
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static mode table.  Called once at startup.
pub fn build_mode_table() -> [ModeDescriptor; HeatingMode::COUNT] {
    [
        // Index 0: Off
        ModeDescriptor {
            mode: HeatingMode::Off,
            name: "OFF",
            on_enter: off_enter,
            on_update: off_update,
        },
        // Index 1: Heating
        ModeDescriptor {
            mode: HeatingMode::Heating,
            name: "HEATING",
            on_enter: heating_enter,
            on_update: heating_update,
        },
        // Index 2: Ready
        ModeDescriptor {
            mode: HeatingMode::Ready,
            name: "READY",
            on_enter: ready_enter,
            on_update: ready_update,
        },
        // Index 3: Oil
        ModeDescriptor {
            mode: HeatingMode::Oil,
            name: "OIL",
            on_enter: oil_enter,
            on_update: oil_update,
        },
        // Index 4: Emergency
        ModeDescriptor {
            mode: HeatingMode::Emergency,
            name: "EMERGENCY",
            on_enter: emergency_enter,
            on_update: emergency_update,
        },
        // Index 5: Error
        ModeDescriptor {
            mode: HeatingMode::Error,
            name: "ERROR",
            on_enter: error_enter,
            on_update: error_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  OFF
// ═══════════════════════════════════════════════════════════════════════════

fn off_enter(ctx: &mut FsmContext) {
    ctx.emit(Effect::Relays(RelayMask::OFF));
    ctx.emit(Effect::Indicator(IndicatorMode::AllOff));
}

/// Power-on is handled by the engine before the mode update runs.
fn off_update(_ctx: &mut FsmContext) -> Option<Transition> {
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  HEATING
// ═══════════════════════════════════════════════════════════════════════════

fn heating_enter(ctx: &mut FsmContext) {
    ctx.emit(Effect::Relays(RelayMask::PUMP_HEATER));
    ctx.emit(Effect::Indicator(IndicatorMode::RedOn));
}

fn heating_update(ctx: &mut FsmContext) -> Option<Transition> {
    let t = ctx.thresholds;
    // Overheat wins over the ready handover, or a hot start would park in
    // Ready for a tick with the heater still on.
    if ctx.temperature > t.max {
        warn!("Heating: oil at {} °C above {} °C", ctx.temperature, t.max);
        return Some(Transition::silent(HeatingMode::Emergency));
    }
    if ctx.temperature > t.ready_above() {
        info!("Heating: oil at {} °C, ready", ctx.temperature);
        return Some(Transition::chime(HeatingMode::Ready, Melody::OilReady));
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  READY
// ═══════════════════════════════════════════════════════════════════════════

fn ready_enter(ctx: &mut FsmContext) {
    ctx.emit(Effect::Relays(RelayMask::PUMP_HEATER));
    ctx.emit(Effect::Indicator(IndicatorMode::OrangeBlink));
}

fn ready_update(ctx: &mut FsmContext) -> Option<Transition> {
    if let Some(next) = band_guard(ctx) {
        return Some(next);
    }
    if ctx.action == Action::Confirm {
        return Some(Transition::chime(HeatingMode::Oil, Melody::OilFlowing));
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  OIL
// ═══════════════════════════════════════════════════════════════════════════

fn oil_enter(ctx: &mut FsmContext) {
    ctx.emit(Effect::Relays(RelayMask::OIL_FLOW));
    ctx.emit(Effect::Indicator(IndicatorMode::GreenOn));
}

fn oil_update(ctx: &mut FsmContext) -> Option<Transition> {
    if let Some(next) = band_guard(ctx) {
        return Some(next);
    }
    if ctx.action == Action::Confirm {
        return Some(Transition::chime(HeatingMode::Ready, Melody::OilStopped));
    }
    None
}

/// Shared by Ready and Oil: too cold goes back to Heating, too hot to
/// Emergency.
fn band_guard(ctx: &FsmContext) -> Option<Transition> {
    let t = ctx.thresholds;
    if ctx.temperature < t.min {
        info!("oil cooled to {} °C, reheating", ctx.temperature);
        Some(Transition::silent(HeatingMode::Heating))
    } else if ctx.temperature > t.max {
        warn!("oil at {} °C above {} °C", ctx.temperature, t.max);
        Some(Transition::silent(HeatingMode::Emergency))
    } else {
        None
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  EMERGENCY
// ═══════════════════════════════════════════════════════════════════════════

fn emergency_enter(ctx: &mut FsmContext) {
    ctx.emit(Effect::Relays(RelayMask::OFF));
    ctx.emit(Effect::Indicator(IndicatorMode::RedBlink));
    ctx.alerter = AlerterMode::Enabled;
    ctx.emit(Effect::Play(Melody::OverheatAlarm));
}

fn emergency_update(ctx: &mut FsmContext) -> Option<Transition> {
    if ctx.temperature < ctx.thresholds.cooled_below() {
        info!("Emergency: oil cooled to {} °C", ctx.temperature);
        return Some(Transition::chime(HeatingMode::Ready, Melody::Cooled));
    }
    acknowledge_or_alert(ctx, Melody::OverheatAlarm);
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ERROR
// ═══════════════════════════════════════════════════════════════════════════

fn error_enter(ctx: &mut FsmContext) {
    // A broken expander cannot take a write this tick anyway; the relay
    // hook keeps re-sending the last mask.  With only the ADC lost, the
    // expander still listens, so drop every output.
    if ctx.bus.relay == BusConnectionState::Ok {
        ctx.emit(Effect::Relays(RelayMask::OFF));
    }
    ctx.emit(Effect::Indicator(IndicatorMode::AllBlink));
    ctx.alerter = AlerterMode::Enabled;
}

fn error_update(ctx: &mut FsmContext) -> Option<Transition> {
    if !ctx.bus_state().is_broken() {
        info!("Error: bus recovered, restoring {}", ctx.previous);
        return Some(Transition::silent(ctx.previous));
    }
    acknowledge_or_alert(ctx, Melody::BusAlarm);
    None
}

/// Confirm silences the alert until the mode is re-entered.
fn acknowledge_or_alert(ctx: &mut FsmContext, alert: Melody) {
    if ctx.action == Action::Confirm {
        if ctx.alerter == AlerterMode::Enabled {
            info!("alert acknowledged");
        }
        ctx.alerter = AlerterMode::Disabled;
    } else if ctx.alerter == AlerterMode::Enabled {
        ctx.emit(Effect::Play(alert));
    }
}
