//! Shared mutable context threaded through every mode handler.
//!
//! `FsmContext` is the single struct that mode handlers read from and
//! write to: this tick's inputs (temperature, operator action, bus
//! health), the thresholds, the alerter latch, and the side effects the
//! engine wants applied.  Think of it as the "blackboard" in a blackboard
//! architecture.

use crate::bus::{BusConnectionState, BusHealth};
use crate::config::SystemConfig;
use crate::drivers::button::Action;
use crate::drivers::buzzer::Melody;
use crate::drivers::relay::RelayMask;
use crate::drivers::status_led::IndicatorMode;

use super::{AlerterMode, HeatingMode};

/// Most side effects a single tick can produce (two mode changes plus an
/// alert, with headroom).
pub const MAX_EFFECTS: usize = 12;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Fixed temperature band the heating logic works against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Lower safe bound.
    pub min: i16,
    /// Upper safe bound.
    pub max: i16,
    /// Hysteresis width.
    pub tolerance: i16,
}

impl Thresholds {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            min: config.min_oil_temp_c,
            max: config.max_oil_temp_c,
            tolerance: config.tolerance_c,
        }
    }

    /// Heating hands over to Ready strictly above this.
    pub const fn ready_above(&self) -> i16 {
        self.min + self.tolerance
    }

    /// Emergency hands back to Ready strictly below this.
    pub const fn cooled_below(&self) -> i16 {
        self.max - self.tolerance
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from_config(&SystemConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Effects (written by the engine and handlers; applied by the service)
// ---------------------------------------------------------------------------

/// One output the service must apply after the tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Relays(RelayMask),
    Indicator(IndicatorMode),
    Play(Melody),
}

/// A requested mode change and the cue keyed to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub to: HeatingMode,
    pub chime: Option<Melody>,
}

impl Transition {
    pub const fn silent(to: HeatingMode) -> Self {
        Self { to, chime: None }
    }

    pub const fn chime(to: HeatingMode, melody: Melody) -> Self {
        Self { to, chime: Some(melody) }
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FsmContext {
    // -- inputs, refreshed before every tick --
    pub temperature: i16,
    /// Action taken from the mailbox for this tick.
    pub action: Action,
    pub bus: BusHealth,

    // -- state --
    pub thresholds: Thresholds,
    pub alerter: AlerterMode,
    /// Mode to restore when Error resolves (mirrored by the engine).
    pub previous: HeatingMode,

    // -- outputs, cleared at the start of every tick --
    pub effects: heapless::Vec<Effect, MAX_EFFECTS>,
}

impl FsmContext {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            temperature: config.initial_oil_temp_c,
            action: Action::None,
            bus: BusHealth::default(),
            thresholds: Thresholds::from_config(config),
            alerter: AlerterMode::Enabled,
            previous: HeatingMode::Off,
            effects: heapless::Vec::new(),
        }
    }

    /// Load this tick's inputs.
    pub fn observe(&mut self, temperature: i16, action: Action, bus: BusHealth) {
        self.temperature = temperature;
        self.action = action;
        self.bus = bus;
    }

    pub fn bus_state(&self) -> BusConnectionState {
        self.bus.overall()
    }

    /// Queue a side effect for the service to apply.
    pub fn emit(&mut self, effect: Effect) {
        if self.effects.push(effect).is_err() {
            debug_assert!(false, "effect queue overflow");
            log::error!("FSM: effect queue full, dropped {:?}", effect);
        }
    }

    /// Take the queued effects, leaving the queue empty.
    pub fn drain_effects(&mut self) -> heapless::Vec<Effect, MAX_EFFECTS> {
        core::mem::take(&mut self.effects)
    }
}
