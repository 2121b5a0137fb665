//! Function-pointer finite state machine for the heating cycle.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  ModeTable                                           │
//! │  ┌───────────┬───────────┬──────────────────────┐    │
//! │  │ Mode      │ on_enter  │ on_update            │    │
//! │  ├───────────┼───────────┼──────────────────────┤    │
//! │  │ Off       │ fn(ctx)   │ fn(ctx)->Option<..>  │    │
//! │  │ Heating   │ fn(ctx)   │ fn(ctx)->Option<..>  │    │
//! │  │ Ready     │ fn(ctx)   │ fn(ctx)->Option<..>  │    │
//! │  │ Oil       │ fn(ctx)   │ fn(ctx)->Option<..>  │    │
//! │  │ Emergency │ fn(ctx)   │ fn(ctx)->Option<..>  │    │
//! │  │ Error     │ fn(ctx)   │ fn(ctx)->Option<..>  │    │
//! │  └───────────┴───────────┴──────────────────────┘    │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick runs in two phases:
//!
//! 1. **Supervisor.**  Outside Off, a broken bus forces Error and a
//!    power toggle forces Off.  In Off, a power toggle starts Heating.
//! 2. **Mode update.**  `on_update` of the mode that is current *after*
//!    the supervisor.  A returned transition is applied, but the new
//!    mode's update waits for the next tick.
//!
//! Mode changes go through [`HeatingFsm::set_mode`], which does nothing
//! when the target is already current.  Outputs are never written
//! directly: handlers queue [`context::Effect`]s for the service.

pub mod context;
pub mod states;

use core::fmt;

use context::{FsmContext, Transition};
use log::info;

use crate::drivers::button::Action;
use crate::drivers::buzzer::Melody;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// Must stay in sync with the table built in [`states::build_mode_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum HeatingMode {
    #[default]
    Off = 0,
    Heating = 1,
    Ready = 2,
    Oil = 3,
    Emergency = 4,
    Error = 5,
}

impl HeatingMode {
    pub const COUNT: usize = 6;

    pub const ALL: [HeatingMode; Self::COUNT] = [
        Self::Off,
        Self::Heating,
        Self::Ready,
        Self::Oil,
        Self::Emergency,
        Self::Error,
    ];

    /// Convert a table index back to a mode.  Falls back to `Error` (the
    /// mode that drives safe outputs) on an out-of-range index.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Off,
            1 => Self::Heating,
            2 => Self::Ready,
            3 => Self::Oil,
            4 => Self::Emergency,
            5 => Self::Error,
            _ => {
                debug_assert!(false, "invalid mode index: {idx}");
                Self::Error
            }
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Heating => "HEATING",
            Self::Ready => "READY",
            Self::Oil => "OIL",
            Self::Emergency => "EMERGENCY",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for HeatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether Emergency and Error keep sounding their alert every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlerterMode {
    #[default]
    Enabled,
    Disabled,
}

impl fmt::Display for AlerterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => f.write_str("enabled"),
            Self::Disabled => f.write_str("disabled"),
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Entry action, run once each time the mode is entered.
pub type ModeActionFn = fn(&mut FsmContext);

/// Per-tick update.  Returns `Some(transition)` to change mode.
pub type ModeUpdateFn = fn(&mut FsmContext) -> Option<Transition>;

/// Static descriptor for one mode.  Stored in a fixed-size array.
pub struct ModeDescriptor {
    pub mode: HeatingMode,
    pub name: &'static str,
    pub on_enter: ModeActionFn,
    pub on_update: ModeUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct HeatingFsm {
    /// Indexed by `HeatingMode as usize`.
    table: [ModeDescriptor; HeatingMode::COUNT],
    current: usize,
    /// Single history slot, overwritten on every change.
    previous: HeatingMode,
    tick_count: u64,
    mode_entry_tick: u64,
}

impl HeatingFsm {
    /// A new engine in Off.  Call [`start`](Self::start) before the
    /// first tick.
    pub fn new(table: [ModeDescriptor; HeatingMode::COUNT]) -> Self {
        Self {
            table,
            current: HeatingMode::Off as usize,
            previous: HeatingMode::Off,
            tick_count: 0,
            mode_entry_tick: 0,
        }
    }

    /// Apply the entry outputs of the starting mode.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in mode: {}", self.table[self.current].name);
        ctx.previous = self.previous;
        (self.table[self.current].on_enter)(ctx);
    }

    /// Advance one tick.  `ctx` must already hold this tick's inputs.
    pub fn tick(&mut self, ctx: &mut FsmContext) {
        self.tick_count = self.tick_count.wrapping_add(1);
        self.supervise(ctx);

        let update = self.table[self.current].on_update;
        if let Some(next) = update(ctx) {
            self.apply(next, ctx);
        }
    }

    /// Switch to `next` and run its entry action.  Returns `false`, with
    /// no side effects at all, when `next` is already current.
    pub fn set_mode(&mut self, next: HeatingMode, ctx: &mut FsmContext) -> bool {
        let next_idx = next as usize;
        if next_idx == self.current {
            return false;
        }

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        self.previous = self.mode();
        ctx.previous = self.previous;
        self.current = next_idx;
        self.mode_entry_tick = self.tick_count;

        (self.table[self.current].on_enter)(ctx);
        true
    }

    pub fn mode(&self) -> HeatingMode {
        HeatingMode::from_index(self.current)
    }

    pub fn previous(&self) -> HeatingMode {
        self.previous
    }

    pub fn ticks_in_current_mode(&self) -> u64 {
        self.tick_count.wrapping_sub(self.mode_entry_tick)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn supervise(&mut self, ctx: &mut FsmContext) {
        if self.mode() != HeatingMode::Off {
            if ctx.bus_state().is_broken() {
                self.set_mode(HeatingMode::Error, ctx);
            }
            if ctx.action == Action::PowerToggle {
                self.apply(Transition::chime(HeatingMode::Off, Melody::PowerOff), ctx);
            }
        } else if ctx.action == Action::PowerToggle {
            self.apply(Transition::chime(HeatingMode::Heating, Melody::PowerOn), ctx);
        }
    }

    /// Chimes only sound when the mode actually changed.
    fn apply(&mut self, transition: Transition, ctx: &mut FsmContext) {
        if self.set_mode(transition.to, ctx) {
            if let Some(melody) = transition.chime {
                ctx.emit(context::Effect::Play(melody));
            }
        }
    }
}

impl Default for HeatingFsm {
    fn default() -> Self {
        Self::new(states::build_mode_table())
    }
}
