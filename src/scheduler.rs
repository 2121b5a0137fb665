//! Cooperative 1 Hz hook scheduler.
//!
//! The only scheduling primitive in the firmware.  Hooks are registered
//! once at startup and run in registration order on every tick.
//!
//! ```text
//! ┌───────────────┐  signal_tick()   ┌──────────────────┐
//! │  1 Hz timer   │ ───────────────▶ │  PENDING_TICKS   │  (atomic counter)
//! │  (ISR / task) │                  └────────┬─────────┘
//! └───────────────┘                           │ take_pending_ticks()
//!                                             ▼
//!                         main loop ──▶ Scheduler::tick(ctx)
//!                                        ├─ hook 0  buttons
//!                                        ├─ hook 1  leds
//!                                        ├─ hook 2  relay
//!                                        └─ hook 3  heating
//! ```
//!
//! The timer callback only bumps a counter.  Every hook runs to
//! completion in the main context, so hooks never race each other or
//! the console.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use log::{info, warn};

/// Default number of hook slots.
pub const MAX_HOOKS: usize = 10;

// ═══════════════════════════════════════════════════════════════
//  Tick source hand-off
// ═══════════════════════════════════════════════════════════════

/// Ticks signalled by the timer and not yet run by the main loop.
static PENDING_TICKS: AtomicU32 = AtomicU32::new(0);

/// Record one elapsed tick.  Safe to call from interrupt context.
pub fn signal_tick() {
    PENDING_TICKS.fetch_add(1, Ordering::Release);
}

/// Take every tick signalled since the last call.
pub fn take_pending_ticks() -> u32 {
    PENDING_TICKS.swap(0, Ordering::Acquire)
}

// ═══════════════════════════════════════════════════════════════
//  Hook registry
// ═══════════════════════════════════════════════════════════════

/// Hook body.  Receives the shared system context on every tick.
pub type HookFn<C> = fn(&mut C);

/// A named entry in the hook registry.
pub struct Hook<C> {
    pub name: &'static str,
    pub run: HookFn<C>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// Every hook slot is taken.
    CapacityExceeded { capacity: usize },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { capacity } => {
                write!(f, "hook registry full ({capacity} slots)")
            }
        }
    }
}

impl core::error::Error for SchedulerError {}

/// Append-only, fixed-capacity hook registry.
pub struct Scheduler<C, const N: usize = MAX_HOOKS> {
    hooks: heapless::Vec<Hook<C>, N>,
    ticks: u64,
}

impl<C, const N: usize> Scheduler<C, N> {
    pub const fn new() -> Self {
        Self {
            hooks: heapless::Vec::new(),
            ticks: 0,
        }
    }

    /// Append a hook.  Returns its slot index.
    ///
    /// Only called while wiring the system; a full registry is a startup
    /// configuration error.
    pub fn register(&mut self, name: &'static str, run: HookFn<C>) -> Result<usize, SchedulerError> {
        let slot = self.hooks.len();
        self.hooks
            .push(Hook { name, run })
            .map_err(|_| SchedulerError::CapacityExceeded { capacity: N })?;
        info!("Scheduler: hook '{}' at slot {}", name, slot);
        Ok(slot)
    }

    /// Run every hook once, in registration order.
    pub fn tick(&mut self, ctx: &mut C) {
        self.ticks = self.ticks.wrapping_add(1);
        for hook in &self.hooks {
            (hook.run)(ctx);
        }
    }

    /// Run one tick per signalled tick.  Returns how many ran.
    ///
    /// More than one pending tick means the previous pass overran its
    /// period; the backlog is still run so that per-tick counters (button
    /// hold time, blink phase) stay in step with wall time.
    pub fn run_pending(&mut self, ctx: &mut C) -> u32 {
        let pending = take_pending_ticks();
        if pending > 1 {
            warn!("Scheduler: {} ticks pending, loop overran", pending);
        }
        for _ in 0..pending {
            self.tick(ctx);
        }
        pending
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Hook names in execution order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.hooks.iter().map(|h| h.name)
    }

    /// Ticks run since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl<C, const N: usize> Default for Scheduler<C, N> {
    fn default() -> Self {
        Self::new()
    }
}
