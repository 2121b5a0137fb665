//! Operator buttons and the single-slot action mailbox.
//!
//! ## Hardware
//!
//! Two momentary switches, one on the dashboard and one next to the
//! temperature gauge.  Each GPIO interrupts on both edges; the edge
//! handler only latches the press and, on release, posts the short-press
//! action.  Long-press detection counts scheduler ticks in the `buttons`
//! hook.
//!
//! ## Gestures
//!
//! | Button    | Gesture                     | Action        |
//! |-----------|-----------------------------|---------------|
//! | dashboard | release before 2nd tick     | `Confirm`     |
//! | dashboard | held across 2 ticks         | `PowerToggle` |
//! | gauge     | release                     | `LightToggle` |

use core::cell::Cell;
use core::sync::atomic::{AtomicU8, Ordering};

use critical_section::Mutex;

/// Ticks a press must be held before it counts as long.
pub const LONG_PRESS_TICKS: u8 = 2;

/// A discrete operator request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Action {
    #[default]
    None = 0,
    Confirm = 1,
    PowerToggle = 2,
    LightToggle = 3,
}

impl Action {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Confirm,
            2 => Self::PowerToggle,
            3 => Self::LightToggle,
            _ => Self::None,
        }
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

// ── Mailbox ───────────────────────────────────────────────────

/// Capacity-1 hand-off from interrupt producers to the heating tick.
///
/// A post while an action is still pending is refused, never
/// overwritten, so every delivered action was seen by exactly one
/// [`take`](Self::take).
pub struct ActionMailbox(AtomicU8);

impl ActionMailbox {
    pub const fn new() -> Self {
        Self(AtomicU8::new(Action::None as u8))
    }

    /// Returns `false` if the slot was occupied and `action` was dropped.
    pub fn post(&self, action: Action) -> bool {
        if action.is_none() {
            return false;
        }
        self.0
            .compare_exchange(
                Action::None as u8,
                action as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Read and clear in one atomic step.
    pub fn take(&self) -> Action {
        Action::from_u8(self.0.swap(Action::None as u8, Ordering::AcqRel))
    }

    pub fn is_empty(&self) -> bool {
        self.0.load(Ordering::Acquire) == Action::None as u8
    }
}

impl Default for ActionMailbox {
    fn default() -> Self {
        Self::new()
    }
}

// ── Per-button latch ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
struct Latch {
    pressed: bool,
    held_ticks: u8,
}

pub struct ButtonChannel {
    latch: Mutex<Cell<Latch>>,
    short: Action,
    long: Option<Action>,
}

impl ButtonChannel {
    pub const fn new(short: Action, long: Option<Action>) -> Self {
        Self {
            latch: Mutex::new(Cell::new(Latch {
                pressed: false,
                held_ticks: 0,
            })),
            short,
            long,
        }
    }

    /// Edge interrupt body.  `pressed` is the new switch level.
    pub fn on_edge(&self, pressed: bool, mailbox: &ActionMailbox) {
        critical_section::with(|cs| {
            let cell = self.latch.borrow(cs);
            let mut latch = cell.get();
            if pressed {
                latch = Latch {
                    pressed: true,
                    held_ticks: 0,
                };
            } else {
                if latch.pressed && latch.held_ticks < LONG_PRESS_TICKS {
                    mailbox.post(self.short);
                }
                latch.pressed = false;
            }
            cell.set(latch);
        });
    }

    /// Tick hook body: advance the hold counter of a long-press button.
    pub fn on_tick(&self, mailbox: &ActionMailbox) {
        let Some(long) = self.long else {
            return;
        };
        critical_section::with(|cs| {
            let cell = self.latch.borrow(cs);
            let mut latch = cell.get();
            if latch.pressed {
                latch.held_ticks = latch.held_ticks.saturating_add(1);
                if latch.held_ticks >= LONG_PRESS_TICKS {
                    mailbox.post(long);
                    latch.pressed = false;
                }
            }
            cell.set(latch);
        });
    }

    pub fn is_pressed(&self) -> bool {
        critical_section::with(|cs| self.latch.borrow(cs).get().pressed)
    }
}

// ── Panel ─────────────────────────────────────────────────────

/// The board's buttons, shared by the GPIO edge handlers and the main loop.
pub static BUTTONS: ButtonPanel = ButtonPanel::new();

/// Both buttons and their shared mailbox.  Lives in a `static` so the
/// GPIO interrupt handlers can reach it.
pub struct ButtonPanel {
    pub mailbox: ActionMailbox,
    pub dashboard: ButtonChannel,
    pub gauge: ButtonChannel,
}

impl ButtonPanel {
    pub const fn new() -> Self {
        Self {
            mailbox: ActionMailbox::new(),
            dashboard: ButtonChannel::new(Action::Confirm, Some(Action::PowerToggle)),
            gauge: ButtonChannel::new(Action::LightToggle, None),
        }
    }

    /// Dashboard button edge (interrupt context).
    pub fn dashboard_edge(&self, pressed: bool) {
        self.dashboard.on_edge(pressed, &self.mailbox);
    }

    /// Gauge button edge (interrupt context).
    pub fn gauge_edge(&self, pressed: bool) {
        self.gauge.on_edge(pressed, &self.mailbox);
    }

    /// `buttons` hook body.
    pub fn tick(&self) {
        self.dashboard.on_tick(&self.mailbox);
        self.gauge.on_tick(&self.mailbox);
    }

    pub fn take_action(&self) -> Action {
        self.mailbox.take()
    }
}

impl Default for ButtonPanel {
    fn default() -> Self {
        Self::new()
    }
}
