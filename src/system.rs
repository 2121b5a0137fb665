//! Top-level wiring: hardware adapter, heating service, event sink, the
//! tick hooks and the console command table.
//!
//! ```text
//!  Scheduler::tick(&mut System)
//!    ├─ buttons  hw.poll_buttons()
//!    ├─ leds     hw.blink_indicator()
//!    ├─ relay    hw.refresh_relays()
//!    └─ heating  service.tick(hw, sink)
//! ```
//!
//! The relay hook runs before the heating hook, so a mask commanded by
//! the FSM reaches the expander on the following tick and the FSM always
//! sees a relay connection state that is at most one hook old.

use core::fmt::{self, Write};

use crate::app::ports::{ActuatorPort, DebugPort, EventSink, PeripheralPort, SensorPort};
use crate::app::service::HeatingService;
use crate::config::SystemConfig;
use crate::drivers::{hw_init, hw_timer};
use crate::error;
use crate::scheduler::{Scheduler, SchedulerError};
use crate::shell::{Command, Dispatch, Shell};

/// Hook names in execution order.
pub const HOOK_ORDER: [&str; 4] = ["buttons", "leds", "relay", "heating"];

/// Console commands besides the built-in `help`.
pub const COMMAND_COUNT: usize = 5;

pub struct System<H, S> {
    pub hw: H,
    pub service: HeatingService,
    pub sink: S,
    config: SystemConfig,
}

impl<H, S> System<H, S>
where
    H: SensorPort + ActuatorPort + PeripheralPort + DebugPort,
    S: EventSink,
{
    pub fn new(hw: H, sink: S, config: SystemConfig) -> Self {
        Self {
            hw,
            service: HeatingService::new(&config),
            sink,
            config,
        }
    }

    /// Apply the Off outputs and play the boot melody.
    pub fn start(&mut self) {
        self.service.start(&mut self.hw, &mut self.sink);
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Validate the configuration, then arm the button interrupts and the
    /// tick timer.  Hooks must be installed before the first tick is run.
    pub fn arm(&self) -> error::Result<()> {
        self.config.validate()?;
        hw_init::init_button_isrs()?;
        hw_timer::start_tick_timer(self.config.tick_interval_ms)?;
        Ok(())
    }

    // ── Hooks ─────────────────────────────────────────────────

    /// Register the four tick hooks in their fixed order.
    pub fn install_hooks<const N: usize>(
        scheduler: &mut Scheduler<Self, N>,
    ) -> Result<(), SchedulerError> {
        scheduler.register(HOOK_ORDER[0], Self::buttons_hook)?;
        scheduler.register(HOOK_ORDER[1], Self::leds_hook)?;
        scheduler.register(HOOK_ORDER[2], Self::relay_hook)?;
        scheduler.register(HOOK_ORDER[3], Self::heating_hook)?;
        Ok(())
    }

    fn buttons_hook(&mut self) {
        self.hw.poll_buttons();
    }

    fn leds_hook(&mut self) {
        self.hw.blink_indicator();
    }

    fn relay_hook(&mut self) {
        self.hw.refresh_relays();
    }

    fn heating_hook(&mut self) {
        self.service.tick(&mut self.hw, &mut self.sink);
    }

    // ── Console ───────────────────────────────────────────────

    pub fn shell(&self) -> Shell<Self, COMMAND_COUNT> {
        Shell::new(
            [
                Command {
                    name: "status",
                    description: "show heater status",
                    debug: false,
                    run: Self::cmd_status,
                },
                Command {
                    name: "temp",
                    description: "show, set or clear (off) the oil temperature override",
                    debug: true,
                    run: Self::cmd_temp,
                },
                Command {
                    name: "pcf",
                    description: "read/write from/to PCF8574 (relays)",
                    debug: true,
                    run: Self::cmd_pcf,
                },
                Command {
                    name: "report",
                    description: "toggle per-tick temperature report",
                    debug: false,
                    run: Self::cmd_report,
                },
                Command {
                    name: "config",
                    description: "dump configuration as JSON",
                    debug: false,
                    run: Self::cmd_config,
                },
            ],
            self.config.debug_commands,
        )
    }

    /// Run one console line.
    pub fn dispatch(
        &mut self,
        shell: &Shell<Self, COMMAND_COUNT>,
        line: &str,
        out: &mut dyn Write,
    ) -> Result<Dispatch, fmt::Error> {
        shell.dispatch(self, line, out)
    }

    fn cmd_status(&mut self, _args: &str, out: &mut dyn Write) -> fmt::Result {
        let report = self
            .service
            .status(self.hw.relay_mask(), self.hw.last_temperature());
        writeln!(out, "{report}")
    }

    fn cmd_temp(&mut self, args: &str, out: &mut dyn Write) -> fmt::Result {
        match args.split_whitespace().next() {
            None => writeln!(out, "t={}", self.hw.last_temperature()),
            Some("off") => {
                self.hw.set_temperature_override(None);
                writeln!(out, "temperature override cleared")
            }
            Some(arg) => match arg.parse::<i16>() {
                Ok(celsius) => {
                    self.hw.set_temperature_override(Some(celsius));
                    writeln!(out, "set temperature to {celsius}")
                }
                Err(_) => writeln!(out, "usage: temp [<celsius>|off]"),
            },
        }
    }

    fn cmd_pcf(&mut self, args: &str, out: &mut dyn Write) -> fmt::Result {
        match args.split_whitespace().next().and_then(parse_byte) {
            Some(byte) => match self.hw.write_relay_port(byte) {
                Ok(()) => writeln!(out, "write {byte:#04x} to pcf data"),
                Err(_) => writeln!(out, "unable to write to pcf"),
            },
            None => {
                writeln!(out, "Reading PCF value...")?;
                match self.hw.read_relay_port() {
                    Ok(byte) => writeln!(out, "pcf data = {byte:#04x}"),
                    Err(_) => writeln!(out, "unable to read pcf data"),
                }
            }
        }
    }

    fn cmd_report(&mut self, _args: &str, out: &mut dyn Write) -> fmt::Result {
        let on = self.service.toggle_report_mode();
        writeln!(out, "report mode {}", if on { "on" } else { "off" })
    }

    fn cmd_config(&mut self, _args: &str, out: &mut dyn Write) -> fmt::Result {
        match serde_json::to_string_pretty(&self.config) {
            Ok(json) => writeln!(out, "{json}"),
            Err(e) => writeln!(out, "unable to encode config: {e}"),
        }
    }
}

/// Decimal or `0x`-prefixed hex byte.
fn parse_byte(text: &str) -> Option<u8> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}
