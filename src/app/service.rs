//! Application service: the hexagonal core.
//!
//! [`HeatingService`] owns the FSM and its context.  All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │     HeatingService     │
//! ActuatorPort ◀──│  FSM · gauge · report  │
//!                 └────────────────────────┘
//! ```

use core::fmt;

use log::{info, warn};

use crate::bus::{BusConnectionState, BusHealth};
use crate::config::SystemConfig;
use crate::drivers::button::Action;
use crate::drivers::buzzer::Melody;
use crate::drivers::gauge::GaugeColour;
use crate::drivers::relay::{Actuator, RelayMask};
use crate::fsm::context::{Effect, FsmContext};
use crate::fsm::{AlerterMode, HeatingFsm, HeatingMode};
use crate::sensors::temperature::Temperature;

use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink, SensorPort};

// ───────────────────────────────────────────────────────────────
// HeatingService
// ───────────────────────────────────────────────────────────────

pub struct HeatingService {
    fsm: HeatingFsm,
    ctx: FsmContext,
    temperature: Temperature,
    gauge_lit: bool,
    /// Colour last sent to the gauge.
    gauge: GaugeColour,
    report_mode: bool,
    tick_count: u64,
}

impl HeatingService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM: call [`start`](Self::start) next.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            fsm: HeatingFsm::default(),
            ctx: FsmContext::new(config),
            temperature: Temperature::measured(config.initial_oil_temp_c),
            gauge_lit: true,
            gauge: GaugeColour::Off,
            report_mode: config.report_mode,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Apply the Off outputs, light the gauge and play the boot melody.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        self.apply_effects(hw);
        self.update_gauge(hw);
        hw.play(Melody::Boot);
        sink.emit(&AppEvent::Started(self.fsm.mode()));
        info!("HeatingService started in {}", self.fsm.mode());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one heating cycle: sample → FSM → outputs → events.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(&mut self, hw: &mut (impl SensorPort + ActuatorPort), sink: &mut impl EventSink) {
        self.tick_count += 1;
        let prev_mode = self.fsm.mode();
        let prev_health = self.ctx.bus;

        // 1. Inputs.  The ADC transaction happens inside the read, so
        //    health is sampled after it.
        self.temperature = hw.read_temperature();
        let action = hw.take_action();
        let health = hw.bus_health();

        if action == Action::LightToggle {
            self.gauge_lit = !self.gauge_lit;
            info!("gauge light {}", if self.gauge_lit { "on" } else { "off" });
        }

        // 2. FSM tick (pure mode logic)
        self.ctx.observe(self.temperature.celsius, action, health);
        self.fsm.tick(&mut self.ctx);

        // 3. Outputs
        self.apply_effects(hw);
        self.update_gauge(hw);

        // 4. Events
        self.emit_bus_events(prev_health, health, sink);
        let mode = self.fsm.mode();
        if mode != prev_mode {
            sink.emit(&AppEvent::ModeChanged {
                from: prev_mode,
                to: mode,
            });
        }
        if self.report_mode {
            sink.emit(&AppEvent::Report(self.temperature));
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> HeatingMode {
        self.fsm.mode()
    }

    pub fn previous_mode(&self) -> HeatingMode {
        self.fsm.previous()
    }

    pub fn alerter(&self) -> AlerterMode {
        self.ctx.alerter
    }

    /// Temperature used by the last tick.
    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    pub fn bus_health(&self) -> BusHealth {
        self.ctx.bus
    }

    pub fn gauge(&self) -> GaugeColour {
        self.gauge
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn report_mode(&self) -> bool {
        self.report_mode
    }

    /// Flip per-tick temperature reporting.  Returns the new setting.
    pub fn toggle_report_mode(&mut self) -> bool {
        self.report_mode = !self.report_mode;
        self.report_mode
    }

    /// Snapshot for the `status` command.  `relays` comes from the
    /// expander, which the service does not own.
    pub fn status(&self, relays: RelayMask, temperature: Temperature) -> StatusReport {
        StatusReport {
            mode: self.fsm.mode(),
            previous: self.fsm.previous(),
            temperature,
            relays,
            bus: self.ctx.bus,
            alerter: self.ctx.alerter,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply_effects(&mut self, hw: &mut impl ActuatorPort) {
        for effect in self.ctx.drain_effects() {
            match effect {
                Effect::Relays(mask) => hw.set_relays(mask),
                Effect::Indicator(mode) => hw.set_indicator(mode),
                Effect::Play(melody) => hw.play(melody),
            }
        }
    }

    fn update_gauge(&mut self, hw: &mut impl ActuatorPort) {
        let colour = if self.gauge_lit {
            GaugeColour::for_temperature(self.temperature.celsius, &self.ctx.thresholds)
        } else {
            GaugeColour::Off
        };
        if colour != self.gauge {
            hw.set_gauge(colour);
            self.gauge = colour;
        }
    }

    fn emit_bus_events(&self, before: BusHealth, after: BusHealth, sink: &mut impl EventSink) {
        let was = before.overall();
        let now = after.overall();
        if before != after && now == BusConnectionState::Broken {
            warn!("bus fault: relay={} adc={}", after.relay, after.adc);
            sink.emit(&AppEvent::BusFault {
                relay: after.relay,
                adc: after.adc,
            });
        } else if was.is_broken() && now == BusConnectionState::Ok {
            sink.emit(&AppEvent::BusRecovered);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Status report
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub mode: HeatingMode,
    pub previous: HeatingMode,
    pub temperature: Temperature,
    pub relays: RelayMask,
    pub bus: BusHealth,
    pub alerter: AlerterMode,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", self.mode)?;
        writeln!(f, "previous: {}", self.previous)?;
        writeln!(f, "t={}", self.temperature)?;
        for actuator in Actuator::ALL {
            writeln!(
                f,
                "{:<9}: {} (feedback {})",
                actuator.name(),
                if self.relays.commanded(actuator) { "on" } else { "off" },
                u8::from(self.relays.feedback(actuator)),
            )?;
        }
        writeln!(f, "bus: relay={} adc={}", self.bus.relay, self.bus.adc)?;
        write!(f, "alerter: {}", self.alerter)
    }
}
