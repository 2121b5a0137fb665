//! Mock hardware for integration tests.
//!
//! `MockHardware` records every port call so tests can assert on the full
//! command history.  `DevicePhy` models one bus device behind the
//! [`TwiPhy`] seam, with knobs for busy, contended and write-protected
//! behaviour.

use oilheat::app::events::AppEvent;
use oilheat::app::ports::{ActuatorPort, DebugPort, EventSink, PeripheralPort, SensorPort};
use oilheat::bus::{BusConnectionState, BusError, BusHealth, TwiPhy, TwiStatus};
use oilheat::drivers::button::Action;
use oilheat::drivers::buzzer::Melody;
use oilheat::drivers::gauge::GaugeColour;
use oilheat::drivers::relay::RelayMask;
use oilheat::drivers::status_led::IndicatorMode;
use oilheat::sensors::temperature::Temperature;

// ── Hardware call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwCall {
    SetRelays(RelayMask),
    SetIndicator(IndicatorMode),
    Play(Melody),
    SetGauge(GaugeColour),
    PollButtons,
    Blink,
    RefreshRelays,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<HwCall>,
    /// Probe reading returned while no override is set.
    pub temperature: i16,
    pub override_c: Option<i16>,
    pub last: Temperature,
    /// Delivered by the next `take_action`, then cleared.
    pub pending: Action,
    pub health: BusHealth,
    pub relays: RelayMask,
    pub port: u8,
    pub port_broken: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            temperature: 20,
            override_c: None,
            last: Temperature::measured(20),
            pending: Action::None,
            health: BusHealth::default(),
            relays: RelayMask::OFF,
            port: 0xFF,
            port_broken: false,
        }
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn melodies(&self) -> Vec<Melody> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Play(m) => Some(*m),
                _ => None,
            })
            .collect()
    }

    pub fn relay_writes(&self) -> Vec<RelayMask> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::SetRelays(m) => Some(*m),
                _ => None,
            })
            .collect()
    }

    pub fn last_indicator(&self) -> Option<IndicatorMode> {
        self.calls.iter().rev().find_map(|c| match c {
            HwCall::SetIndicator(m) => Some(*m),
            _ => None,
        })
    }

    pub fn last_gauge(&self) -> Option<GaugeColour> {
        self.calls.iter().rev().find_map(|c| match c {
            HwCall::SetGauge(g) => Some(*g),
            _ => None,
        })
    }

    pub fn break_relay(&mut self) {
        self.health.relay = BusConnectionState::Broken;
    }

    pub fn heal(&mut self) {
        self.health = BusHealth::default();
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_temperature(&mut self) -> Temperature {
        self.last = match self.override_c {
            Some(c) => Temperature::simulated(c),
            None => Temperature::measured(self.temperature),
        };
        self.last
    }

    fn take_action(&mut self) -> Action {
        core::mem::take(&mut self.pending)
    }

    fn bus_health(&self) -> BusHealth {
        self.health
    }
}

impl ActuatorPort for MockHardware {
    fn set_relays(&mut self, mask: RelayMask) {
        self.relays = mask;
        self.calls.push(HwCall::SetRelays(mask));
    }

    fn set_indicator(&mut self, mode: IndicatorMode) {
        self.calls.push(HwCall::SetIndicator(mode));
    }

    fn play(&mut self, melody: Melody) {
        self.calls.push(HwCall::Play(melody));
    }

    fn set_gauge(&mut self, colour: GaugeColour) {
        self.calls.push(HwCall::SetGauge(colour));
    }
}

impl PeripheralPort for MockHardware {
    fn poll_buttons(&mut self) {
        self.calls.push(HwCall::PollButtons);
    }

    fn blink_indicator(&mut self) {
        self.calls.push(HwCall::Blink);
    }

    fn refresh_relays(&mut self) -> BusConnectionState {
        self.calls.push(HwCall::RefreshRelays);
        self.health.relay
    }

    fn relay_mask(&self) -> RelayMask {
        self.relays
    }
}

impl DebugPort for MockHardware {
    fn set_temperature_override(&mut self, celsius: Option<i16>) {
        self.override_c = celsius;
    }

    fn last_temperature(&self) -> Temperature {
        match self.override_c {
            Some(c) => Temperature::simulated(c),
            None => self.last,
        }
    }

    fn write_relay_port(&mut self, byte: u8) -> Result<(), BusError> {
        if self.port_broken {
            return Err(BusError::Timeout);
        }
        self.port = byte;
        Ok(())
    }

    fn read_relay_port(&mut self) -> Result<u8, BusError> {
        if self.port_broken {
            return Err(BusError::Timeout);
        }
        Ok(self.port)
    }
}

// ── Recording event sink ──────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── DevicePhy ─────────────────────────────────────────────────

/// One device at `address` on an otherwise idle bus.
#[allow(dead_code)]
pub struct DevicePhy {
    pub address: u8,
    /// Address selections to NACK before the device answers.
    pub busy: u32,
    /// Address selections to lose to another master before anything else.
    pub contended: u32,
    pub write_protected: bool,
    /// NACK the read address after a good pointer cycle.
    pub refuse_read: bool,
    /// The START phase reports a bus fault.
    pub dead: bool,
    pub data: Vec<u8>,

    // ── observed ──
    pub starts: u32,
    pub stops: u32,
    pub selects: Vec<u8>,
    pub written: Vec<u8>,
    /// Ack bit the master sent with each received byte.
    pub acks: Vec<bool>,
    in_transfer: bool,
    expecting_address: bool,
    read_index: usize,
}

#[allow(dead_code)]
impl DevicePhy {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            busy: 0,
            contended: 0,
            write_protected: false,
            refuse_read: false,
            dead: false,
            data: Vec::new(),
            starts: 0,
            stops: 0,
            selects: Vec::new(),
            written: Vec::new(),
            acks: Vec::new(),
            in_transfer: false,
            expecting_address: false,
            read_index: 0,
        }
    }

    pub fn busy(mut self, n: u32) -> Self {
        self.busy = n;
        self
    }

    pub fn contended(mut self, n: u32) -> Self {
        self.contended = n;
        self
    }

    pub fn with_data(mut self, data: &[u8]) -> Self {
        self.data = data.to_vec();
        self
    }

    /// Address selections that named this device for writing.
    pub fn write_selects(&self) -> usize {
        self.selects.iter().filter(|&&b| b == self.address << 1).count()
    }
}

impl TwiPhy for DevicePhy {
    fn start(&mut self) -> TwiStatus {
        if self.dead {
            return TwiStatus::BusFault;
        }
        self.starts += 1;
        self.expecting_address = true;
        if self.in_transfer {
            TwiStatus::RepeatedStart
        } else {
            self.in_transfer = true;
            TwiStatus::Start
        }
    }

    fn transmit(&mut self, byte: u8) -> TwiStatus {
        if self.expecting_address {
            self.expecting_address = false;
            self.selects.push(byte);
            if self.contended > 0 {
                self.contended -= 1;
                // Losing arbitration releases the bus to the winner.
                self.in_transfer = false;
                return TwiStatus::ArbitrationLost;
            }
            let reading = byte & 1 == 1;
            if byte >> 1 != self.address {
                return if reading { TwiStatus::SlaReadNack } else { TwiStatus::SlaWriteNack };
            }
            if reading {
                self.read_index = 0;
                return if self.refuse_read { TwiStatus::SlaReadNack } else { TwiStatus::SlaReadAck };
            }
            if self.busy > 0 {
                self.busy -= 1;
                return TwiStatus::SlaWriteNack;
            }
            return TwiStatus::SlaWriteAck;
        }

        if self.write_protected {
            return TwiStatus::DataWriteNack;
        }
        self.written.push(byte);
        TwiStatus::DataWriteAck
    }

    fn receive(&mut self, ack: bool) -> (TwiStatus, u8) {
        self.acks.push(ack);
        let byte = self.data.get(self.read_index).copied().unwrap_or(0xFF);
        self.read_index += 1;
        let status = if ack { TwiStatus::DataReadAck } else { TwiStatus::DataReadNack };
        (status, byte)
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.in_transfer = false;
        self.expecting_address = false;
    }
}
