//! Two-wire bus master.
//!
//! One [`BusMaster`] drives every device on the shared bus (relay
//! expander, ADC).  Each call is a complete transaction:
//!
//! ```text
//!   Idle ──▶ Start ──▶ Select(SLA+W) ──▶ Data* ──┬──────────────────▶ Stop
//!              ▲          │                      │
//!              │          │ NACK (busy)          └▶ RepStart ──▶ Select(SLA+R) ──▶ Data* ──▶ Stop
//!              └──────────┘ charged against max_iter
//!
//!   ArbitrationLost in any phase ──▶ back to Start, never charged
//! ```
//!
//! A STOP is issued exactly once on every exit path, success or failure.
//! Addresses are 7-bit; the direction bit is added here.

pub mod bitbang;
pub mod phy;
pub mod status;

use core::fmt;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use log::{debug, warn};

pub use phy::TwiPhy;
pub use status::TwiStatus;

/// Select-phase attempts before a transaction gives up.
pub const MAX_ITER: u16 = 200;

/// Largest run of data bytes sent in one write transaction.
pub const PAGE_SIZE: usize = 8;

const DIR_WRITE: u8 = 0;
const DIR_READ: u8 = 1;

// ───────────────────────────────────────────────────────────────
// Errors and connection state
// ───────────────────────────────────────────────────────────────

/// Terminal failure of one bus transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The device NACKed its address for `max_iter` consecutive attempts.
    Timeout,
    /// The phy did not report a START condition.
    NotInStartCondition,
    /// Unexpected status during start/select (the bus had to be stopped).
    ProtocolViolation,
    /// The device NACKed a data byte.
    WriteProtected,
    /// Unexpected status during the data phase, or a short transfer.
    Unknown,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "device did not respond to selection"),
            Self::NotInStartCondition => write!(f, "not in start condition"),
            Self::ProtocolViolation => write!(f, "unexpected bus status, stop sent"),
            Self::WriteProtected => write!(f, "device write protected"),
            Self::Unknown => write!(f, "unknown bus error"),
        }
    }
}

impl core::error::Error for BusError {}

impl embedded_hal::i2c::Error for BusError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            Self::WriteProtected => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            Self::NotInStartCondition | Self::ProtocolViolation => ErrorKind::Bus,
            Self::Unknown => ErrorKind::Other,
        }
    }
}

/// Connectivity of one logical bus device, as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusConnectionState {
    #[default]
    Ok,
    Broken,
}

impl BusConnectionState {
    /// Collapse any transaction outcome to connectivity.
    pub fn of<T, E>(result: &core::result::Result<T, E>) -> Self {
        if result.is_ok() { Self::Ok } else { Self::Broken }
    }

    pub fn is_broken(self) -> bool {
        self == Self::Broken
    }
}

impl fmt::Display for BusConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Broken => write!(f, "broken"),
        }
    }
}

/// Connection state of every device the heating logic depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusHealth {
    pub relay: BusConnectionState,
    pub adc: BusConnectionState,
}

impl BusHealth {
    /// `Broken` if any device is broken.
    pub fn overall(&self) -> BusConnectionState {
        if self.relay.is_broken() || self.adc.is_broken() {
            BusConnectionState::Broken
        } else {
            BusConnectionState::Ok
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Bus master
// ───────────────────────────────────────────────────────────────

/// What one pass from Start to the end of the data phase asks the
/// transaction loop to do next.
enum Pass {
    Done(usize),
    /// Address NACK: charge one attempt, then restart.
    Busy,
    /// Arbitration lost: restart without charging.
    Rearbitrate,
}

enum Select {
    Acked,
    Nacked,
    Lost,
}

pub struct BusMaster<P> {
    phy: P,
    max_iter: u16,
    page_size: usize,
    last_status: TwiStatus,
}

impl<P: TwiPhy> BusMaster<P> {
    pub fn new(phy: P) -> Self {
        Self::with_limits(phy, MAX_ITER, PAGE_SIZE)
    }

    /// `max_iter` and `page_size` are clamped to at least 1.
    pub fn with_limits(phy: P, max_iter: u16, page_size: usize) -> Self {
        Self {
            phy,
            max_iter: max_iter.max(1),
            page_size: page_size.max(1),
            last_status: TwiStatus::NoInfo,
        }
    }

    /// Status of the most recent bus phase, for diagnostics.
    pub fn last_status(&self) -> TwiStatus {
        self.last_status
    }

    pub fn phy_mut(&mut self) -> &mut P {
        &mut self.phy
    }

    pub fn into_phy(self) -> P {
        self.phy
    }

    /// Write up to one page of `bytes` to `address`.
    ///
    /// Returns the number of bytes the device acknowledged.  Input longer
    /// than a page is truncated; the caller re-invokes for the rest.
    pub fn write_bytes(&mut self, address: u8, bytes: &[u8]) -> Result<usize, BusError> {
        let page = &bytes[..bytes.len().min(self.page_size)];
        self.transact(address, |bus| bus.write_pass(address, page))
    }

    /// Read `buf.len()` bytes from `address`.
    ///
    /// Returns the number of bytes received.  A device that NACKs its read
    /// address yields `Ok(0)`.
    pub fn read_bytes(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, BusError> {
        self.write_read_bytes(address, &[], buf)
    }

    /// Send `bytes` (typically a register pointer) in the write cycle, then
    /// reselect with a repeated START and read into `buf`.
    pub fn write_read_bytes(
        &mut self,
        address: u8,
        bytes: &[u8],
        buf: &mut [u8],
    ) -> Result<usize, BusError> {
        let pointer = &bytes[..bytes.len().min(self.page_size)];
        self.transact(address, |bus| bus.read_pass(address, pointer, buf))
    }

    // ── Transaction loop ───────────────────────────────────────

    fn transact(
        &mut self,
        address: u8,
        mut pass: impl FnMut(&mut Self) -> Result<Pass, BusError>,
    ) -> Result<usize, BusError> {
        let mut attempts: u16 = 0;
        let outcome = loop {
            match pass(self) {
                Ok(Pass::Done(count)) => break Ok(count),
                Ok(Pass::Rearbitrate) => {
                    debug!("bus: 0x{:02x} arbitration lost, restarting", address);
                }
                Ok(Pass::Busy) => {
                    attempts += 1;
                    if attempts >= self.max_iter {
                        warn!(
                            "bus: 0x{:02x} no response after {} selections",
                            address, attempts
                        );
                        break Err(BusError::Timeout);
                    }
                }
                Err(e) => {
                    debug!("bus: 0x{:02x} failed: {} ({})", address, e, self.last_status);
                    break Err(e);
                }
            }
        };
        self.phy.stop();
        outcome
    }

    fn write_pass(&mut self, address: u8, page: &[u8]) -> Result<Pass, BusError> {
        if !self.begin(BusError::NotInStartCondition)? {
            return Ok(Pass::Rearbitrate);
        }
        match self.select(address, DIR_WRITE)? {
            Select::Acked => {}
            Select::Nacked => return Ok(Pass::Busy),
            Select::Lost => return Ok(Pass::Rearbitrate),
        }
        self.send(page)
    }

    fn read_pass(&mut self, address: u8, pointer: &[u8], buf: &mut [u8]) -> Result<Pass, BusError> {
        if !self.begin(BusError::NotInStartCondition)? {
            return Ok(Pass::Rearbitrate);
        }
        match self.select(address, DIR_WRITE)? {
            Select::Acked => {}
            Select::Nacked => return Ok(Pass::Busy),
            Select::Lost => return Ok(Pass::Rearbitrate),
        }
        if let Pass::Rearbitrate = self.send(pointer)? {
            return Ok(Pass::Rearbitrate);
        }

        if !self.begin(BusError::ProtocolViolation)? {
            return Ok(Pass::Rearbitrate);
        }
        match self.select(address, DIR_READ)? {
            Select::Acked => {}
            Select::Nacked => return Ok(Pass::Done(0)),
            Select::Lost => return Ok(Pass::Rearbitrate),
        }

        let len = buf.len();
        let mut received = 0;
        for (i, slot) in buf.iter_mut().enumerate() {
            let (status, byte) = self.phy.receive(i + 1 < len);
            match self.observe(status) {
                TwiStatus::DataReadAck => {
                    *slot = byte;
                    received += 1;
                }
                TwiStatus::DataReadNack => {
                    *slot = byte;
                    received += 1;
                    break;
                }
                TwiStatus::ArbitrationLost => return Ok(Pass::Rearbitrate),
                _ => return Err(BusError::Unknown),
            }
        }
        Ok(Pass::Done(received))
    }

    // ── Phases ─────────────────────────────────────────────────

    /// `Ok(false)` when arbitration was lost.
    fn begin(&mut self, not_started: BusError) -> Result<bool, BusError> {
        let status = self.phy.start();
        match self.observe(status) {
            s if s.is_start() => Ok(true),
            TwiStatus::ArbitrationLost => Ok(false),
            _ => Err(not_started),
        }
    }

    fn select(&mut self, address: u8, direction: u8) -> Result<Select, BusError> {
        let status = self.phy.transmit((address << 1) | direction);
        match (self.observe(status), direction) {
            (TwiStatus::SlaWriteAck, DIR_WRITE) | (TwiStatus::SlaReadAck, DIR_READ) => {
                Ok(Select::Acked)
            }
            (TwiStatus::SlaWriteNack, DIR_WRITE) | (TwiStatus::SlaReadNack, DIR_READ) => {
                Ok(Select::Nacked)
            }
            (TwiStatus::ArbitrationLost, _) => Ok(Select::Lost),
            _ => Err(BusError::ProtocolViolation),
        }
    }

    fn send(&mut self, bytes: &[u8]) -> Result<Pass, BusError> {
        let mut sent = 0;
        for &byte in bytes {
            let status = self.phy.transmit(byte);
            match self.observe(status) {
                TwiStatus::DataWriteAck => sent += 1,
                TwiStatus::DataWriteNack => return Err(BusError::WriteProtected),
                TwiStatus::ArbitrationLost => return Ok(Pass::Rearbitrate),
                _ => return Err(BusError::Unknown),
            }
        }
        Ok(Pass::Done(sent))
    }

    fn observe(&mut self, status: TwiStatus) -> TwiStatus {
        self.last_status = status;
        status
    }
}

// ───────────────────────────────────────────────────────────────
// embedded-hal bus
// ───────────────────────────────────────────────────────────────

impl<P> ErrorType for BusMaster<P> {
    type Error = BusError;
}

/// Supports the transaction shapes device drivers use: a single write, a
/// single read, or a write followed by a read.  Short transfers are
/// reported as [`BusError::Unknown`].
impl<P: TwiPhy> I2c for BusMaster<P> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let (expected, transferred) = match operations {
            [] => return Ok(()),
            [Operation::Write(bytes)] => (bytes.len(), self.write_bytes(address, bytes)?),
            [Operation::Read(buf)] => (buf.len(), self.read_bytes(address, buf)?),
            [Operation::Write(bytes), Operation::Read(buf)] => {
                (buf.len(), self.write_read_bytes(address, bytes, buf)?)
            }
            _ => {
                warn!("bus: unsupported transaction shape ({} ops)", operations.len());
                return Err(BusError::Unknown);
            }
        };
        if transferred == expected {
            Ok(())
        } else {
            warn!(
                "bus: 0x{:02x} short transfer ({}/{} bytes)",
                address, transferred, expected
            );
            Err(BusError::Unknown)
        }
    }
}
