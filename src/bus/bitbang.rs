//! Software phy over two open-drain GPIOs.
//!
//! Both lines must be configured open-drain with pull-ups: `set_high`
//! releases the line, `set_low` drives it.  Reading a line back while it
//! is released is how arbitration loss and clock stretching are seen.
//!
//! ```text
//!  SDA ‾‾‾\___/‾‾‾‾X‾‾‾‾X ... X‾‾‾‾\___ ... ___/‾‾‾
//!  SCL ‾‾‾‾‾\__/‾‾\__/‾‾\ ... /‾‾\__/‾‾‾‾\__/‾‾‾‾‾
//!        START   b7    b6       ACK         STOP
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use super::phy::TwiPhy;
use super::status::TwiStatus;

/// Polls of a released SCL before clock stretching is declared a fault.
pub const DEFAULT_STRETCH_LIMIT: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Address,
    MasterTransmit,
    MasterReceive,
}

pub struct BitBangPhy<SDA, SCL, D> {
    sda: SDA,
    scl: SCL,
    delay: D,
    half_period_ns: u32,
    stretch_limit: u32,
    phase: Phase,
}

type Line<T> = Result<T, TwiStatus>;

impl<SDA, SCL, D> BitBangPhy<SDA, SCL, D>
where
    SDA: InputPin + OutputPin,
    SCL: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(sda: SDA, scl: SCL, delay: D, clock_hz: u32, stretch_limit: u32) -> Self {
        Self {
            sda,
            scl,
            delay,
            half_period_ns: 500_000_000 / clock_hz.max(1),
            stretch_limit: stretch_limit.max(1),
            phase: Phase::Idle,
        }
    }

    pub fn release(self) -> (SDA, SCL, D) {
        (self.sda, self.scl, self.delay)
    }

    // ── Line primitives ────────────────────────────────────────

    fn wait(&mut self) {
        self.delay.delay_ns(self.half_period_ns);
    }

    fn sda_release(&mut self) -> Line<()> {
        self.sda.set_high().map_err(|_| TwiStatus::BusFault)
    }

    fn sda_drive(&mut self) -> Line<()> {
        self.sda.set_low().map_err(|_| TwiStatus::BusFault)
    }

    fn sda_is_high(&mut self) -> Line<bool> {
        self.sda.is_high().map_err(|_| TwiStatus::BusFault)
    }

    fn scl_drive(&mut self) -> Line<()> {
        self.scl.set_low().map_err(|_| TwiStatus::BusFault)
    }

    /// Release SCL and wait out any clock stretching by the device.
    fn scl_release(&mut self) -> Line<()> {
        self.scl.set_high().map_err(|_| TwiStatus::BusFault)?;
        for _ in 0..self.stretch_limit {
            if self.scl.is_high().map_err(|_| TwiStatus::BusFault)? {
                return Ok(());
            }
            self.wait();
        }
        Err(TwiStatus::BusFault)
    }

    fn lose_arbitration(&mut self) -> TwiStatus {
        let _ = self.sda.set_high();
        let _ = self.scl.set_high();
        self.phase = Phase::Idle;
        TwiStatus::ArbitrationLost
    }

    // ── Bit level ──────────────────────────────────────────────

    /// Clock one bit out.  `check` enables arbitration detection.
    fn write_bit(&mut self, bit: bool, check: bool) -> Line<()> {
        if bit {
            self.sda_release()?;
        } else {
            self.sda_drive()?;
        }
        self.wait();
        self.scl_release()?;
        if check && bit && !self.sda_is_high()? {
            return Err(self.lose_arbitration());
        }
        self.wait();
        self.scl_drive()
    }

    fn read_bit(&mut self) -> Line<bool> {
        self.sda_release()?;
        self.wait();
        self.scl_release()?;
        let bit = self.sda_is_high()?;
        self.wait();
        self.scl_drive()?;
        Ok(bit)
    }

    // ── Phases ─────────────────────────────────────────────────

    fn try_start(&mut self) -> Line<TwiStatus> {
        let repeated = self.phase != Phase::Idle;
        if repeated {
            self.sda_release()?;
            self.wait();
            self.scl_release()?;
            self.wait();
        }
        if !self.sda_is_high()? {
            return Err(self.lose_arbitration());
        }
        self.sda_drive()?;
        self.wait();
        self.scl_drive()?;
        self.phase = Phase::Address;
        Ok(if repeated { TwiStatus::RepeatedStart } else { TwiStatus::Start })
    }

    fn try_transmit(&mut self, byte: u8) -> Line<TwiStatus> {
        for bit in (0..8).rev() {
            self.write_bit(byte & (1 << bit) != 0, true)?;
        }
        let acked = !self.read_bit()?;
        let status = match self.phase {
            Phase::Address if byte & 1 == 0 => {
                self.phase = Phase::MasterTransmit;
                if acked { TwiStatus::SlaWriteAck } else { TwiStatus::SlaWriteNack }
            }
            Phase::Address => {
                self.phase = Phase::MasterReceive;
                if acked { TwiStatus::SlaReadAck } else { TwiStatus::SlaReadNack }
            }
            Phase::MasterTransmit => {
                if acked { TwiStatus::DataWriteAck } else { TwiStatus::DataWriteNack }
            }
            Phase::Idle | Phase::MasterReceive => TwiStatus::BusFault,
        };
        Ok(status)
    }

    fn try_receive(&mut self, ack: bool) -> Line<(TwiStatus, u8)> {
        if self.phase != Phase::MasterReceive {
            return Err(TwiStatus::BusFault);
        }
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | u8::from(self.read_bit()?);
        }
        self.write_bit(!ack, false)?;
        self.sda_release()?;
        let status = if ack { TwiStatus::DataReadAck } else { TwiStatus::DataReadNack };
        Ok((status, byte))
    }

    fn try_stop(&mut self) -> Line<()> {
        self.sda_drive()?;
        self.wait();
        self.scl_release()?;
        self.wait();
        self.sda_release()?;
        self.wait();
        Ok(())
    }
}

impl<SDA, SCL, D> TwiPhy for BitBangPhy<SDA, SCL, D>
where
    SDA: InputPin + OutputPin,
    SCL: InputPin + OutputPin,
    D: DelayNs,
{
    fn start(&mut self) -> TwiStatus {
        self.try_start().unwrap_or_else(|status| status)
    }

    fn transmit(&mut self, byte: u8) -> TwiStatus {
        self.try_transmit(byte).unwrap_or_else(|status| status)
    }

    fn receive(&mut self, ack: bool) -> (TwiStatus, u8) {
        self.try_receive(ack).unwrap_or_else(|status| (status, 0xFF))
    }

    fn stop(&mut self) {
        if self.try_stop().is_err() {
            log::warn!("bus: stop condition could not be driven");
        }
        self.phase = Phase::Idle;
    }
}
