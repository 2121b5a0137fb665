//! Phase-level hardware access for the bus master.
//!
//! A phy performs exactly one bus phase per call, blocks until the
//! hardware reports completion, and returns the resulting status.  It
//! makes no protocol decisions; retry and error policy live in
//! [`BusMaster`](super::BusMaster).

use super::status::TwiStatus;

pub trait TwiPhy {
    /// Issue a START (or a repeated START while the bus is held).
    fn start(&mut self) -> TwiStatus;

    /// Shift one byte out (address or data) and sample the ACK bit.
    fn transmit(&mut self, byte: u8) -> TwiStatus;

    /// Shift one byte in, answering with ACK when `ack` is set.
    fn receive(&mut self, ack: bool) -> (TwiStatus, u8);

    /// Issue a STOP and release the bus.
    fn stop(&mut self);
}

impl<P: TwiPhy + ?Sized> TwiPhy for &mut P {
    fn start(&mut self) -> TwiStatus {
        (**self).start()
    }

    fn transmit(&mut self, byte: u8) -> TwiStatus {
        (**self).transmit(byte)
    }

    fn receive(&mut self, ack: bool) -> (TwiStatus, u8) {
        (**self).receive(ack)
    }

    fn stop(&mut self) {
        (**self).stop();
    }
}
