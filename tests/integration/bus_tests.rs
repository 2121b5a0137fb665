//! Bus master transactions against a scripted device.

use embedded_hal::i2c::I2c;
use oilheat::bus::{BusError, BusMaster, MAX_ITER, PAGE_SIZE, TwiStatus};

use crate::mock_hw::DevicePhy;

const EXPANDER: u8 = 0x20;
const ADC: u8 = 0x48;

fn master(phy: DevicePhy, max_iter: u16) -> BusMaster<DevicePhy> {
    BusMaster::with_limits(phy, max_iter, PAGE_SIZE)
}

// ── Retry budget ──────────────────────────────────────────────

#[test]
fn busy_device_answering_within_budget_succeeds() {
    let mut bus = master(DevicePhy::new(EXPANDER).busy(4), 5);
    assert_eq!(bus.write_bytes(EXPANDER, &[0x5A]), Ok(1));

    let phy = bus.into_phy();
    assert_eq!(phy.write_selects(), 5);
    assert_eq!(phy.written, vec![0x5A]);
    assert_eq!(phy.stops, 1);
}

#[test]
fn busy_device_at_budget_times_out() {
    let mut bus = master(DevicePhy::new(EXPANDER).busy(5), 5);
    assert_eq!(bus.write_bytes(EXPANDER, &[0x5A]), Err(BusError::Timeout));

    let phy = bus.into_phy();
    assert_eq!(phy.write_selects(), 5);
    assert!(phy.written.is_empty());
    assert_eq!(phy.stops, 1);
}

#[test]
fn selections_never_exceed_budget() {
    let mut bus = master(DevicePhy::new(EXPANDER).busy(6), 5);
    assert_eq!(bus.write_bytes(EXPANDER, &[0x5A]), Err(BusError::Timeout));
    assert_eq!(bus.into_phy().write_selects(), 5);
}

#[test]
fn absent_device_times_out_after_default_budget() {
    let mut bus = BusMaster::new(DevicePhy::new(0x21));
    assert_eq!(bus.write_bytes(EXPANDER, &[0x00]), Err(BusError::Timeout));
    assert_eq!(bus.last_status(), TwiStatus::SlaWriteNack);

    let phy = bus.into_phy();
    assert_eq!(phy.selects.len(), usize::from(MAX_ITER));
    assert_eq!(phy.starts, u32::from(MAX_ITER));
    assert_eq!(phy.stops, 1);
}

#[test]
fn busy_device_is_retried_on_read() {
    let mut bus = master(DevicePhy::new(ADC).busy(3).with_data(&[0x12, 0x34]), 5);
    let mut buf = [0u8; 2];
    assert_eq!(bus.read_bytes(ADC, &mut buf), Ok(2));
    assert_eq!(buf, [0x12, 0x34]);
}

// ── Arbitration ───────────────────────────────────────────────

#[test]
fn lost_arbitration_is_not_charged() {
    let mut bus = master(DevicePhy::new(EXPANDER).contended(10).busy(4), 5);
    assert_eq!(bus.write_bytes(EXPANDER, &[0x01]), Ok(1));

    let phy = bus.into_phy();
    assert_eq!(phy.selects.len(), 15);
    assert_eq!(phy.stops, 1);
}

// ── Failure paths ─────────────────────────────────────────────

#[test]
fn data_nack_is_write_protected() {
    let mut phy = DevicePhy::new(EXPANDER);
    phy.write_protected = true;
    let mut bus = master(phy, 5);
    assert_eq!(bus.write_bytes(EXPANDER, &[0x01, 0x02]), Err(BusError::WriteProtected));
    assert_eq!(bus.last_status(), TwiStatus::DataWriteNack);

    let phy = bus.into_phy();
    assert_eq!(phy.write_selects(), 1, "write protection is not retried");
    assert_eq!(phy.stops, 1);
}

#[test]
fn failed_start_is_reported_and_stopped() {
    let mut phy = DevicePhy::new(EXPANDER);
    phy.dead = true;
    let mut bus = master(phy, 5);
    assert_eq!(bus.write_bytes(EXPANDER, &[0x01]), Err(BusError::NotInStartCondition));

    let phy = bus.into_phy();
    assert!(phy.selects.is_empty());
    assert_eq!(phy.stops, 1);
}

#[test]
fn refused_read_address_returns_nothing() {
    let mut phy = DevicePhy::new(ADC).with_data(&[0xAA]);
    phy.refuse_read = true;
    let mut bus = master(phy, 5);
    let mut buf = [0u8; 1];
    assert_eq!(bus.read_bytes(ADC, &mut buf), Ok(0));
    assert_eq!(buf, [0]);

    let phy = bus.into_phy();
    assert!(phy.acks.is_empty());
    assert_eq!(phy.stops, 1);
}

// ── Data phase ────────────────────────────────────────────────

#[test]
fn every_byte_but_the_last_is_acked() {
    let mut bus = master(DevicePhy::new(ADC).with_data(&[1, 2, 3, 4]), 5);
    let mut buf = [0u8; 4];
    assert_eq!(bus.read_bytes(ADC, &mut buf), Ok(4));
    assert_eq!(buf, [1, 2, 3, 4]);
    assert_eq!(bus.last_status(), TwiStatus::DataReadNack);
    assert_eq!(bus.into_phy().acks, vec![true, true, true, false]);
}

#[test]
fn read_selects_write_then_read_with_repeated_start() {
    let mut bus = master(DevicePhy::new(ADC).with_data(&[0x7F, 0xF0]), 5);
    let mut buf = [0u8; 2];
    assert_eq!(bus.write_read_bytes(ADC, &[0x00], &mut buf), Ok(2));
    assert_eq!(buf, [0x7F, 0xF0]);

    let phy = bus.into_phy();
    assert_eq!(phy.selects, vec![ADC << 1, (ADC << 1) | 1]);
    assert_eq!(phy.written, vec![0x00]);
    assert_eq!(phy.starts, 2);
    assert_eq!(phy.stops, 1);
}

#[test]
fn write_is_truncated_to_one_page() {
    let mut bus = BusMaster::with_limits(DevicePhy::new(EXPANDER), 5, 4);
    let data: Vec<u8> = (1..=10).collect();
    assert_eq!(bus.write_bytes(EXPANDER, &data), Ok(4));
    assert_eq!(bus.into_phy().written, vec![1, 2, 3, 4]);
}

#[test]
fn one_stop_per_transaction() {
    let mut bus = master(DevicePhy::new(ADC).with_data(&[9]), 5);
    let mut buf = [0u8; 1];
    bus.write_bytes(ADC, &[1]).unwrap();
    bus.read_bytes(ADC, &mut buf).unwrap();
    bus.write_read_bytes(ADC, &[0], &mut buf).unwrap();
    assert_eq!(bus.into_phy().stops, 3);
}

// ── embedded-hal surface ──────────────────────────────────────

#[test]
fn i2c_write_read_reaches_device() {
    let mut bus = master(DevicePhy::new(ADC).with_data(&[0x01, 0x02]), 5);
    let mut buf = [0u8; 2];
    assert_eq!(bus.write_read(ADC, &[0x00], &mut buf), Ok(()));
    assert_eq!(buf, [0x01, 0x02]);
}

#[test]
fn i2c_refused_read_is_short_transfer() {
    let mut phy = DevicePhy::new(ADC);
    phy.refuse_read = true;
    let mut bus = master(phy, 5);
    let mut buf = [0u8; 2];
    assert_eq!(bus.read(ADC, &mut buf), Err(BusError::Unknown));
}
