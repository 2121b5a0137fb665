//! Waste-oil heater controller: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter                                LogEventSink │
//! │  relay expander · ADC thermometer · LEDs        (EventSink)  │
//! │  gauge · buzzer · button mailbox                             │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            HeatingService (pure logic, FSM)            │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  1 Hz esp_timer ─▶ Scheduler hooks · stdin ─▶ Shell          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::cell::RefCell;
use std::io::{ErrorKind, Read, Write as _};
use std::time::Duration;

use anyhow::Result;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embedded_hal_bus::i2c::RefCellDevice;
use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, Output, PinDriver};
use log::{debug, info, warn};

use oilheat::adapters::hardware::HardwareAdapter;
use oilheat::adapters::log_sink::LogEventSink;
use oilheat::app::ports::{ActuatorPort, DebugPort, EventSink, PeripheralPort, SensorPort};
use oilheat::bus::BusMaster;
use oilheat::bus::bitbang::BitBangPhy;
use oilheat::config::SystemConfig;
use oilheat::drivers::button::BUTTONS;
use oilheat::drivers::buzzer::Buzzer;
use oilheat::drivers::gauge::RgbGauge;
use oilheat::drivers::relay::RelayExpander;
use oilheat::drivers::status_led::TriColorLed;
use oilheat::pins;
use oilheat::scheduler::Scheduler;
use oilheat::sensors::ads1115::Ads1115;
use oilheat::sensors::temperature::OilThermometer;
use oilheat::shell::{Dispatch, Line, LineBuffer};
use oilheat::system::System;

/// Console lines from the stdin reader thread to the main loop.
static CONSOLE: Channel<CriticalSectionRawMutex, Line, 4> = Channel::new();

/// Main-loop idle time between scheduler and console polls.
const POLL_MS: u32 = 10;

/// Reader back-off when the UART has nothing for us.
const READ_IDLE: Duration = Duration::from_millis(50);

/// Reader back-off after a hard read error.
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(500);

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  oilheat v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();

    // ── 2. Shared bus ─────────────────────────────────────────
    // SAFETY: every GPIO number below is taken exactly once, and the
    // HAL `Peripherals` singleton is never taken in this firmware.
    let (sda, scl) = unsafe {
        (
            AnyIOPin::new(pins::BUS_SDA_GPIO),
            AnyIOPin::new(pins::BUS_SCL_GPIO),
        )
    };
    let phy = BitBangPhy::new(
        PinDriver::input_output_od(sda)?,
        PinDriver::input_output_od(scl)?,
        Ets,
        config.bus_clock_hz,
        config.clock_stretch_limit,
    );
    let bus = RefCell::new(BusMaster::with_limits(
        phy,
        config.bus_max_iter,
        config.bus_page_size,
    ));

    // ── 3. Peripherals ────────────────────────────────────────
    let relay = RelayExpander::new(RefCellDevice::new(&bus), pins::RELAY_EXPANDER_ADDR);
    let thermometer = OilThermometer::new(Ads1115::new(RefCellDevice::new(&bus), pins::ADC_ADDR), &config);
    let indicator = TriColorLed::new(
        output(pins::LED_GREEN_GPIO)?,
        output(pins::LED_ORANGE_GPIO)?,
        output(pins::LED_RED_GPIO)?,
        output(pins::LED_COMMON_GPIO)?,
    );
    let gauge = RgbGauge::new(
        output(pins::GAUGE_RED_GPIO)?,
        output(pins::GAUGE_GREEN_GPIO)?,
        output(pins::GAUGE_BLUE_GPIO)?,
        output(pins::GAUGE_COMMON_GPIO)?,
    );
    let buzzer = Buzzer::new(output(pins::BUZZER_GPIO)?, Ets);

    let hw = HardwareAdapter::new(relay, thermometer, indicator, gauge, buzzer, &BUTTONS);

    // ── 4. System + hooks ─────────────────────────────────────
    let mut system = System::new(hw, LogEventSink::new(), config);
    system.start();

    // ── 5. Interrupt sources and console ──────────────────────
    system.arm()?;
    spawn_console_reader()?;

    info!("System ready. Entering main loop.");
    run(system)
}

/// Push-pull output on a raw GPIO number.
fn output(gpio: i32) -> Result<PinDriver<'static, AnyOutputPin, Output>> {
    // SAFETY: see the pin note in `main`; each number is used once.
    let pin = unsafe { AnyOutputPin::new(gpio) };
    Ok(PinDriver::output(pin)?)
}

// ── Main loop ─────────────────────────────────────────────────

fn run<H, S>(mut system: System<H, S>) -> Result<()>
where
    H: SensorPort + ActuatorPort + PeripheralPort + DebugPort,
    S: EventSink,
{
    let mut sched: Scheduler<System<H, S>> = Scheduler::new();
    System::install_hooks(&mut sched)?;
    let console = system.shell();
    prompt();

    loop {
        sched.run_pending(&mut system);

        while let Ok(line) = CONSOLE.try_receive() {
            let mut out = String::new();
            match system.dispatch(&console, &line, &mut out) {
                Ok(Dispatch::Empty) => {}
                Ok(_) => print!("{out}"),
                Err(_) => warn!("console: output formatting failed"),
            }
            prompt();
        }

        FreeRtos::delay_ms(POLL_MS);
    }
}

fn prompt() {
    print!("$ ");
    if let Err(e) = std::io::stdout().flush() {
        debug!("console: prompt flush failed ({})", e);
    }
}

// ── Console reader ────────────────────────────────────────────

fn spawn_console_reader() -> Result<()> {
    std::thread::Builder::new()
        .name("console".into())
        .stack_size(4096)
        .spawn(|| {
            let mut stdin = std::io::stdin();
            let mut chunk = [0u8; 32];
            let mut line = LineBuffer::new();
            loop {
                match stdin.read(&mut chunk) {
                    // No input pending on the UART.
                    Ok(0) => std::thread::sleep(READ_IDLE),
                    Ok(n) => chunk[..n]
                        .iter()
                        .filter_map(|&b| line.push(b))
                        .for_each(forward),
                    Err(e) if e.kind() == ErrorKind::WouldBlock => std::thread::sleep(READ_IDLE),
                    Err(e) => {
                        warn!("console: read failed ({})", e);
                        std::thread::sleep(READ_ERROR_BACKOFF);
                    }
                }
            }
        })?;
    Ok(())
}

/// Hand one complete line to the main loop.
fn forward(line: Line) {
    if CONSOLE.try_send(line).is_err() {
        warn!("console: main loop busy, line dropped");
    }
}
