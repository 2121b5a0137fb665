//! Console commands dispatched against a mock-backed `System`.

use oilheat::config::SystemConfig;
use oilheat::drivers::button::Action;
use oilheat::fsm::HeatingMode;
use oilheat::shell::{Dispatch, Shell};
use oilheat::system::{COMMAND_COUNT, System};

use crate::mock_hw::{MockHardware, RecordingSink};

type MockSystem = System<MockHardware, RecordingSink>;

struct Console {
    sys: MockSystem,
    shell: Shell<MockSystem, COMMAND_COUNT>,
}

impl Console {
    fn new(config: SystemConfig) -> Self {
        let mut sys = System::new(MockHardware::new(), RecordingSink::default(), config);
        sys.start();
        let shell = sys.shell();
        Self { sys, shell }
    }

    fn run(&mut self, line: &str) -> (Dispatch, String) {
        let mut out = String::new();
        let d = self.sys.dispatch(&self.shell, line, &mut out).unwrap();
        (d, out)
    }

    fn out(&mut self, line: &str) -> String {
        self.run(line).1
    }
}

fn console() -> Console {
    Console::new(SystemConfig::default())
}

#[test]
fn status_reports_mode_and_outputs() {
    let mut c = console();
    let (d, out) = c.run("status");
    assert_eq!(d, Dispatch::Ran("status"));
    assert!(out.starts_with("Status: OFF\nprevious: OFF\nt=20\n"), "{out}");
    assert!(out.contains("heater   : off (feedback 0)"), "{out}");
    assert!(out.contains("bus: relay=ok adc=ok"));
    assert!(out.ends_with("alerter: enabled\n"));
}

#[test]
fn status_follows_mode_changes() {
    let mut c = console();
    c.sys.hw.pending = Action::PowerToggle;
    c.sys.service.tick(&mut c.sys.hw, &mut c.sys.sink);
    assert_eq!(c.sys.service.mode(), HeatingMode::Heating);

    let out = c.out("status");
    assert!(out.starts_with("Status: HEATING\nprevious: OFF\n"), "{out}");
    assert!(out.contains("pump     : on"));
    assert!(out.contains("heater   : on"));
}

#[test]
fn temp_sets_shows_and_clears_override() {
    let mut c = console();
    assert_eq!(c.out("temp"), "t=20\n");
    assert_eq!(c.out("temp 75"), "set temperature to 75\n");
    assert_eq!(c.sys.hw.override_c, Some(75));
    assert_eq!(c.out("temp"), "t=75 (sim)\n");
    assert!(c.out("status").contains("t=75 (sim)"));

    assert_eq!(c.out("temp off"), "temperature override cleared\n");
    assert_eq!(c.sys.hw.override_c, None);
}

#[test]
fn temp_rejects_garbage() {
    let mut c = console();
    assert_eq!(c.out("temp hot"), "usage: temp [<celsius>|off]\n");
    assert_eq!(c.sys.hw.override_c, None);
}

#[test]
fn pcf_writes_and_reads_port() {
    let mut c = console();
    assert_eq!(c.out("pcf 0x3f"), "write 0x3f to pcf data\n");
    assert_eq!(c.sys.hw.port, 0x3F);
    assert_eq!(c.out("pcf"), "Reading PCF value...\npcf data = 0x3f\n");
    assert_eq!(c.out("pcf 255"), "write 0xff to pcf data\n");
}

#[test]
fn pcf_reports_bus_failure() {
    let mut c = console();
    c.sys.hw.port_broken = true;
    assert_eq!(c.out("pcf 1"), "unable to write to pcf\n");
    assert_eq!(c.out("pcf"), "Reading PCF value...\nunable to read pcf data\n");
}

#[test]
fn report_toggles() {
    let mut c = console();
    assert_eq!(c.out("report"), "report mode on\n");
    assert!(c.sys.service.report_mode());
    assert_eq!(c.out("report"), "report mode off\n");
}

#[test]
fn config_prints_json() {
    let mut c = console();
    let out = c.out("config");
    let parsed: SystemConfig = serde_json::from_str(out.trim_end()).unwrap();
    assert_eq!(parsed, SystemConfig::default());
}

#[test]
fn unknown_command_is_named() {
    let mut c = console();
    assert_eq!(
        c.run("frobnicate now"),
        (Dispatch::Unknown, "frobnicate: unknown command\n".to_string())
    );
}

#[test]
fn help_lists_debug_commands_in_debug_mode() {
    let mut c = console();
    let (d, out) = c.run("help");
    assert_eq!(d, Dispatch::Help);
    assert!(out.contains("  status - show heater status\n"));
    assert!(out.contains("  pcf - read/write from/to PCF8574 (relays)\n"));
}

#[test]
fn debug_commands_hidden_but_callable_outside_debug_mode() {
    let mut c = Console::new(SystemConfig {
        debug_commands: false,
        ..SystemConfig::default()
    });
    let help = c.out("help");
    assert!(!help.contains("  pcf -"));
    assert!(!help.contains("  temp -"));
    assert!(help.contains("  report -"));

    assert_eq!(c.run("temp 50").0, Dispatch::Ran("temp"));
}
