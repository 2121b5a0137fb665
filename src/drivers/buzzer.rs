//! Piezo buzzer melodies.
//!
//! A melody is a score string: `c d e f g a b` are C4–B4, `C D E F G A B`
//! are C5–B5, anything else is a short rest.  Notes last 150 ms, rests
//! 75 ms.  Playback bit-bangs the buzzer pin and blocks until done.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use super::Chime;

pub const NOTE_MS: u32 = 150;
pub const REST_MS: u32 = 75;

/// Audible cue, keyed to the transition that plays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Melody {
    Boot,
    PowerOn,
    PowerOff,
    /// Heating → Ready.
    OilReady,
    /// Ready → Oil.
    OilFlowing,
    /// Oil → Ready.
    OilStopped,
    /// Emergency → Ready.
    Cooled,
    /// Entering, and repeating in, Emergency.
    OverheatAlarm,
    /// Repeating in Error.
    BusAlarm,
}

impl Melody {
    pub const fn score(self) -> &'static str {
        match self {
            Self::Boot => "GA_AG",
            Self::PowerOn => "bC",
            Self::PowerOff => "Cb",
            Self::OilReady => "F_F_F",
            Self::OilFlowing => "F",
            Self::OilStopped | Self::Cooled => "E",
            Self::OverheatAlarm => "G",
            Self::BusAlarm => "GFG",
        }
    }

    /// Playback time in milliseconds.
    pub fn duration_ms(self) -> u32 {
        self.score()
            .chars()
            .map(|c| if note_hz(c).is_some() { NOTE_MS } else { REST_MS })
            .sum()
    }
}

/// Pitch of one score character, `None` for a rest.
pub fn note_hz(note: char) -> Option<u32> {
    let hz = match note {
        'c' => 262,
        'd' => 294,
        'e' => 330,
        'f' => 349,
        'g' => 392,
        'a' => 440,
        'b' => 494,
        'C' => 523,
        'D' => 587,
        'E' => 659,
        'F' => 698,
        'G' => 784,
        'A' => 880,
        'B' => 988,
        _ => return None,
    };
    Some(hz)
}

pub struct Buzzer<P, D> {
    pin: P,
    delay: D,
    muted: bool,
}

impl<P: OutputPin, D: DelayNs> Buzzer<P, D> {
    pub fn new(mut pin: P, delay: D) -> Self {
        let _ = pin.set_low();
        Self { pin, delay, muted: false }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn tone(&mut self, hz: u32, ms: u32) {
        let half_period_us = 500_000 / hz;
        let cycles = hz * ms / 1000;
        for _ in 0..cycles {
            let _ = self.pin.set_high();
            self.delay.delay_us(half_period_us);
            let _ = self.pin.set_low();
            self.delay.delay_us(half_period_us);
        }
    }
}

impl<P: OutputPin, D: DelayNs> Chime for Buzzer<P, D> {
    fn play(&mut self, melody: Melody) {
        if self.muted {
            return;
        }
        for note in melody.score().chars() {
            match note_hz(note) {
                Some(hz) => self.tone(hz, NOTE_MS),
                None => self.delay.delay_ms(REST_MS),
            }
        }
    }
}
