//! Line-oriented operator console.
//!
//! A fixed table of commands.  The first whitespace-delimited token of a
//! line selects a command by exact name; the rest of the line is handed
//! to it as arguments.  `help` is built in and lists the table, leaving
//! out debug commands unless debug mode is on.  Debug commands stay
//! callable either way.
//!
//! Output goes to any [`core::fmt::Write`], so the same dispatcher drives
//! the UART console on the device and a `String` in tests.

use core::fmt::{self, Write};

use log::{debug, warn};

/// Longest accepted line; anything past it is dropped.
pub const MAX_LINE: usize = 160;

/// One console line.
pub type Line = heapless::String<MAX_LINE>;

/// Command body: context, argument text, console.
pub type CommandFn<C> = fn(&mut C, &str, &mut dyn Write) -> fmt::Result;

pub struct Command<C> {
    pub name: &'static str,
    pub description: &'static str,
    /// Maintenance command, hidden from `help` outside debug mode.
    pub debug: bool,
    pub run: CommandFn<C>,
}

// Manual impls: the derives would require `C: Clone`.
impl<C> Clone for Command<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Command<C> {}

/// What a dispatched line turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Blank line.
    Empty,
    Help,
    Ran(&'static str),
    Unknown,
}

pub struct Shell<C, const N: usize> {
    commands: [Command<C>; N],
    debug_mode: bool,
}

impl<C, const N: usize> Shell<C, N> {
    pub const fn new(commands: [Command<C>; N], debug_mode: bool) -> Self {
        Self {
            commands,
            debug_mode,
        }
    }

    pub fn find(&self, name: &str) -> Option<&Command<C>> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Run one console line against `ctx`.
    pub fn dispatch(&self, ctx: &mut C, line: &str, out: &mut dyn Write) -> Result<Dispatch, fmt::Error> {
        let line = clip(line);
        let line = line.trim();
        let (token, args) = match line.split_once(char::is_whitespace) {
            Some((token, rest)) => (token, rest.trim_start()),
            None => (line, ""),
        };

        if token.is_empty() {
            return Ok(Dispatch::Empty);
        }
        if token == "help" {
            self.help(out)?;
            return Ok(Dispatch::Help);
        }
        match self.find(token) {
            Some(cmd) => {
                debug!("shell: {} {:?}", cmd.name, args);
                (cmd.run)(ctx, args, out)?;
                Ok(Dispatch::Ran(cmd.name))
            }
            None => {
                writeln!(out, "{token}: unknown command")?;
                Ok(Dispatch::Unknown)
            }
        }
    }

    fn help(&self, out: &mut dyn Write) -> fmt::Result {
        writeln!(out, "supported commands:")?;
        writeln!(out, "  help - list commands")?;
        for cmd in self.commands.iter().filter(|c| self.debug_mode || !c.debug) {
            writeln!(out, "  {} - {}", cmd.name, cmd.description)?;
        }
        Ok(())
    }
}

/// Cut `line` to [`MAX_LINE`] bytes on a character boundary.
fn clip(line: &str) -> &str {
    if line.len() <= MAX_LINE {
        return line;
    }
    let mut end = MAX_LINE;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    warn!("shell: line of {} bytes cut to {}", line.len(), end);
    &line[..end]
}

/// Assembles console lines from a byte stream that may hand over a line
/// in several pieces.
///
/// A line is complete only at `'\n'`; `'\r'` and other control bytes are
/// discarded, as is anything past [`MAX_LINE`] until the next newline.
#[derive(Default)]
pub struct LineBuffer {
    line: Line,
    clipped: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte; yields the finished line on newline.
    pub fn push(&mut self, byte: u8) -> Option<Line> {
        match byte {
            b'\n' => {
                if core::mem::take(&mut self.clipped) {
                    warn!("shell: line cut to {} bytes", MAX_LINE);
                }
                Some(core::mem::take(&mut self.line))
            }
            b' ' | b'\t' => {
                self.keep(char::from(byte));
                None
            }
            b if b.is_ascii_graphic() => {
                self.keep(char::from(b));
                None
            }
            _ => None,
        }
    }

    /// Bytes of the line still being assembled.
    pub fn pending(&self) -> usize {
        self.line.len()
    }

    fn keep(&mut self, c: char) {
        if self.line.push(c).is_err() {
            self.clipped = true;
        }
    }
}
