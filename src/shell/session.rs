//! Shell session: line editing and escape handling over one port.
//!
//! `process` is a cooperative poll: it drains every byte the port
//! currently has queued and returns. The embedding application either
//! calls it periodically or parks the task on the port's RX semaphore
//! between calls.

use core::fmt::Write;

use super::commands::{dispatch, CommandCtx, ShellInfo};
use super::error::ShellError;
use super::line_buffer::LineBuffer;
use super::parser::parse_line;
use crate::config::PROMPT;
use crate::platform::Platform;
use crate::transport::{Serial, SerialOut};

/// Telnet IAC marker.
const IAC: u8 = 0xFF;
/// Telnet "interrupt process" code.
const IAC_IP: u8 = 0xF4;
/// Reply: IAC DO TIMING-MARK.
const IAC_DO_TM: [u8; 3] = [0xFF, 0xFD, 0x06];
/// Reply: IAC WILL TIMING-MARK.
const IAC_WILL_TM: [u8; 3] = [0xFF, 0xFB, 0x06];

#[derive(Clone, Copy, PartialEq)]
enum EscapeState {
    Normal,
    /// Got IAC; the code byte may arrive in a later poll.
    IacSeen,
}

/// One interactive shell session on one transport.
pub struct Shell<'a> {
    port: &'a dyn Serial,
    platform: &'a dyn Platform,
    info: ShellInfo<'a>,
    line: LineBuffer,
    state: EscapeState,
    no_echo: bool,
    /// Session start, for uptime reporting.
    since_us: i64,
}

impl<'a> Shell<'a> {
    pub fn new(port: &'a dyn Serial, platform: &'a dyn Platform, info: ShellInfo<'a>) -> Self {
        Self {
            port,
            platform,
            info,
            line: LineBuffer::new(),
            state: EscapeState::Normal,
            no_echo: false,
            since_us: platform.timestamp_us(),
        }
    }

    /// Suppress echo of typed characters (for machine peers).
    pub fn set_no_echo(&mut self, no_echo: bool) {
        self.no_echo = no_echo;
    }

    /// Banner, identity strings and the first prompt.
    pub fn show_welcome(&self) {
        let mut out = SerialOut::new(self.port);
        let _ = write!(out, "\n\x1b[2K");
        let _ = writeln!(out, "{}", self.info.banner);
        let _ = writeln!(out, "{}", self.info.version);
        let _ = writeln!(out, "{}", self.info.built);
        let _ = writeln!(out, "-------------------------------------------");
        let _ = writeln!(out, "{}", self.info.copyright);
        let _ = write!(out, "{}", PROMPT);
    }

    /// Drain and process everything currently queued on the port.
    ///
    /// Returns the number of input bytes consumed.
    pub fn process(&mut self) -> usize {
        let mut consumed = 0;
        let mut byte = [0u8; 1];

        while self.port.bytes_available() > 0 {
            if self.port.read(&mut byte) == 0 {
                break;
            }
            consumed += 1;
            self.handle_byte(byte[0]);
        }

        consumed
    }

    fn handle_byte(&mut self, c: u8) {
        match self.state {
            EscapeState::IacSeen => {
                self.state = EscapeState::Normal;
                if c == IAC_IP {
                    self.ack_interrupt_process();
                }
                // Any other IAC code is ignored.
            }

            EscapeState::Normal => match c {
                IAC => {
                    self.state = EscapeState::IacSeen;
                }

                b'\r' => {
                    if !self.no_echo {
                        let mut out = SerialOut::new(self.port);
                        let _ = write!(out, "\n");
                    }
                    let _ = self.exec();
                    let mut out = SerialOut::new(self.port);
                    let _ = write!(out, "{}", PROMPT);
                    self.line.clear();
                }

                // Backspace / DEL
                0x7F | 0x08 => {
                    if self.line.backspace() && !self.no_echo {
                        let mut out = SerialOut::new(self.port);
                        let _ = write!(out, "\x08 \x08");
                    }
                }

                // Ctrl-C
                0x03 => {
                    let mut out = SerialOut::new(self.port);
                    let _ = write!(out, "^C\n{}", PROMPT);
                    self.line.clear();
                }

                // Printable; dropped silently when the line is full.
                0x20..=0x7E => {
                    if self.line.push(c) && !self.no_echo {
                        let mut out = SerialOut::new(self.port);
                        let _ = write!(out, "{}", c as char);
                    }
                }

                // '\n' and remaining non-printables are ignored.
                _ => {}
            },
        }
    }

    /// Remote "interrupt process": acknowledge with the two fixed
    /// timing-mark sequences (raw, no line-ending translation), then a
    /// fresh prompt on an empty line.
    fn ack_interrupt_process(&mut self) {
        let _ = self.port.write(&IAC_DO_TM);
        let _ = self.port.write(&IAC_WILL_TM);

        let mut out = SerialOut::new(self.port);
        let _ = write!(out, "\n{}", PROMPT);
        self.line.clear();
    }

    fn exec(&mut self) -> Result<(), ShellError> {
        let parsed = parse_line(self.line.as_str());
        let ctx = CommandCtx {
            info: &self.info,
            platform: self.platform,
            since_us: self.since_us,
        };
        let mut out = SerialOut::new(self.port);
        dispatch(&ctx, &parsed, &mut out)
    }

    /// Block until a Ctrl-C or the interrupt-process escape arrives.
    ///
    /// Used by long-running commands that want to stay interruptible.
    /// Shares the escape/Ctrl-C recognition with `process` but does no
    /// line editing. With `until_found == false` this is a single
    /// non-blocking check.
    pub fn wait_interrupt(&mut self, until_found: bool) -> bool {
        let mut byte = [0u8; 1];

        loop {
            if self.port.read(&mut byte) == 0 {
                if !until_found {
                    return false;
                }
                continue;
            }

            match byte[0] {
                IAC => {
                    // The code byte may lag the marker.
                    let is_ip = loop {
                        if self.port.read(&mut byte) == 1 {
                            break byte[0] == IAC_IP;
                        }
                        if !until_found {
                            break false;
                        }
                    };

                    if is_ip {
                        self.ack_interrupt_process();
                        return true;
                    }
                    return false;
                }

                0x03 => return true,

                _ => {
                    if !until_found {
                        return false;
                    }
                }
            }
        }
    }

    /// Current (incomplete) line, mainly for diagnostics and tests.
    pub fn pending_line(&self) -> &str {
        self.line.as_str()
    }
}
