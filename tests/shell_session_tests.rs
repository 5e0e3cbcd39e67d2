//! Shell session tests: line editing, echo and telnet escape handling
//! driven through an in-memory serial port.

use core::fmt;
use std::cell::RefCell;
use std::collections::VecDeque;

use serial_shell::config::{LINE_SIZE, PROMPT};
use serial_shell::platform::{HeapStats, Platform};
use serial_shell::shell::ShellInfo;
use serial_shell::{Serial, SerialDevice, Shell, TransportError};

struct MockSerial {
    rx: RefCell<VecDeque<u8>>,
    tx: RefCell<Vec<u8>>,
}

impl MockSerial {
    fn new() -> Self {
        Self {
            rx: RefCell::new(VecDeque::new()),
            tx: RefCell::new(Vec::new()),
        }
    }

    fn feed(&self, bytes: &[u8]) {
        self.rx.borrow_mut().extend(bytes);
    }

    fn sent(&self) -> Vec<u8> {
        self.tx.borrow().clone()
    }

    fn sent_str(&self) -> String {
        String::from_utf8_lossy(&self.tx.borrow()).into_owned()
    }

    fn clear_tx(&self) {
        self.tx.borrow_mut().clear();
    }
}

impl Serial for MockSerial {
    fn write(&self, data: &[u8]) -> Result<usize, TransportError> {
        self.tx.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn read(&self, data: &mut [u8]) -> usize {
        let mut rx = self.rx.borrow_mut();
        let mut n = 0;
        while n < data.len() {
            match rx.pop_front() {
                Some(b) => {
                    data[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        n
    }

    fn bytes_available(&self) -> usize {
        self.rx.borrow().len()
    }

    fn device(&self) -> SerialDevice {
        SerialDevice::UsbSerial
    }
}

struct TestPlatform;

impl Platform for TestPlatform {
    fn name(&self) -> &str {
        "TestBoard"
    }

    fn has_wireless(&self) -> bool {
        false
    }

    fn temperature_c(&self) -> f32 {
        25.0
    }

    fn heap_stats(&self) -> HeapStats {
        HeapStats {
            total: 65536,
            used: 4096,
        }
    }

    fn timestamp_us(&self) -> i64 {
        0
    }

    fn clock_summary(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "   clk_sys: 125000000 Hz")
    }

    fn task_snapshot(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "main        R      1         512        1       0")
    }

    fn reboot(&self) -> ! {
        panic!("reboot requested");
    }

    fn bootsel(&self) -> ! {
        panic!("bootsel requested");
    }
}

const INFO: ShellInfo<'static> = ShellInfo {
    banner: "Test Console",
    version: "test v0.0.0",
    built: "Built today",
    copyright: "(c) test",
};

const PLATFORM: TestPlatform = TestPlatform;

#[test]
fn test_welcome_banner_and_prompt() {
    let port = MockSerial::new();
    let shell = Shell::new(&port, &PLATFORM, INFO);

    shell.show_welcome();

    let out = port.sent_str();
    assert!(out.starts_with("\r\n\x1b[2K"));
    assert!(out.contains("Test Console"));
    assert!(out.contains("test v0.0.0"));
    assert!(out.ends_with(PROMPT));
}

#[test]
fn test_typed_characters_echo() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    port.feed(b"hi");
    assert_eq!(shell.process(), 2);

    assert_eq!(port.sent(), b"hi");
    assert_eq!(shell.pending_line(), "hi");
}

#[test]
fn test_help_round_trip() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    port.feed(b"help\r");
    shell.process();

    let out = port.sent_str();
    assert!(out.contains("Available commands:"));
    assert!(out.contains("version"));
    // Command output precedes the fresh prompt.
    assert!(out.ends_with(PROMPT));
    assert_eq!(shell.pending_line(), "");
}

#[test]
fn test_system_verbose_round_trip() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    port.feed(b"system -v\r");
    shell.process();

    let out = port.sent_str();
    assert!(out.contains("  Platform: TestBoard"));
    assert!(out.contains("   clk_sys: 125000000 Hz"));
    assert!(out.contains("Name        State  Priority  StackRem   Task#   CPU Affn"));
}

#[test]
fn test_output_uses_crlf() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    port.feed(b"version\r");
    shell.process();

    let out = port.sent();
    // Every LF on the wire is preceded by a CR.
    for (i, &b) in out.iter().enumerate() {
        if b == b'\n' {
            assert_eq!(out[i - 1], b'\r', "bare LF at offset {}", i);
        }
    }
}

#[test]
fn test_unknown_command_keeps_session_alive() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    port.feed(b"boop\r");
    shell.process();
    assert!(port.sent_str().contains("Unknown command 'boop'!"));

    port.clear_tx();
    port.feed(b"help\r");
    shell.process();
    assert!(port.sent_str().contains("Available commands:"));
}

#[test]
fn test_backspace_edits_line() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    port.feed(b"helq\x08p");
    shell.process();

    assert_eq!(shell.pending_line(), "help");
    assert!(port.sent_str().contains("\x08 \x08"));
}

#[test]
fn test_backspace_on_empty_line_is_silent() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    port.feed(&[0x08, 0x7F]);
    shell.process();

    assert!(port.sent().is_empty());
    assert_eq!(shell.pending_line(), "");
}

#[test]
fn test_ctrl_c_abandons_line() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    port.feed(b"garbage\x03");
    shell.process();

    assert_eq!(shell.pending_line(), "");
    assert!(port.sent_str().ends_with(&format!("^C\r\n{}", PROMPT)));

    // Abandoned input never executes.
    port.clear_tx();
    port.feed(b"\r");
    shell.process();
    assert!(!port.sent_str().contains("Unknown command"));
}

#[test]
fn test_interrupt_process_acknowledged() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    port.feed(b"stale");
    shell.process();
    port.clear_tx();

    port.feed(&[0xFF, 0xF4]);
    shell.process();

    let out = port.sent();
    // Both timing-mark replies go out raw, then a fresh prompt.
    assert!(out.starts_with(&[0xFF, 0xFD, 0x06, 0xFF, 0xFB, 0x06]));
    assert!(port.sent_str().ends_with(&format!("\r\n{}", PROMPT)));
    assert_eq!(shell.pending_line(), "");
}

#[test]
fn test_interrupt_marker_split_across_polls() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    port.feed(&[0xFF]);
    shell.process();
    assert!(port.sent().is_empty());

    port.feed(&[0xF4]);
    shell.process();

    assert!(port.sent().starts_with(&[0xFF, 0xFD, 0x06]));
}

#[test]
fn test_other_iac_codes_ignored() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    // IAC NOP-ish code: swallowed without echo or reply.
    port.feed(&[0xFF, 0xF1]);
    shell.process();

    assert!(port.sent().is_empty());
    assert_eq!(shell.pending_line(), "");
}

#[test]
fn test_newline_byte_ignored() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    port.feed(b"hi\n");
    shell.process();

    assert_eq!(shell.pending_line(), "hi");
    assert_eq!(port.sent(), b"hi");
}

#[test]
fn test_no_echo_suppresses_terminal_traffic() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);
    shell.set_no_echo(true);

    port.feed(b"xy\x08");
    shell.process();

    assert!(port.sent().is_empty());
    assert_eq!(shell.pending_line(), "x");
}

#[test]
fn test_line_overflow_drops_silently() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    let long = vec![b'a'; LINE_SIZE + 10];
    port.feed(&long);
    shell.process();

    assert_eq!(shell.pending_line().len(), LINE_SIZE - 1);
    // Echo stops once the buffer refuses input.
    assert_eq!(port.sent().len(), LINE_SIZE - 1);
}

#[test]
fn test_wait_interrupt_nonblocking_empty() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    assert!(!shell.wait_interrupt(false));
}

#[test]
fn test_wait_interrupt_sees_ctrl_c() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    port.feed(&[0x03]);
    assert!(shell.wait_interrupt(false));
}

#[test]
fn test_wait_interrupt_sees_remote_interrupt() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    port.feed(&[0xFF, 0xF4]);
    assert!(shell.wait_interrupt(true));
    assert!(port.sent().starts_with(&[0xFF, 0xFD, 0x06]));
}

#[test]
fn test_wait_interrupt_ignores_other_bytes() {
    let port = MockSerial::new();
    let mut shell = Shell::new(&port, &PLATFORM, INFO);

    port.feed(b"x");
    assert!(!shell.wait_interrupt(false));
}
