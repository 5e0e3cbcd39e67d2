//! Polymorphic byte channel over the physical serial links.
//!
//! One [`Serial`] implementation exists per physical link (see `hal`);
//! the shell talks to the trait only, which keeps the whole protocol
//! layer host-testable against in-memory mocks.

use core::fmt;

use crate::config::PRINT_BUF_SIZE;

/// The supported physical links.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SerialDevice {
    /// USB virtual serial (CDC-ACM style console).
    UsbSerial = 0,
    /// Hardware UART channel 0.
    Uart0 = 1,
    /// Hardware UART channel 1.
    Uart1 = 2,
}

impl SerialDevice {
    /// Number of devices; registry arrays are indexed by [`index`](Self::index).
    pub const COUNT: usize = 3;

    /// Stable index for registry lookup.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Reverse of [`index`](Self::index).
    pub const fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(SerialDevice::UsbSerial),
            1 => Some(SerialDevice::Uart0),
            2 => Some(SerialDevice::Uart1),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SerialDevice::UsbSerial => "usb-serial",
            SerialDevice::Uart0 => "uart0",
            SerialDevice::Uart1 => "uart1",
        }
    }
}

/// Transport-level errors.
///
/// Construction failures leave the affected port unusable; other ports
/// are unaffected. Ring overrun is deliberately *not* represented here
/// (see `ring` module docs).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportError {
    /// Invalid device/peripheral selection at construction.
    InvalidDevice,
    /// The link cannot accept data right now.
    NotReady,
    /// Platform driver error code.
    Hardware(i32),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::InvalidDevice => write!(f, "invalid device"),
            TransportError::NotReady => write!(f, "link not ready"),
            TransportError::Hardware(code) => write!(f, "driver error {}", code),
        }
    }
}

/// A byte channel over one physical link.
///
/// `write` blocks (busy-retry under the port's TX mutex) until every
/// byte is accepted by the link; there is no timeout, so a permanently
/// stalled peer blocks the writer indefinitely. Callers that need
/// timely completion must run their own watchdog. `read` and
/// `bytes_available` never block.
pub trait Serial {
    /// Blocking write; returns the number of bytes accepted (all of
    /// them on success).
    fn write(&self, data: &[u8]) -> Result<usize, TransportError>;

    /// Non-blocking read from the ingress ring; 0 when empty.
    fn read(&self, data: &mut [u8]) -> usize;

    /// Bytes queued on the ingress side.
    fn bytes_available(&self) -> usize;

    /// Which physical link this is.
    fn device(&self) -> SerialDevice;
}

/// Port registry indexed by [`SerialDevice`].
///
/// Holds whichever ports the application brought up; lookup by device
/// replaces reaching for per-link globals.
pub struct SerialRegistry<'a> {
    ports: [Option<&'a dyn Serial>; SerialDevice::COUNT],
}

impl<'a> SerialRegistry<'a> {
    pub const fn new() -> Self {
        Self {
            ports: [None; SerialDevice::COUNT],
        }
    }

    /// Register a port under its own device slot. Replaces any
    /// previous registration for that device.
    pub fn register(&mut self, port: &'a dyn Serial) {
        self.ports[port.device().index()] = Some(port);
    }

    /// Look up the port for a device, if one was registered.
    pub fn get(&self, device: SerialDevice) -> Option<&'a dyn Serial> {
        self.ports[device.index()]
    }

    /// Registered ports, in device-index order.
    pub fn iter(&self) -> impl Iterator<Item = &'a dyn Serial> + '_ {
        self.ports.iter().filter_map(|p| *p)
    }
}

impl Default for SerialRegistry<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// `core::fmt::Write` adapter over a [`Serial`] port.
///
/// Formatted output renders into a fixed staging buffer and is
/// transmitted through [`Serial::write`], with a `\r` injected before
/// every `\n` (canonical-mode line endings for terminal clients).
pub struct SerialOut<'a> {
    port: &'a dyn Serial,
    staging: [u8; PRINT_BUF_SIZE],
    len: usize,
}

impl<'a> SerialOut<'a> {
    pub fn new(port: &'a dyn Serial) -> Self {
        Self {
            port,
            staging: [0u8; PRINT_BUF_SIZE],
            len: 0,
        }
    }

    fn flush(&mut self) -> fmt::Result {
        if self.len > 0 {
            self.port
                .write(&self.staging[..self.len])
                .map_err(|_| fmt::Error)?;
            self.len = 0;
        }
        Ok(())
    }

    fn stage(&mut self, byte: u8) -> fmt::Result {
        if self.len == self.staging.len() {
            self.flush()?;
        }
        self.staging[self.len] = byte;
        self.len += 1;
        Ok(())
    }
}

impl fmt::Write for SerialOut<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for &byte in s.as_bytes() {
            if byte == b'\n' {
                self.stage(b'\r')?;
            }
            self.stage(byte)?;
        }
        self.flush()
    }
}
