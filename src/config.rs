//! Compile-time tunables.
//!
//! Everything here is fixed at build time; there is no runtime
//! configuration and nothing survives a restart.

/// RX ring capacity in bytes per port. Must be a power of 2.
pub const RX_RING_SIZE: usize = 512;

/// Staging buffer for formatted output chunks.
pub const PRINT_BUF_SIZE: usize = 256;

/// Command line capacity. One slot is reserved, so the longest
/// accepted line is `LINE_SIZE - 1` characters.
pub const LINE_SIZE: usize = 256;

/// Maximum tokens per command line; surplus tokens are dropped.
pub const MAX_TOKENS: usize = 32;

/// Shell prompt.
pub const PROMPT: &str = "> ";

/// Default UART baud rate.
pub const UART_BAUD_RATE: u32 = 115_200;

/// Default UART0 pins (TX, RX).
pub const UART0_PINS: (i32, i32) = (0, 1);

/// Default UART1 pins (TX, RX).
pub const UART1_PINS: (i32, i32) = (4, 5);
