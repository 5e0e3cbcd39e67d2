//! # serial-shell
//!
//! Byte-stream transport over interrupt-driven serial links (hardware
//! UART, USB virtual serial) plus a line-oriented command shell.
//!
//! ## Architecture
//!
//! ```text
//! RX interrupt ──▶ RxRing ──▶ semaphore ──▶ Serial::read
//!                                              │
//!                                    Shell::process (byte at a time)
//!                                              │
//!                                        dispatch(line)
//!                                              │
//!                            Serial::write ◀── command output
//! ```
//!
//! The ring buffer is the only structure crossing the interrupt/task
//! boundary; it is lock-free under the SPSC discipline. Everything in
//! this library is portable and host-testable; hardware bindings live
//! in `hal` and compile only for ESP-IDF targets.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod logging;
pub mod platform;
pub mod ring;
pub mod shell;
pub mod transport;

#[cfg(all(not(test), target_os = "espidf"))]
pub mod hal;

pub use platform::{HeapStats, Platform};
pub use ring::RxRing;
pub use shell::{Shell, ShellError, ShellInfo};
pub use transport::{Serial, SerialDevice, SerialOut, SerialRegistry, TransportError};
