//! Deferred, allocation-free logging.
//!
//! Interrupt handlers and the TX busy-wait path must never print, so
//! log records go into a lock-free ring and are drained out the
//! console port by the firmware main loop:
//!
//! ```text
//! fw_warn!() ──▶ LogRing ──▶ drain ──▶ Serial::write
//!  ~100ns        lock-free             blocking ok
//! ```
//!
//! Push never blocks; when the ring is full the record is dropped and
//! counted.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length per record.
pub const MAX_MSG_LEN: usize = 96;

/// Default ring size (number of records).
pub const LOG_RING_SIZE: usize = 64;

/// Log severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// One log record.
#[derive(Clone, Copy)]
pub struct LogRecord {
    /// Monotonic microseconds at push time.
    pub timestamp_us: i64,
    pub level: LogLevel,
    len: u8,
    msg: [u8; MAX_MSG_LEN],
}

impl LogRecord {
    const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

/// Lock-free log ring: multiple producers, single drain consumer.
///
/// Producers claim slots with an atomic `fetch_add`, so any context,
/// interrupts included, may push concurrently; the single consumer
/// drains at leisure.
pub struct LogRing<const N: usize = LOG_RING_SIZE> {
    records: UnsafeCell<[LogRecord; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: producers are coordinated by fetch_add slot claiming, the
// single consumer owns read_idx. No mutable aliasing within that
// discipline.
unsafe impl<const N: usize> Sync for LogRing<N> {}
unsafe impl<const N: usize> Send for LogRing<N> {}

impl<const N: usize> LogRing<N> {
    const MASK: usize = N - 1;

    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log ring size must be power of 2");

        Self {
            records: UnsafeCell::new([LogRecord::EMPTY; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push a record. Never blocks; returns `false` if dropped.
    #[inline]
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        let write = self.write_idx.fetch_add(1, Ordering::AcqRel);
        let read = self.read_idx.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N as u32 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let idx = (write as usize) & Self::MASK;

        // SAFETY: fetch_add handed this producer a unique slot.
        unsafe {
            let record = &mut (*self.records.get())[idx];
            record.timestamp_us = timestamp_us;
            record.level = level;
            record.len = msg.len().min(MAX_MSG_LEN) as u8;
            record.msg[..record.len as usize].copy_from_slice(&msg[..record.len as usize]);
        }

        true
    }

    /// Take the next record, if any. Single-consumer only.
    #[inline]
    pub fn drain(&self) -> Option<LogRecord> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) & Self::MASK;

        // SAFETY: single consumer, slot is behind write_idx.
        let record = unsafe { (*self.records.get())[idx] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(record)
    }

    /// Records dropped because the ring was full.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Records waiting to be drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format into a byte buffer without allocating.
///
/// Returns the number of bytes written; output is truncated to the
/// buffer length.
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    use core::fmt::Write;

    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl Write for BufWriter<'_> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let bytes = s.as_bytes();
            let remaining = self.buf.len() - self.pos;
            let to_write = bytes.len().min(remaining);
            self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
            Ok(())
        }
    }

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// Push a formatted record onto a [`LogRing`].
#[macro_export]
macro_rules! fw_log {
    ($ring:expr, $timestamp:expr, $level:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $ring.push($timestamp, $level, &buf[..len]);
    }};
}

#[macro_export]
macro_rules! fw_error {
    ($ring:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::fw_log!($ring, $timestamp, $crate::logging::LogLevel::Error, $($arg)*)
    };
}

#[macro_export]
macro_rules! fw_warn {
    ($ring:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::fw_log!($ring, $timestamp, $crate::logging::LogLevel::Warn, $($arg)*)
    };
}

#[macro_export]
macro_rules! fw_info {
    ($ring:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::fw_log!($ring, $timestamp, $crate::logging::LogLevel::Info, $($arg)*)
    };
}

#[macro_export]
macro_rules! fw_debug {
    ($ring:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::fw_log!($ring, $timestamp, $crate::logging::LogLevel::Debug, $($arg)*)
    };
}
