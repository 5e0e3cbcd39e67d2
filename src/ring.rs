//! Lock-free SPSC receive ring for serial ingress.
//!
//! One instance sits between each port's RX interrupt handler and the
//! shell task that drains it:
//!
//! ```text
//! ISR ── push_from_isr ──▶ RxRing ── pop ──▶ task
//!                        (lock-free)
//! ```
//!
//! # Ownership split
//!
//! - Only the interrupt producer advances `write_pos`.
//! - Only the task consumer advances `read_pos`.
//! - The producer publishes `write_pos` with `Release` after storing
//!   bytes; the consumer loads it with `Acquire` before reading them.
//! - Neither side writes the other's index. The producer does not even
//!   read `read_pos`: on overflow it keeps going and the oldest unread
//!   bytes are silently overwritten.
//!
//! The overwrite-on-overflow policy is deliberate: the ISR must never
//! block, and for a low-bandwidth console link bounded memory with
//! loss under saturation beats backpressure into the interrupt path.
//! Loss is not reported to the consumer; the only corruption signal is
//! the guard-sentinel check in [`RxRing::validate`].

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Guard sentinel value bracketing the ring storage.
pub const CANARY: u32 = 0x1234_5678;

/// SPSC byte ring with guard sentinels.
///
/// `N` must be a power of 2. Indices are free-running `u32`s wrapped
/// with a mask; the occupied count is `min(write - read, N)`.
///
/// # Safety
///
/// Uses `UnsafeCell` internally but is safe to use under the SPSC
/// contract: exactly one producer context (the ISR) calls
/// [`push_from_isr`](Self::push_from_isr) and exactly one consumer
/// context (the task) calls [`pop`](Self::pop). All index coordination
/// is done with atomics; no mutable aliasing is possible within that
/// discipline.
#[repr(C)]
pub struct RxRing<const N: usize> {
    /// Sentinel before the storage (bit 0 of `validate`).
    guard_head: u32,

    /// Ring storage. Written by the producer only.
    slots: UnsafeCell<[u8; N]>,

    /// Sentinel between the storage and the index block (bit 1).
    guard_mid: u32,

    /// Next write index (free-running, wraps via mask).
    write_pos: AtomicU32,

    /// Next read index (free-running, wraps via mask).
    read_pos: AtomicU32,

    /// Sentinel after the control block (bit 2).
    guard_tail: u32,
}

// SAFETY: single producer, single consumer, atomic index coordination.
// See the module docs for the ownership split.
unsafe impl<const N: usize> Sync for RxRing<N> {}
unsafe impl<const N: usize> Send for RxRing<N> {}

/// `validate` bit: sentinel before the storage was clobbered.
pub const CORRUPT_PRE: u8 = 1 << 0;
/// `validate` bit: sentinel between storage and indices was clobbered.
pub const CORRUPT_MID: u8 = 1 << 1;
/// `validate` bit: sentinel after the control block was clobbered.
pub const CORRUPT_POST: u8 = 1 << 2;

impl<const N: usize> RxRing<N> {
    /// Mask for wrapping an index to the storage size.
    const MASK: usize = N - 1;

    /// Create a new empty ring.
    pub const fn new() -> Self {
        // Compile-time check: N must be power of 2
        assert!(N.is_power_of_two(), "Ring size must be power of 2");

        Self {
            guard_head: CANARY,
            slots: UnsafeCell::new([0u8; N]),
            guard_mid: CANARY,
            write_pos: AtomicU32::new(0),
            read_pos: AtomicU32::new(0),
            guard_tail: CANARY,
        }
    }

    /// Push one byte from interrupt context.
    ///
    /// Never blocks, never fails. If the ring is full the write index
    /// simply keeps advancing and the oldest unread byte is lost.
    #[inline]
    pub fn push_from_isr(&self, byte: u8) {
        let write = self.write_pos.load(Ordering::Relaxed);

        // SAFETY: single producer; the consumer never writes `slots`.
        unsafe {
            (*self.slots.get())[(write as usize) & Self::MASK] = byte;
        }

        // Publish the byte before the index becomes visible.
        self.write_pos.store(write.wrapping_add(1), Ordering::Release);
    }

    /// Bytes currently queued, computed without locking.
    #[inline]
    pub fn available(&self) -> usize {
        let write = self.write_pos.load(Ordering::Acquire);
        let read = self.read_pos.load(Ordering::Relaxed);
        (write.wrapping_sub(read) as usize).min(N)
    }

    /// Ring capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Pop up to `out.len()` bytes from task context.
    ///
    /// Returns the number of bytes copied; 0 immediately when the ring
    /// is empty. Never blocks; callers that want to sleep until data
    /// arrives wait on the port's semaphore instead.
    ///
    /// If the producer has lapped the consumer, the read index first
    /// resyncs to the oldest byte still present, so after a sustained
    /// overrun exactly the most recent `N` bytes are retrievable.
    pub fn pop(&self, out: &mut [u8]) -> usize {
        let write = self.write_pos.load(Ordering::Acquire);
        let mut read = self.read_pos.load(Ordering::Relaxed);

        if write.wrapping_sub(read) > N as u32 {
            read = write.wrapping_sub(N as u32);
        }

        let mut count = 0;
        while count < out.len() && read != write {
            // SAFETY: bytes behind `write` were published by the
            // producer's Release store; the resync above keeps `read`
            // out of the producer's current lap.
            out[count] = unsafe { (*self.slots.get())[(read as usize) & Self::MASK] };
            read = read.wrapping_add(1);
            count += 1;
        }

        self.read_pos.store(read, Ordering::Relaxed);
        count
    }

    /// Check the guard sentinels against their expected constant.
    ///
    /// Returns a bitmask of [`CORRUPT_PRE`], [`CORRUPT_MID`] and
    /// [`CORRUPT_POST`]; 0 means intact. Advisory only; nothing is
    /// repaired.
    pub fn validate(&self) -> u8 {
        let mut flags = 0u8;

        // Volatile reads: the sentinels are only ever "written" by
        // out-of-bounds stores the compiler cannot see.
        let head = unsafe { core::ptr::read_volatile(&self.guard_head) };
        let mid = unsafe { core::ptr::read_volatile(&self.guard_mid) };
        let tail = unsafe { core::ptr::read_volatile(&self.guard_tail) };

        if head != CANARY {
            flags |= CORRUPT_PRE;
        }
        if mid != CANARY {
            flags |= CORRUPT_MID;
        }
        if tail != CANARY {
            flags |= CORRUPT_POST;
        }

        flags
    }
}

impl<const N: usize> Default for RxRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_basic_push_pop() {
        let ring = RxRing::<64>::new();

        ring.push_from_isr(b'h');
        ring.push_from_isr(b'i');
        assert_eq!(ring.available(), 2);

        let mut out = [0u8; 8];
        let n = ring.pop(&mut out);
        assert_eq!(n, 2);
        assert_eq!(&out[..2], b"hi");
        assert_eq!(ring.available(), 0);
    }

    #[test]
    fn test_ring_pop_empty_returns_zero() {
        let ring = RxRing::<64>::new();
        let mut out = [0u8; 8];
        assert_eq!(ring.pop(&mut out), 0);
    }

    #[test]
    fn test_ring_pop_respects_out_len() {
        let ring = RxRing::<64>::new();
        for b in b"abcdef" {
            ring.push_from_isr(*b);
        }

        let mut out = [0u8; 4];
        assert_eq!(ring.pop(&mut out), 4);
        assert_eq!(&out, b"abcd");
        assert_eq!(ring.pop(&mut out), 2);
        assert_eq!(&out[..2], b"ef");
    }

    #[test]
    fn test_ring_wraps_across_capacity() {
        let ring = RxRing::<8>::new();
        let mut out = [0u8; 8];

        // Several laps with interleaved drains.
        for lap in 0..5u8 {
            for i in 0..6u8 {
                ring.push_from_isr(lap * 10 + i);
            }
            let n = ring.pop(&mut out);
            assert_eq!(n, 6);
            for i in 0..6u8 {
                assert_eq!(out[i as usize], lap * 10 + i);
            }
        }
    }

    #[test]
    fn test_ring_overflow_keeps_most_recent() {
        const K: usize = 20;
        let ring = RxRing::<64>::new();

        // capacity + K pushes without a drain
        for i in 0..(64 + K) {
            ring.push_from_isr(i as u8);
        }
        assert_eq!(ring.available(), 64);

        let mut out = [0u8; 64];
        let n = ring.pop(&mut out);
        assert_eq!(n, 64);

        // Oldest K bytes lost, most recent 64 intact and in order.
        for (i, b) in out.iter().enumerate() {
            assert_eq!(*b, (K + i) as u8);
        }
        assert_eq!(ring.validate(), 0);
    }

    #[test]
    fn test_ring_validate_idempotent() {
        let ring = RxRing::<64>::new();

        for _ in 0..3 {
            assert_eq!(ring.validate(), 0);
        }

        for i in 0..200 {
            ring.push_from_isr(i as u8);
        }
        let mut out = [0u8; 64];
        ring.pop(&mut out);

        for _ in 0..3 {
            assert_eq!(ring.validate(), 0);
        }
    }

    #[test]
    fn test_ring_spsc_ordering_across_threads() {
        use std::sync::Arc;
        use std::thread;

        const TOTAL: usize = 50_000;
        let ring = Arc::new(RxRing::<256>::new());

        let producer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                let mut sent = 0usize;
                while sent < TOTAL {
                    // Test-side flow control so nothing is overwritten
                    // and the full sequence must arrive in order.
                    if ring.available() < ring.capacity() {
                        ring.push_from_isr(sent as u8);
                        sent += 1;
                    } else {
                        thread::yield_now();
                    }
                }
            })
        };

        let mut received = Vec::with_capacity(TOTAL);
        let mut out = [0u8; 64];
        while received.len() < TOTAL {
            let n = ring.pop(&mut out);
            if n == 0 {
                thread::yield_now();
                continue;
            }
            received.extend_from_slice(&out[..n]);
        }

        producer.join().unwrap();

        assert_eq!(received.len(), TOTAL);
        for (i, b) in received.iter().enumerate() {
            assert_eq!(*b, i as u8, "byte {} out of order", i);
        }
    }
}
