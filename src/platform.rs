//! Board-info service seam.
//!
//! The shell only needs a handful of facts about the board it runs on;
//! this trait is that boundary. The ESP implementation lives in
//! `hal::platform`, tests substitute a canned one.

use core::fmt;

/// Heap accounting snapshot.
///
/// `total` comes from the fixed memory-layout boundaries, `used` from
/// the allocator's live statistic.
#[derive(Clone, Copy, Debug)]
pub struct HeapStats {
    pub total: usize,
    pub used: usize,
}

impl HeapStats {
    #[inline]
    pub const fn free(&self) -> usize {
        self.total - self.used
    }
}

/// Platform/board-info service.
///
/// `reboot` and `bootsel` never return; they are the only non-local
/// transfers of control in the system and are exempt from normal
/// return-path cleanup.
pub trait Platform {
    /// Board name, e.g. chip model.
    fn name(&self) -> &str;

    /// Whether the board has a wireless radio.
    fn has_wireless(&self) -> bool;

    /// On-board temperature in Celsius.
    fn temperature_c(&self) -> f32;

    /// Current heap accounting.
    fn heap_stats(&self) -> HeapStats;

    /// Monotonic microseconds since boot.
    fn timestamp_us(&self) -> i64;

    /// Write the named clock-frequency readings, one per line.
    fn clock_summary(&self, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Write the scheduler task snapshot rows (name, run state,
    /// priority, remaining stack, task id, core affinity).
    fn task_snapshot(&self, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Restart the system.
    fn reboot(&self) -> !;

    /// Restart into the ROM bootloader / download mode.
    fn bootsel(&self) -> !;
}
