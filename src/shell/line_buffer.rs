//! Line editing buffer for shell input.

use crate::config::LINE_SIZE;

/// Fixed-capacity line buffer with a cursor count.
///
/// The last slot is reserved, so a line holds at most `LINE_SIZE - 1`
/// characters; further printable input is dropped silently.
pub struct LineBuffer {
    buf: [u8; LINE_SIZE],
    len: usize,
}

impl LineBuffer {
    /// Create empty buffer.
    pub const fn new() -> Self {
        Self {
            buf: [0u8; LINE_SIZE],
            len: 0,
        }
    }

    /// Append a character. Returns `false` (and stores nothing) when
    /// the buffer is at capacity.
    pub fn push(&mut self, c: u8) -> bool {
        if self.len < LINE_SIZE - 1 {
            self.buf[self.len] = c;
            self.len += 1;
            true
        } else {
            false
        }
    }

    /// Remove the last character. Returns `false` at cursor 0.
    pub fn backspace(&mut self) -> bool {
        if self.len > 0 {
            self.len -= 1;
            true
        } else {
            false
        }
    }

    /// Reset to empty.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Current contents as a string slice.
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
