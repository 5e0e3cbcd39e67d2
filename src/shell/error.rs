//! Shell error types.
//!
//! Protocol/input errors are always recovered locally: the user gets a
//! visible message and the session continues.

/// Shell error with code and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellError {
    /// E01: Command name matched nothing in the table.
    UnknownCommand,
    /// E02: Argument was present but not understood.
    InvalidArgument,
}

impl ShellError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "E01",
            Self::InvalidArgument => "E02",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown command",
            Self::InvalidArgument => "invalid argument",
        }
    }
}

impl core::fmt::Display for ShellError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
