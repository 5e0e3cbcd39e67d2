//! Command line tokenizer.
//!
//! Splits on whitespace runs, capped at [`MAX_TOKENS`] tokens; surplus
//! tokens are dropped silently rather than failing the line. Tokens
//! borrow from the session's line buffer; the caller's storage is
//! never mutated.

use crate::config::MAX_TOKENS;

/// A tokenized command line.
#[derive(Debug, Clone)]
pub struct ParsedLine<'a> {
    tokens: [&'a str; MAX_TOKENS],
    count: usize,
}

impl<'a> ParsedLine<'a> {
    /// Number of tokens.
    pub fn argc(&self) -> usize {
        self.count
    }

    /// Token by index (0 = command name).
    pub fn arg(&self, idx: usize) -> Option<&'a str> {
        if idx < self.count {
            Some(self.tokens[idx])
        } else {
            None
        }
    }

    /// The command name, unless the line was blank.
    pub fn command(&self) -> Option<&'a str> {
        self.arg(0)
    }

    /// All tokens as a slice.
    pub fn tokens(&self) -> &[&'a str] {
        &self.tokens[..self.count]
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Tokenize a completed line.
pub fn parse_line(line: &str) -> ParsedLine<'_> {
    let mut tokens = [""; MAX_TOKENS];
    let mut count = 0;

    for part in line.split_whitespace().take(MAX_TOKENS) {
        tokens[count] = part;
        count += 1;
    }

    ParsedLine { tokens, count }
}
