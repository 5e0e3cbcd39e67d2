//! Line buffer edge case tests

use serial_shell::config::LINE_SIZE;
use serial_shell::shell::LineBuffer;

#[test]
fn test_push_and_read_back() {
    let mut line = LineBuffer::new();

    for c in b"system -v" {
        assert!(line.push(*c));
    }

    assert_eq!(line.as_str(), "system -v");
    assert_eq!(line.len(), 9);
}

#[test]
fn test_starts_empty() {
    let line = LineBuffer::new();

    assert!(line.is_empty());
    assert_eq!(line.as_str(), "");
}

#[test]
fn test_capacity_reserves_one_slot() {
    let mut line = LineBuffer::new();

    for _ in 0..LINE_SIZE - 1 {
        assert!(line.push(b'a'));
    }

    // Full: further input is refused, contents unchanged.
    assert!(!line.push(b'b'));
    assert_eq!(line.len(), LINE_SIZE - 1);
    assert!(line.as_str().bytes().all(|c| c == b'a'));
}

#[test]
fn test_backspace_removes_last() {
    let mut line = LineBuffer::new();

    line.push(b'h');
    line.push(b'i');
    assert!(line.backspace());
    assert_eq!(line.as_str(), "h");
}

#[test]
fn test_backspace_at_cursor_zero_is_noop() {
    let mut line = LineBuffer::new();

    assert!(!line.backspace());
    assert!(line.is_empty());
}

#[test]
fn test_clear_resets() {
    let mut line = LineBuffer::new();

    line.push(b'x');
    line.clear();

    assert!(line.is_empty());
    assert!(line.push(b'y'));
    assert_eq!(line.as_str(), "y");
}

#[test]
fn test_full_then_backspace_accepts_again() {
    let mut line = LineBuffer::new();

    for _ in 0..LINE_SIZE - 1 {
        line.push(b'a');
    }
    assert!(!line.push(b'b'));

    assert!(line.backspace());
    assert!(line.push(b'c'));
    assert!(line.as_str().ends_with('c'));
}
