//! Command table and handlers.
//!
//! The command set is closed at build time: a static table of
//! `(name, handler)` pairs, resolved by exact case-sensitive match on
//! the first token. Insertion order defines the `help` listing order.

use core::fmt::Write;

use super::error::ShellError;
use super::parser::ParsedLine;
use crate::platform::Platform;

/// Identity strings shown by `version` and the welcome banner.
///
/// All four are opaque to the core; the embedding application supplies
/// them (typically from `build.rs` output).
#[derive(Clone, Copy)]
pub struct ShellInfo<'a> {
    pub banner: &'a str,
    pub version: &'a str,
    pub built: &'a str,
    pub copyright: &'a str,
}

/// Context handed to every command handler.
pub struct CommandCtx<'a> {
    pub info: &'a ShellInfo<'a>,
    pub platform: &'a dyn Platform,
    /// Session start, `Platform::timestamp_us` domain.
    pub since_us: i64,
}

/// Command descriptor.
pub struct CommandDescriptor {
    pub name: &'static str,
    pub handler: fn(&CommandCtx<'_>, &ParsedLine<'_>, &mut dyn Write) -> Result<(), ShellError>,
}

/// All available commands.
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { name: "help", handler: cmd_help },
    CommandDescriptor { name: "version", handler: cmd_version },
    CommandDescriptor { name: "system", handler: cmd_system },
    CommandDescriptor { name: "reboot", handler: cmd_reboot },
    CommandDescriptor { name: "bootsel", handler: cmd_bootsel },
];

/// Route a tokenized line to its handler.
///
/// A blank line is a no-op, not an error. An unmatched command name
/// reports itself to the user and returns `UnknownCommand`; the
/// session always continues.
pub fn dispatch(
    ctx: &CommandCtx<'_>,
    line: &ParsedLine<'_>,
    out: &mut dyn Write,
) -> Result<(), ShellError> {
    let Some(name) = line.command() else {
        return Ok(());
    };

    match COMMANDS.iter().find(|c| c.name == name) {
        Some(c) => (c.handler)(ctx, line, out),
        None => unknown_command(name, out),
    }
}

/// Registered command names, in help order.
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|c| c.name)
}

fn unknown_command(name: &str, out: &mut dyn Write) -> Result<(), ShellError> {
    let _ = writeln!(out, "Unknown command '{}'!", name);
    Err(ShellError::UnknownCommand)
}

// --- Command Implementations ---

fn cmd_help(
    _ctx: &CommandCtx<'_>,
    _line: &ParsedLine<'_>,
    out: &mut dyn Write,
) -> Result<(), ShellError> {
    let _ = writeln!(out, "Available commands:");

    // Four names per row, tab separated.
    let mut i = 0usize;
    for c in COMMANDS {
        if i % 4 == 0 {
            let _ = write!(out, "\t");
        }
        let _ = write!(out, "{}\t", c.name);
        if i % 4 == 3 {
            let _ = writeln!(out);
        }
        i += 1;
    }
    if i % 4 != 0 {
        let _ = writeln!(out);
    }

    Ok(())
}

fn cmd_version(
    ctx: &CommandCtx<'_>,
    _line: &ParsedLine<'_>,
    out: &mut dyn Write,
) -> Result<(), ShellError> {
    let _ = writeln!(out, "{}", ctx.info.banner);
    let _ = writeln!(out, "{}", ctx.info.version);
    let _ = writeln!(out, "{}", ctx.info.built);
    let _ = writeln!(out, "-------------------------------------------");
    let _ = writeln!(out, "{}", ctx.info.copyright);

    Ok(())
}

fn cmd_system(
    ctx: &CommandCtx<'_>,
    line: &ParsedLine<'_>,
    out: &mut dyn Write,
) -> Result<(), ShellError> {
    let platform = ctx.platform;

    let _ = writeln!(out, "  Platform: {}", platform.name());

    let uptime = (platform.timestamp_us() - ctx.since_us).max(0) as u64 / 1_000_000;
    let sec = uptime % 60;
    let min = (uptime / 60) % 60;
    let hour = (uptime / 3600) % 24;
    let days = uptime / 86400;
    if days == 0 {
        let _ = writeln!(out, "   Up-time: {:02}:{:02}:{:02}", hour, min, sec);
    } else {
        let _ = writeln!(out, "   Up-time: {}d {:02}:{:02}:{:02}", days, hour, min, sec);
    }

    let heap = platform.heap_stats();
    let _ = writeln!(out, "Total Heap: {:8} bytes", heap.total);
    let _ = writeln!(out, " Free Heap: {:8} bytes", heap.free());
    let _ = writeln!(out, " Used Heap: {:8} bytes", heap.used);
    let _ = writeln!(out, "Board Temp:     {:.1}C", platform.temperature_c());

    if line.argc() == 2 && line.arg(1) == Some("-v") {
        let _ = platform.clock_summary(out);
    }

    let _ = writeln!(out, "     Tasks:");
    let _ = writeln!(out, "Name        State  Priority  StackRem   Task#   CPU Affn");
    let _ = writeln!(out, "--------------------------------------------------------");
    let _ = platform.task_snapshot(out);

    Ok(())
}

fn cmd_reboot(
    ctx: &CommandCtx<'_>,
    _line: &ParsedLine<'_>,
    out: &mut dyn Write,
) -> Result<(), ShellError> {
    let _ = writeln!(out, "Rebooting ...");
    ctx.platform.reboot()
}

fn cmd_bootsel(
    ctx: &CommandCtx<'_>,
    _line: &ParsedLine<'_>,
    out: &mut dyn Write,
) -> Result<(), ShellError> {
    let _ = writeln!(out, "Rebooting to BOOTSEL mode");
    ctx.platform.bootsel()
}
