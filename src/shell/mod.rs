//! Line-oriented interactive command shell.
//!
//! Cooperative polling over one transport per session; zero heap
//! allocation, all fixed-size buffers.

pub mod commands;
pub mod error;
pub mod line_buffer;
pub mod parser;
pub mod session;

pub use commands::{command_names, dispatch, CommandCtx, CommandDescriptor, ShellInfo, COMMANDS};
pub use error::ShellError;
pub use line_buffer::LineBuffer;
pub use parser::{parse_line, ParsedLine};
pub use session::Shell;
