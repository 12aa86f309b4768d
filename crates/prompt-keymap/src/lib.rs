//! Command registry and key-binding tables.

mod commands;
mod keymap;

pub use commands::{match_abbreviation, CommandRegistry, CommandResult, LookupError};
pub use keymap::{default_keymap, Keymap, Mode};
