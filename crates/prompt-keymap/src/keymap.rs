//! Mode-scoped key binding tables and built-in command aliases.

use std::collections::HashMap;

/// Which input mode a key binding applies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Normal,
    Duplicates,
}

/// Maps key chords to command lines, per mode, plus a flat table of command
/// aliases expanded before lookup.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    normal: HashMap<String, String>,
    duplicates: HashMap<String, String>,
    aliases: HashMap<String, String>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, mode: Mode, key: impl Into<String>, command: impl Into<String>) {
        let table = match mode {
            Mode::Normal => &mut self.normal,
            Mode::Duplicates => &mut self.duplicates,
        };
        table.insert(key.into(), command.into());
    }

    pub fn alias(&mut self, name: impl Into<String>, expansion: impl Into<String>) {
        self.aliases.insert(name.into(), expansion.into());
    }

    /// Look up the command bound to `key` in `mode`, with alias expansion
    /// applied to the result.
    pub fn command_for(&self, mode: Mode, key: &str) -> Option<String> {
        let table = match mode {
            Mode::Normal => &self.normal,
            Mode::Duplicates => &self.duplicates,
        };
        table.get(key).map(|command| self.expand_aliases(command))
    }

    /// Expand a leading alias word in `command`, if one is registered.
    /// Aliases do not nest.
    pub fn expand_aliases(&self, command: &str) -> String {
        let mut parts = command.splitn(2, ' ');
        let head = parts.next().unwrap_or_default();
        let rest = parts.next();

        match self.aliases.get(head) {
            Some(expansion) => match rest {
                Some(rest) => format!("{expansion} {rest}"),
                None => expansion.clone(),
            },
            None => command.to_string(),
        }
    }
}

/// The built-in key bindings and aliases shipped with the default
/// configuration.
pub fn default_keymap() -> Keymap {
    let mut keymap = Keymap::new();

    for (key, command) in [
        ("ctrl-a", "move-line-start"),
        ("ctrl-e", "move-line-end"),
        ("ctrl-b", "move-char-left"),
        ("ctrl-f", "move-char-right"),
        ("alt-b", "move-word-left"),
        ("alt-f", "move-word-right"),
        ("ctrl-p", "move-up"),
        ("ctrl-n", "move-down"),
        ("ctrl-d", "delete-char"),
        ("ctrl-h", "delete-char-left"),
        ("ctrl-w", "delete-word-left"),
        ("alt-d", "delete-word-right"),
        ("ctrl-k", "delete-to-end"),
        ("ctrl-u", "delete-to-start"),
        ("alt-backspace", "delete-param"),
        ("ctrl-_", "undo"),
        ("ctrl-y", "paste"),
        ("ctrl-l", "lights-off"),
        ("ctrl-shift-d", "show-duplicates"),
        ("ctrl-q", "quit -p"),
        ("ctrl-c", "quit -y"),
        ("escape", "quit"),
        ("enter", "quit -p"),
    ] {
        keymap.bind(Mode::Normal, key, command);
    }

    for (key, command) in [
        ("left", "duplicate-prev"),
        ("right", "duplicate-next"),
        ("up", "duplicate-previous-group"),
        ("down", "duplicate-next-group"),
        ("space", "duplicate-select"),
        ("a", "duplicate-all"),
        ("n", "duplicate-none"),
        ("k", "duplicates-keep"),
        ("d", "duplicates-delete"),
        ("f", "duplicates-first"),
        ("escape", "duplicates-exit"),
        ("enter", "duplicates-exit"),
        ("q", "duplicates-exit"),
    ] {
        keymap.bind(Mode::Duplicates, key, command);
    }

    for (alias, expansion) in [
        ("q", "quit"),
        ("qp", "quit -p"),
        ("lo", "lights-off"),
        ("dup", "show-duplicates"),
    ] {
        keymap.alias(alias, expansion);
    }

    keymap
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_normal_bindings_cover_quit_keys() {
        let keymap = default_keymap();
        assert_eq!(keymap.command_for(Mode::Normal, "ctrl-c").as_deref(), Some("quit -y"));
        assert_eq!(keymap.command_for(Mode::Normal, "enter").as_deref(), Some("quit -p"));
    }

    #[test]
    fn duplicates_mode_bindings_are_scoped_separately() {
        let keymap = default_keymap();
        assert_eq!(keymap.command_for(Mode::Duplicates, "escape").as_deref(), Some("duplicates-exit"));
        assert_ne!(
            keymap.command_for(Mode::Normal, "escape"),
            keymap.command_for(Mode::Duplicates, "escape")
        );
    }

    #[test]
    fn aliases_expand_while_preserving_arguments() {
        let mut keymap = Keymap::new();
        keymap.alias("q", "quit -y");
        assert_eq!(keymap.expand_aliases("q"), "quit -y");
        assert_eq!(keymap.expand_aliases("unknown-command arg"), "unknown-command arg");
    }
}
