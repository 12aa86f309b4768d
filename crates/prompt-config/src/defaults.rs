//! The built-in configuration document, merged underneath any user config.

/// Categories, flags, theme, and key bindings shipped out of the box.
pub fn default_document() -> &'static str {
    DEFAULT_CONFIG_YAML
}

const DEFAULT_CONFIG_YAML: &str = r#"
config:
  granularity: token
  color: true

categories:
  Includes:
    colors: [cyan]
  Libraries:
    colors: [magenta]
  Outputs:
    colors: [green]
  Warnings:
    colors: [yellow]
  Optimization:
    colors: [blue]
  Debug:
    colors: [red]
  Architecture:
    colors: [white]
  Default:
    colors: [white]

category_maps:
  Compiler: [Includes, Libraries, Outputs, Optimization, Debug, Architecture]

themes:
  default:
    Includes: cyan
    Libraries: magenta
    Outputs: green
    Warnings: yellow
    Optimization: blue
    Debug: red
    Architecture: white
    Default: white
    Executable: bold white
    "ui:gap": white
    "ui:cursor": "on white"
    "ui:selection": "on blue"
    "ui:lights-off-dim": "+bright black"
    "ui:duplicates": "on yellow"
    "ui:duplicates-hidden": "+bright black"
    "ui:duplicates-selected": "bold on blue"
    "ui:duplicates-current": "bold on yellow"

flags:
  - category: Includes
    regexps:
      - "-(I|isystem|idirafter|iprefix|iwithprefix|iwithprefixbefore)\\s*(.*)"
    capture_groups: [flag, value]
    validator:
      type: directory
  - category: Libraries
    regexps:
      - "-(L|library-path)\\s*(.*)"
      - "-(l)(.+)"
    capture_groups: [flag, value]
    validator:
      type: directory
  - category: Outputs
    regexps:
      - "-(o)\\s*(.*)"
    capture_groups: [flag, value]
    validator:
      type: file
      extensions: [".o", ".out", ".exe", ""]
  - category: Warnings
    regexps:
      - "-(W)(no-)?(.+)"
    capture_groups: [flag, disabled, value]
    validator:
      type: warnings
  - category: Optimization
    regexps:
      - "-(O)(\\d|s|g|fast)?"
    capture_groups: [flag, value]
    validator:
      type: choice
      options: ["0", "1", "2", "3", "s", "g", "fast"]
  - category: Debug
    regexps:
      - "-(g)(\\d)?"
    capture_groups: [flag, value]
    validator:
      type: choice
      options: ["", "1", "2", "3"]

programs: {}

keybindings:
  normal:
    ctrl-a: move-line-start
    ctrl-e: move-line-end
    ctrl-b: move-char-left
    ctrl-f: move-char-right
    alt-b: move-word-left
    alt-f: move-word-right
    ctrl-p: move-up
    ctrl-n: move-down
    ctrl-d: delete-char
    ctrl-h: delete-char-left
    ctrl-w: delete-word-left
    alt-d: delete-word-right
    ctrl-k: delete-to-end
    ctrl-u: delete-to-start
    alt-backspace: delete-param
    ctrl-_: undo
    ctrl-y: paste
    ctrl-l: lights-off
    ctrl-shift-d: show-duplicates
    ctrl-q: "quit -p"
    ctrl-c: "quit -y"
    escape: quit
    enter: "quit -p"
  duplicates:
    left: duplicate-prev
    right: duplicate-next
    up: duplicate-previous-group
    down: duplicate-next-group
    space: duplicate-select
    a: duplicate-all
    n: duplicate-none
    k: duplicates-keep
    d: duplicates-delete
    f: duplicates-first
    escape: duplicates-exit
    enter: duplicates-exit
    q: duplicates-exit

aliases:
  q: quit
  qp: "quit -p"
  lo: lights-off
  dup: show-duplicates
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_document_parses_as_yaml() {
        let value: serde_yaml::Value = serde_yaml::from_str(default_document()).unwrap();
        assert!(value.get("categories").is_some());
        assert!(value.get("flags").is_some());
    }
}
