//! The single-line editor's mutable state and command dispatch.

use std::collections::{HashMap, HashSet};

use prompt_complete::CommandLineCompleter;
use prompt_duplicates::DuplicatesMode;
use prompt_keymap::{match_abbreviation, Keymap, Mode};
use prompt_lexer::{duplicate_overlay_map, resolve_styles, DuplicateOverlay, Lexer};
use prompt_match::get_equivalent_indices;
use prompt_style::ParsedColor;
use prompt_text::rebuild_command;
use prompt_validate::CustomValidator;

use crate::buffer::{insert_char, next_boundary, next_word_boundary, prev_boundary, prev_word_boundary, remove_range};

/// The names every command line can resolve to, used for abbreviation
/// matching before dispatch.
const COMMAND_NAMES: &[&str] = &[
    "move-char-left",
    "move-char-right",
    "move-word-left",
    "move-word-right",
    "move-line-start",
    "move-line-end",
    "move-param-next",
    "move-param-prev",
    "move-param-equivalent",
    "delete-char",
    "delete-char-left",
    "delete-word-left",
    "delete-word-right",
    "delete-param",
    "delete-to-end",
    "delete-to-start",
    "undo",
    "paste",
    "lights-off",
    "show-duplicates",
    "quit",
    "duplicate-prev",
    "duplicate-next",
    "duplicate-previous-group",
    "duplicate-next-group",
    "duplicate-select",
    "duplicate-deselect",
    "duplicate-all",
    "duplicate-none",
    "duplicates-keep",
    "duplicates-delete",
    "duplicates-first",
    "duplicates-exit",
];

/// What the editor should do after dispatching one command or key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit { code: i32, print: bool },
}

struct UndoEntry {
    text: String,
    cursor: usize,
}

/// Everything the edit loop needs to mutate and re-render on each event.
pub struct EditorState {
    pub text: String,
    pub cursor: usize,
    pub mode: Mode,
    pub duplicates: Option<DuplicatesMode>,
    undo_stack: Vec<UndoEntry>,
    clipboard: String,
    keymap: Keymap,
    lexer: Lexer,
    completer: CommandLineCompleter,
    category_styles: HashMap<String, ParsedColor>,
    overlay_styles: HashMap<DuplicateOverlay, ParsedColor>,
    /// Flattened `member category -> group name` lookup from `category_maps`,
    /// applied only when grouping tokens into duplicate groups; empty when
    /// `--granularity` is 0. Styling always uses the raw per-flag category.
    category_groups: HashMap<String, String>,
    /// Categories backed by an out-of-band shell command rather than a
    /// synchronous `Validator`. Invoked through a one-off current-thread
    /// runtime entered only for that call.
    custom_validators: HashMap<String, CustomValidator>,
    cwd: String,
}

impl EditorState {
    pub fn new(
        text: String,
        keymap: Keymap,
        lexer: Lexer,
        completer: CommandLineCompleter,
        category_styles: HashMap<String, ParsedColor>,
        overlay_styles: HashMap<DuplicateOverlay, ParsedColor>,
        category_groups: HashMap<String, String>,
        custom_validators: HashMap<String, CustomValidator>,
        cwd: String,
    ) -> Self {
        let cursor = text.len();
        Self {
            text,
            cursor,
            mode: Mode::Normal,
            duplicates: None,
            undo_stack: Vec::new(),
            clipboard: String::new(),
            keymap,
            lexer,
            completer,
            category_styles,
            overlay_styles,
            category_groups,
            custom_validators,
            cwd,
        }
    }

    /// Remap each match's category through `category_groups` for duplicate
    /// grouping, leaving matches with no configured group untouched.
    fn grouped_matches(&self, matches: &[prompt_match::MatchResult]) -> Vec<prompt_match::MatchResult> {
        if self.category_groups.is_empty() {
            return matches.to_vec();
        }
        matches
            .iter()
            .map(|m| {
                let mut grouped = m.clone();
                if let Some(group) = self.category_groups.get(&m.category) {
                    grouped.category = group.clone();
                }
                grouped
            })
            .collect()
    }

    /// Re-tokenize, re-match, and re-style the current buffer. Cheap enough
    /// to call on every mutation per the no-stale-spans ordering guarantee.
    pub fn lex(&self) -> prompt_lexer::LexResult {
        self.lexer.lex_document(&self.text, self.current_token_index())
    }

    /// The token index the cursor currently sits in, used to drive
    /// cursor-following lights-off when no category is selected.
    fn current_token_index(&self) -> Option<usize> {
        let tokens = prompt_text::tokenize(&self.text);
        match prompt_complete::find_token_at_cursor(&tokens, self.cursor) {
            prompt_complete::CursorPosition::InToken(idx) => Some(idx),
            _ => None,
        }
    }

    pub fn lights_off(&self) -> bool {
        self.lexer.lights_off()
    }

    pub fn completions_at_cursor(&self) -> Vec<String> {
        let lexed = self.lex();
        if let prompt_complete::CursorPosition::InToken(idx) =
            prompt_complete::find_token_at_cursor(&lexed.tokens, self.cursor)
        {
            if idx > 0 {
                if let Some(result) = lexed.matches.iter().find(|m| m.token_index == idx) {
                    if !self.completer.has_validator(&result.category) {
                        if let Some(validator) = self.custom_validators.get(&result.category) {
                            let (partial, _replacement_start) =
                                prompt_complete::partial_value(&lexed.tokens[idx], self.cursor, &result.groups);
                            return self.run_custom_validator(validator, &partial);
                        }
                    }
                }
            }
        }
        self.completer.get_completions(&lexed.tokens, &lexed.matches, self.cursor)
    }

    /// Enter a current-thread runtime only for the duration of the call,
    /// per the single-threaded cooperative model's custom-validator
    /// suspension point. Spawn/timeout failures surface as no completions.
    fn run_custom_validator(&self, validator: &CustomValidator, partial: &str) -> Vec<String> {
        let Ok(runtime) = tokio::runtime::Builder::new_current_thread().enable_all().build() else {
            return Vec::new();
        };
        runtime
            .block_on(validator.validate(partial, &self.cwd))
            .map(|result| result.completions)
            .unwrap_or_default()
    }

    /// Resolve the style for each span of the current buffer, including any
    /// active duplicates-mode overlay.
    pub fn styled_spans(&self) -> Vec<(prompt_lexer::StyledSpan, ParsedColor)> {
        let lexed = self.lex();
        let overlays = match &self.duplicates {
            Some(mode) if self.mode == Mode::Duplicates => {
                let highlighted: HashSet<usize> = mode.get_highlighted_indices().into_iter().collect();
                let selected: HashSet<usize> = mode.get_selected_indices().into_iter().collect();
                duplicate_overlay_map(&highlighted, &selected, mode.get_current_index())
            }
            _ => HashMap::new(),
        };
        let colors = resolve_styles(&lexed.spans, &self.category_styles, &overlays, &self.overlay_styles);
        lexed.spans.into_iter().zip(colors).collect()
    }

    fn snapshot(&mut self) {
        self.undo_stack.push(UndoEntry {
            text: self.text.clone(),
            cursor: self.cursor,
        });
    }

    fn mutate(&mut self, f: impl FnOnce(&mut Self)) {
        self.snapshot();
        f(self);
        if self.duplicates.is_some() {
            let lexed = self.lexer.lex_document(&self.text, None);
            let grouped = self.grouped_matches(&lexed.matches);
            if let Some(duplicates) = &mut self.duplicates {
                duplicates.refresh(&grouped);
            }
        }
    }

    /// Resolve a chord to its bound command line for the current mode.
    pub fn command_for_key(&self, chord: &str) -> Option<String> {
        self.keymap.command_for(self.mode, chord)
    }

    /// Dispatch one command line (name plus positional args). Unknown or
    /// ambiguous commands are silently ignored, matching the upstream
    /// behavior of a binding that names a command the registry doesn't
    /// recognize.
    pub fn execute(&mut self, command_line: &str) -> Outcome {
        let mut parts = command_line.split_whitespace();
        let Some(name) = parts.next() else {
            return Outcome::Continue;
        };
        let args: Vec<String> = parts.map(str::to_string).collect();

        let Ok(resolved) = match_abbreviation(name, COMMAND_NAMES.iter().copied()) else {
            return Outcome::Continue;
        };

        self.dispatch(&resolved, &args)
    }

    fn dispatch(&mut self, name: &str, args: &[String]) -> Outcome {
        match name {
            "move-char-left" => self.move_char_left(),
            "move-char-right" => self.move_char_right(),
            "move-word-left" => self.move_word_left(),
            "move-word-right" => self.move_word_right(),
            "move-line-start" => self.cursor = 0,
            "move-line-end" => self.cursor = self.text.len(),
            "move-param-next" => self.move_param_next(),
            "move-param-prev" => self.move_param_prev(),
            "move-param-equivalent" => self.move_param_equivalent(),
            "delete-char" => self.delete_char(),
            "delete-char-left" => self.delete_char_left(),
            "delete-word-left" => self.delete_word_left(),
            "delete-word-right" => self.delete_word_right(),
            "delete-param" => self.delete_param(),
            "delete-to-end" => self.delete_to_end(),
            "delete-to-start" => self.delete_to_start(),
            "undo" => self.undo(),
            "paste" => self.paste(),
            "lights-off" => {
                self.lexer.toggle_lights_off(args.first().map(String::as_str));
            }
            "show-duplicates" => self.enter_duplicates_mode(),
            "quit" => {
                return Outcome::Exit {
                    code: 0,
                    print: args.iter().any(|a| a == "-p"),
                }
            }
            "duplicate-prev" => self.with_duplicates(DuplicatesMode::move_prev),
            "duplicate-next" => self.with_duplicates(DuplicatesMode::move_next),
            "duplicate-previous-group" => self.with_duplicates(DuplicatesMode::prev_group),
            "duplicate-next-group" => self.with_duplicates(DuplicatesMode::next_group),
            "duplicate-select" => self.with_duplicates(DuplicatesMode::select_group),
            "duplicate-deselect" => self.with_duplicates(DuplicatesMode::deselect_group),
            "duplicate-all" => self.with_duplicates(DuplicatesMode::select_all),
            "duplicate-none" => self.with_duplicates(DuplicatesMode::deselect_all),
            "duplicates-keep" => self.apply_duplicates_mutation(DuplicatesMode::keep_current),
            "duplicates-delete" => self.apply_duplicates_mutation(DuplicatesMode::delete_current),
            "duplicates-first" => self.apply_duplicates_mutation(DuplicatesMode::keep_first),
            "duplicates-exit" => self.exit_duplicates_mode(),
            _ => {}
        }
        self.sync_cursor_after_duplicates_move();
        Outcome::Continue
    }

    fn with_duplicates(&mut self, f: impl FnOnce(&mut DuplicatesMode)) {
        if let Some(duplicates) = &mut self.duplicates {
            f(duplicates);
        }
    }

    fn sync_cursor_after_duplicates_move(&mut self) {
        if self.mode != Mode::Duplicates {
            return;
        }
        let Some(duplicates) = &self.duplicates else {
            return;
        };
        let Some(index) = duplicates.get_current_index() else {
            return;
        };
        let lexed = self.lex();
        if let Some(token) = lexed.tokens.get(index) {
            self.cursor = token.start;
        }
    }

    fn move_char_left(&mut self) {
        self.cursor = prev_boundary(&self.text, self.cursor);
    }

    fn move_char_right(&mut self) {
        self.cursor = next_boundary(&self.text, self.cursor);
    }

    fn move_word_left(&mut self) {
        self.cursor = prev_word_boundary(&self.text, self.cursor);
    }

    fn move_word_right(&mut self) {
        self.cursor = next_word_boundary(&self.text, self.cursor);
    }

    fn move_param_next(&mut self) {
        let lexed = self.lex();
        if let Some(token) = lexed.tokens.iter().find(|t| t.start > self.cursor) {
            self.cursor = token.start;
        }
    }

    fn move_param_prev(&mut self) {
        let lexed = self.lex();
        if let Some(token) = lexed.tokens.iter().rev().find(|t| t.end <= self.cursor) {
            self.cursor = token.start;
        }
    }

    fn move_param_equivalent(&mut self) {
        let lexed = self.lex();
        let Some(current) = lexed.tokens.iter().position(|t| t.start <= self.cursor && self.cursor <= t.end) else {
            return;
        };
        let equivalents = get_equivalent_indices(&lexed.matches, current);
        if let Some(&next) = equivalents.iter().find(|&&idx| idx > current).or_else(|| equivalents.first()) {
            if let Some(token) = lexed.tokens.get(next) {
                self.cursor = token.start;
            }
        }
    }

    fn delete_char(&mut self) {
        if self.cursor >= self.text.len() {
            return;
        }
        let end = next_boundary(&self.text, self.cursor);
        self.mutate(|s| {
            remove_range(&mut s.text, s.cursor, end);
        });
    }

    fn delete_char_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = prev_boundary(&self.text, self.cursor);
        self.mutate(|s| {
            s.cursor = remove_range(&mut s.text, start, s.cursor);
        });
    }

    fn delete_word_left(&mut self) {
        let start = prev_word_boundary(&self.text, self.cursor);
        if start == self.cursor {
            return;
        }
        self.mutate(|s| {
            s.cursor = remove_range(&mut s.text, start, s.cursor);
        });
    }

    fn delete_word_right(&mut self) {
        let end = next_word_boundary(&self.text, self.cursor);
        if end == self.cursor {
            return;
        }
        self.mutate(|s| {
            remove_range(&mut s.text, s.cursor, end);
        });
    }

    fn delete_param(&mut self) {
        let lexed = self.lex();
        let Some(token) = lexed.tokens.iter().find(|t| t.start <= self.cursor && self.cursor < t.end) else {
            return;
        };
        let mut end = token.end;
        let bytes = self.text.as_bytes();
        while end < bytes.len() && (bytes[end] == b' ' || bytes[end] == b'\t') {
            end += 1;
        }
        let start = token.start;
        self.mutate(|s| {
            s.cursor = remove_range(&mut s.text, start, end);
        });
    }

    fn delete_to_end(&mut self) {
        if self.cursor >= self.text.len() {
            return;
        }
        let len = self.text.len();
        self.mutate(|s| {
            remove_range(&mut s.text, s.cursor, len);
        });
    }

    fn delete_to_start(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let cursor = self.cursor;
        self.mutate(|s| {
            s.cursor = remove_range(&mut s.text, 0, cursor);
        });
    }

    fn undo(&mut self) {
        if let Some(entry) = self.undo_stack.pop() {
            self.text = entry.text;
            self.cursor = entry.cursor;
        }
    }

    fn paste(&mut self) {
        if self.clipboard.is_empty() {
            return;
        }
        let clipboard = self.clipboard.clone();
        self.mutate(|s| {
            for ch in clipboard.chars() {
                s.cursor = insert_char(&mut s.text, s.cursor, ch);
            }
        });
    }

    /// Insert a literal character typed in `Normal` mode.
    pub fn insert_char(&mut self, ch: char) {
        self.mutate(|s| {
            s.cursor = insert_char(&mut s.text, s.cursor, ch);
        });
    }

    fn enter_duplicates_mode(&mut self) {
        let lexed = self.lex();
        let mode = DuplicatesMode::from_matches(&self.grouped_matches(&lexed.matches));
        if mode.is_empty() {
            return;
        }
        self.duplicates = Some(mode);
        self.mode = Mode::Duplicates;
        self.sync_cursor_after_duplicates_move();
    }

    fn exit_duplicates_mode(&mut self) {
        self.mode = Mode::Normal;
    }

    fn apply_duplicates_mutation(&mut self, f: impl FnOnce(&DuplicatesMode, &[prompt_text::Token]) -> String) {
        let Some(duplicates) = self.duplicates.clone() else {
            return;
        };
        let lexed = self.lex();
        let rebuilt = f(&duplicates, &lexed.tokens);
        self.snapshot();
        self.text = rebuilt;
        let new_lexed = self.lex();
        let grouped = self.grouped_matches(&new_lexed.matches);
        if let Some(d) = &mut self.duplicates {
            d.refresh(&grouped);
        }
        self.sync_cursor_after_duplicates_move();
    }
}

/// Print the final line per `--print`, applying minimal re-quoting through
/// the tokenizer/rebuilder round trip used elsewhere in the crate.
pub fn final_text(text: &str) -> String {
    rebuild_command(&prompt_text::tokenize(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompt_config::load_config_from_string;
    use prompt_match::FlagRule;

    fn test_state(text: &str) -> EditorState {
        let config = load_config_from_string(prompt_config::default_document()).unwrap();
        let rules: Vec<FlagRule<'_>> = config
            .flags
            .iter()
            .map(|f| FlagRule {
                category: f.category.as_str(),
                patterns: f.regexps.as_slice(),
            })
            .collect();
        let matcher = prompt_match::Matcher::new(&rules);
        let lexer = Lexer::new(matcher);
        let completer = CommandLineCompleter::new(HashMap::new());
        EditorState::new(
            text.to_string(),
            prompt_keymap::default_keymap(),
            lexer,
            completer,
            HashMap::new(),
            HashMap::new(),
            HashMap::new(),
            HashMap::new(),
            String::new(),
        )
    }

    #[test]
    fn move_char_left_and_right_respect_bounds() {
        let mut state = test_state("abc");
        state.cursor = 0;
        state.execute("move-char-left");
        assert_eq!(state.cursor, 0);
        state.execute("move-char-right");
        assert_eq!(state.cursor, 1);
    }

    #[test]
    fn delete_char_left_removes_preceding_character() {
        let mut state = test_state("abc");
        state.cursor = 3;
        state.execute("delete-char-left");
        assert_eq!(state.text, "ab");
        assert_eq!(state.cursor, 2);
    }

    #[test]
    fn undo_restores_previous_text_and_cursor() {
        let mut state = test_state("abc");
        state.cursor = 3;
        state.execute("delete-char-left");
        assert_eq!(state.text, "ab");
        state.execute("undo");
        assert_eq!(state.text, "abc");
        assert_eq!(state.cursor, 3);
    }

    #[test]
    fn abbreviated_command_resolves() {
        let mut state = test_state("abc");
        state.cursor = 3;
        state.execute("delete-char-l"); // abbreviation of delete-char-left
        assert_eq!(state.text, "ab");
    }

    #[test]
    fn quit_command_reports_exit_outcome() {
        let mut state = test_state("gcc main.c");
        let outcome = state.execute("quit -p");
        assert_eq!(outcome, Outcome::Exit { code: 0, print: true });
    }

    #[test]
    fn show_duplicates_enters_mode_only_when_duplicates_exist() {
        let mut state = test_state("gcc main.c");
        state.execute("show-duplicates");
        assert_eq!(state.mode, Mode::Normal);

        let mut state = test_state("gcc -Ia -Ib main.c");
        state.execute("show-duplicates");
        assert_eq!(state.mode, Mode::Duplicates);
    }

    #[test]
    fn duplicates_keep_current_rebuilds_buffer_and_exits_cleanly() {
        let mut state = test_state("gcc -Ia -Ib -Ic main.c");
        state.execute("show-duplicates");
        assert_eq!(state.mode, Mode::Duplicates);
        state.execute("duplicate-next");
        state.execute("duplicates-keep");
        assert_eq!(state.text, "gcc -Ib main.c");
    }
}
