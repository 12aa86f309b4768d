//! Routes a cursor position to the right validator and produces
//! completions, including executable-name completion from `$PATH`.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;

use prompt_match::{CaptureGroup, MatchResult};
use prompt_text::Token;
use prompt_validate::Validator;

/// Where the cursor sits relative to the tokenized command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPosition {
    /// Inside (or touching the end of) the token at this index.
    InToken(usize),
    /// Sitting in a whitespace gap; value is the index of the token that
    /// would follow if typing began here.
    Whitespace(usize),
    /// Past every token in the line.
    PastAll,
}

/// Locate the cursor among tokens. A cursor resting exactly at a token's end
/// boundary counts as being inside that token, so completion continues it
/// rather than starting a new one.
pub fn find_token_at_cursor(tokens: &[Token], cursor: usize) -> CursorPosition {
    for (idx, token) in tokens.iter().enumerate() {
        if cursor >= token.start && cursor <= token.end {
            return CursorPosition::InToken(idx);
        }
    }

    match tokens.iter().position(|t| t.start > cursor) {
        Some(idx) => CursorPosition::Whitespace(idx),
        None => CursorPosition::PastAll,
    }
}

/// Maps a flag category to the validator that governs its captured value.
pub type ValidatorRegistry = HashMap<String, Box<dyn Validator>>;

/// Drives completion for a command line given its tokens, category matches,
/// and the validators configured per category.
pub struct CommandLineCompleter {
    validators: ValidatorRegistry,
}

impl CommandLineCompleter {
    pub fn new(validators: ValidatorRegistry) -> Self {
        Self { validators }
    }

    /// Whether `category` has a registered synchronous validator. Callers
    /// use this to decide whether a category's value instead falls through
    /// to an out-of-band custom validator.
    pub fn has_validator(&self, category: &str) -> bool {
        self.validators.contains_key(category)
    }

    /// Produce completions for the token at `cursor`.
    ///
    /// - Token 0 (the executable) completes from `$PATH`.
    /// - A token whose category has a registered validator completes from
    ///   that validator. The partial is the last capture group's prefix up
    ///   to the cursor when the match has ≥2 groups and the cursor sits
    ///   inside the last one; otherwise it's the token's prefix up to the
    ///   cursor (see [`partial_value`]).
    /// - Anything else (unmatched tokens, whitespace, past the last token)
    ///   yields no completions.
    pub fn get_completions(&self, tokens: &[Token], matches: &[MatchResult], cursor: usize) -> Vec<String> {
        match find_token_at_cursor(tokens, cursor) {
            CursorPosition::InToken(0) => {
                let (partial, _replacement_start) = partial_value(&tokens[0], cursor, &[]);
                complete_executables(&partial, &env::var("PATH").unwrap_or_default())
            }
            CursorPosition::InToken(idx) => {
                let Some(result) = matches.iter().find(|m| m.token_index == idx) else {
                    return Vec::new();
                };
                let Some(validator) = self.validators.get(&result.category) else {
                    return Vec::new();
                };
                let (partial, _replacement_start) = partial_value(&tokens[idx], cursor, &result.groups);
                validator.get_completions(&partial)
            }
            CursorPosition::Whitespace(_) | CursorPosition::PastAll => Vec::new(),
        }
    }
}

/// Determine the completion partial and the absolute buffer offset where a
/// chosen completion should be spliced back in. With ≥2 capture groups and
/// the cursor inside the last one, the partial is that group's prefix up to
/// the cursor; otherwise it's the whole token's prefix up to the cursor.
pub fn partial_value(token: &Token, cursor: usize, groups: &[CaptureGroup]) -> (String, usize) {
    let token_cursor = cursor.saturating_sub(token.start).min(token.value.len());

    if groups.len() >= 2 {
        if let Some(last) = groups.last() {
            if token_cursor >= last.start && token_cursor <= last.end {
                let offset = (token_cursor - last.start).min(last.value.len());
                return (last.value[..offset].to_string(), token.start + last.start);
            }
        }
    }

    (token.value[..token_cursor].to_string(), token.start)
}

/// Scan `$PATH` for executables whose basename starts with `partial`,
/// de-duplicating by name and preferring the first `PATH` entry that
/// provides each name.
pub fn complete_executables(partial: &str, path: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut names = Vec::new();

    for dir in env::split_paths(path) {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.filter_map(Result::ok) {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with(partial) || seen.contains(&name) {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if metadata.is_file() && metadata.permissions().mode() & 0o111 != 0 {
                seen.insert(name.clone());
                names.push(name);
            }
        }
    }

    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompt_text::tokenize;

    #[test]
    fn cursor_inside_token_boundary_counts_as_in_token() {
        let tokens = tokenize("gcc main.c");
        assert_eq!(find_token_at_cursor(&tokens, 3), CursorPosition::InToken(0));
        assert_eq!(find_token_at_cursor(&tokens, 0), CursorPosition::InToken(0));
    }

    #[test]
    fn cursor_in_whitespace_gap() {
        let tokens = tokenize("gcc  main.c");
        let pos = find_token_at_cursor(&tokens, 4);
        assert_eq!(pos, CursorPosition::Whitespace(1));
    }

    #[test]
    fn cursor_past_all_tokens() {
        let tokens = tokenize("gcc main.c");
        assert_eq!(find_token_at_cursor(&tokens, 10), CursorPosition::PastAll);
    }

    #[test]
    fn executables_are_filtered_by_prefix_and_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let bin_path = dir.path().join("gcc-test-binary");
        std::fs::write(&bin_path, "#!/bin/sh\n").unwrap();
        let mut perms = std::fs::metadata(&bin_path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&bin_path, perms).unwrap();

        let path = dir.path().to_string_lossy().to_string();
        let completions = complete_executables("gcc", &path);
        assert_eq!(completions, vec!["gcc-test-binary".to_string()]);
    }

    fn group(name: &str, value: &str, start: usize, end: usize) -> CaptureGroup {
        CaptureGroup {
            name: Some(name.to_string()),
            value: value.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn partial_value_with_one_group_uses_whole_token_prefix() {
        let tokens = tokenize("gcc -Iinclude");
        let token = &tokens[1];
        let groups = vec![group("flag", "-I", 0, 2)];
        let (partial, start) = partial_value(token, token.start + 5, &groups);
        assert_eq!(partial, "-Iin");
        assert_eq!(start, token.start);
    }

    #[test]
    fn partial_value_with_two_groups_uses_last_group_when_cursor_is_inside_it() {
        let tokens = tokenize("gcc -isystem/usr/inc");
        let token = &tokens[1];
        let groups = vec![group("flag", "-isystem", 0, 8), group("path", "/usr/inc", 8, 16)];
        let (partial, start) = partial_value(token, token.start + 12, &groups);
        assert_eq!(partial, "/usr");
        assert_eq!(start, token.start + 8);
    }

    #[test]
    fn partial_value_with_two_groups_falls_back_when_cursor_is_in_the_first_group() {
        let tokens = tokenize("gcc -isystem/usr/inc");
        let token = &tokens[1];
        let groups = vec![group("flag", "-isystem", 0, 8), group("path", "/usr/inc", 8, 16)];
        let (partial, start) = partial_value(token, token.start + 3, &groups);
        assert_eq!(partial, "-is");
        assert_eq!(start, token.start);
    }
}
