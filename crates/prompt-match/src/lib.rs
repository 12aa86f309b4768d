//! Flag-pattern matching: classifies each token against a set of per-category
//! regex patterns and groups the results for duplicate detection and
//! equivalent-flag navigation.

use std::collections::HashMap;

use prompt_text::Token;
use regex::Regex;

/// Index: always token 0, never produced by a pattern match.
pub const EXECUTABLE_CATEGORY: &str = "Executable";
/// Category assigned to any token that matched no configured pattern.
pub const DEFAULT_CATEGORY: &str = "Default";

/// A single named or positional capture extracted from a matched token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureGroup {
    pub name: Option<String>,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

/// The outcome of matching one token against the configured flag rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub token_index: usize,
    pub category: String,
    /// True when a configured pattern actually matched this token (as
    /// opposed to it falling back to [`DEFAULT_CATEGORY`]).
    pub flag: bool,
    pub groups: Vec<CaptureGroup>,
}

/// A category's ordered list of regex patterns, anchored at the start of the
/// token when compiled. Borrowed from configuration by the caller.
#[derive(Debug, Clone, Copy)]
pub struct FlagRule<'a> {
    pub category: &'a str,
    pub patterns: &'a [String],
}

struct CompiledRule {
    category: String,
    regexes: Vec<Regex>,
}

/// Compiles and applies a set of flag rules against tokenized command lines.
pub struct Matcher {
    rules: Vec<CompiledRule>,
}

impl Matcher {
    /// Compile `rules` into anchored regexes. A pattern that fails to
    /// compile is logged and skipped rather than rejecting the whole set.
    pub fn new(rules: &[FlagRule<'_>]) -> Self {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let mut regexes = Vec::with_capacity(rule.patterns.len());
            for pattern in rule.patterns {
                let anchored = format!("^(?:{pattern})");
                match Regex::new(&anchored) {
                    Ok(re) => regexes.push(re),
                    Err(err) => {
                        tracing::warn!(category = rule.category, pattern, %err, "invalid flag pattern, skipping");
                    }
                }
            }
            compiled.push(CompiledRule {
                category: rule.category.to_string(),
                regexes,
            });
        }
        Self { rules: compiled }
    }

    /// Match a single non-executable token, returning the first category
    /// whose pattern list contains a hit, or [`DEFAULT_CATEGORY`] otherwise.
    pub fn match_token(&self, token_index: usize, token: &Token) -> MatchResult {
        for rule in &self.rules {
            for regex in &rule.regexes {
                if let Some(captures) = regex.captures(&token.value) {
                    return MatchResult {
                        token_index,
                        category: rule.category.clone(),
                        flag: true,
                        groups: extract_groups(regex, &captures),
                    };
                }
            }
        }

        MatchResult {
            token_index,
            category: DEFAULT_CATEGORY.to_string(),
            flag: false,
            groups: vec![whole_token_group(token)],
        }
    }

    /// Match every token in a command line. Token 0 is always classified as
    /// [`EXECUTABLE_CATEGORY`] regardless of any configured pattern.
    pub fn match_tokens(&self, tokens: &[Token]) -> Vec<MatchResult> {
        tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                if index == 0 {
                    MatchResult {
                        token_index: 0,
                        category: EXECUTABLE_CATEGORY.to_string(),
                        flag: false,
                        groups: vec![whole_token_group(token)],
                    }
                } else {
                    self.match_token(index, token)
                }
            })
            .collect()
    }
}

/// A synthetic group named `"0"` spanning the whole token, used whenever a
/// token isn't matched by a category pattern with its own groups.
fn whole_token_group(token: &Token) -> CaptureGroup {
    CaptureGroup {
        name: Some("0".to_string()),
        value: token.value.clone(),
        start: 0,
        end: token.value.len(),
    }
}

fn extract_groups(regex: &Regex, captures: &regex::Captures<'_>) -> Vec<CaptureGroup> {
    let names: Vec<Option<&str>> = regex.capture_names().collect();
    let mut groups = Vec::new();

    for (idx, maybe_match) in captures.iter().enumerate().skip(1) {
        if let Some(m) = maybe_match {
            groups.push(CaptureGroup {
                name: names.get(idx).copied().flatten().map(|s| s.to_string()),
                value: m.as_str().to_string(),
                start: m.start(),
                end: m.end(),
            });
        }
    }

    groups
}

/// Look up the category assigned to a given token index.
pub fn get_category_for_token(results: &[MatchResult], token_index: usize) -> Option<&str> {
    results
        .iter()
        .find(|r| r.token_index == token_index)
        .map(|r| r.category.as_str())
}

/// Group token indices by category for duplicate-flag highlighting. Only
/// results that actually matched a configured pattern are counted, and the
/// `Default` and `Executable` categories never form duplicate groups.
pub fn find_duplicates(results: &[MatchResult]) -> HashMap<String, Vec<usize>> {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();

    for result in results {
        if !result.flag {
            continue;
        }
        if result.category == DEFAULT_CATEGORY || result.category == EXECUTABLE_CATEGORY {
            continue;
        }
        groups
            .entry(result.category.clone())
            .or_default()
            .push(result.token_index);
    }

    groups.retain(|_, indices| indices.len() > 1);
    groups
}

/// Indices sharing `current_index`'s category, for "jump to next/previous
/// flag of this kind" navigation. The `Default` category has no equivalents:
/// tokens that matched nothing are never considered interchangeable.
pub fn get_equivalent_indices(results: &[MatchResult], current_index: usize) -> Vec<usize> {
    let Some(current) = results.iter().find(|r| r.token_index == current_index) else {
        return Vec::new();
    };
    if current.category == DEFAULT_CATEGORY {
        return Vec::new();
    }

    results
        .iter()
        .filter(|r| r.category == current.category && r.token_index != current_index)
        .map(|r| r.token_index)
        .collect()
}

/// Expand a `category -> [member categories]` grouping map (as configured
/// under `category_maps`) into a flat `member category -> group name` lookup.
pub fn expand_category_map(raw: &HashMap<String, Vec<String>>) -> HashMap<String, String> {
    let mut expanded = HashMap::new();
    for (group_name, members) in raw {
        for member in members {
            expanded.insert(member.clone(), group_name.clone());
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompt_text::tokenize;

    fn includes_rule() -> Vec<String> {
        vec![r"-(I|isystem|idirafter)\s*(.*)".to_string()]
    }

    #[test]
    fn executable_token_is_never_matched_against_rules() {
        let patterns = includes_rule();
        let rules = [FlagRule {
            category: "Includes",
            patterns: &patterns,
        }];
        let matcher = Matcher::new(&rules);
        let tokens = tokenize("-Iinclude main.c");
        let results = matcher.match_tokens(&tokens);
        assert_eq!(results[0].category, EXECUTABLE_CATEGORY);
        assert!(!results[0].flag);
        assert_eq!(results[0].groups, vec![CaptureGroup {
            name: Some("0".to_string()),
            value: "-Iinclude".to_string(),
            start: 0,
            end: 9,
        }]);
    }

    #[test]
    fn matches_includes_and_falls_back_to_default() {
        let patterns = includes_rule();
        let rules = [FlagRule {
            category: "Includes",
            patterns: &patterns,
        }];
        let matcher = Matcher::new(&rules);
        let tokens = tokenize("gcc -Iinclude main.c");
        let results = matcher.match_tokens(&tokens);
        assert_eq!(results[1].category, "Includes");
        assert!(results[1].flag);
        assert_eq!(results[2].category, DEFAULT_CATEGORY);
        assert!(!results[2].flag);
        assert_eq!(results[2].groups, vec![CaptureGroup {
            name: Some("0".to_string()),
            value: "main.c".to_string(),
            start: 0,
            end: 6,
        }]);
    }

    #[test]
    fn find_duplicates_excludes_default_and_executable() {
        let patterns = includes_rule();
        let rules = [FlagRule {
            category: "Includes",
            patterns: &patterns,
        }];
        let matcher = Matcher::new(&rules);
        let tokens = tokenize("gcc -Ia -Ib main.c");
        let results = matcher.match_tokens(&tokens);
        let dups = find_duplicates(&results);
        assert_eq!(dups.get("Includes"), Some(&vec![1, 2]));
        assert!(!dups.contains_key(DEFAULT_CATEGORY));
        assert!(!dups.contains_key(EXECUTABLE_CATEGORY));
    }

    #[test]
    fn equivalent_indices_empty_for_default_category() {
        let patterns = includes_rule();
        let rules = [FlagRule {
            category: "Includes",
            patterns: &patterns,
        }];
        let matcher = Matcher::new(&rules);
        let tokens = tokenize("gcc main.c other.c");
        let results = matcher.match_tokens(&tokens);
        assert!(get_equivalent_indices(&results, 1).is_empty());
    }

    #[test]
    fn expand_category_map_flattens_groups() {
        let mut raw = HashMap::new();
        raw.insert(
            "Compiler".to_string(),
            vec!["Includes".to_string(), "Libraries".to_string()],
        );
        let expanded = expand_category_map(&raw);
        assert_eq!(expanded.get("Includes"), Some(&"Compiler".to_string()));
        assert_eq!(expanded.get("Libraries"), Some(&"Compiler".to_string()));
    }
}
