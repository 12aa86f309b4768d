//! Turns a tokenized, matched command line into a byte-exact partition of
//! styled spans covering the whole source text, including whitespace gaps.

use std::collections::{HashMap, HashSet};

use prompt_match::{MatchResult, Matcher, DEFAULT_CATEGORY};
use prompt_style::{combine_colors, ParsedColor};
use prompt_text::{tokenize, Token};

/// One contiguous, uniformly-styled run of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    pub start: usize,
    pub end: usize,
    pub category: String,
    pub token_index: Option<usize>,
}

/// A fully lexed command line: its tokens, their category matches, and the
/// span partition derived from them.
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub matches: Vec<MatchResult>,
    pub spans: Vec<StyledSpan>,
}

/// Styles a command line's categories. Lights-off is a boolean flag plus an
/// optional category name: with a category, every other category dims; with
/// none, dimming is cursor-driven (only the token at `cursor_token` stays lit).
pub struct Lexer {
    matcher: Matcher,
    lights_off: bool,
    category: Option<String>,
}

const GAP_CATEGORY: &str = "ui:gap";
const LIGHTS_OFF_DIM_CATEGORY: &str = "ui:lights-off-dim";

impl Lexer {
    pub fn new(matcher: Matcher) -> Self {
        Self {
            matcher,
            lights_off: false,
            category: None,
        }
    }

    pub fn set_lights_off(&mut self, on: bool) {
        self.lights_off = on;
        if !on {
            self.category = None;
        }
    }

    pub fn lights_off(&self) -> bool {
        self.lights_off
    }

    pub fn lights_off_category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Toggle lights-off for `category` (`None` means cursor-driven).
    /// Toggling with the category already active clears the mode; toggling
    /// with a different category switches to it.
    pub fn toggle_lights_off(&mut self, category: Option<&str>) -> bool {
        let same = self.lights_off && self.category.as_deref() == category;
        if same {
            self.lights_off = false;
            self.category = None;
        } else {
            self.lights_off = true;
            self.category = category.map(str::to_string);
        }
        self.lights_off
    }

    /// Tokenize, match, and partition `text` into styled spans covering
    /// every byte, whitespace included. `cursor_token` is the index of the
    /// token the cursor currently sits in, used when lights-off is active
    /// with no category selected.
    pub fn lex_document(&self, text: &str, cursor_token: Option<usize>) -> LexResult {
        let tokens = tokenize(text);
        let matches = self.matcher.match_tokens(&tokens);
        let spans = style_results(
            text,
            &tokens,
            &matches,
            self.lights_off,
            self.category.as_deref(),
            cursor_token,
        );

        LexResult { tokens, matches, spans }
    }
}

fn style_results(
    text: &str,
    tokens: &[Token],
    matches: &[MatchResult],
    lights_off: bool,
    category: Option<&str>,
    cursor_token: Option<usize>,
) -> Vec<StyledSpan> {
    let mut spans = Vec::with_capacity(tokens.len() * 2 + 1);
    let mut cursor = 0usize;

    for (token, result) in tokens.iter().zip(matches.iter()) {
        if token.start > cursor {
            spans.push(StyledSpan {
                start: cursor,
                end: token.start,
                category: GAP_CATEGORY.to_string(),
                token_index: None,
            });
        }

        let dimmed = lights_off
            && match category {
                Some(selected) => !result.category.eq_ignore_ascii_case(selected),
                None => cursor_token != Some(result.token_index),
            };

        let category = if dimmed {
            LIGHTS_OFF_DIM_CATEGORY.to_string()
        } else {
            result.category.clone()
        };

        spans.push(StyledSpan {
            start: token.start,
            end: token.end,
            category,
            token_index: Some(result.token_index),
        });
        cursor = token.end;
    }

    if cursor < text.len() {
        spans.push(StyledSpan {
            start: cursor,
            end: text.len(),
            category: GAP_CATEGORY.to_string(),
            token_index: None,
        });
    }

    spans
}

/// How duplicate-flag groups are rendered on top of the base category
/// styling: hidden (collapsed out of view), selected, or the currently
/// focused group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DuplicateOverlay {
    Hidden,
    Selected,
    Current,
}

/// Resolve the final [`ParsedColor`] for each span, applying category base
/// styles, then a duplicates-mode overlay for spans whose token index is
/// highlighted.
pub fn resolve_styles(
    spans: &[StyledSpan],
    category_styles: &HashMap<String, ParsedColor>,
    duplicate_overlays: &HashMap<usize, DuplicateOverlay>,
    overlay_styles: &HashMap<DuplicateOverlay, ParsedColor>,
) -> Vec<ParsedColor> {
    spans
        .iter()
        .map(|span| {
            let base = category_styles.get(&span.category).cloned().unwrap_or_default();
            match span.token_index.and_then(|idx| duplicate_overlays.get(&idx)) {
                Some(overlay) => match overlay_styles.get(overlay) {
                    Some(overlay_style) => combine_colors(&base, overlay_style),
                    None => base,
                },
                None => base,
            }
        })
        .collect()
}

/// Token indices belonging to duplicate groups, useful to feed
/// [`resolve_styles`] after a duplicates-mode selection changes.
pub fn duplicate_overlay_map(
    highlighted: &HashSet<usize>,
    selected: &HashSet<usize>,
    current: Option<usize>,
) -> HashMap<usize, DuplicateOverlay> {
    let mut map = HashMap::new();
    for &idx in highlighted {
        map.insert(idx, DuplicateOverlay::Hidden);
    }
    for &idx in selected {
        map.insert(idx, DuplicateOverlay::Selected);
    }
    if let Some(idx) = current {
        map.insert(idx, DuplicateOverlay::Current);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompt_match::FlagRule;

    fn includes_matcher() -> Matcher {
        let patterns = vec![r"-(I)(.*)".to_string()];
        let rules = [FlagRule {
            category: "Includes",
            patterns: &patterns,
        }];
        Matcher::new(&rules)
    }

    #[test]
    fn spans_cover_the_entire_text_including_gaps() {
        let lexer = Lexer::new(includes_matcher());
        let text = "gcc  -Iinclude main.c";
        let result = lexer.lex_document(text, None);
        let mut cursor = 0;
        for span in &result.spans {
            assert_eq!(span.start, cursor);
            cursor = span.end;
        }
        assert_eq!(cursor, text.len());
    }

    #[test]
    fn lights_off_with_category_dims_every_other_category() {
        let mut lexer = Lexer::new(includes_matcher());
        lexer.toggle_lights_off(Some("Includes"));
        let result = lexer.lex_document("gcc -Iinclude main.c", None);
        let exec_span = result.spans.iter().find(|s| s.token_index == Some(0)).unwrap();
        assert_eq!(exec_span.category, LIGHTS_OFF_DIM_CATEGORY);
        let include_span = result.spans.iter().find(|s| s.token_index == Some(1)).unwrap();
        assert_eq!(include_span.category, "Includes");
    }

    #[test]
    fn lights_off_without_category_is_cursor_driven() {
        let mut lexer = Lexer::new(includes_matcher());
        lexer.toggle_lights_off(None);
        let result = lexer.lex_document("gcc -Iinclude main.c", Some(1));
        let exec_span = result.spans.iter().find(|s| s.token_index == Some(0)).unwrap();
        assert_eq!(exec_span.category, LIGHTS_OFF_DIM_CATEGORY);
        let include_span = result.spans.iter().find(|s| s.token_index == Some(1)).unwrap();
        assert_eq!(include_span.category, "Includes");
    }

    #[test]
    fn toggling_same_category_clears_lights_off() {
        let mut lexer = Lexer::new(includes_matcher());
        assert!(lexer.toggle_lights_off(Some("Includes")));
        assert!(!lexer.toggle_lights_off(Some("Includes")));
        assert!(!lexer.lights_off());
    }

    #[test]
    fn toggling_a_different_category_switches_instead_of_clearing() {
        let mut lexer = Lexer::new(includes_matcher());
        lexer.toggle_lights_off(Some("Includes"));
        assert!(lexer.toggle_lights_off(Some("Libraries")));
        assert_eq!(lexer.lights_off_category(), Some("Libraries"));
    }

    #[test]
    fn default_category_used_for_unmatched_tokens() {
        let lexer = Lexer::new(includes_matcher());
        let result = lexer.lex_document("gcc main.c", None);
        let arg_span = result.spans.iter().find(|s| s.token_index == Some(1)).unwrap();
        assert_eq!(arg_span.category, DEFAULT_CATEGORY);
    }
}
