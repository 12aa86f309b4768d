//! Grapheme-aware editing over the single-line buffer: cursor motion and
//! deletion operate on grapheme boundaries, never splitting a multi-byte
//! character or a combining sequence.

use unicode_segmentation::UnicodeSegmentation;

/// Byte offsets of every grapheme boundary in `text`, including 0 and
/// `text.len()`.
fn boundaries(text: &str) -> Vec<usize> {
    let mut bounds: Vec<usize> = text.grapheme_indices(true).map(|(i, _)| i).collect();
    bounds.push(text.len());
    bounds
}

/// The byte offset one grapheme to the left of `cursor`, or `cursor` if
/// already at the start.
pub fn prev_boundary(text: &str, cursor: usize) -> usize {
    boundaries(text).into_iter().rev().find(|&b| b < cursor).unwrap_or(0)
}

/// The byte offset one grapheme to the right of `cursor`, or `cursor` if
/// already at the end.
pub fn next_boundary(text: &str, cursor: usize) -> usize {
    boundaries(text).into_iter().find(|&b| b > cursor).unwrap_or(text.len())
}

fn is_word_byte(c: char) -> bool {
    !c.is_whitespace()
}

/// The start of the previous word (a maximal run of non-whitespace),
/// skipping any whitespace immediately to the left of `cursor` first.
pub fn prev_word_boundary(text: &str, cursor: usize) -> usize {
    let mut pos = cursor;
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let idx_of = |byte: usize| chars.iter().position(|&(i, _)| i == byte).unwrap_or(chars.len());

    let mut i = idx_of(pos);
    while i > 0 && chars[i - 1].1.is_whitespace() {
        i -= 1;
    }
    while i > 0 && is_word_byte(chars[i - 1].1) {
        i -= 1;
    }
    pos = chars.get(i).map(|&(b, _)| b).unwrap_or(0);
    pos
}

/// The end of the next word, skipping whitespace to the right of `cursor`
/// first.
pub fn next_word_boundary(text: &str, cursor: usize) -> usize {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let idx_of = |byte: usize| chars.iter().position(|&(i, _)| i == byte).unwrap_or(chars.len());

    let mut i = idx_of(cursor);
    while i < chars.len() && chars[i].1.is_whitespace() {
        i += 1;
    }
    while i < chars.len() && is_word_byte(chars[i].1) {
        i += 1;
    }
    chars.get(i).map(|&(b, _)| b).unwrap_or(text.len())
}

/// Insert `ch` at `cursor`, returning the new cursor position.
pub fn insert_char(text: &mut String, cursor: usize, ch: char) -> usize {
    text.insert(cursor, ch);
    cursor + ch.len_utf8()
}

/// Remove the byte range `[start, end)`, returning the new cursor position
/// (`start`).
pub fn remove_range(text: &mut String, start: usize, end: usize) -> usize {
    text.replace_range(start..end, "");
    start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_step_over_multibyte_graphemes() {
        let text = "a\u{00e9}b"; // "a", "é" (2 bytes), "b"
        assert_eq!(next_boundary(text, 1), 3);
        assert_eq!(prev_boundary(text, 3), 1);
    }

    #[test]
    fn word_boundaries_skip_whitespace_and_stop_at_runs() {
        let text = "gcc  -O2 main.c";
        assert_eq!(next_word_boundary(text, 0), 3);
        assert_eq!(next_word_boundary(text, 3), 8);
        assert_eq!(prev_word_boundary(text, 8), 5);
    }

    #[test]
    fn insert_and_remove_update_cursor() {
        let mut text = "gcc main.c".to_string();
        let cursor = insert_char(&mut text, 3, ' ');
        assert_eq!(text, "gcc  main.c");
        assert_eq!(cursor, 4);

        let cursor = remove_range(&mut text, 3, 4);
        assert_eq!(text, "gcc main.c");
        assert_eq!(cursor, 3);
    }
}
