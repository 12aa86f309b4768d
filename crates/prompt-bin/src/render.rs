//! Draws the styled command line into the terminal, redrawing the whole
//! line in place on every mutation.

use std::io::{self, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::{Print, ResetColor};
use crossterm::terminal::{Clear, ClearType};
use unicode_segmentation::UnicodeSegmentation;

use crate::editor::EditorState;

/// Clears the current line, prints each styled span, and leaves the
/// cursor at the buffer's cursor position (counted in graphemes, since
/// that's what the terminal advances per rendered character).
pub fn draw(out: &mut impl Write, state: &EditorState) -> io::Result<()> {
    queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;

    for (span, color) in state.styled_spans() {
        queue!(out, Print(format!("{}{}", color.to_ansi(), &state.text[span.start..span.end])))?;
    }
    queue!(out, ResetColor)?;

    let column = state.text[..state.cursor].graphemes(true).count() as u16;
    queue!(out, MoveToColumn(column))?;
    out.flush()
}
