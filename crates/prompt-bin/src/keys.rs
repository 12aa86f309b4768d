//! Maps crossterm key events to the chord names used by `prompt-keymap`'s
//! default bindings (`ctrl-a`, `alt-f`, `escape`, `enter`, plain characters).

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Render a key event as a chord string, or `None` for events the keymap
/// never binds (e.g. bare modifier presses).
pub fn chord_for(event: &KeyEvent) -> Option<String> {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let alt = event.modifiers.contains(KeyModifiers::ALT);
    let shift = event.modifiers.contains(KeyModifiers::SHIFT);

    let base = match event.code {
        KeyCode::Char(c) if ctrl => {
            let lower = c.to_ascii_lowercase();
            match lower {
                '_' => "ctrl-_".to_string(),
                _ => format!("ctrl-{lower}"),
            }
        }
        KeyCode::Char(c) if alt => format!("alt-{}", c.to_ascii_lowercase()),
        KeyCode::Backspace if alt => "alt-backspace".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Esc => "escape".to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char('d') if ctrl && shift => "ctrl-shift-d".to_string(),
        _ => return None,
    };

    Some(base)
}

/// A plain, unbound character that should be inserted into the buffer
/// rather than dispatched as a command.
pub fn literal_char(event: &KeyEvent) -> Option<char> {
    if event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    match event.code {
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}
