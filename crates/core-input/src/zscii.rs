//! `read_char`'s reduced key mapping: no editor state, just the
//! distinguished cursor/edit key codes plus raw character input.

use crate::action::EditorAction;

/// Maps a classified action to the value `read_char` hands back, or
/// `None` if the key has no `read_char` meaning (e.g. `CTRL_L`,
/// `CTRL_R`, a resize).
pub fn read_char_code(action: EditorAction) -> Option<i16> {
    match action {
        EditorAction::CursorUp => Some(129),
        EditorAction::CursorDown => Some(130),
        EditorAction::CursorLeft => Some(131),
        EditorAction::CursorRight => Some(132),
        EditorAction::Backspace => Some(8),
        EditorAction::Delete => Some(127),
        EditorAction::Newline => Some(13),
        EditorAction::Esc => Some(27),
        EditorAction::Input(c) => Some(c as i16),
        _ => None,
    }
}
