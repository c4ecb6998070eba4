//! Classifies a raw [`BackendEvent`] into the reduced vocabulary §4.D's
//! `read_line`/`read_char` event table actually switches on.

use core_events::{BackendEvent, KeyToken, ModMask, NamedKey};

/// One entry of §4.D's event table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Timeout,
    PageUp,
    PageDown,
    Input(char),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    CtrlA,
    CtrlE,
    CtrlL,
    CtrlR,
    Newline,
    Esc,
    Winch(u16, u16),
    /// A key outside §4.D's table (e.g. a control character with no
    /// listed effect). `read_line` ignores it and waits for the next
    /// event; it is not one of the "non-scroll events" the closing
    /// rules speak of.
    Unhandled,
}

pub fn classify(event: BackendEvent) -> EditorAction {
    match event {
        BackendEvent::Timeout => EditorAction::Timeout,
        BackendEvent::Resize(xsize, ysize) => EditorAction::Winch(xsize, ysize),
        BackendEvent::Key(key) => {
            if key.is_ctrl_char('a') {
                return EditorAction::CtrlA;
            }
            if key.is_ctrl_char('e') {
                return EditorAction::CtrlE;
            }
            if key.is_ctrl_char('l') {
                return EditorAction::CtrlL;
            }
            if key.is_ctrl_char('r') {
                return EditorAction::CtrlR;
            }
            match key.token {
                KeyToken::Named(NamedKey::Enter) => EditorAction::Newline,
                KeyToken::Named(NamedKey::Escape) => EditorAction::Esc,
                KeyToken::Named(NamedKey::Backspace) => EditorAction::Backspace,
                KeyToken::Named(NamedKey::Delete) => EditorAction::Delete,
                KeyToken::Named(NamedKey::Left) => EditorAction::CursorLeft,
                KeyToken::Named(NamedKey::Right) => EditorAction::CursorRight,
                KeyToken::Named(NamedKey::Up) => EditorAction::CursorUp,
                KeyToken::Named(NamedKey::Down) => EditorAction::CursorDown,
                KeyToken::Named(NamedKey::PageUp) => EditorAction::PageUp,
                KeyToken::Named(NamedKey::PageDown) => EditorAction::PageDown,
                KeyToken::Named(NamedKey::Home) => EditorAction::CtrlA,
                KeyToken::Named(NamedKey::End) => EditorAction::CtrlE,
                KeyToken::Char(c) if !key.mods.contains(ModMask::CTRL) => EditorAction::Input(c),
                _ => EditorAction::Unhandled,
            }
        }
    }
}

/// True for every action the closing rules call a "non-scroll event":
/// anything other than `PAGE_UP`/`PAGE_DOWN` destroys an active
/// history cursor and, if scroll-back was in progress, returns the
/// window to the live view first.
pub fn is_scroll_action(action: EditorAction) -> bool {
    matches!(action, EditorAction::PageUp | EditorAction::PageDown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{KeyPress, ModMask};

    #[test]
    fn ctrl_r_is_recognised_before_generic_char_match() {
        let event = BackendEvent::Key(KeyPress::new(KeyToken::Char('r'), ModMask::CTRL));
        assert_eq!(classify(event), EditorAction::CtrlR);
    }

    #[test]
    fn plain_char_becomes_input() {
        let event = BackendEvent::Key(KeyPress::plain(KeyToken::Char('x')));
        assert_eq!(classify(event), EditorAction::Input('x'));
    }

    #[test]
    fn home_and_end_alias_ctrl_a_and_ctrl_e() {
        assert_eq!(
            classify(BackendEvent::Key(KeyPress::plain(KeyToken::Named(
                NamedKey::Home
            )))),
            EditorAction::CtrlA
        );
        assert_eq!(
            classify(BackendEvent::Key(KeyPress::plain(KeyToken::Named(
                NamedKey::End
            )))),
            EditorAction::CtrlE
        );
    }

    #[test]
    fn resize_becomes_winch() {
        assert_eq!(
            classify(BackendEvent::Resize(80, 24)),
            EditorAction::Winch(80, 24)
        );
    }

    #[test]
    fn page_actions_are_scroll_actions_only() {
        assert!(is_scroll_action(EditorAction::PageUp));
        assert!(is_scroll_action(EditorAction::PageDown));
        assert!(!is_scroll_action(EditorAction::CursorUp));
        assert!(!is_scroll_action(EditorAction::Newline));
    }
}
