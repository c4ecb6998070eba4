//! The `read_line` buffer/cursor state machine (component D). This owns
//! the text being composed and its on-screen scroll window; it knows
//! nothing about a backend or a window, so the driver that actually
//! paints keystrokes lives above this crate.

use core_state::CommandHistory;

use crate::action::EditorAction;

/// What happened to the line as a result of one [`EditorAction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    /// The buffer or cursor changed; redraw the visible slice.
    Changed,
    /// `CTRL_L`: redraw the whole screen, buffer unchanged.
    RedrawScreen,
    /// Nothing the line editor owns changed (an unhandled key, or a
    /// recall that hit the end of history).
    Unchanged,
    /// `NEWLINE`: input is complete.
    Submitted(String),
    /// `ESC` with `return_on_escape` set.
    Aborted,
    /// `WINCH`: the caller must reinitialise geometry before resuming.
    Resized(u16, u16),
    /// `CTRL_R`: treat as a resize event against the backend's current
    /// screen dimensions. The composed buffer is left untouched.
    Resync,
}

/// The composed-line buffer, its edit cursor, and the horizontal
/// scroll offset used when the line is wider than the display.
#[derive(Debug, Clone)]
pub struct LineEditor {
    buffer: Vec<char>,
    cursor: usize,
    scroll: usize,
    display_width: u16,
    max_len: usize,
    return_on_escape: bool,
}

impl LineEditor {
    /// `preloaded` seeds the buffer (§4.D allows a story to supply
    /// initial input text); the cursor starts at its end.
    pub fn new(preloaded: &str, max_len: usize, display_width: u16) -> Self {
        let buffer: Vec<char> = preloaded.chars().take(max_len).collect();
        let cursor = buffer.len();
        let mut editor = Self {
            buffer,
            cursor,
            scroll: 0,
            display_width: display_width.max(1),
            max_len,
            return_on_escape: false,
        };
        editor.rescroll();
        editor
    }

    pub fn set_return_on_escape(&mut self, yes: bool) {
        self.return_on_escape = yes;
    }

    pub fn set_display_width(&mut self, width: u16) {
        self.display_width = width.max(1);
        self.rescroll();
    }

    pub fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The portion of the buffer currently within the display window.
    pub fn visible_slice(&self) -> String {
        let width = self.display_width as usize;
        let start = self.scroll.min(self.buffer.len());
        let end = (start + width).min(self.buffer.len());
        self.buffer[start..end].iter().collect()
    }

    /// Column of the cursor within the visible slice (0-based).
    pub fn cursor_column(&self) -> u16 {
        (self.cursor - self.scroll) as u16
    }

    fn rescroll(&mut self) {
        let width = self.display_width as usize;
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + width {
            self.scroll = self.cursor + 1 - width;
        }
    }

    fn insert_char(&mut self, c: char) -> bool {
        if self.buffer.len() >= self.max_len {
            return false;
        }
        self.buffer.insert(self.cursor, c);
        self.cursor += 1;
        self.rescroll();
        true
    }

    fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.buffer.remove(self.cursor);
        self.rescroll();
        true
    }

    fn delete(&mut self) -> bool {
        if self.cursor >= self.buffer.len() {
            return false;
        }
        self.buffer.remove(self.cursor);
        self.rescroll();
        true
    }

    fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.rescroll();
        true
    }

    fn move_right(&mut self) -> bool {
        if self.cursor >= self.buffer.len() {
            return false;
        }
        self.cursor += 1;
        self.rescroll();
        true
    }

    fn move_home(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor = 0;
        self.rescroll();
        true
    }

    fn move_end(&mut self) -> bool {
        if self.cursor == self.buffer.len() {
            return false;
        }
        self.cursor = self.buffer.len();
        self.rescroll();
        true
    }

    fn replace_with(&mut self, text: &str) {
        self.buffer = text.chars().take(self.max_len).collect();
        self.cursor = self.buffer.len();
        self.rescroll();
    }

    /// Apply one classified event. `history` backs `CURSOR_UP`/
    /// `CURSOR_DOWN` recall per §4.D; scroll-back (`PAGE_UP`/
    /// `PAGE_DOWN`) is handled by the caller since it needs the
    /// output-history store and a backend, not just this buffer.
    pub fn apply(
        &mut self,
        action: EditorAction,
        history: &mut dyn CommandHistory,
    ) -> EditorOutcome {
        match action {
            EditorAction::Timeout | EditorAction::PageUp | EditorAction::PageDown => {
                EditorOutcome::Unchanged
            }
            EditorAction::Input(c) => {
                if self.insert_char(c) {
                    EditorOutcome::Changed
                } else {
                    EditorOutcome::Unchanged
                }
            }
            EditorAction::Backspace => {
                if self.backspace() {
                    EditorOutcome::Changed
                } else {
                    EditorOutcome::Unchanged
                }
            }
            EditorAction::Delete => {
                if self.delete() {
                    EditorOutcome::Changed
                } else {
                    EditorOutcome::Unchanged
                }
            }
            EditorAction::CursorLeft => {
                if self.move_left() {
                    EditorOutcome::Changed
                } else {
                    EditorOutcome::Unchanged
                }
            }
            EditorAction::CursorRight => {
                if self.move_right() {
                    EditorOutcome::Changed
                } else {
                    EditorOutcome::Unchanged
                }
            }
            EditorAction::CursorUp => match history.recall_older() {
                Some(line) => {
                    let line = line.to_string();
                    self.replace_with(&line);
                    EditorOutcome::Changed
                }
                None => EditorOutcome::Unchanged,
            },
            EditorAction::CursorDown => match history.recall_newer() {
                Some(line) => {
                    let line = line.to_string();
                    self.replace_with(&line);
                    EditorOutcome::Changed
                }
                None => {
                    self.replace_with("");
                    EditorOutcome::Changed
                }
            },
            EditorAction::CtrlA => {
                if self.move_home() {
                    EditorOutcome::Changed
                } else {
                    EditorOutcome::Unchanged
                }
            }
            EditorAction::CtrlE => {
                if self.move_end() {
                    EditorOutcome::Changed
                } else {
                    EditorOutcome::Unchanged
                }
            }
            EditorAction::CtrlL => EditorOutcome::RedrawScreen,
            // §4.D: CTRL_R reinitialises from backend-reported screen
            // dimensions, same as a resize; it does not touch the line
            // being composed or the recall cursor.
            EditorAction::CtrlR => EditorOutcome::Resync,
            EditorAction::Newline => {
                let line = self.text();
                tracing::debug!(target: "input.editor", len = line.len(), "line_submitted");
                history.push(&line);
                EditorOutcome::Submitted(line)
            }
            EditorAction::Esc => {
                if self.return_on_escape {
                    EditorOutcome::Aborted
                } else {
                    EditorOutcome::Unchanged
                }
            }
            EditorAction::Winch(xsize, ysize) => EditorOutcome::Resized(xsize, ysize),
            EditorAction::Unhandled => EditorOutcome::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_state::RingCommandHistory;

    #[test]
    fn preloaded_text_starts_with_cursor_at_end() {
        let editor = LineEditor::new("go north", 80, 40);
        assert_eq!(editor.text(), "go north");
        assert_eq!(editor.cursor_column(), 8);
    }

    #[test]
    fn typing_past_max_len_is_rejected() {
        let mut history = RingCommandHistory::new(8);
        let mut editor = LineEditor::new("", 3, 40);
        assert_eq!(
            editor.apply(EditorAction::Input('a'), &mut history),
            EditorOutcome::Changed
        );
        editor.apply(EditorAction::Input('b'), &mut history);
        editor.apply(EditorAction::Input('c'), &mut history);
        assert_eq!(
            editor.apply(EditorAction::Input('d'), &mut history),
            EditorOutcome::Unchanged
        );
        assert_eq!(editor.text(), "abc");
    }

    #[test]
    fn backspace_and_delete_edit_around_the_cursor() {
        let mut history = RingCommandHistory::new(8);
        let mut editor = LineEditor::new("wait", 80, 40);
        editor.apply(EditorAction::CursorLeft, &mut history);
        editor.apply(EditorAction::Backspace, &mut history);
        assert_eq!(editor.text(), "wat");
        editor.apply(EditorAction::Delete, &mut history);
        assert_eq!(editor.text(), "wa");
    }

    #[test]
    fn newline_submits_and_records_history() {
        let mut history = RingCommandHistory::new(8);
        let mut editor = LineEditor::new("look", 80, 40);
        let outcome = editor.apply(EditorAction::Newline, &mut history);
        assert_eq!(outcome, EditorOutcome::Submitted("look".to_string()));
        assert_eq!(history.recall_older(), Some("look"));
    }

    #[test]
    fn cursor_up_recalls_history_replacing_the_buffer() {
        let mut history = RingCommandHistory::new(8);
        history.push("take lamp");
        let mut editor = LineEditor::new("", 80, 40);
        let outcome = editor.apply(EditorAction::CursorUp, &mut history);
        assert_eq!(outcome, EditorOutcome::Changed);
        assert_eq!(editor.text(), "take lamp");
    }

    #[test]
    fn cursor_down_past_newest_clears_the_buffer() {
        let mut history = RingCommandHistory::new(8);
        history.push("take lamp");
        let mut editor = LineEditor::new("", 80, 40);
        editor.apply(EditorAction::CursorUp, &mut history);
        editor.apply(EditorAction::CursorDown, &mut history);
        assert_eq!(editor.text(), "");
    }

    #[test]
    fn escape_aborts_only_when_enabled() {
        let mut history = RingCommandHistory::new(8);
        let mut editor = LineEditor::new("hi", 80, 40);
        assert_eq!(
            editor.apply(EditorAction::Esc, &mut history),
            EditorOutcome::Unchanged
        );
        editor.set_return_on_escape(true);
        assert_eq!(
            editor.apply(EditorAction::Esc, &mut history),
            EditorOutcome::Aborted
        );
    }

    #[test]
    fn cursor_scrolls_horizontally_past_display_width() {
        let mut history = RingCommandHistory::new(8);
        let mut editor = LineEditor::new("", 80, 4);
        for c in "abcdefgh".chars() {
            editor.apply(EditorAction::Input(c), &mut history);
        }
        assert_eq!(editor.visible_slice(), "efgh");
        assert_eq!(editor.cursor_column(), 4);
    }

    #[test]
    fn ctrl_r_resyncs_geometry_and_preserves_the_buffer() {
        let mut history = RingCommandHistory::new(8);
        history.push("xyzzy");
        let mut editor = LineEditor::new("partial", 80, 40);
        let outcome = editor.apply(EditorAction::CtrlR, &mut history);
        assert_eq!(outcome, EditorOutcome::Resync);
        assert_eq!(editor.text(), "partial");
    }
}
