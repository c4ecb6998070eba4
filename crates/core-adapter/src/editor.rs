//! `read_line`/`read_char` orchestration (§4.D): drives
//! [`core_input::LineEditor`] against a real backend, window, and the
//! two history stores, since those pieces all need to be live at once
//! for scroll-back and for painting keystrokes.

use core_input::{EditorAction, EditorOutcome, LineEditor, classify, is_scroll_action, read_char_code};
use core_model::WindowId;
use core_render::{GreedyWrapper, Wrapper};
use core_terminal::Backend;

use crate::{Adapter, AdapterError};

pub enum ReadLineOutcome {
    Line(String),
    /// `verify_routine` signalled abort: §4.D's size = 0 return.
    VerifyAborted,
    /// `ESC` with `return_on_escape` set: §4.D's size = −2 return.
    EscapeAborted,
}

pub enum ReadCharOutcome {
    Code(i16),
    VerifyAborted,
}

pub struct ReadLineRequest<'a> {
    pub max_len: usize,
    pub preloaded: &'a str,
    /// Tenths of a second between `verify_routine` polls; 0 disables
    /// timed input.
    pub tenth_seconds: u32,
    pub return_on_escape: bool,
    pub disable_cmd_history: bool,
    pub verify_routine: Option<&'a mut dyn FnMut() -> i32>,
}

enum ScrollDirection {
    Up,
    Down,
}

impl<B: Backend> Adapter<B> {
    /// `read_line` (§4.D).
    pub fn read_line(&mut self, mut req: ReadLineRequest<'_>) -> Result<ReadLineOutcome, AdapterError> {
        for wrapper in self.wrappers.values_mut() {
            wrapper.flush(&mut |_| {});
        }
        for window in self.windows.windows().iter().map(|w| w.id).collect::<Vec<_>>() {
            if let Some(w) = self.windows.get_mut(window) {
                w.consecutive_lines_output = 0;
            }
        }

        let window = self.active_window_mut()?;
        let space = window
            .xsize
            .saturating_sub(window.right_margin)
            .saturating_sub(window.xcursorpos.saturating_sub(1));
        if space < 1 {
            self.z_ucs_output("\n")?;
        }

        let window = self.active_window_mut()?;
        let preloaded_count = req.preloaded.chars().count() as u16;
        let input_x = window.xcursorpos.saturating_sub(preloaded_count);
        let input_y = window.ycursorpos;
        let input_display_width = window
            .xsize
            .saturating_sub(window.xcursorpos.saturating_sub(1).saturating_sub(preloaded_count))
            .saturating_sub(window.right_margin)
            .max(1);

        let mut editor = LineEditor::new(req.preloaded, req.max_len, input_display_width);
        editor.set_return_on_escape(req.return_on_escape);

        let timed = req.tenth_seconds > 0 && self.backend.is_input_timeout_available();
        let timeout_ms = if timed { Some(100u64) } else { None };
        let mut ticks = 0u32;

        self.redraw_input_line(input_y, input_x, &editor)?;

        loop {
            let event = self.backend.get_next_event(timeout_ms)?;
            let action = classify(event);

            if matches!(action, EditorAction::Timeout) && timed {
                ticks += 1;
                if ticks >= req.tenth_seconds {
                    ticks = 0;
                    if let Some(verify) = req.verify_routine.as_deref_mut() {
                        if verify() != 0 {
                            return Ok(ReadLineOutcome::VerifyAborted);
                        }
                    }
                }
                continue;
            }

            if !is_scroll_action(action) && self.history_cursor.screen_line != 0 {
                self.return_to_live_view()?;
            }

            if is_scroll_action(action) {
                let direction = if matches!(action, EditorAction::PageUp) {
                    ScrollDirection::Up
                } else {
                    ScrollDirection::Down
                };
                self.scroll(direction)?;
                continue;
            }

            let history: &mut dyn core_state::CommandHistory = if req.disable_cmd_history {
                &mut NullCommandHistory
            } else {
                self.command_history
                    .as_deref_mut()
                    .ok_or(AdapterError::NoStoryLinked)?
            };

            match editor.apply(action, history) {
                EditorOutcome::Changed => {
                    self.redraw_input_line(input_y, input_x, &editor)?;
                }
                EditorOutcome::RedrawScreen => {
                    self.backend.redraw_screen_from_scratch()?;
                    self.redraw_input_line(input_y, input_x, &editor)?;
                }
                EditorOutcome::Unchanged => {}
                EditorOutcome::Submitted(line) => {
                    self.backend.goto_yx(input_y, input_x)?;
                    self.backend.clear_to_eol()?;
                    return Ok(ReadLineOutcome::Line(line));
                }
                EditorOutcome::Aborted => return Ok(ReadLineOutcome::EscapeAborted),
                EditorOutcome::Resized(xsize, ysize) => {
                    self.handle_resize(xsize, ysize)?;
                    let width = self
                        .windows
                        .get(WindowId::MAIN)
                        .map(|w| w.content_width())
                        .unwrap_or(input_display_width);
                    editor.set_display_width(width);
                    self.redraw_input_line(input_y, input_x, &editor)?;
                }
                EditorOutcome::Resync => {
                    let (xsize, ysize) = self.backend.screen_size();
                    self.handle_resize(xsize, ysize)?;
                    let width = self
                        .windows
                        .get(WindowId::MAIN)
                        .map(|w| w.content_width())
                        .unwrap_or(input_display_width);
                    editor.set_display_width(width);
                    self.redraw_input_line(input_y, input_x, &editor)?;
                }
            }
        }
    }

    /// `read_char` (§4.D): the same event model, reduced key mapping,
    /// no editor state.
    pub fn read_char(
        &mut self,
        tenth_seconds: u32,
        mut verify_routine: Option<&mut dyn FnMut() -> i32>,
    ) -> Result<ReadCharOutcome, AdapterError> {
        let timed = tenth_seconds > 0 && self.backend.is_input_timeout_available();
        let timeout_ms = if timed { Some(100u64) } else { None };
        let mut ticks = 0u32;

        loop {
            let event = self.backend.get_next_event(timeout_ms)?;
            let action = classify(event);

            if matches!(action, EditorAction::Timeout) && timed {
                ticks += 1;
                if ticks >= tenth_seconds {
                    ticks = 0;
                    if let Some(verify) = verify_routine.as_deref_mut() {
                        if verify() != 0 {
                            return Ok(ReadCharOutcome::VerifyAborted);
                        }
                    }
                }
                continue;
            }
            if let EditorAction::Winch(xsize, ysize) = action {
                self.handle_resize(xsize, ysize)?;
                continue;
            }
            if matches!(action, EditorAction::CtrlR) {
                let (xsize, ysize) = self.backend.screen_size();
                self.handle_resize(xsize, ysize)?;
                continue;
            }
            if let Some(code) = read_char_code(action) {
                return Ok(ReadCharOutcome::Code(code));
            }
        }
    }

    fn redraw_input_line(&mut self, row: u16, col: u16, editor: &LineEditor) -> Result<(), AdapterError> {
        self.backend.goto_yx(row, col)?;
        self.backend.clear_to_eol()?;
        self.backend.put_text(&editor.visible_slice())?;
        self.backend.goto_yx(row, col + editor.cursor_column())?;
        Ok(())
    }

    /// Closing rule: a non-scroll event while scroll-back is active
    /// returns the window to the live view before that event is acted
    /// on, and discards the history cursor.
    fn return_to_live_view(&mut self) -> Result<(), AdapterError> {
        let id = WindowId::MAIN;
        self.history_cursor = core_state::HistoryCursor::default();
        let hyphenate = !self.config.disable_hyphenation;
        let width = self.windows.get(id).map(|w| w.content_width()).unwrap_or(1);
        let wrapper = self
            .wrappers
            .entry(id)
            .or_insert_with(|| GreedyWrapper::new(width, hyphenate));
        let window = self
            .windows
            .get_mut(id)
            .ok_or(AdapterError::GeometryViolation(id))?;
        let ysize = window.ysize;
        let history = self.output_history.as_deref_mut().ok_or(AdapterError::NoStoryLinked)?;
        let mut cursor = core_state::HistoryCursor::default();
        self.refresh_engine
            .refresh(&mut self.backend, &mut self.pipeline, window, wrapper, history, &mut cursor, 1, ysize)?;
        self.backend.set_cursor_visibility(true)?;
        Ok(())
    }

    fn scroll(&mut self, direction: ScrollDirection) -> Result<(), AdapterError> {
        let id = WindowId::MAIN;
        let ysize = self
            .windows
            .get(id)
            .ok_or(AdapterError::GeometryViolation(id))?
            .ysize;
        let step = ysize.div_ceil(2) as i64;
        match direction {
            ScrollDirection::Up => self.history_cursor.screen_line += step,
            ScrollDirection::Down => {
                self.history_cursor.screen_line = (self.history_cursor.screen_line - step).max(0)
            }
        }

        let hyphenate = !self.config.disable_hyphenation;
        let width = self.windows.get(id).map(|w| w.content_width()).unwrap_or(1);
        let wrapper = self
            .wrappers
            .entry(id)
            .or_insert_with(|| GreedyWrapper::new(width, hyphenate));
        let window = self
            .windows
            .get_mut(id)
            .ok_or(AdapterError::GeometryViolation(id))?;
        let history = self.output_history.as_deref_mut().ok_or(AdapterError::NoStoryLinked)?;
        self.refresh_engine.refresh(
            &mut self.backend,
            &mut self.pipeline,
            window,
            wrapper,
            history,
            &mut self.history_cursor,
            1,
            ysize,
        )?;
        self.backend
            .set_cursor_visibility(self.history_cursor.screen_line == 0)?;
        Ok(())
    }

    /// §4.G's resize sequence, entered mid-`read_line`/`read_char` on a
    /// `WINCH`: re-derive geometry, widen every buffering window's
    /// wrapper, and repaint window 0 from history.
    fn handle_resize(&mut self, xsize: u16, ysize: u16) -> Result<(), AdapterError> {
        self.windows.relayout(xsize, ysize);
        let ids: Vec<WindowId> = self.windows.windows().iter().map(|w| w.id).collect();
        for id in ids {
            if let (Some(window), Some(wrapper)) =
                (self.windows.get(id), self.wrappers.get_mut(&id))
            {
                wrapper.adjust_line_length(window.content_width());
            }
        }

        let id = WindowId::MAIN;
        let Some(window_ysize) = self.windows.get(id).map(|w| w.ysize) else {
            return Ok(());
        };
        let hyphenate = !self.config.disable_hyphenation;
        let width = self.windows.get(id).map(|w| w.content_width()).unwrap_or(1);
        let wrapper = self
            .wrappers
            .entry(id)
            .or_insert_with(|| GreedyWrapper::new(width, hyphenate));
        let window = self
            .windows
            .get_mut(id)
            .ok_or(AdapterError::GeometryViolation(id))?;
        let mut cursor = self.history_cursor;
        if let Some(history) = self.output_history.as_deref_mut() {
            self.refresh_engine.refresh(
                &mut self.backend,
                &mut self.pipeline,
                window,
                wrapper,
                history,
                &mut cursor,
                1,
                window_ysize,
            )?;
        }
        self.history_cursor = cursor;
        Ok(())
    }
}

/// Backs `disable_cmd_history`: a `CURSOR_UP`/`CURSOR_DOWN` recall that
/// always reports nothing to recall, without needing `Option` plumbing
/// through the editor's `apply`.
struct NullCommandHistory;

impl core_state::CommandHistory for NullCommandHistory {
    fn push(&mut self, _line: &str) {}
    fn recall_older(&mut self) -> Option<&str> {
        None
    }
    fn recall_newer(&mut self) -> Option<&str> {
        None
    }
    fn reset_cursor(&mut self) {}
}
