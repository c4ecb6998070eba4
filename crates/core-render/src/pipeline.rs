//! The window-target routine: §4.B's per-line algorithm that turns a
//! stream of wrap tokens destined for one window into cell-level backend
//! calls, handling margins, style/colour diffing, scroll-on-overflow,
//! and [MORE] pagination.

use core_events::BackendEvent;
use core_model::Window;
use core_terminal::{Backend, BackendError};

use crate::style::WrapToken;

pub struct OutputPipeline {
    disable_more_prompt: bool,
}

impl Default for OutputPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPipeline {
    pub fn new() -> Self {
        Self {
            disable_more_prompt: false,
        }
    }

    pub fn set_disable_more_prompt(&mut self, disable: bool) {
        self.disable_more_prompt = disable;
    }

    /// Route one wrap token at `window` through the backend. `flush_others`
    /// is invoked before a [MORE] prompt is shown, giving the caller a
    /// chance to flush every other buffering window first (§4.B step 7).
    pub fn target<B: Backend>(
        &mut self,
        backend: &mut B,
        window: &mut Window,
        token: WrapToken,
        flush_others: &mut dyn FnMut(&mut B),
    ) -> Result<(), BackendError> {
        match token {
            WrapToken::Style(style) => {
                window.buffered_style = style;
                Ok(())
            }
            WrapToken::Colour(fg, bg) => {
                window.buffered_colour = (fg, bg);
                Ok(())
            }
            WrapToken::Newline => self.on_line_boundary(backend, window, flush_others),
            WrapToken::Text(text) => self.emit_run(backend, window, &text, flush_others),
        }
    }

    fn emit_run<B: Backend>(
        &mut self,
        backend: &mut B,
        window: &mut Window,
        mut text: &str,
        flush_others: &mut dyn FnMut(&mut B),
    ) -> Result<(), BackendError> {
        while !text.is_empty() {
            // Step 1: clamp cursor out of the lower margin.
            let floor = window.ysize.saturating_sub(window.refresh.lower_margin).max(1);
            if window.ycursorpos > floor {
                window.ycursorpos = floor;
            }

            // Step 2: reconcile backend style/colour with the window's.
            self.reconcile_style_colour(backend, window)?;

            // Step 3: space remaining on this line.
            let space = window
                .xsize
                .saturating_sub(window.right_margin)
                .saturating_sub(window.xcursorpos.saturating_sub(1));

            // Steps 4-5: take up to `space` characters (wrap tokens never
            // carry an embedded newline, so no search for one is needed
            // here — the wrapper already split on line breaks).
            let take = (space as usize).min(text.chars().count());
            let (chunk, rest) = split_at_chars(text, take);
            if !chunk.is_empty() {
                backend.goto_yx(
                    window.ypos + window.ycursorpos - 1,
                    window.xpos + window.xcursorpos - 1,
                )?;
                backend.put_text(chunk)?;
                window.xcursorpos += chunk.chars().count() as u16;
            }
            text = rest;

            if !text.is_empty() {
                // Line filled but more text remains: this is a wrap point.
                self.on_line_boundary(backend, window, flush_others)?;
            } else if take == 0 {
                // Nothing fit and nothing was consumed: force a break so
                // we always make progress.
                self.on_line_boundary(backend, window, flush_others)?;
            }
        }
        Ok(())
    }

    fn reconcile_style_colour<B: Backend>(
        &mut self,
        backend: &mut B,
        window: &mut Window,
    ) -> Result<(), BackendError> {
        if window.output_style != window.buffered_style {
            backend.set_text_style(window.buffered_style)?;
            window.output_style = window.buffered_style;
        }
        if window.output_colour != window.buffered_colour {
            backend.set_colour(window.buffered_colour.0, window.buffered_colour.1)?;
            window.output_colour = window.buffered_colour;
        }
        Ok(())
    }

    /// Step 6: at a line boundary either scroll the writable region or
    /// advance the cursor, then reset to the left margin and run the
    /// refresh-bookkeeping decrements, then step 7's [MORE] check.
    fn on_line_boundary<B: Backend>(
        &mut self,
        backend: &mut B,
        window: &mut Window,
        flush_others: &mut dyn FnMut(&mut B),
    ) -> Result<(), BackendError> {
        let bottom = window.ysize.saturating_sub(window.refresh.lower_margin).max(1);
        let on_last_row = window.ycursorpos >= bottom;

        if window.wrapping && on_last_row {
            let top = window.refresh.upper_margin + 1;
            if bottom > top {
                backend.copy_area(
                    window.ypos + top - 1,
                    window.xpos,
                    window.ypos + top,
                    window.xpos,
                    bottom - top,
                    window.xsize,
                )?;
            }
            backend.clear_area(window.xpos, window.ypos + bottom - 1, window.xsize, 1)?;
        } else {
            window.ycursorpos += 1;
        }
        window.xcursorpos = 1 + window.left_margin;

        if window.refresh.lines_to_skip > 0 {
            window.refresh.lines_to_skip -= 1;
        }
        if let Some(n) = window.refresh.remaining_lines_to_fill.as_mut() {
            *n = n.saturating_sub(1);
        }
        window.consecutive_lines_output += 1;

        self.maybe_page(backend, window, flush_others)
    }

    fn maybe_page<B: Backend>(
        &mut self,
        backend: &mut B,
        window: &mut Window,
        flush_others: &mut dyn FnMut(&mut B),
    ) -> Result<(), BackendError> {
        let refreshing =
            window.refresh.remaining_lines_to_fill.is_some() || window.refresh.lines_to_skip > 0;
        let page_full = window.consecutive_lines_output >= window.ysize.saturating_sub(1);

        if !window.wrapping || self.disable_more_prompt || !page_full || refreshing {
            return Ok(());
        }

        tracing::debug!(target: "render.pipeline", window = ?window.id, "more_prompt");
        flush_others(backend);
        backend.goto_yx(window.ypos + window.ysize - 1, window.xpos)?;
        backend.put_text("[MORE]")?;
        backend.update_screen()?;
        loop {
            match backend.get_next_event(None)? {
                BackendEvent::Timeout => continue,
                BackendEvent::Resize(_, _) | BackendEvent::Key(_) => break,
            }
        }
        backend.clear_area(window.xpos, window.ypos + window.ysize - 1, window.xsize, 1)?;
        window.consecutive_lines_output = 0;
        Ok(())
    }
}

fn split_at_chars(s: &str, n: usize) -> (&str, &str) {
    match s.char_indices().nth(n) {
        Some((idx, _)) => s.split_at(idx),
        None => (s, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::{StoryVersion, WindowId, WindowRegistry};
    use core_text::Colour;

    struct RecordingBackend {
        events: std::collections::VecDeque<BackendEvent>,
        puts: Vec<String>,
    }

    impl RecordingBackend {
        fn new() -> Self {
            Self {
                events: std::collections::VecDeque::new(),
                puts: Vec::new(),
            }
        }
    }

    impl Backend for RecordingBackend {
        fn screen_size(&self) -> (u16, u16) {
            (80, 24)
        }
        fn default_colours(&self) -> (Colour, Colour) {
            (Colour::DEFAULT, Colour::DEFAULT)
        }
        fn is_colour_available(&self) -> bool {
            true
        }
        fn is_bold_face_available(&self) -> bool {
            true
        }
        fn is_italic_available(&self) -> bool {
            true
        }
        fn is_input_timeout_available(&self) -> bool {
            true
        }
        fn interface_name(&self) -> &str {
            "test"
        }
        fn goto_yx(&mut self, _row: u16, _col: u16) -> Result<(), BackendError> {
            Ok(())
        }
        fn put_text(&mut self, text: &str) -> Result<(), BackendError> {
            self.puts.push(text.to_string());
            Ok(())
        }
        fn set_text_style(&mut self, _style: core_text::TextStyle) -> Result<(), BackendError> {
            Ok(())
        }
        fn set_colour(&mut self, _fg: Colour, _bg: Colour) -> Result<(), BackendError> {
            Ok(())
        }
        fn clear_area(&mut self, _x: u16, _y: u16, _w: u16, _h: u16) -> Result<(), BackendError> {
            Ok(())
        }
        fn clear_to_eol(&mut self) -> Result<(), BackendError> {
            Ok(())
        }
        fn copy_area(
            &mut self,
            _dy: u16,
            _dx: u16,
            _sy: u16,
            _sx: u16,
            _h: u16,
            _w: u16,
        ) -> Result<(), BackendError> {
            Ok(())
        }
        fn set_cursor_visibility(&mut self, _visible: bool) -> Result<(), BackendError> {
            Ok(())
        }
        fn update_screen(&mut self) -> Result<(), BackendError> {
            Ok(())
        }
        fn redraw_screen_from_scratch(&mut self) -> Result<(), BackendError> {
            Ok(())
        }
        fn get_next_event(&mut self, _timeout_ms: Option<u64>) -> Result<BackendEvent, BackendError> {
            Ok(self.events.pop_front().unwrap_or(BackendEvent::Timeout))
        }
        fn set_title(&mut self, _title: &str) -> Result<(), BackendError> {
            Ok(())
        }
        fn prompt_for_filename(&mut self, _write: bool) -> Result<Option<String>, BackendError> {
            Ok(None)
        }
        fn parse_config_parameter(&mut self, _key: &str, _value: &str) -> Result<(), BackendError> {
            Ok(())
        }
        fn get_config_value(&self, _key: &str) -> Option<String> {
            None
        }
        fn get_config_option_names(&self) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn plain_text_advances_cursor() {
        let mut backend = RecordingBackend::new();
        let mut reg = WindowRegistry::new(StoryVersion::V3, 20, 10, (Colour::DEFAULT, Colour::DEFAULT));
        let window = reg.get_mut(WindowId::MAIN).unwrap();
        let mut pipe = OutputPipeline::new();
        pipe.target(&mut backend, window, WrapToken::Text("hi".into()), &mut |_| {})
            .unwrap();
        assert_eq!(window.xcursorpos, 3);
        assert_eq!(backend.puts, vec!["hi".to_string()]);
    }

    #[test]
    fn newline_resets_column_and_advances_row() {
        let mut backend = RecordingBackend::new();
        let mut reg = WindowRegistry::new(StoryVersion::V3, 20, 10, (Colour::DEFAULT, Colour::DEFAULT));
        let window = reg.get_mut(WindowId::MAIN).unwrap();
        let start_row = window.ycursorpos;
        let mut pipe = OutputPipeline::new();
        pipe.target(&mut backend, window, WrapToken::Newline, &mut |_| {})
            .unwrap();
        assert_eq!(window.xcursorpos, 1);
        assert_eq!(window.ycursorpos, start_row + 1);
    }

    #[test]
    fn text_wider_than_line_wraps_via_scroll_at_bottom_row() {
        let mut backend = RecordingBackend::new();
        let mut reg = WindowRegistry::new(StoryVersion::V3, 5, 10, (Colour::DEFAULT, Colour::DEFAULT));
        let window = reg.get_mut(WindowId::MAIN).unwrap();
        window.ycursorpos = window.ysize;
        let mut pipe = OutputPipeline::new();
        pipe.target(&mut backend, window, WrapToken::Text("abcdefghij".into()), &mut |_| {})
            .unwrap();
        assert_eq!(window.ycursorpos, window.ysize);
        assert!(backend.puts.len() >= 2);
    }
}
