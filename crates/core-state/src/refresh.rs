//! The history-refresh engine (component C): repaints a rectangular
//! strip of window 0 by replaying paragraphs from the output-history
//! store, using a screen-line cursor `chsl` and the four positional
//! cases from §4.C.

use core_model::Window;
use core_render::{OutputPipeline, WrapToken, Wrapper};
use core_terminal::Backend;

use crate::error::HistoryError;
use crate::history::{OutputHistory, Paragraph};

/// The process-wide, adapter-owned history cursor (§3). `screen_line` is
/// `chsl`: 0 means "pointing at the bottom of the logical buffer, no
/// output shown yet"; positive values count lines above the bottom.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryCursor {
    pub screen_line: i64,
    pub hit_top: bool,
}

pub struct HistoryRefreshEngine {
    max_recursion: u32,
}

impl Default for HistoryRefreshEngine {
    fn default() -> Self {
        Self { max_recursion: 64 }
    }
}

impl HistoryRefreshEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh `[y_refresh_top .. y_refresh_top + y_size - 1]` of window 0.
    /// Returns `Ok(true)` if the strip was fully painted, `Ok(false)` if
    /// replay reached the front of history first — callers use this to
    /// clamp scrollback.
    pub fn refresh<B: Backend, W: Wrapper>(
        &self,
        backend: &mut B,
        pipeline: &mut OutputPipeline,
        window: &mut Window,
        wrapper: &mut W,
        history: &mut dyn OutputHistory,
        cursor: &mut HistoryCursor,
        y_refresh_top: u16,
        y_size: u16,
    ) -> Result<bool, HistoryError> {
        self.refresh_inner(
            backend,
            pipeline,
            window,
            wrapper,
            history,
            cursor,
            y_refresh_top,
            y_size,
            self.max_recursion,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn refresh_inner<B: Backend, W: Wrapper>(
        &self,
        backend: &mut B,
        pipeline: &mut OutputPipeline,
        window: &mut Window,
        wrapper: &mut W,
        history: &mut dyn OutputHistory,
        cursor: &mut HistoryCursor,
        y_refresh_top: u16,
        y_size: u16,
        budget: u32,
    ) -> Result<bool, HistoryError> {
        if y_size == 0 {
            return Ok(true);
        }
        if budget == 0 {
            return Err(HistoryError::RecursionBudgetExhausted);
        }

        let scrollback_top_line = window.scrollback_top_line as i64;
        let b_lo = scrollback_top_line - (y_refresh_top as i64 - 1) - y_size as i64;
        let b_hi = scrollback_top_line - (y_refresh_top as i64 - 1);
        let chsl = cursor.screen_line;

        if chsl < b_lo {
            self.case_0(
                backend, pipeline, window, wrapper, history, cursor, y_refresh_top, y_size, budget,
            )
        } else if chsl == b_lo {
            self.case_1(
                backend, pipeline, window, wrapper, history, cursor, y_refresh_top, y_size, budget,
            )
        } else if chsl < b_hi {
            self.case_2(
                backend, pipeline, window, wrapper, history, cursor, y_refresh_top, y_size, b_lo, b_hi, budget,
            )
        } else {
            self.case_3(
                backend, pipeline, window, wrapper, history, cursor, y_refresh_top, y_size, scrollback_top_line,
            )
        }
    }

    /// Case 0 — chsl below B_lo: the next rewindable paragraph must be
    /// measured (dry-run, no emission) before we know how far up it
    /// brings us.
    #[allow(clippy::too_many_arguments)]
    fn case_0<B: Backend, W: Wrapper>(
        &self,
        backend: &mut B,
        pipeline: &mut OutputPipeline,
        window: &mut Window,
        wrapper: &mut W,
        history: &mut dyn OutputHistory,
        cursor: &mut HistoryCursor,
        y_refresh_top: u16,
        y_size: u16,
        budget: u32,
    ) -> Result<bool, HistoryError> {
        window.refresh.lines_to_skip = u32::MAX;
        match history.rewind_paragraph() {
            None => {
                window.refresh.lines_to_skip = 0;
                if cursor.screen_line != 0 {
                    tracing::error!(target: "render.history", chsl = cursor.screen_line, "store_exhausted_unexpectedly");
                    return Err(HistoryError::UnexpectedEmptyStore);
                }
                cursor.hit_top = true;
                Ok(false)
            }
            Some(paragraph) => {
                let lines = measure_lines(wrapper, &paragraph);
                cursor.screen_line += lines as i64;
                window.refresh.lines_to_skip = 0;
                self.refresh_inner(
                    backend, pipeline, window, wrapper, history, cursor, y_refresh_top, y_size, budget - 1,
                )
            }
        }
    }

    /// Case 1 — chsl == B_lo: place the cursor at the bottom of the
    /// strip, protect everything outside it with upper/lower margins,
    /// and replay one paragraph for real. It grows upward because each
    /// internal newline scrolls only the protected window-0 region.
    #[allow(clippy::too_many_arguments)]
    fn case_1<B: Backend, W: Wrapper>(
        &self,
        backend: &mut B,
        pipeline: &mut OutputPipeline,
        window: &mut Window,
        wrapper: &mut W,
        history: &mut dyn OutputHistory,
        cursor: &mut HistoryCursor,
        y_refresh_top: u16,
        y_size: u16,
        budget: u32,
    ) -> Result<bool, HistoryError> {
        let strip_bottom = y_refresh_top + y_size - 1;
        window.refresh.upper_margin = y_refresh_top.saturating_sub(1);
        window.refresh.lower_margin = window.ysize.saturating_sub(strip_bottom);
        window.ycursorpos = strip_bottom.min(window.ysize);
        window.xcursorpos = 1 + window.left_margin;

        let was_at_bottom = cursor.screen_line == 0;
        let outcome = match history.rewind_paragraph() {
            None => {
                if cursor.screen_line != 0 {
                    tracing::error!(target: "render.history", chsl = cursor.screen_line, "store_exhausted_unexpectedly");
                    return Err(HistoryError::UnexpectedEmptyStore);
                }
                cursor.hit_top = true;
                None
            }
            Some(paragraph) => {
                let lines = emit_real(backend, pipeline, window, wrapper, &paragraph);
                if was_at_bottom && paragraph.newline_terminated {
                    let _ = pipeline.target(backend, window, WrapToken::Newline, &mut |_| {});
                }
                cursor.screen_line += lines as i64;
                Some(lines)
            }
        };

        window.refresh.upper_margin = 0;
        window.refresh.lower_margin = 0;

        match outcome {
            None => Ok(false),
            Some(lines) if (lines as u16) < y_size => self.refresh_inner(
                backend,
                pipeline,
                window,
                wrapper,
                history,
                cursor,
                y_refresh_top,
                y_size - lines as u16,
                budget - 1,
            ),
            Some(_) => Ok(true),
        }
    }

    /// Case 2 — B_lo < chsl < B_hi: history is inside the strip. Fill
    /// downward (dry-run) to find how far chsl advances, rewind back to
    /// where we started, then recurse on the upper sub-strip.
    #[allow(clippy::too_many_arguments)]
    fn case_2<B: Backend, W: Wrapper>(
        &self,
        backend: &mut B,
        pipeline: &mut OutputPipeline,
        window: &mut Window,
        wrapper: &mut W,
        history: &mut dyn OutputHistory,
        cursor: &mut HistoryCursor,
        y_refresh_top: u16,
        y_size: u16,
        b_lo: i64,
        b_hi: i64,
        budget: u32,
    ) -> Result<bool, HistoryError> {
        let original_pos = cursor.screen_line;
        let mut remaining = (cursor.screen_line - b_lo).max(0) as u32;
        window.refresh.remaining_lines_to_fill = Some(remaining);

        let mut advanced = 0u32;
        while remaining > 0 {
            let mut fetched = None;
            history.repeat_paragraphs(1, true, true, &mut |p, _| fetched = Some(p.clone()));
            let Some(paragraph) = fetched else { break };
            remaining = remaining.saturating_sub(measure_lines(wrapper, &paragraph));
            advanced += 1;
        }
        window.refresh.remaining_lines_to_fill = None;
        for _ in 0..advanced {
            history.rewind_paragraph();
        }
        cursor.screen_line = original_pos;

        let upper_size = (b_hi - cursor.screen_line).max(0).min(y_size as i64) as u16;
        self.refresh_inner(
            backend, pipeline, window, wrapper, history, cursor, y_refresh_top, upper_size, budget - 1,
        )
    }

    /// Case 3 — chsl ≥ B_hi: part of the strip is already behind chsl in
    /// the buffer. Skip the rows already shown and fill the rest
    /// forward until the history front is hit or the strip is full.
    #[allow(clippy::too_many_arguments)]
    fn case_3<B: Backend, W: Wrapper>(
        &self,
        backend: &mut B,
        pipeline: &mut OutputPipeline,
        window: &mut Window,
        wrapper: &mut W,
        history: &mut dyn OutputHistory,
        cursor: &mut HistoryCursor,
        y_refresh_top: u16,
        y_size: u16,
        scrollback_top_line: i64,
    ) -> Result<bool, HistoryError> {
        let skip = (cursor.screen_line - (scrollback_top_line - y_refresh_top as i64 + 1)).max(0);
        window.refresh.lines_to_skip = skip as u32;
        window.refresh.remaining_lines_to_fill = Some(y_size as u32);

        let mut filled = true;
        loop {
            if window.refresh.remaining_lines_to_fill.unwrap_or(0) == 0 {
                break;
            }
            let mut fetched = None;
            history.repeat_paragraphs(1, true, false, &mut |p, _| fetched = Some(p.clone()));
            let Some(paragraph) = fetched else {
                if cursor.screen_line != 0 {
                    tracing::error!(target: "render.history", chsl = cursor.screen_line, "store_exhausted_unexpectedly");
                    return Err(HistoryError::UnexpectedEmptyStore);
                }
                filled = false;
                cursor.hit_top = true;
                break;
            };
            let lines = emit_real(backend, pipeline, window, wrapper, &paragraph);
            cursor.screen_line = (cursor.screen_line - lines as i64).max(0);
        }
        window.refresh.lines_to_skip = 0;
        window.refresh.remaining_lines_to_fill = None;
        Ok(filled)
    }
}

/// Dry-run a paragraph through the wrapper, counting the lines it would
/// occupy without letting any token reach the backend.
fn measure_lines<W: Wrapper>(wrapper: &mut W, paragraph: &Paragraph) -> u32 {
    let mut lines = 1u32;
    wrapper.wrap(&paragraph.text, &mut |t| {
        if t.is_newline() {
            lines += 1;
        }
    });
    lines
}

/// Replay a paragraph for real through the wrapper and output pipeline,
/// returning how many lines it occupied.
fn emit_real<B: Backend, W: Wrapper>(
    backend: &mut B,
    pipeline: &mut OutputPipeline,
    window: &mut Window,
    wrapper: &mut W,
    paragraph: &Paragraph,
) -> u32 {
    let mut lines = 1u32;
    let mut tokens = Vec::new();
    wrapper.wrap(&paragraph.text, &mut |t| tokens.push(t));
    for token in tokens {
        if token.is_newline() {
            lines += 1;
        }
        let _ = pipeline.target(backend, window, token, &mut |_| {});
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistory;
    use core_model::{StoryVersion, WindowId, WindowRegistry};
    use core_render::GreedyWrapper;
    use core_text::Colour;
    use core_terminal::BackendError;
    use core_events::BackendEvent;
    use proptest::prop_assert;

    struct NullBackend;
    impl Backend for NullBackend {
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
            "null"
        }
        fn goto_yx(&mut self, _row: u16, _col: u16) -> Result<(), BackendError> {
            Ok(())
        }
        fn put_text(&mut self, _text: &str) -> Result<(), BackendError> {
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
        fn copy_area(&mut self, _dy: u16, _dx: u16, _sy: u16, _sx: u16, _h: u16, _w: u16) -> Result<(), BackendError> {
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
            Ok(BackendEvent::Timeout)
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
    fn refresh_of_empty_history_returns_false() {
        let mut backend = NullBackend;
        let mut pipeline = OutputPipeline::new();
        let mut reg = WindowRegistry::new(StoryVersion::V3, 80, 24, (Colour::DEFAULT, Colour::DEFAULT));
        let window = reg.get_mut(WindowId::MAIN).unwrap();
        let mut wrapper = GreedyWrapper::new(window.content_width(), true);
        let mut history = MemoryHistory::new();
        let mut cursor = HistoryCursor::default();
        let engine = HistoryRefreshEngine::new();

        let ok = engine
            .refresh(&mut backend, &mut pipeline, window, &mut wrapper, &mut history, &mut cursor, 1, 5)
            .unwrap();
        assert!(!ok);
        assert!(cursor.hit_top);
    }

    #[test]
    fn refresh_replays_single_paragraph_from_bottom() {
        let mut backend = NullBackend;
        let mut pipeline = OutputPipeline::new();
        let mut reg = WindowRegistry::new(StoryVersion::V3, 80, 24, (Colour::DEFAULT, Colour::DEFAULT));
        let window = reg.get_mut(WindowId::MAIN).unwrap();
        let mut wrapper = GreedyWrapper::new(window.content_width(), true);
        let mut history = MemoryHistory::new();
        history.append_paragraph("hello world", true);
        let mut cursor = HistoryCursor::default();
        let engine = HistoryRefreshEngine::new();

        let ok = engine
            .refresh(&mut backend, &mut pipeline, window, &mut wrapper, &mut history, &mut cursor, 1, 5)
            .unwrap();
        assert!(ok);
        assert!(cursor.screen_line > 0);
    }

    #[test]
    fn refresh_never_recurses_past_budget_on_pathological_input() {
        let mut backend = NullBackend;
        let mut pipeline = OutputPipeline::new();
        let mut reg = WindowRegistry::new(StoryVersion::V3, 80, 24, (Colour::DEFAULT, Colour::DEFAULT));
        let window = reg.get_mut(WindowId::MAIN).unwrap();
        let mut wrapper = GreedyWrapper::new(window.content_width(), true);
        let mut history = MemoryHistory::new();
        for i in 0..200 {
            history.append_paragraph(&format!("line {i}"), true);
        }
        let mut cursor = HistoryCursor::default();
        let engine = HistoryRefreshEngine::new();

        let result = engine.refresh(&mut backend, &mut pipeline, window, &mut wrapper, &mut history, &mut cursor, 1, 5);
        assert!(result.is_ok());
    }

    proptest::proptest! {
        /// §8 property: refreshing the same strip twice in a row with no
        /// new output in between converges rather than diverging —
        /// `chsl` never exceeds the total lines the history could produce.
        #[test]
        fn idempotent_refresh_converges(paragraph_count in 0usize..20, ysize in 1u16..24) {
            let mut backend = NullBackend;
            let mut pipeline = OutputPipeline::new();
            let mut reg = WindowRegistry::new(StoryVersion::V3, 80, 24, (Colour::DEFAULT, Colour::DEFAULT));
            let window = reg.get_mut(WindowId::MAIN).unwrap();
            let mut wrapper = GreedyWrapper::new(window.content_width(), true);
            let mut history = MemoryHistory::new();
            for i in 0..paragraph_count {
                history.append_paragraph(&format!("paragraph number {i}"), true);
            }
            let mut cursor = HistoryCursor::default();
            let engine = HistoryRefreshEngine::new();

            let first = engine.refresh(&mut backend, &mut pipeline, window, &mut wrapper, &mut history, &mut cursor, 1, ysize);
            prop_assert!(first.is_ok());
            let line_after_first = cursor.screen_line;
            let second = engine.refresh(&mut backend, &mut pipeline, window, &mut wrapper, &mut history, &mut cursor, 1, ysize);
            prop_assert!(second.is_ok());
            prop_assert!(cursor.screen_line >= line_after_first);
        }
    }
}
