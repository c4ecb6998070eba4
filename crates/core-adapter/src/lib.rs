//! The top-level `Adapter`: the single owned value every public entry
//! point becomes a method on (§9 — "no global singletons"). Wires the
//! window registry (component A), the output pipeline and wrapper pool
//! (component B), the history-refresh engine and the two external
//! stores (component C), the input editor (component D), and the
//! status-line formatter (component E) behind one generic backend.

mod editor;
mod error;

pub use editor::{ReadCharOutcome, ReadLineOutcome, ReadLineRequest};
pub use error::AdapterError;

use std::collections::HashMap;

use core_config::{Config, ConfigContext};
use core_model::{StoryVersion, Window, WindowId, WindowRegistry};
use core_render::{GreedyWrapper, OutputPipeline, StatusContext, StatusMode, WrapToken, Wrapper, format_status};
use core_state::{CommandHistory, HistoryCursor, HistoryRefreshEngine, OutputHistory};
use core_terminal::Backend;
use core_text::{Colour, TextStyle};

/// Everything live for the duration of one interpreter session.
pub struct Adapter<B: Backend> {
    backend: B,
    config: Config,
    windows: WindowRegistry,
    wrappers: HashMap<WindowId, GreedyWrapper>,
    pipeline: OutputPipeline,
    output_history: Option<Box<dyn OutputHistory>>,
    command_history: Option<Box<dyn CommandHistory>>,
    history_cursor: HistoryCursor,
    refresh_engine: HistoryRefreshEngine,
    version: StoryVersion,
}

impl<B: Backend> Adapter<B> {
    pub fn new(backend: B, config: Config) -> Self {
        let (xsize, ysize) = backend.screen_size();
        let defaults = backend.default_colours();
        Self {
            windows: WindowRegistry::new(StoryVersion::V1Or2, xsize.max(1), ysize.max(1), defaults),
            backend,
            config,
            wrappers: HashMap::new(),
            pipeline: OutputPipeline::new(),
            output_history: None,
            command_history: None,
            history_cursor: HistoryCursor::default(),
            refresh_engine: HistoryRefreshEngine::new(),
            version: StoryVersion::V1Or2,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn wrapper_for(&mut self, id: WindowId) -> &mut GreedyWrapper {
        let hyphenate = !self.config.disable_hyphenation;
        let width = self.windows.get(id).map(|w| w.content_width()).unwrap_or(1);
        self.wrappers
            .entry(id)
            .or_insert_with(|| GreedyWrapper::new(width, hyphenate))
    }

    // --- lifecycle ------------------------------------------------------

    /// `link_interface_to_story` (§6): build the version-selected window
    /// layout, apply adapter margins to window 0, and adopt the two
    /// history stores the interpreter hands in.
    pub fn link_interface_to_story(
        &mut self,
        story_version: u8,
        output_history: Box<dyn OutputHistory>,
        command_history: Box<dyn CommandHistory>,
    ) -> Result<(), AdapterError> {
        let (xsize, ysize) = self.backend.screen_size();
        let defaults = self.backend.default_colours();
        self.config.apply_context(ConfigContext::new(xsize));
        self.version = StoryVersion::from_raw(story_version);
        self.windows = WindowRegistry::new(self.version, xsize, ysize, defaults);
        if !matches!(self.version, StoryVersion::V6) {
            if let Some(main) = self.windows.get_mut(WindowId::MAIN) {
                main.left_margin = self.config.left_margin;
                main.right_margin = self.config.right_margin;
                main.enforce_margin_invariant();
            }
        }
        self.wrappers.clear();
        self.output_history = Some(output_history);
        self.command_history = Some(command_history);
        self.history_cursor = HistoryCursor::default();
        tracing::info!(target: "window", version = ?self.version, xsize, ysize, "interface_linked");
        // §9 open question: the ZTUU/xterm-title hook stays inert by
        // default; a caller that wants it sets a title after linking.
        Ok(())
    }

    /// `reset_interface` (§6): re-derive the layout at the current
    /// screen size without discarding the adopted history stores.
    pub fn reset_interface(&mut self) -> Result<(), AdapterError> {
        let (xsize, ysize) = self.backend.screen_size();
        let defaults = self.backend.default_colours();
        self.windows = WindowRegistry::new(self.version, xsize, ysize, defaults);
        if !matches!(self.version, StoryVersion::V6) {
            if let Some(main) = self.windows.get_mut(WindowId::MAIN) {
                main.left_margin = self.config.left_margin;
                main.right_margin = self.config.right_margin;
                main.enforce_margin_invariant();
            }
        }
        self.wrappers.clear();
        self.history_cursor = HistoryCursor::default();
        Ok(())
    }

    /// `close_interface` (§7): always tears the backend down regardless
    /// of the outcome. `error_message` selects between the plain
    /// diagnostic path and the "press any key to quit" path.
    pub fn close_interface(&mut self, error_message: Option<&str>) -> i32 {
        let code = match error_message {
            Some(message) => {
                tracing::error!(target: "window", error = message, "session_aborted");
                let _ = self.z_ucs_output(&format!("\n{message}\n"));
                1
            }
            None => {
                let _ = self.z_ucs_output("\n[Press any key to quit]\n");
                let _ = self.backend.update_screen();
                let _ = self.backend.get_next_event(None);
                0
            }
        };
        let _ = self.backend.set_cursor_visibility(true);
        self.wrappers.clear();
        self.output_history = None;
        self.command_history = None;
        code
    }

    // --- output -----------------------------------------------------------

    /// `z_ucs_output` (§6): write to the active window. Window 0's
    /// output is additionally recorded to the history store, and any
    /// live history cursor is discarded since it would otherwise point
    /// at a now-stale position (§3 lifecycle note).
    pub fn z_ucs_output(&mut self, text: &str) -> Result<(), AdapterError> {
        let id = self.windows.active();
        if id == WindowId::MAIN {
            if let Some(history) = self.output_history.as_deref_mut() {
                history.append_paragraph(text, text.ends_with('\n'));
            }
            self.history_cursor = HistoryCursor::default();
        }
        self.write_to_window(id, text)
    }

    fn write_to_window(&mut self, id: WindowId, text: &str) -> Result<(), AdapterError> {
        let buffering = self.windows.get(id).map(|w| w.buffering).unwrap_or(false);
        if buffering {
            let wrapper = self.wrapper_for(id);
            let mut tokens = Vec::new();
            wrapper.wrap(text, &mut |t| tokens.push(t));
            let window = self
                .windows
                .get_mut(id)
                .ok_or(AdapterError::GeometryViolation(id))?;
            for token in tokens {
                // A greedy wrapper never withholds a finished word, so
                // there is nothing for `flush_others` to flush here.
                self.pipeline.target(&mut self.backend, window, token, &mut |_| {})?;
            }
        } else {
            let window = self
                .windows
                .get_mut(id)
                .ok_or(AdapterError::GeometryViolation(id))?;
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    self.pipeline
                        .target(&mut self.backend, window, WrapToken::Newline, &mut |_| {})?;
                }
                if !line.is_empty() {
                    self.pipeline.target(
                        &mut self.backend,
                        window,
                        WrapToken::Text(line.to_string()),
                        &mut |_| {},
                    )?;
                }
            }
        }
        Ok(())
    }

    /// `show_status` (§6): a no-op outside V≤3, which has no status
    /// window. `p1`/`p2` are score/turns in `ScoreAndTurn` mode, or a
    /// 24-hour hour/minute pair in `Time` mode.
    pub fn show_status(
        &mut self,
        room_name: &str,
        mode: StatusMode,
        p1: i16,
        p2: i16,
    ) -> Result<(), AdapterError> {
        let Some(id) = self
            .windows
            .windows()
            .iter()
            .find(|w| w.output_style.contains(TextStyle::REVERSE))
            .map(|w| w.id)
        else {
            return Ok(());
        };
        let window = self
            .windows
            .get_mut(id)
            .ok_or(AdapterError::GeometryViolation(id))?;
        let text = format_status(&StatusContext {
            room_name,
            mode,
            first: p1,
            second: p2,
            width: window.xsize,
        });
        window.set_cursor(1, 1);
        self.pipeline
            .target(&mut self.backend, window, WrapToken::Text(text), &mut |_| {})?;
        Ok(())
    }

    // --- style, colour, windows ---------------------------------------

    pub fn set_text_style(&mut self, style: TextStyle) {
        self.windows.active_window_mut().buffered_style = style;
    }

    /// `set_colour(fg, bg, window)` (§6): `Colour::CURRENT` on either
    /// channel leaves that channel unchanged.
    pub fn set_colour(&mut self, fg: Colour, bg: Colour, window: Option<WindowId>) {
        let id = window.unwrap_or_else(|| self.windows.active());
        if let Some(w) = self.windows.get_mut(id) {
            let resolved_fg = if fg.is_current() { w.buffered_colour.0 } else { fg };
            let resolved_bg = if bg.is_current() { w.buffered_colour.1 } else { bg };
            w.buffered_colour = (resolved_fg, resolved_bg);
        }
    }

    /// `set_font` (§6): no-op, as specified.
    pub fn set_font(&mut self, _font: u8) {}

    pub fn split_window(&mut self, upper_lines: u16) {
        self.windows.split_window(upper_lines);
    }

    pub fn set_window(&mut self, id: WindowId) -> Result<(), AdapterError> {
        if self.windows.get(id).is_none() {
            return Err(AdapterError::GeometryViolation(id));
        }
        self.windows.set_active(id);
        Ok(())
    }

    /// `erase_window(n)` (§6): `None` clears every window (the whole
    /// screen), `Some(id)` clears just that one.
    pub fn erase_window(&mut self, target: Option<WindowId>) -> Result<(), AdapterError> {
        let ids: Vec<WindowId> = match target {
            Some(id) => vec![id],
            None => self.windows.windows().iter().map(|w| w.id).collect(),
        };
        for id in ids {
            let window = self
                .windows
                .get_mut(id)
                .ok_or(AdapterError::GeometryViolation(id))?;
            self.backend
                .clear_area(window.xpos, window.ypos, window.xsize, window.ysize)?;
            let window = self.windows.get_mut(id).unwrap();
            window.set_cursor(1, 1 + window.left_margin);
        }
        Ok(())
    }

    pub fn set_cursor(&mut self, row: u16, col: u16, window: Option<WindowId>) -> Result<(), AdapterError> {
        let id = window.unwrap_or_else(|| self.windows.active());
        let w = self
            .windows
            .get_mut(id)
            .ok_or(AdapterError::GeometryViolation(id))?;
        w.set_cursor(row, col);
        Ok(())
    }

    pub fn get_cursor_row(&self) -> u16 {
        self.windows.active_window().ycursorpos
    }

    pub fn get_cursor_column(&self) -> u16 {
        self.windows.active_window().xcursorpos
    }

    // --- config -----------------------------------------------------------

    pub fn parse_config_parameter(&mut self, key: &str, value: &str) -> Result<(), AdapterError> {
        match self.config.parse_config_parameter(key, value) {
            Ok(()) => {
                let xsize = self.backend.screen_size().0;
                self.config.apply_context(ConfigContext::new(xsize));
                Ok(())
            }
            Err(core_config::ConfigError::UnknownKey(_)) => {
                self.backend.parse_config_parameter(key, value).map_err(AdapterError::from)
            }
            Err(e) => Err(AdapterError::from(e)),
        }
    }

    pub fn get_config_value(&self, key: &str) -> Option<String> {
        self.config
            .get_config_value(key)
            .or_else(|| self.backend.get_config_value(key))
    }

    pub fn get_config_option_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Config::get_config_option_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        names.extend(self.backend.get_config_option_names());
        names
    }

    // --- capability surface (§4.F) ---------------------------------------

    pub fn screen_width_cells(&self) -> u16 {
        self.backend.screen_size().0
    }

    pub fn screen_height_cells(&self) -> u16 {
        self.backend.screen_size().1
    }

    /// The adapter treats every cell as one code point; there is no
    /// font-size negotiation, so both dimensions are always 1.
    pub fn font_width(&self) -> u16 {
        1
    }

    pub fn font_height(&self) -> u16 {
        1
    }

    pub fn default_foreground_colour(&self) -> Colour {
        self.backend.default_colours().0
    }

    pub fn default_background_colour(&self) -> Colour {
        self.backend.default_colours().1
    }

    pub fn has_status_line(&self) -> bool {
        true
    }

    pub fn has_split_window(&self) -> bool {
        true
    }

    pub fn has_pictures(&self) -> bool {
        false
    }

    pub fn has_variable_pitch_font(&self) -> bool {
        false
    }

    /// §4.F: colour reporting is masked off when `disable-color` is set,
    /// even on a backend that could otherwise render colour.
    pub fn is_colour_available(&self) -> bool {
        !self.config.disable_color && self.backend.is_colour_available()
    }

    pub fn is_bold_face_available(&self) -> bool {
        self.backend.is_bold_face_available()
    }

    pub fn is_italic_available(&self) -> bool {
        self.backend.is_italic_available()
    }

    pub fn is_input_timeout_available(&self) -> bool {
        self.backend.is_input_timeout_available()
    }

    // --- misc upward interface -----------------------------------------

    pub fn output_interface_info(&self) -> String {
        format!(
            "{} (color={}, bold={}, italic={}, timed-input={})",
            self.backend.interface_name(),
            self.is_colour_available(),
            self.is_bold_face_available(),
            self.is_italic_available(),
            self.is_input_timeout_available(),
        )
    }

    pub fn input_must_be_repeated_by_story(&self) -> bool {
        true
    }

    /// A restored save game may have replaced the output history the
    /// adapter was tracking; drop any live cursor into it.
    pub fn game_was_restored_and_history_modified(&mut self) {
        if let Some(history) = self.output_history.as_deref_mut() {
            history.destroy_cursor();
        }
        self.history_cursor = HistoryCursor::default();
    }

    pub fn prompt_for_filename(&mut self, write: bool) -> Result<Option<String>, AdapterError> {
        self.backend.prompt_for_filename(write).map_err(AdapterError::from)
    }

    fn active_window_mut(&mut self) -> Result<&mut Window, AdapterError> {
        let id = self.windows.active();
        self.windows.get_mut(id).ok_or(AdapterError::GeometryViolation(id))
    }
}
