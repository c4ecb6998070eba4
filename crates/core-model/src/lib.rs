//! The window registry: geometry, cursor, margins, and style/colour state
//! for every active Z-window (component A).
//!
//! A `Window` is a plain record; all behaviour that reconciles several
//! windows at once (layout selection on story load, re-layout on resize)
//! lives on `WindowRegistry`. Nothing here touches a backend or the
//! wrapper — this crate is pure geometry and bookkeeping.

use core_text::{Colour, TextStyle};

/// Stable identifier for a window. Window 0 is always the main scrollable
/// window; window 1 (when present) is the upper window; higher ids are
/// only ever allocated under V6's eight-window layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u8);

impl WindowId {
    pub const MAIN: WindowId = WindowId(0);
    pub const UPPER: WindowId = WindowId(1);
}

/// Bookkeeping a history-refresh call needs for the duration of one
/// invocation; zeroed outside of a refresh (§4.C invariant: "upper/lower
/// margin remain set only for the duration of one refresh call").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshBookkeeping {
    pub upper_margin: u16,
    pub lower_margin: u16,
    pub lines_to_skip: u32,
    /// `None` means unbounded (refresh cases set this explicitly); `Some(n)`
    /// counts down to zero, matching `remaining_lines_to_fill`'s `-1`
    /// sentinel for "not bounding this call".
    pub remaining_lines_to_fill: Option<u32>,
}

/// A single Z-window: position, size, cursor, margins, style/colour, and
/// the transient state the output pipeline and history-refresh engine
/// hang off it (§3).
#[derive(Debug, Clone)]
pub struct Window {
    pub id: WindowId,
    pub ypos: u16,
    pub xpos: u16,
    pub ysize: u16,
    pub xsize: u16,
    pub ycursorpos: u16,
    pub xcursorpos: u16,
    pub left_margin: u16,
    pub right_margin: u16,
    pub output_style: TextStyle,
    pub buffered_style: TextStyle,
    pub output_colour: (Colour, Colour),
    pub buffered_colour: (Colour, Colour),
    pub wrapping: bool,
    pub buffering: bool,
    pub consecutive_lines_output: u16,
    pub refresh: RefreshBookkeeping,
    pub scrollback_top_line: u32,
}

impl Window {
    /// A freshly created window at `(ypos, xpos)` sized `ysize × xsize`,
    /// cursor at the top-left cell, roman style, backend default colours,
    /// no margins, not wrapping, not buffering.
    pub fn new(id: WindowId, ypos: u16, xpos: u16, ysize: u16, xsize: u16, defaults: (Colour, Colour)) -> Self {
        Self {
            id,
            ypos,
            xpos,
            ysize,
            xsize,
            ycursorpos: 1,
            xcursorpos: 1,
            left_margin: 0,
            right_margin: 0,
            output_style: TextStyle::ROMAN,
            buffered_style: TextStyle::ROMAN,
            output_colour: defaults,
            buffered_colour: defaults,
            wrapping: false,
            buffering: false,
            consecutive_lines_output: 0,
            refresh: RefreshBookkeeping::default(),
            scrollback_top_line: 0,
        }
    }

    /// Content width available to the wrapper: `xsize − leftmargin − rightmargin`.
    pub fn content_width(&self) -> u16 {
        self.xsize
            .saturating_sub(self.left_margin)
            .saturating_sub(self.right_margin)
    }

    /// §3 invariant: `1 ≤ cursor ≤ size` on both axes.
    pub fn clamp_cursor(&mut self) {
        self.ycursorpos = self.ycursorpos.clamp(1, self.ysize.max(1));
        self.xcursorpos = self.xcursorpos.clamp(1, self.xsize.max(1));
    }

    /// §3 invariant: margins forced to 0 when they would leave no room to
    /// wrap into (`leftmargin + rightmargin < xsize` whenever wrapping).
    pub fn enforce_margin_invariant(&mut self) {
        if !self.wrapping {
            return;
        }
        if self.left_margin as u32 + self.right_margin as u32 >= self.xsize as u32 {
            self.left_margin = 0;
            self.right_margin = 0;
        }
    }

    pub fn set_cursor(&mut self, row: u16, col: u16) {
        self.ycursorpos = row;
        self.xcursorpos = col;
        self.clamp_cursor();
    }

    /// Move the window to a new rectangle, re-clamping cursor and margins.
    /// Used on resize and on upper-window split/unsplit.
    pub fn reposition(&mut self, ypos: u16, xpos: u16, ysize: u16, xsize: u16) {
        self.ypos = ypos;
        self.xpos = xpos;
        self.ysize = ysize;
        self.xsize = xsize;
        self.enforce_margin_invariant();
        self.clamp_cursor();
    }
}

/// Z-Machine version, as reported by the interpreter at story-load time.
/// Only the version bands that change window layout (§4.A) are
/// distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryVersion {
    V1Or2,
    V3,
    V4OrLater,
    V6,
}

impl StoryVersion {
    pub fn from_raw(v: u8) -> Self {
        match v {
            1 | 2 => StoryVersion::V1Or2,
            3 => StoryVersion::V3,
            6 => StoryVersion::V6,
            _ => StoryVersion::V4OrLater,
        }
    }

    pub fn has_status_window(self) -> bool {
        matches!(self, StoryVersion::V3)
    }

    pub fn window_count(self) -> usize {
        match self {
            StoryVersion::V1Or2 => 1,
            StoryVersion::V3 | StoryVersion::V4OrLater => 2,
            StoryVersion::V6 => 8,
        }
    }
}

/// Owns every active window and applies the version-selected layout
/// rules from §4.A whenever the story links in or the screen resizes.
#[derive(Debug)]
pub struct WindowRegistry {
    version: StoryVersion,
    windows: Vec<Window>,
    active: WindowId,
}

impl WindowRegistry {
    /// Build the initial layout for `version` against a `xsize × ysize`
    /// screen, per §4.A: window 0 gets adapter margins only when the
    /// story isn't V6; buffering is on for window 0 (and, for V6, every
    /// window); wrapping is window-0-only; a status window (V3 only)
    /// takes row 1 and shrinks window 0 by one row from the top.
    pub fn new(version: StoryVersion, xsize: u16, ysize: u16, defaults: (Colour, Colour)) -> Self {
        let mut windows = Vec::with_capacity(version.window_count());
        let status_rows = if version.has_status_window() { 1 } else { 0 };
        let main_ypos = 1 + status_rows;
        let main_ysize = ysize.saturating_sub(status_rows);

        let mut main = Window::new(WindowId::MAIN, main_ypos, 1, main_ysize, xsize, defaults);
        main.buffering = true;
        main.wrapping = true;
        windows.push(main);

        if version.has_status_window() {
            let mut status = Window::new(WindowId(2), 1, 1, 1, xsize, defaults);
            status.output_style = TextStyle::REVERSE;
            windows.push(status);
        }

        match version {
            StoryVersion::V1Or2 => {}
            StoryVersion::V3 | StoryVersion::V4OrLater => {
                windows.push(Window::new(WindowId::UPPER, 1, 1, 0, xsize, defaults));
            }
            StoryVersion::V6 => {
                for i in 1..8u8 {
                    let mut w = Window::new(WindowId(i), 1, 1, ysize, xsize, defaults);
                    w.buffering = true;
                    windows.push(w);
                }
            }
        }

        Self {
            version,
            windows,
            active: WindowId::MAIN,
        }
    }

    pub fn version(&self) -> StoryVersion {
        self.version
    }

    pub fn active(&self) -> WindowId {
        self.active
    }

    pub fn set_active(&mut self, id: WindowId) {
        if self.get(id).is_some() {
            self.active = id;
        }
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    pub fn active_window(&self) -> &Window {
        self.get(self.active).expect("active window always exists")
    }

    pub fn active_window_mut(&mut self) -> &mut Window {
        let id = self.active;
        self.get_mut(id).expect("active window always exists")
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Re-derive every window's rectangle for a new screen size, per the
    /// §4.G resize contract: window 0 and the status window (if any)
    /// both span the new width; window 0's height absorbs all of the
    /// vertical delta since the status window is always exactly one row.
    pub fn relayout(&mut self, xsize: u16, ysize: u16) {
        let status_rows = if self.version.has_status_window() { 1 } else { 0 };
        let main_ypos = 1 + status_rows;
        let main_ysize = ysize.saturating_sub(status_rows);

        if let Some(main) = self.get_mut(WindowId::MAIN) {
            main.reposition(main_ypos, 1, main_ysize, xsize);
        }
        if let Some(status) = self.windows.iter_mut().find(|w| w.output_style.contains(TextStyle::REVERSE) && w.id != WindowId::MAIN) {
            status.reposition(1, 1, 1, xsize);
        }
    }

    /// Split window 0, giving the upper window `upper_lines` rows from
    /// the top (per §4.A/§4.B split_window semantics); window 0 shrinks
    /// and moves down to make room. A `upper_lines` of 0 unsplits.
    pub fn split_window(&mut self, upper_lines: u16) {
        let xsize = self.active_screen_xsize();
        let total_ysize = self.total_screen_ysize();
        let status_rows = if self.version.has_status_window() { 1 } else { 0 };

        if let Some(upper) = self.get_mut(WindowId::UPPER) {
            upper.reposition(1 + status_rows, 1, upper_lines, xsize);
        }
        if let Some(main) = self.get_mut(WindowId::MAIN) {
            let main_ypos = 1 + status_rows + upper_lines;
            let main_ysize = total_ysize.saturating_sub(status_rows).saturating_sub(upper_lines);
            main.reposition(main_ypos, 1, main_ysize, xsize);
        }
    }

    fn active_screen_xsize(&self) -> u16 {
        self.get(WindowId::MAIN).map(|w| w.xsize).unwrap_or(80)
    }

    fn total_screen_ysize(&self) -> u16 {
        let main = self.get(WindowId::MAIN);
        let upper = self.get(WindowId::UPPER);
        let status_rows = if self.version.has_status_window() { 1 } else { 0 };
        main.map(|m| m.ysize).unwrap_or(24) + upper.map(|u| u.ysize).unwrap_or(0) + status_rows
    }
}
