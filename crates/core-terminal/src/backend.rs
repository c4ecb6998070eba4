//! The downward contract: what a monospace display backend must offer.
//!
//! This is §6's "Downward (expected from the display backend)" interface
//! verbatim, mapped to a trait per the design note in §9 ("the adapter
//! calls the backend through a capability record of function pointers...
//! map this to an interface/trait/object-with-virtuals; no subclassing
//! required, one concrete backend per build target").

use core_events::BackendEvent;
use core_text::{Colour, TextStyle};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("backend rejected operation: {0}")]
    Rejected(String),
}

/// The contract a concrete monospace display driver implements. Rows and
/// columns are 1-based everywhere to match the rest of the adapter's
/// coordinate system (`goto_yx(1, 1)` is the top-left cell).
pub trait Backend {
    // --- queries -----------------------------------------------------
    fn screen_size(&self) -> (u16, u16);
    fn default_colours(&self) -> (Colour, Colour);
    fn is_colour_available(&self) -> bool;
    fn is_bold_face_available(&self) -> bool;
    fn is_italic_available(&self) -> bool;
    fn is_input_timeout_available(&self) -> bool;
    fn interface_name(&self) -> &str;

    // --- actions -------------------------------------------------------
    fn goto_yx(&mut self, row: u16, col: u16) -> Result<(), BackendError>;
    fn put_text(&mut self, text: &str) -> Result<(), BackendError>;
    fn set_text_style(&mut self, style: TextStyle) -> Result<(), BackendError>;
    fn set_colour(&mut self, fg: Colour, bg: Colour) -> Result<(), BackendError>;
    fn clear_area(&mut self, x: u16, y: u16, w: u16, h: u16) -> Result<(), BackendError>;
    fn clear_to_eol(&mut self) -> Result<(), BackendError>;
    fn copy_area(
        &mut self,
        dst_y: u16,
        dst_x: u16,
        src_y: u16,
        src_x: u16,
        h: u16,
        w: u16,
    ) -> Result<(), BackendError>;
    fn set_cursor_visibility(&mut self, visible: bool) -> Result<(), BackendError>;
    fn update_screen(&mut self) -> Result<(), BackendError>;
    fn redraw_screen_from_scratch(&mut self) -> Result<(), BackendError>;
    fn get_next_event(&mut self, timeout_ms: Option<u64>) -> Result<BackendEvent, BackendError>;

    /// The inert xterm-title/ZTUU hook point (§9 open question). The
    /// reference crossterm backend implements this; the adapter itself
    /// never calls it except once, from `link_interface_to_story`.
    fn set_title(&mut self, title: &str) -> Result<(), BackendError>;

    fn prompt_for_filename(&mut self, write: bool) -> Result<Option<String>, BackendError>;

    // --- config passthrough --------------------------------------------
    fn parse_config_parameter(&mut self, key: &str, value: &str) -> Result<(), BackendError>;
    fn get_config_value(&self, key: &str) -> Option<String>;
    fn get_config_option_names(&self) -> Vec<String>;
}
