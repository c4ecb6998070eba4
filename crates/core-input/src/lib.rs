//! The input line editor (component D): classifying backend events per
//! §4.D's event table, and the buffer/cursor/scroll state machine that
//! drives `read_line`. Scroll-back during input and the surrounding
//! `read_line`/`read_char` orchestration (pre-flush, geometry, timeout
//! selection) need a backend and a window at the same time and live in
//! the adapter that owns both.

mod action;
mod line_editor;
mod zscii;

pub use action::{EditorAction, classify, is_scroll_action};
pub use line_editor::{EditorOutcome, LineEditor};
pub use zscii::read_char_code;
