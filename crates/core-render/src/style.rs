//! The vocabulary a wrapper emits through its callback: text chunks,
//! line breaks, and style/colour metadata insertions that must take
//! effect at the exact horizontal position they were requested, after
//! wrapping has decided where that position lands on screen (§4.B:
//! "Style and colour changes on buffered windows are inserted into the
//! wrapper as metadata callbacks so they take effect at the correct
//! horizontal position after wrapping").

use core_text::{Colour, TextStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum WrapToken {
    /// A run of printable text with no embedded newline.
    Text(String),
    /// A line break produced either by an explicit newline in the input
    /// or by the wrapper breaking a line at a word boundary.
    Newline,
    Style(TextStyle),
    Colour(Colour, Colour),
}

impl WrapToken {
    pub fn is_newline(&self) -> bool {
        matches!(self, WrapToken::Newline)
    }
}
