//! The adapter's internal character, style, and colour vocabulary.
//!
//! The adapter treats every code point as exactly one screen cell: no
//! grapheme clustering, no double-width glyphs, no combining marks merged
//! onto a base character. A `char` already guarantees a valid Unicode
//! scalar value, so it doubles as the adapter's "32-bit code point" type
//! without any extra wrapper.

use bitflags::bitflags;

/// One adapter-internal character. One code point, one cell, always.
pub type Cell = char;

bitflags! {
    /// Z-Machine text style bits. Combinable except that `Reverse` and
    /// `FixedPitch` with `Roman` cancel to the base style per the usual
    /// convention: setting `Roman` clears the others.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextStyle: u8 {
        const ROMAN       = 0b0000;
        const REVERSE     = 0b0001;
        const BOLD        = 0b0010;
        const ITALIC      = 0b0100;
        const FIXED_PITCH = 0b1000;
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle::ROMAN
    }
}

/// A Z-Machine colour value: either a named colour 2..=9, or one of the
/// two sentinels `CURRENT` (0, "leave unchanged") and `DEFAULT` (1, "the
/// backend's default for this channel").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Colour(pub i16);

impl Colour {
    pub const CURRENT: Colour = Colour(0);
    pub const DEFAULT: Colour = Colour(1);
    pub const BLACK: Colour = Colour(2);
    pub const RED: Colour = Colour(3);
    pub const GREEN: Colour = Colour(4);
    pub const YELLOW: Colour = Colour(5);
    pub const BLUE: Colour = Colour(6);
    pub const MAGENTA: Colour = Colour(7);
    pub const CYAN: Colour = Colour(8);
    pub const WHITE: Colour = Colour(9);

    pub fn is_current(self) -> bool {
        self == Colour::CURRENT
    }
}

impl Default for Colour {
    fn default() -> Self {
        Colour::DEFAULT
    }
}
