//! Key tokens and the backend-facing event vocabulary.
//!
//! The adapter only ever sees three kinds of backend event: a key, a
//! timeout tick, and a resize (`WINCH`). Everything `get_next_event` can
//! report collapses into [`BackendEvent`]; keyboard detail lives in
//! [`KeyToken`] plus [`ModMask`].

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held alongside a [`KeyToken`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModMask: u8 {
        const CTRL  = 0b0001;
        const ALT   = 0b0010;
        const SHIFT = 0b0100;
    }
}

/// Named (non-printable) keys the input editor and `read_char` care
/// about. This is the reduced set the distillation lists for §4.D/§4.D's
/// `read_char`: cursor motion, editing, paging, and escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Escape,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
}

/// A single keypress as the adapter understands it: either a printable
/// code point or one of the named keys above, always paired with a
/// [`ModMask`] so `Ctrl-A`/`Ctrl-E`/`Ctrl-L`/`Ctrl-R` are expressed as
/// `Char('a'..'r') + ModMask::CTRL` rather than as bespoke variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyToken {
    Char(char),
    Named(NamedKey),
}

/// One fully-resolved keypress: token plus modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub token: KeyToken,
    pub mods: ModMask,
}

impl KeyPress {
    pub fn new(token: KeyToken, mods: ModMask) -> Self {
        Self { token, mods }
    }

    pub fn plain(token: KeyToken) -> Self {
        Self::new(token, ModMask::empty())
    }

    /// True if this is `Ctrl-<lowercase letter>`, used to recognise
    /// CTRL_A / CTRL_E / CTRL_L / CTRL_R.
    pub fn is_ctrl_char(&self, c: char) -> bool {
        self.mods.contains(ModMask::CTRL) && matches!(self.token, KeyToken::Char(ch) if ch.eq_ignore_ascii_case(&c))
    }
}

/// Everything `get_next_event` can report, collapsed to three shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendEvent {
    Key(KeyPress),
    Timeout,
    Resize(u16, u16),
}
