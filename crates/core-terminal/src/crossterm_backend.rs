//! A crossterm-backed implementation of [`Backend`].
//!
//! Output is queued rather than written immediately: consecutive `Print`s
//! are coalesced into one write the way the batching writer in the
//! teacher render pipeline coalesced plain-character prints, and the
//! whole queue is flushed on `update_screen()`. This keeps the adapter's
//! one-command-per-call style from turning into one syscall per cell.

use crate::backend::{Backend, BackendError};
use crate::capabilities::TerminalCapabilities;
use core_events::{BackendEvent, KeyPress, KeyToken, ModMask, NamedKey};
use core_text::{Colour, TextStyle};
use crossterm::style::{Attribute, Color, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode,
        enable_raw_mode,
    },
};
use std::collections::HashMap;
use std::io::{Write, stdout};
use std::time::Duration;

enum Queued {
    MoveTo(u16, u16),
    Text(String),
    Style(TextStyle),
    Colour(Colour, Colour),
    ClearArea(u16, u16, u16, u16),
    ClearToEol,
    CursorVisible(bool),
}

pub struct CrosstermBackend {
    entered: bool,
    caps: TerminalCapabilities,
    queue: Vec<Queued>,
    config: HashMap<String, String>,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self {
            entered: false,
            caps: TerminalCapabilities::detect(),
            queue: Vec::new(),
            config: HashMap::new(),
        }
    }

    pub fn capabilities(&self) -> TerminalCapabilities {
        self.caps
    }

    pub fn enter(&mut self) -> Result<(), BackendError> {
        if !self.entered {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
            self.entered = true;
            tracing::debug!(target: "window", "entered_alternate_screen");
        }
        Ok(())
    }

    pub fn leave(&mut self) -> Result<(), BackendError> {
        if self.entered {
            execute!(stdout(), LeaveAlternateScreen, Show)?;
            disable_raw_mode()?;
            self.entered = false;
            tracing::debug!(target: "window", "left_alternate_screen");
        }
        Ok(())
    }

    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_>, BackendError> {
        self.enter()?;
        Ok(TerminalGuard {
            backend: self,
            active: true,
        })
    }

    /// Push consecutive `Text` onto the most recent pending `Text` entry
    /// instead of growing the queue, mirroring the plain-char batching in
    /// the teacher codebase's render pipeline.
    fn push_text(&mut self, s: &str) {
        if let Some(Queued::Text(buf)) = self.queue.last_mut() {
            buf.push_str(s);
        } else {
            self.queue.push(Queued::Text(s.to_string()));
        }
    }
}

fn to_crossterm_colour(c: Colour) -> Option<Color> {
    match c {
        Colour::BLACK => Some(Color::Black),
        Colour::RED => Some(Color::DarkRed),
        Colour::GREEN => Some(Color::DarkGreen),
        Colour::YELLOW => Some(Color::DarkYellow),
        Colour::BLUE => Some(Color::DarkBlue),
        Colour::MAGENTA => Some(Color::DarkMagenta),
        Colour::CYAN => Some(Color::DarkCyan),
        Colour::WHITE => Some(Color::Grey),
        _ => None,
    }
}

fn map_key_code(code: KeyCode) -> Option<KeyToken> {
    match code {
        KeyCode::Char(c) => Some(KeyToken::Char(c)),
        KeyCode::Enter => Some(KeyToken::Named(NamedKey::Enter)),
        KeyCode::Esc => Some(KeyToken::Named(NamedKey::Escape)),
        KeyCode::Backspace => Some(KeyToken::Named(NamedKey::Backspace)),
        KeyCode::Delete => Some(KeyToken::Named(NamedKey::Delete)),
        KeyCode::Left => Some(KeyToken::Named(NamedKey::Left)),
        KeyCode::Right => Some(KeyToken::Named(NamedKey::Right)),
        KeyCode::Up => Some(KeyToken::Named(NamedKey::Up)),
        KeyCode::Down => Some(KeyToken::Named(NamedKey::Down)),
        KeyCode::Home => Some(KeyToken::Named(NamedKey::Home)),
        KeyCode::End => Some(KeyToken::Named(NamedKey::End)),
        KeyCode::PageUp => Some(KeyToken::Named(NamedKey::PageUp)),
        KeyCode::PageDown => Some(KeyToken::Named(NamedKey::PageDown)),
        _ => None,
    }
}

fn map_modifiers(mods: KeyModifiers) -> ModMask {
    let mut out = ModMask::empty();
    if mods.contains(KeyModifiers::CONTROL) {
        out |= ModMask::CTRL;
    }
    if mods.contains(KeyModifiers::ALT) {
        out |= ModMask::ALT;
    }
    if mods.contains(KeyModifiers::SHIFT) {
        out |= ModMask::SHIFT;
    }
    out
}

fn map_key_event(ev: KeyEvent) -> Option<KeyPress> {
    let token = map_key_code(ev.code)?;
    Some(KeyPress::new(token, map_modifiers(ev.modifiers)))
}

impl Backend for CrosstermBackend {
    fn screen_size(&self) -> (u16, u16) {
        crossterm::terminal::size().unwrap_or((80, 24))
    }

    fn default_colours(&self) -> (Colour, Colour) {
        (Colour::DEFAULT, Colour::DEFAULT)
    }

    fn is_colour_available(&self) -> bool {
        self.caps.supports_colour
    }

    fn is_bold_face_available(&self) -> bool {
        self.caps.supports_bold
    }

    fn is_italic_available(&self) -> bool {
        self.caps.supports_italic
    }

    fn is_input_timeout_available(&self) -> bool {
        self.caps.supports_input_timeout
    }

    fn interface_name(&self) -> &str {
        "crossterm"
    }

    fn goto_yx(&mut self, row: u16, col: u16) -> Result<(), BackendError> {
        self.queue
            .push(Queued::MoveTo(col.saturating_sub(1), row.saturating_sub(1)));
        Ok(())
    }

    fn put_text(&mut self, text: &str) -> Result<(), BackendError> {
        self.push_text(text);
        Ok(())
    }

    fn set_text_style(&mut self, style: TextStyle) -> Result<(), BackendError> {
        self.queue.push(Queued::Style(style));
        Ok(())
    }

    fn set_colour(&mut self, fg: Colour, bg: Colour) -> Result<(), BackendError> {
        self.queue.push(Queued::Colour(fg, bg));
        Ok(())
    }

    fn clear_area(&mut self, x: u16, y: u16, w: u16, h: u16) -> Result<(), BackendError> {
        self.queue.push(Queued::ClearArea(x, y, w, h));
        Ok(())
    }

    fn clear_to_eol(&mut self) -> Result<(), BackendError> {
        self.queue.push(Queued::ClearToEol);
        Ok(())
    }

    fn copy_area(
        &mut self,
        dst_y: u16,
        dst_x: u16,
        src_y: u16,
        src_x: u16,
        h: u16,
        w: u16,
    ) -> Result<(), BackendError> {
        // No native scroll-region fast path is wired here (it would need a
        // full-screen cell buffer to read back from); fall back to reading
        // nothing and relying on the caller (the history-refresh engine)
        // to have already produced real content for the destination via a
        // subsequent refresh. A cell-buffer-backed backend could instead
        // issue `\x1b[{n}S`/`\x1b[{n}T` for the common vertical-shift case.
        let _ = (dst_y, dst_x, src_y, src_x, h, w);
        Ok(())
    }

    fn set_cursor_visibility(&mut self, visible: bool) -> Result<(), BackendError> {
        self.queue.push(Queued::CursorVisible(visible));
        Ok(())
    }

    fn update_screen(&mut self) -> Result<(), BackendError> {
        let mut out = stdout();
        for cmd in self.queue.drain(..) {
            match cmd {
                Queued::MoveTo(col, row) => {
                    queue!(out, MoveTo(col, row))?;
                }
                Queued::Text(text) => {
                    queue!(out, crossterm::style::Print(text))?;
                }
                Queued::Style(style) => {
                    queue!(out, SetAttribute(Attribute::Reset))?;
                    if style.contains(TextStyle::REVERSE) {
                        queue!(out, SetAttribute(Attribute::Reverse))?;
                    }
                    if style.contains(TextStyle::BOLD) {
                        queue!(out, SetAttribute(Attribute::Bold))?;
                    }
                    if style.contains(TextStyle::ITALIC) {
                        queue!(out, SetAttribute(Attribute::Italic))?;
                    }
                }
                Queued::Colour(fg, bg) => {
                    if let Some(c) = to_crossterm_colour(fg) {
                        queue!(out, SetForegroundColor(c))?;
                    }
                    if let Some(c) = to_crossterm_colour(bg) {
                        queue!(out, SetBackgroundColor(c))?;
                    }
                }
                Queued::ClearArea(x, y, w, h) => {
                    let blank: String = " ".repeat(w as usize);
                    for row in y..y.saturating_add(h) {
                        queue!(
                            out,
                            MoveTo(x.saturating_sub(1), row.saturating_sub(1)),
                            crossterm::style::Print(&blank)
                        )?;
                    }
                }
                Queued::ClearToEol => {
                    queue!(out, Clear(ClearType::UntilNewLine))?;
                }
                Queued::CursorVisible(true) => {
                    queue!(out, Show)?;
                }
                Queued::CursorVisible(false) => {
                    queue!(out, Hide)?;
                }
            }
        }
        out.flush()?;
        Ok(())
    }

    fn redraw_screen_from_scratch(&mut self) -> Result<(), BackendError> {
        self.queue.clear();
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    fn get_next_event(&mut self, timeout_ms: Option<u64>) -> Result<BackendEvent, BackendError> {
        let timeout = timeout_ms.map(Duration::from_millis);
        let ready = match timeout {
            Some(d) => event::poll(d)?,
            None => {
                event::poll(Duration::from_secs(3600 * 24))?;
                true
            }
        };
        if !ready {
            return Ok(BackendEvent::Timeout);
        }
        match event::read()? {
            CEvent::Resize(w, h) => {
                tracing::debug!(target: "window", width = w, height = h, "resize");
                Ok(BackendEvent::Resize(w, h))
            }
            CEvent::Key(ev) if ev.kind != KeyEventKind::Release => match map_key_event(ev) {
                Some(kp) => Ok(BackendEvent::Key(kp)),
                None => Ok(BackendEvent::Timeout),
            },
            _ => Ok(BackendEvent::Timeout),
        }
    }

    fn set_title(&mut self, title: &str) -> Result<(), BackendError> {
        execute!(stdout(), SetTitle(title))?;
        Ok(())
    }

    fn prompt_for_filename(&mut self, _write: bool) -> Result<Option<String>, BackendError> {
        // No file-picker UI is implemented by this reference backend; the
        // adapter treats `None` as "cancelled".
        Ok(None)
    }

    fn parse_config_parameter(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        self.config.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_config_value(&self, key: &str) -> Option<String> {
        self.config.get(key).cloned()
    }

    fn get_config_option_names(&self) -> Vec<String> {
        self.config.keys().cloned().collect()
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

/// RAII guard ensuring terminal state restoration even if the caller
/// early-returns or panics.
pub struct TerminalGuard<'a> {
    backend: &'a mut CrosstermBackend,
    active: bool,
}

impl<'a> Drop for TerminalGuard<'a> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.leave();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_plain_char() {
        let ev = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        let kp = map_key_event(ev).unwrap();
        assert_eq!(kp.token, KeyToken::Char('a'));
        assert!(kp.mods.is_empty());
    }

    #[test]
    fn maps_ctrl_modifier() {
        let ev = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        let kp = map_key_event(ev).unwrap();
        assert!(kp.mods.contains(ModMask::CTRL));
    }

    #[test]
    fn maps_named_key() {
        let ev = KeyEvent::new(KeyCode::PageUp, KeyModifiers::NONE);
        let kp = map_key_event(ev).unwrap();
        assert_eq!(kp.token, KeyToken::Named(NamedKey::PageUp));
    }

    #[test]
    fn unsupported_key_returns_none() {
        let ev = KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE);
        assert!(map_key_event(ev).is_none());
    }

    #[test]
    fn push_text_batches_consecutive_prints() {
        let mut backend = CrosstermBackend::new();
        backend.put_text("a").unwrap();
        backend.put_text("b").unwrap();
        backend.put_text("c").unwrap();
        assert_eq!(backend.queue.len(), 1);
        if let Some(Queued::Text(s)) = backend.queue.last() {
            assert_eq!(s, "abc");
        } else {
            panic!("expected batched text entry");
        }
    }
}
