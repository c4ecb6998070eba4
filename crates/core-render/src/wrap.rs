//! A greedy word-wrapper implementing the external wrapper contract from
//! §6: `wrap`/`flush`/`insert_metadata`/`set_line_index`/
//! `adjust_line_length`/`destroy`. The output pipeline is the only
//! caller; it owns one wrapper per buffering window.

use crate::style::WrapToken;

pub trait Wrapper {
    /// Change the content width mid-stream (a resize, or a margin change).
    fn adjust_line_length(&mut self, width: u16);
    /// Tell the wrapper which logical output line it is about to produce,
    /// used by dry-run replay during history refresh to count lines
    /// without caring about their absolute position.
    fn set_line_index(&mut self, index: u32);
    /// Feed text through the wrapper, invoking `out` for every token
    /// (text run or forced newline) the wrap decision produces.
    fn wrap(&mut self, text: &str, out: &mut dyn FnMut(WrapToken));
    /// Insert a style/colour change so it takes effect at the current
    /// wrap position rather than immediately.
    fn insert_metadata(&mut self, token: WrapToken, out: &mut dyn FnMut(WrapToken));
    /// Emit any content still pending (a greedy wrapper never withholds
    /// a finished word, so this is a no-op for `GreedyWrapper`).
    fn flush(&mut self, out: &mut dyn FnMut(WrapToken));
    fn destroy(&mut self);
}

/// Greedy word-wrap: place whole words until one would overflow the
/// line, then break. Hyphenation only kicks in for a single word longer
/// than the line, and only when enabled.
pub struct GreedyWrapper {
    width: u16,
    hyphenation: bool,
    column: u16,
    line_index: u32,
}

impl GreedyWrapper {
    pub fn new(width: u16, hyphenation: bool) -> Self {
        Self {
            width: width.max(1),
            hyphenation,
            column: 0,
            line_index: 0,
        }
    }

    fn emit_text(&mut self, text: &str, out: &mut dyn FnMut(WrapToken)) {
        if text.is_empty() {
            return;
        }
        self.column += text.chars().count() as u16;
        out(WrapToken::Text(text.to_string()));
    }

    fn break_line(&mut self, out: &mut dyn FnMut(WrapToken)) {
        out(WrapToken::Newline);
        self.column = 0;
        self.line_index += 1;
    }

    fn wrap_segment(&mut self, segment: &str, out: &mut dyn FnMut(WrapToken)) {
        for chunk in segment.split_inclusive(' ') {
            let word = chunk.trim_end_matches(' ');
            let had_space = chunk.len() > word.len();
            if !word.is_empty() {
                self.place_word(word, out);
            }
            if had_space && self.column < self.width {
                self.emit_text(" ", out);
            }
        }
    }

    fn place_word(&mut self, word: &str, out: &mut dyn FnMut(WrapToken)) {
        let word_len = word.chars().count() as u16;
        if self.column > 0 && self.column + word_len > self.width {
            self.break_line(out);
        }
        if word_len > self.width {
            self.hard_break_word(word, out);
        } else {
            self.emit_text(word, out);
        }
    }

    fn hard_break_word(&mut self, word: &str, out: &mut dyn FnMut(WrapToken)) {
        let chars: Vec<char> = word.chars().collect();
        let mut idx = 0;
        while idx < chars.len() {
            let room = self.width.saturating_sub(self.column).max(1);
            let reserve_for_hyphen = self.hyphenation && room > 1 && (chars.len() - idx) as u16 > room;
            let take = if reserve_for_hyphen { room - 1 } else { room }.min((chars.len() - idx) as u16) as usize;
            let chunk: String = chars[idx..idx + take].iter().collect();
            idx += take;
            self.emit_text(&chunk, out);
            if idx < chars.len() {
                if self.hyphenation {
                    self.emit_text("-", out);
                }
                self.break_line(out);
            }
        }
    }
}

impl Wrapper for GreedyWrapper {
    fn adjust_line_length(&mut self, width: u16) {
        self.width = width.max(1);
    }

    fn set_line_index(&mut self, index: u32) {
        self.line_index = index;
    }

    fn wrap(&mut self, text: &str, out: &mut dyn FnMut(WrapToken)) {
        let mut segments = text.split('\n');
        if let Some(first) = segments.next() {
            self.wrap_segment(first, out);
        }
        for segment in segments {
            self.break_line(out);
            self.wrap_segment(segment, out);
        }
    }

    fn insert_metadata(&mut self, token: WrapToken, out: &mut dyn FnMut(WrapToken)) {
        out(token);
    }

    fn flush(&mut self, _out: &mut dyn FnMut(WrapToken)) {}

    fn destroy(&mut self) {}
}
