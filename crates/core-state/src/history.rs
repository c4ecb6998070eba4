//! The output-history store: listed as an external collaborator in §6,
//! but the history-refresh engine can't be exercised without one. This
//! models it as a trait plus an in-memory implementation that stores
//! paragraphs as rendered code-point strings.

/// One unit of output as recorded by the history store: the rendered
/// text plus whether it ended with an explicit newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub newline_terminated: bool,
}

/// The replay surface the history-refresh engine needs: `rewind_paragraph`
/// moves the read cursor one paragraph further from the bottom of the
/// buffer; `repeat_paragraphs` replays forward from wherever the cursor
/// currently sits.
pub trait OutputHistory {
    fn append_paragraph(&mut self, text: &str, newline_terminated: bool);

    /// Move one paragraph further from the tail and return it, or `None`
    /// if the cursor is already at the oldest recorded paragraph.
    fn rewind_paragraph(&mut self) -> Option<Paragraph>;

    /// Replay up to `n` paragraphs forward from the cursor, invoking
    /// `emit` for each one actually replayed and returning how many
    /// were emitted. `want_newlines` mirrors stored terminators through
    /// to the caller rather than forcing one. `dry_run` is purely
    /// informational here — the store itself doesn't touch a screen;
    /// it is up to the caller to not forward dry-run output to a
    /// backend.
    fn repeat_paragraphs(
        &mut self,
        n: u32,
        want_newlines: bool,
        dry_run: bool,
        emit: &mut dyn FnMut(&Paragraph, bool),
    ) -> u32;

    /// True once the read cursor is at the bottom of the buffer (no
    /// paragraphs have been rewound, or every rewound paragraph has
    /// been replayed back to the tail).
    fn is_output_at_frontindex(&self) -> bool;

    /// Discard the read cursor, returning to "nothing rewound".
    fn destroy_cursor(&mut self);
}

/// Paragraphs kept in a flat `Vec`; the read cursor is simply a count
/// of how many paragraphs from the tail it currently sits at.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    paragraphs: Vec<Paragraph>,
    cursor_from_tail: usize,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

impl OutputHistory for MemoryHistory {
    fn append_paragraph(&mut self, text: &str, newline_terminated: bool) {
        self.paragraphs.push(Paragraph {
            text: text.to_string(),
            newline_terminated,
        });
        self.cursor_from_tail = 0;
    }

    fn rewind_paragraph(&mut self) -> Option<Paragraph> {
        if self.cursor_from_tail >= self.paragraphs.len() {
            return None;
        }
        self.cursor_from_tail += 1;
        let idx = self.paragraphs.len() - self.cursor_from_tail;
        self.paragraphs.get(idx).cloned()
    }

    fn repeat_paragraphs(
        &mut self,
        n: u32,
        want_newlines: bool,
        dry_run: bool,
        emit: &mut dyn FnMut(&Paragraph, bool),
    ) -> u32 {
        let mut emitted = 0;
        for _ in 0..n {
            if self.cursor_from_tail == 0 {
                break;
            }
            let idx = self.paragraphs.len() - self.cursor_from_tail;
            let p = &self.paragraphs[idx];
            emit(p, want_newlines && p.newline_terminated);
            self.cursor_from_tail -= 1;
            emitted += 1;
        }
        let _ = dry_run;
        emitted
    }

    fn is_output_at_frontindex(&self) -> bool {
        self.cursor_from_tail == 0
    }

    fn destroy_cursor(&mut self) {
        self.cursor_from_tail = 0;
    }
}
