//! Terminal capability probing.
//!
//! Capability queries in §4.F are answered from fixed truths (status-line
//! yes, split yes, pictures no, ...) except colour/bold/italic/timed-input,
//! which are delegated to the backend. This is the record the backend
//! fills in once at startup so the adapter can answer those delegated
//! queries without re-probing on every call.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct TerminalCapabilities {
    pub supports_colour: bool,
    pub supports_bold: bool,
    pub supports_italic: bool,
    pub supports_input_timeout: bool,
    pub supports_scroll_region: bool,
}

impl TerminalCapabilities {
    /// Optimistic defaults for a modern terminal driven through crossterm.
    /// Colour can still be masked off later by the `disable-color` config
    /// key; that happens in the adapter, not here.
    pub fn detect() -> Self {
        Self {
            supports_colour: true,
            supports_bold: true,
            supports_italic: true,
            supports_input_timeout: true,
            supports_scroll_region: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_sets_optimistic_defaults() {
        let caps = TerminalCapabilities::detect();
        assert!(caps.supports_colour);
        assert!(caps.supports_scroll_region);
    }
}
