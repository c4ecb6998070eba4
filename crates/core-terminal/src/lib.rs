//! The downward backend contract and one concrete crossterm implementation.

pub mod backend;
pub mod capabilities;
pub mod crossterm_backend;

pub use backend::{Backend, BackendError};
pub use capabilities::TerminalCapabilities;
pub use crossterm_backend::{CrosstermBackend, TerminalGuard};
