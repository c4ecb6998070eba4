//! Output-history replay (component C) plus the two external-collaborator
//! stores (output history, command history) the rest of the adapter
//! depends on but does not own.

pub mod command_history;
pub mod error;
pub mod history;
pub mod refresh;

pub use command_history::{CommandHistory, RingCommandHistory};
pub use error::HistoryError;
pub use history::{MemoryHistory, OutputHistory, Paragraph};
pub use refresh::{HistoryCursor, HistoryRefreshEngine};
