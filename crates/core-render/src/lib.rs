//! The output pipeline (component B) and the status-line formatter
//! (component E): everything that turns buffered or direct interpreter
//! output into backend calls.

pub mod pipeline;
pub mod status;
pub mod style;
pub mod wrap;

pub use pipeline::OutputPipeline;
pub use status::{StatusContext, StatusMode, format_status};
pub use style::WrapToken;
pub use wrap::{GreedyWrapper, Wrapper};
