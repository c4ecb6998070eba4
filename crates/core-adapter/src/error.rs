//! §7/§9's collapsed error type: every adapter failure mode reduces to
//! one of these variants rather than the mix of exit codes, negative
//! returns, and fatal translators the distillation describes.

use core_config::ConfigError;
use core_model::WindowId;
use core_state::HistoryError;
use core_terminal::BackendError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("history store inconsistency: {0}")]
    History(#[from] HistoryError),
    #[error("geometry violation: window {0:?} out of bounds")]
    GeometryViolation(WindowId),
    #[error("no story linked to the interface")]
    NoStoryLinked,
}
