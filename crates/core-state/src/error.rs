use thiserror::Error;

/// §7's "History store inconsistency" failure mode: the refresh engine
/// asked the output-history store to do something it could not honour.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history refresh recursion did not terminate within bounds")]
    RecursionBudgetExhausted,
    #[error("history store returned no paragraph while one was expected")]
    UnexpectedEmptyStore,
}
