use thiserror::Error;

/// Error kinds of the search core. Everything except `ExecutionFailure` is
/// fatal to the run; `ExecutionFailure` is recovered at the evaluation
/// boundary by assigning worst-case fitness. Nothing is retried.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("not yet implemented: {0}")]
    NotYetImplemented(&'static str),

    #[error("execution failed: {0}")]
    ExecutionFailure(String),
}

impl SearchError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SearchError::InvalidConfiguration(msg.into())
    }
}
