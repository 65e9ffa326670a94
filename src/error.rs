use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error taxonomy for the credit-limit ledger.
///
/// The first four variants are client errors: the request itself was
/// unacceptable and retrying it unchanged will fail again. `Conflict` is a
/// store-level optimistic-concurrency failure; the engine retries it
/// internally and it only escapes when the retry budget is exhausted.
/// Everything else is a collaborator failure.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no contract found for account {0}")]
    NotFound(String),
    #[error("contract already exists for account {0}")]
    AlreadyExists(String),
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("conflicting concurrent update on account {0}")]
    Conflict(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl LedgerError {
    /// True for errors caused by the request rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::NotFound(_)
                | Self::AlreadyExists(_)
                | Self::InvariantViolation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(LedgerError::InvalidInput("x".into()).is_client_error());
        assert!(LedgerError::NotFound("acc".into()).is_client_error());
        assert!(LedgerError::AlreadyExists("acc".into()).is_client_error());
        assert!(LedgerError::InvariantViolation("x".into()).is_client_error());
        assert!(!LedgerError::Conflict("acc".into()).is_client_error());
        assert!(!LedgerError::Io(std::io::Error::other("boom")).is_client_error());
    }
}
