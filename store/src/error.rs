use thiserror::Error;

/// Failures of the join-request ledger and the policy store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record under this request id.
    #[error("no record for request {0}")]
    NotFound(String),

    /// The request id is taken, or the user already has a request waiting
    /// in that group.
    #[error("already recorded: {0}")]
    Duplicate(String),

    #[error("store unavailable: {0}")]
    Backend(String),

    /// A stored record or policy could not be encoded or decoded.
    #[error("unreadable record: {0}")]
    Serialization(String),
}
