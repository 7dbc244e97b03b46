use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("no record for request {0}")]
    NotFound(String),

    #[error("already recorded: {0}")]
    Duplicate(String),

    #[error("bincode error: {0}")]
    Serialization(String),

    /// The blocking task running a transaction panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        LmdbError::Heed(e.to_string())
    }
}

impl From<bincode::Error> for LmdbError {
    fn from(e: bincode::Error) -> Self {
        LmdbError::Serialization(e.to_string())
    }
}

impl From<tokio::task::JoinError> for LmdbError {
    fn from(e: tokio::task::JoinError) -> Self {
        LmdbError::Task(e.to_string())
    }
}

impl From<LmdbError> for joinvote_store::StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::NotFound(key) => joinvote_store::StoreError::NotFound(key),
            LmdbError::Duplicate(key) => joinvote_store::StoreError::Duplicate(key),
            LmdbError::Serialization(msg) => joinvote_store::StoreError::Serialization(msg),
            other => joinvote_store::StoreError::Backend(other.to_string()),
        }
    }
}
