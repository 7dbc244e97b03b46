use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TallyError {
    #[error("ballot is closed")]
    Closed,

    #[error("voter has already voted")]
    AlreadyVoted,

    #[error("voter has not voted")]
    NotVoted,

    #[error("operation not supported by this vote mode")]
    WrongMode,
}
