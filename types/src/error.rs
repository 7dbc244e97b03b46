use thiserror::Error;

/// Failure to decode an inbound interaction token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unsupported token version: {0}")]
    UnsupportedVersion(String),

    #[error("unknown action kind: {0}")]
    UnknownKind(String),

    #[error("invalid request id: {0}")]
    InvalidRequestId(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed token")]
    Malformed,
}
