//! User-facing acknowledgements returned by session handlers.

/// How an interaction ended, from the caller's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AckKind {
    /// A manual decision was applied.
    Done,
    /// A vote was recorded.
    Recorded,
    /// The request is no longer open, or the session is gone.
    Expired,
    /// The caller lacks the required role.
    PermissionDenied,
    /// Malformed action or payload.
    InvalidInput,
    AlreadyVoted,
    /// Live results were asked for before voting.
    NotVoted,
    /// A platform or storage call failed; nothing changed.
    Unavailable,
    /// Informational reply (status, live results).
    Info,
}

/// Text to show the caller, optionally as a blocking alert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ack {
    pub kind: AckKind,
    pub text: String,
    pub alert: bool,
}

impl Ack {
    pub fn new(kind: AckKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            alert: false,
        }
    }

    pub fn alert(mut self) -> Self {
        self.alert = true;
        self
    }
}
