//! Identifier types for chats, users and join requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A platform chat identifier (groups are negative, private chats positive).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// A platform user identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl ChatId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl UserId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// The private chat with this user shares the user's id.
    pub fn private_chat(&self) -> ChatId {
        ChatId(self.0)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one join request, and of the vote session that manages it.
///
/// Rendered hyphenated for logs and in the simple (32 hex chars) form inside
/// callback tokens and deep links, where space is limited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Raw bytes, used as the storage key.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// The compact 32-character hex form.
    pub fn to_simple(&self) -> String {
        self.0.simple().to_string()
    }

    /// Parse either the simple or the hyphenated form.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::try_parse(s).ok().map(Self)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}
