//! Inbound platform events, already reduced to what the bot handles.

use joinvote_types::{ChatId, UserId};
use serde::{Deserialize, Serialize};

use crate::MessageRef;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    pub title: Option<String>,
}

impl Chat {
    /// The title, or the numeric id for untitled chats.
    pub fn display_title(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundEvent {
    /// A user asked to join a group that requires approval.
    JoinRequest { chat: Chat, user: User },

    /// A button press on one of the bot's inline keyboards.
    Callback {
        id: String,
        from: User,
        message: Option<MessageRef>,
        data: String,
    },

    /// A `/command` message. `args` is the rest of the line, if any.
    Command {
        message: MessageRef,
        from: User,
        private: bool,
        command: String,
        args: Option<String>,
    },

    /// The service message posted when someone pins a message.
    PinnedService {
        message: MessageRef,
        from: Option<User>,
    },
}

impl InboundEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::JoinRequest { .. } => "join_request",
            InboundEvent::Callback { .. } => "callback",
            InboundEvent::Command { .. } => "command",
            InboundEvent::PinnedService { .. } => "pinned_service",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_parts() {
        let mut user = User {
            id: UserId(1),
            username: None,
            first_name: "Ada".into(),
            last_name: Some("Lovelace".into()),
        };
        assert_eq!(user.full_name(), "Ada Lovelace");
        user.last_name = Some(String::new());
        assert_eq!(user.full_name(), "Ada");
    }

    #[test]
    fn untitled_chat_shows_id() {
        let chat = Chat {
            id: ChatId(-42),
            title: None,
        };
        assert_eq!(chat.display_title(), "-42");
    }
}
