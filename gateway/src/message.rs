//! Outbound message and poll descriptions, and handles to sent messages.

use joinvote_types::{ChatId, UserId, VoteCounts};

use crate::InlineKeyboard;

/// Address of a message the bot sent or received.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat: ChatId,
    pub message_id: i64,
}

impl MessageRef {
    pub fn new(chat: ChatId, message_id: i64) -> Self {
        Self { chat, message_id }
    }
}

/// A text message to send. Text is HTML.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub chat: ChatId,
    pub text: String,
    pub reply_to: Option<i64>,
    pub thread_id: Option<i64>,
    pub keyboard: Option<InlineKeyboard>,
    pub protect_content: bool,
    pub disable_preview: bool,
}

impl OutgoingMessage {
    pub fn new(chat: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat,
            text: text.into(),
            reply_to: None,
            thread_id: None,
            keyboard: None,
            protect_content: false,
            disable_preview: false,
        }
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to = Some(message_id);
        self
    }

    /// Post inside a forum topic. Zero means "no topic".
    pub fn thread(mut self, thread_id: Option<i64>) -> Self {
        self.thread_id = thread_id.filter(|id| *id != 0);
        self
    }

    pub fn keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn protected(mut self) -> Self {
        self.protect_content = true;
        self
    }

    pub fn without_preview(mut self) -> Self {
        self.disable_preview = true;
        self
    }
}

/// A two-option poll: option 0 is "yes", option 1 is "no".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollRequest {
    pub chat: ChatId,
    pub question: String,
    pub yes_option: String,
    pub no_option: String,
    pub anonymous: bool,
    pub reply_to: Option<i64>,
}

/// A poll the bot opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollHandle {
    pub message: MessageRef,
    pub poll_id: String,
    /// Counts as last reported by the platform.
    pub snapshot: VoteCounts,
}

/// The bot's own account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: UserId,
    pub username: String,
}
