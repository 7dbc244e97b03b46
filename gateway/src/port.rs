//! The gateway trait.

use async_trait::async_trait;
use joinvote_types::{ChatId, Decision, UserId, VoteCounts};

use crate::{
    BotIdentity, GatewayError, InlineKeyboard, MemberStatus, MessageRef, OutgoingMessage,
    PollHandle, PollRequest,
};

/// Outbound operations on the chat platform. Every call is fallible I/O.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn send_message(&self, message: &OutgoingMessage) -> Result<MessageRef, GatewayError>;

    /// Replace a message's text. `None` removes its keyboard.
    async fn edit_message_text(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), GatewayError>;

    async fn delete_message(&self, message: MessageRef) -> Result<(), GatewayError>;

    async fn send_poll(&self, poll: &PollRequest) -> Result<PollHandle, GatewayError>;

    /// Close a poll and return its final (yes, no) counts.
    async fn stop_poll(&self, message: MessageRef) -> Result<VoteCounts, GatewayError>;

    async fn pin_message(&self, message: MessageRef, silent: bool) -> Result<(), GatewayError>;

    async fn get_member(&self, chat: ChatId, user: UserId) -> Result<MemberStatus, GatewayError>;

    async fn approve_join_request(&self, chat: ChatId, user: UserId) -> Result<(), GatewayError>;

    async fn decline_join_request(&self, chat: ChatId, user: UserId) -> Result<(), GatewayError>;

    async fn ban_member(&self, chat: ChatId, user: UserId) -> Result<(), GatewayError>;

    /// Acknowledge a button press, optionally as a blocking alert.
    async fn answer_interaction(
        &self,
        interaction_id: &str,
        text: &str,
        alert: bool,
    ) -> Result<(), GatewayError>;

    async fn bot_identity(&self) -> Result<BotIdentity, GatewayError>;

    /// Apply an admission decision to a pending join request.
    async fn apply_decision(
        &self,
        chat: ChatId,
        user: UserId,
        decision: Decision,
    ) -> Result<(), GatewayError> {
        match decision {
            Decision::Approve => self.approve_join_request(chat, user).await,
            Decision::Decline => self.decline_join_request(chat, user).await,
        }
    }
}
