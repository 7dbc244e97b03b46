//! Request router: turns inbound events into session work.
//!
//! The router holds no state of its own. Join requests start sessions;
//! button presses and deep links are decoded once here and forwarded to the
//! session they name, or answered "expired" when no such session is live.

use std::sync::Arc;

use joinvote_gateway::{Chat, InboundEvent, MessageRef, OutgoingMessage, User};
use joinvote_types::{CallbackAction, DeepLink, RequestId};
use tracing::Instrument;

use crate::ack::{Ack, AckKind};
use crate::context::Services;
use crate::registry::SessionRegistry;
use crate::session::VoteSession;
use crate::tracing_spans::{event_span, interaction_span};
use crate::NodeError;

fn action_kind(action: &CallbackAction) -> &'static str {
    match action {
        CallbackAction::Admin { .. } => "admin_action",
        CallbackAction::Vote { .. } => "vote",
        CallbackAction::Status { .. } => "status",
    }
}

pub struct RequestRouter {
    services: Arc<Services>,
    registry: Arc<SessionRegistry>,
}

impl RequestRouter {
    pub fn new(services: Arc<Services>, registry: Arc<SessionRegistry>) -> Self {
        Self { services, registry }
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Abort every live session; used on shutdown.
    pub fn shutdown(&self) -> usize {
        self.registry.abort_all()
    }

    /// Text in the deployment's default language, for replies that have no
    /// group to take a language from.
    fn default_text(&self, key: &str) -> String {
        self.services
            .texts
            .text(&self.services.settings.default_policy.language, key)
    }

    pub async fn handle_event(&self, event: InboundEvent) {
        let span = event_span(event.kind());
        async move {
            match event {
                InboundEvent::JoinRequest { chat, user } => {
                    if let Err(e) = self.handle_join_request(chat, user).await {
                        tracing::error!(error = %e, "failed to start vote session");
                    }
                }
                InboundEvent::Callback { id, from, data, .. } => {
                    self.handle_callback(&id, &from, &data).await;
                }
                InboundEvent::Command {
                    message,
                    from,
                    private,
                    command,
                    args,
                } => {
                    self.handle_command(message, &from, private, &command, args.as_deref())
                        .await;
                }
                InboundEvent::PinnedService { message, from } => {
                    self.handle_pinned_service(message, from.as_ref()).await;
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Start a vote session for a join request.
    ///
    /// Returns `None` when the group does not vote on requests or the user
    /// already has a request waiting there.
    pub async fn handle_join_request(
        &self,
        chat: Chat,
        user: User,
    ) -> Result<Option<RequestId>, NodeError> {
        let policy = self
            .services
            .policies
            .get_or_create(chat.id, &self.services.settings.default_policy)
            .await?;
        if !policy.vote_to_join {
            tracing::debug!(group = %chat.id, "voting disabled, leaving request to admins");
            return Ok(None);
        }
        if self.services.ledger.has_waiting(chat.id, user.id).await? {
            tracing::debug!(group = %chat.id, user = %user.id, "duplicate join request dropped");
            return Ok(None);
        }

        let session = Arc::new(VoteSession::new(
            Arc::clone(&self.services),
            chat,
            user,
            policy,
        ));
        let id = session.id();
        self.registry.spawn(session)?;
        self.services.metrics.sessions_started.inc();
        Ok(Some(id))
    }

    /// Decode a button press, forward it and answer the press.
    pub async fn handle_callback(&self, interaction_id: &str, from: &User, data: &str) {
        let ack = match CallbackAction::decode(data) {
            Ok(action) => {
                let span = interaction_span(action_kind(&action), &action.request_id());
                self.dispatch(from, action).instrument(span).await
            }
            Err(e) => {
                tracing::debug!(error = %e, data, "undecodable callback");
                Ack::new(AckKind::InvalidInput, self.default_text("invalid_input"))
            }
        };
        if let Err(e) = self
            .services
            .gateway
            .answer_interaction(interaction_id, &ack.text, ack.alert)
            .await
        {
            tracing::debug!(error = %e, "failed to answer interaction");
        }
    }

    /// Forward a decoded action to its session.
    pub async fn dispatch(&self, from: &User, action: CallbackAction) -> Ack {
        let Some(session) = self.registry.lookup(&action.request_id()) else {
            return Ack::new(AckKind::Expired, self.default_text("expired"));
        };
        match action {
            CallbackAction::Admin { action, .. } => session.handle_admin_action(from, action).await,
            CallbackAction::Vote { choice, .. } => session.handle_vote(from, choice).await,
            CallbackAction::Status { .. } => session.handle_status_query(from).await,
        }
    }

    /// Resolve a `/start` payload to the reply the caller should see.
    pub async fn live_result(&self, from: &User, payload: &str) -> Ack {
        let id = match DeepLink::decode(payload) {
            Ok(DeepLink::LiveResult(id)) => id,
            Err(e) => {
                tracing::debug!(error = %e, "unknown start payload");
                return Ack::new(AckKind::InvalidInput, self.default_text("invalid_input"));
            }
        };
        match self.registry.lookup(&id) {
            Some(session) => {
                session
                    .handle_live_result_request(from)
                    .instrument(interaction_span("live_result", &id))
                    .await
            }
            None => Ack::new(AckKind::Expired, self.default_text("expired")),
        }
    }

    async fn handle_command(
        &self,
        message: MessageRef,
        from: &User,
        private: bool,
        command: &str,
        args: Option<&str>,
    ) {
        // Group commands belong to other features.
        if !private {
            return;
        }
        let text = match (command, args) {
            ("start", Some(payload)) => self.live_result(from, payload).await.text,
            ("start", None) | ("help", _) => format!(
                "<b>{}</b>\n{}",
                self.default_text("help_title"),
                self.default_text("help_text")
            ),
            _ => return,
        };
        let reply = OutgoingMessage::new(message.chat, text)
            .reply_to(message.message_id)
            .without_preview();
        if let Err(e) = self.services.gateway.send_message(&reply).await {
            tracing::warn!(error = %e, command, "failed to answer command");
        }
    }

    /// Delete the "pinned a message" notice left by the bot's own pins.
    async fn handle_pinned_service(&self, message: MessageRef, from: Option<&User>) {
        let Some(from) = from else {
            return;
        };
        let bot = match self.services.gateway.bot_identity().await {
            Ok(bot) => bot,
            Err(e) => {
                tracing::debug!(error = %e, "bot identity unavailable");
                return;
            }
        };
        if from.id != bot.id {
            return;
        }
        let policy = match self
            .services
            .policies
            .get_or_create(message.chat, &self.services.settings.default_policy)
            .await
        {
            Ok(policy) => policy,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read group policy");
                return;
            }
        };
        if policy.clean_pinned_message {
            if let Err(e) = self.services.gateway.delete_message(message).await {
                tracing::debug!(error = %e, "failed to delete pin notice");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{fixture, group, user, Fixture};
    use joinvote_gateway::MemberStatus;
    use joinvote_types::{AdminAction, ChatId, GroupPolicy, UserId};

    fn router(f: &Fixture) -> RequestRouter {
        RequestRouter::new(Arc::clone(&f.services), Arc::new(SessionRegistry::new()))
    }

    #[tokio::test]
    async fn disabled_group_gets_no_session() {
        let f = fixture();
        f.policies.set(
            group().id,
            GroupPolicy {
                vote_to_join: false,
                ..Default::default()
            },
        );
        let router = router(&f);
        let id = router.handle_join_request(group(), user(7)).await.unwrap();
        assert!(id.is_none());
        assert!(router.registry().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_request_is_dropped() {
        let f = fixture();
        let router = router(&f);
        let first = router.handle_join_request(group(), user(7)).await.unwrap();
        assert!(first.is_some());
        // Let the session persist its record.
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;

        let second = router.handle_join_request(group(), user(7)).await.unwrap();
        assert!(second.is_none());
        assert_eq!(router.registry().len(), 1);
        router.shutdown();
    }

    #[tokio::test]
    async fn malformed_callback_is_invalid_input() {
        let f = fixture();
        let router = router(&f);
        router.handle_callback("cb1", &user(7), "jr 1 approve").await;
        let answers = f.gateway.answers();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].0, "cb1");
        assert_eq!(
            answers[0].1,
            f.services.texts.text("zh_CN", "invalid_input")
        );
    }

    #[tokio::test]
    async fn unknown_session_is_expired() {
        let f = fixture();
        let router = router(&f);
        let action = CallbackAction::Status {
            id: RequestId::new(),
        };
        let ack = router.dispatch(&user(7), action).await;
        assert_eq!(ack.kind, AckKind::Expired);
    }

    #[tokio::test]
    async fn help_is_answered_in_private_only() {
        let f = fixture();
        let router = router(&f);
        let private = MessageRef::new(ChatId(7), 1);
        router
            .handle_event(InboundEvent::Command {
                message: private,
                from: user(7),
                private: true,
                command: "help".to_string(),
                args: None,
            })
            .await;
        router
            .handle_event(InboundEvent::Command {
                message: MessageRef::new(group().id, 2),
                from: user(7),
                private: false,
                command: "help".to_string(),
                args: None,
            })
            .await;
        let sent = f.gateway.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.chat, ChatId(7));
        assert_eq!(sent[0].0.reply_to, Some(1));
    }

    #[tokio::test]
    async fn bot_pin_notice_is_cleaned_when_enabled() {
        let f = fixture();
        f.policies.set(
            group().id,
            GroupPolicy {
                clean_pinned_message: true,
                ..Default::default()
            },
        );
        let router = router(&f);
        let bot = f.gateway.identity().clone();
        let notice = MessageRef::new(group().id, 50);
        router
            .handle_event(InboundEvent::PinnedService {
                message: notice,
                from: Some(User {
                    id: bot.id,
                    username: Some(bot.username),
                    first_name: "bot".to_string(),
                    last_name: None,
                }),
            })
            .await;
        // A member's pin is left alone.
        router
            .handle_event(InboundEvent::PinnedService {
                message: MessageRef::new(group().id, 51),
                from: Some(user(7)),
            })
            .await;
        assert_eq!(f.gateway.deleted(), vec![notice]);
    }

    #[tokio::test]
    async fn non_admin_cannot_resolve() {
        let f = fixture();
        f.gateway
            .set_member(group().id, UserId(8), MemberStatus::Member);
        let session = VoteSession::new(
            Arc::clone(&f.services),
            group(),
            user(7),
            GroupPolicy::default(),
        );
        let ack = session
            .handle_admin_action(&user(8), AdminAction::Approve)
            .await;
        assert_eq!(ack.kind, AckKind::PermissionDenied);
        assert!(ack.alert);
        assert!(f.gateway.decisions().is_empty());
    }
}
