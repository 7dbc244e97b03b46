//! Nullable gateway: records outbound calls instead of talking to a platform.

use async_trait::async_trait;
use joinvote_gateway::{
    BotIdentity, Gateway, GatewayError, InlineKeyboard, MemberStatus, MessageRef,
    OutgoingMessage, PollHandle, PollRequest,
};
use joinvote_types::{ChatId, Decision, UserId, VoteCounts};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// One recorded outbound call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayCall {
    SendMessage {
        message: OutgoingMessage,
        sent: MessageRef,
    },
    EditMessage {
        message: MessageRef,
        text: String,
        keyboard: Option<InlineKeyboard>,
    },
    DeleteMessage(MessageRef),
    SendPoll {
        poll: PollRequest,
        sent: MessageRef,
    },
    StopPoll(MessageRef),
    Pin(MessageRef),
    Approve { chat: ChatId, user: UserId },
    Decline { chat: ChatId, user: UserId },
    Ban { chat: ChatId, user: UserId },
    Answer {
        interaction_id: String,
        text: String,
        alert: bool,
    },
}

/// Operations that can be made to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    SendMessage,
    EditMessage,
    DeleteMessage,
    SendPoll,
    StopPoll,
    Pin,
    GetMember,
    ApplyDecision,
    Ban,
    Answer,
}

type SendFilter = Box<dyn Fn(&OutgoingMessage) -> bool + Send + Sync>;

struct GatewayState {
    next_message_id: i64,
    calls: Vec<GatewayCall>,
    members: HashMap<(ChatId, UserId), MemberStatus>,
    delays: HashMap<GatewayOp, Duration>,
    poll_counts: HashMap<MessageRef, VoteCounts>,
    failing: HashSet<GatewayOp>,
    failing_sends: Vec<SendFilter>,
}

/// A test gateway that records calls and answers from configurable state.
///
/// Unknown users are plain members. Polls report 0:0 until
/// [`set_poll_counts`](NullGateway::set_poll_counts) says otherwise.
pub struct NullGateway {
    state: Mutex<GatewayState>,
    identity: BotIdentity,
}

impl NullGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GatewayState {
                next_message_id: 100,
                calls: Vec::new(),
                members: HashMap::new(),
                delays: HashMap::new(),
                poll_counts: HashMap::new(),
                failing: HashSet::new(),
                failing_sends: Vec::new(),
            }),
            identity: BotIdentity {
                id: UserId(999),
                username: "joinvote_bot".to_string(),
            },
        }
    }

    pub fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    /// Set a user's membership status in a chat.
    pub fn set_member(&self, chat: ChatId, user: UserId, status: MemberStatus) {
        self.state
            .lock()
            .unwrap()
            .members
            .insert((chat, user), status);
    }

    /// Votes a poll will report when stopped.
    pub fn set_poll_counts(&self, poll: MessageRef, counts: VoteCounts) {
        self.state.lock().unwrap().poll_counts.insert(poll, counts);
    }

    /// Make every call of `op` fail until cleared.
    pub fn fail(&self, op: GatewayOp) {
        self.state.lock().unwrap().failing.insert(op);
    }

    /// Make every call of `op` take `delay` before it runs.
    pub fn delay(&self, op: GatewayOp, delay: Duration) {
        self.state.lock().unwrap().delays.insert(op, delay);
    }

    /// Fail only the sends matching `filter`.
    pub fn fail_sends_where(&self, filter: impl Fn(&OutgoingMessage) -> bool + Send + Sync + 'static) {
        self.state
            .lock()
            .unwrap()
            .failing_sends
            .push(Box::new(filter));
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Every approve/decline applied, in order.
    pub fn decisions(&self) -> Vec<(ChatId, UserId, Decision)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::Approve { chat, user } => Some((chat, user, Decision::Approve)),
                GatewayCall::Decline { chat, user } => Some((chat, user, Decision::Decline)),
                _ => None,
            })
            .collect()
    }

    pub fn bans(&self) -> Vec<(ChatId, UserId)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::Ban { chat, user } => Some((chat, user)),
                _ => None,
            })
            .collect()
    }

    pub fn sent_messages(&self) -> Vec<(OutgoingMessage, MessageRef)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::SendMessage { message, sent } => Some((message, sent)),
                _ => None,
            })
            .collect()
    }

    pub fn polls(&self) -> Vec<(PollRequest, MessageRef)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::SendPoll { poll, sent } => Some((poll, sent)),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<(MessageRef, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::EditMessage { message, text, .. } => Some((message, text)),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<MessageRef> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::DeleteMessage(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn answers(&self) -> Vec<(String, String, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::Answer {
                    interaction_id,
                    text,
                    alert,
                } => Some((interaction_id, text, alert)),
                _ => None,
            })
            .collect()
    }

    async fn enter(&self, op: GatewayOp) -> Result<(), GatewayError> {
        let delay = self.state.lock().unwrap().delays.get(&op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check(op)
    }

    fn check(&self, op: GatewayOp) -> Result<(), GatewayError> {
        if self.state.lock().unwrap().failing.contains(&op) {
            return Err(GatewayError::Api {
                code: 400,
                description: format!("injected {op:?} failure"),
            });
        }
        Ok(())
    }

    fn record(&self, call: GatewayCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl Default for NullGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Gateway for NullGateway {
    async fn send_message(&self, message: &OutgoingMessage) -> Result<MessageRef, GatewayError> {
        self.enter(GatewayOp::SendMessage).await?;
        let mut state = self.state.lock().unwrap();
        if state.failing_sends.iter().any(|f| f(message)) {
            return Err(GatewayError::Api {
                code: 400,
                description: "injected send failure".into(),
            });
        }
        state.next_message_id += 1;
        let sent = MessageRef::new(message.chat, state.next_message_id);
        state.calls.push(GatewayCall::SendMessage {
            message: message.clone(),
            sent,
        });
        Ok(sent)
    }

    async fn edit_message_text(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), GatewayError> {
        self.enter(GatewayOp::EditMessage).await?;
        self.record(GatewayCall::EditMessage {
            message,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), GatewayError> {
        self.enter(GatewayOp::DeleteMessage).await?;
        self.record(GatewayCall::DeleteMessage(message));
        Ok(())
    }

    async fn send_poll(&self, poll: &PollRequest) -> Result<PollHandle, GatewayError> {
        self.enter(GatewayOp::SendPoll).await?;
        let mut state = self.state.lock().unwrap();
        state.next_message_id += 1;
        let sent = MessageRef::new(poll.chat, state.next_message_id);
        state.calls.push(GatewayCall::SendPoll {
            poll: poll.clone(),
            sent,
        });
        Ok(PollHandle {
            message: sent,
            poll_id: format!("poll-{}", sent.message_id),
            snapshot: VoteCounts::default(),
        })
    }

    async fn stop_poll(&self, message: MessageRef) -> Result<VoteCounts, GatewayError> {
        self.enter(GatewayOp::StopPoll).await?;
        self.record(GatewayCall::StopPoll(message));
        Ok(self
            .state
            .lock()
            .unwrap()
            .poll_counts
            .get(&message)
            .copied()
            .unwrap_or_default())
    }

    async fn pin_message(&self, message: MessageRef, _silent: bool) -> Result<(), GatewayError> {
        self.enter(GatewayOp::Pin).await?;
        self.record(GatewayCall::Pin(message));
        Ok(())
    }

    async fn get_member(&self, chat: ChatId, user: UserId) -> Result<MemberStatus, GatewayError> {
        self.enter(GatewayOp::GetMember).await?;
        let state = self.state.lock().unwrap();
        Ok(state
            .members
            .get(&(chat, user))
            .copied()
            .unwrap_or(MemberStatus::Member))
    }

    async fn approve_join_request(&self, chat: ChatId, user: UserId) -> Result<(), GatewayError> {
        self.enter(GatewayOp::ApplyDecision).await?;
        self.record(GatewayCall::Approve { chat, user });
        Ok(())
    }

    async fn decline_join_request(&self, chat: ChatId, user: UserId) -> Result<(), GatewayError> {
        self.enter(GatewayOp::ApplyDecision).await?;
        self.record(GatewayCall::Decline { chat, user });
        Ok(())
    }

    async fn ban_member(&self, chat: ChatId, user: UserId) -> Result<(), GatewayError> {
        self.enter(GatewayOp::Ban).await?;
        self.record(GatewayCall::Ban { chat, user });
        Ok(())
    }

    async fn answer_interaction(
        &self,
        interaction_id: &str,
        text: &str,
        alert: bool,
    ) -> Result<(), GatewayError> {
        self.enter(GatewayOp::Answer).await?;
        self.record(GatewayCall::Answer {
            interaction_id: interaction_id.to_string(),
            text: text.to_string(),
            alert,
        });
        Ok(())
    }

    async fn bot_identity(&self) -> Result<BotIdentity, GatewayError> {
        Ok(self.identity.clone())
    }
}
