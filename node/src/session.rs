//! The vote session: one join request's lifecycle from request card to
//! cleanup.
//!
//! A session is driven by its own background task ([`VoteSession::run`]).
//! Two kinds of calls reach it from outside while that task runs: votes and
//! admin actions. Both paths may try to resolve the request; the ledger's
//! conditional update on the `waiting` flag decides which one wins, and the
//! loser backs off without side effects.
//!
//! ```text
//! Created ──▶ BallotOpen ──(timeout)──▶ Resolving ──▶ Resolved ──▶ Cleanup ──▶ Terminal
//!                 │
//!                 └──(admin action)──▶ Resolved (by the handler)
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use joinvote_gateway::{Chat, MessageRef, OutgoingMessage, PollRequest, User};
use joinvote_store::StoreError;
use joinvote_tally::{decide, PerVoterTally, SealedTally, Tally, TallyError, VoteMode};
use joinvote_types::{
    AdminAction, GroupPolicy, JoinRequestRecord, Outcome, RequestId, Resolution, Timestamp,
    VoteChoice, VoteCounts,
};
use joinvote_utils::{format_duration, vote_minutes};
use tokio::sync::{watch, OnceCell};
use tokio::time::Instant;

use crate::ack::{Ack, AckKind};
use crate::context::Services;
use crate::render;
use crate::NodeError;

/// Where a session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Created,
    BallotOpen,
    Resolving,
    Resolved(Outcome),
    Cleanup,
    Terminal,
}

/// How a session's task ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// The task itself decided the request, by vote or by aborting.
    Decided(Outcome),
    /// An admin resolved the request while the ballot was open.
    Overridden,
    /// The request was already resolved when the task tried to.
    Superseded,
}

struct Ballot {
    tally: Tally,
    message: MessageRef,
}

#[derive(Clone, Copy, Debug, Default)]
struct Messages {
    request_card: Option<MessageRef>,
    applicant_notice: Option<MessageRef>,
    result_notice: Option<MessageRef>,
    log_entry: Option<MessageRef>,
}

/// Status, group announcement and private notice for a vote outcome.
fn outcome_keys(outcome: Outcome) -> (&'static str, &'static str, &'static str) {
    match outcome {
        Outcome::Approved => ("jr_status_approved", "jr_group_approved", "jr_private_approved"),
        Outcome::Rejected { tie: true } => ("jr_status_tie", "jr_group_tie", "jr_private_rejected"),
        Outcome::Rejected { tie: false } => {
            ("jr_status_rejected", "jr_group_rejected", "jr_private_rejected")
        }
        Outcome::InsufficientVoters => (
            "jr_status_not_enough_voters",
            "jr_not_enough_voters",
            "jr_no_votes_private",
        ),
        Outcome::Aborted => ("jr_status_rejected", "jr_group_rejected", "jr_private_rejected"),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct VoteSession {
    id: RequestId,
    chat: Chat,
    applicant: User,
    /// Snapshot taken when the request arrived.
    policy: GroupPolicy,
    services: Arc<Services>,
    override_tx: watch::Sender<bool>,
    ballot: OnceCell<Ballot>,
    messages: Mutex<Messages>,
    /// Private outcome an admin decided, until it reaches the applicant.
    manual_outcome: Mutex<Option<&'static str>>,
    phase: Mutex<Phase>,
    deadline: Mutex<Option<Instant>>,
}

impl VoteSession {
    pub fn new(services: Arc<Services>, chat: Chat, applicant: User, policy: GroupPolicy) -> Self {
        let (override_tx, _) = watch::channel(false);
        Self {
            id: RequestId::new(),
            chat,
            applicant,
            policy,
            services,
            override_tx,
            ballot: OnceCell::new(),
            messages: Mutex::new(Messages::default()),
            manual_outcome: Mutex::new(None),
            phase: Mutex::new(Phase::Created),
            deadline: Mutex::new(None),
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn chat(&self) -> &Chat {
        &self.chat
    }

    pub fn applicant(&self) -> &User {
        &self.applicant
    }

    pub fn policy(&self) -> &GroupPolicy {
        &self.policy
    }

    pub fn phase(&self) -> Phase {
        *lock(&self.phase)
    }

    /// `None` until the ballot is open.
    pub fn mode(&self) -> Option<VoteMode> {
        self.ballot.get().map(|b| b.tally.mode())
    }

    pub fn ballot_message(&self) -> Option<MessageRef> {
        self.ballot.get().map(|b| b.message)
    }

    pub fn request_card(&self) -> Option<MessageRef> {
        lock(&self.messages).request_card
    }

    fn set_phase(&self, phase: Phase) {
        *lock(&self.phase) = phase;
    }

    fn messages(&self) -> Messages {
        *lock(&self.messages)
    }

    fn override_raised(&self) -> bool {
        *self.override_tx.borrow()
    }

    // ── Text helpers ────────────────────────────────────────────────────

    fn text(&self, key: &str) -> String {
        self.services.texts.text(&self.policy.language, key)
    }

    fn ack(&self, kind: AckKind, key: &str) -> Ack {
        Ack::new(kind, self.text(key))
    }

    /// A status text naming the applicant, and the admin if given.
    fn applicant_text(&self, key: &str, admin: Option<&User>) -> String {
        let user = render::applicant_display(&self.applicant);
        let user_id = self.applicant.id.to_string();
        let admin = admin.map(render::admin_display).unwrap_or_default();
        self.services.texts.resolve(
            &self.policy.language,
            key,
            &[
                ("user", user.as_str()),
                ("user_id", user_id.as_str()),
                ("admin", admin.as_str()),
            ],
        )
    }

    // ── Task ────────────────────────────────────────────────────────────

    /// Drive the session to a terminal state.
    ///
    /// Returns an error only when the ledger fails; gateway failures are
    /// handled here (fallback, abort, or logged and skipped).
    pub async fn run(self: Arc<Self>) -> Result<SessionEnd, NodeError> {
        let record = JoinRequestRecord::new(
            self.id,
            self.chat.id,
            self.applicant.id,
            Timestamp::now(),
        );
        match self.services.ledger.create(&record).await {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => {
                tracing::debug!("request already waiting, dropping duplicate");
                return Ok(SessionEnd::Superseded);
            }
            Err(e) => return Err(e.into()),
        }

        let card = OutgoingMessage::new(self.chat.id, self.applicant_text("jr_requesting", None))
            .keyboard(render::request_card_keyboard(
                &self.services.texts,
                &self.policy.language,
                self.id,
            ));
        let card = match self.services.gateway.send_message(&card).await {
            Ok(card) => card,
            Err(e) => {
                tracing::error!(error = %e, "failed to send request card");
                return self.abort().await;
            }
        };
        lock(&self.messages).request_card = Some(card);
        self.send_pending_log().await;

        let Some(ballot) = self.open_ballot(card).await else {
            return self.abort().await;
        };
        let ballot_message = ballot.message;
        // Only this task sets the ballot.
        let _ = self.ballot.set(ballot);

        if self.override_raised() {
            // Resolved by an admin while the ballot was being opened.
            self.close_ballot().await;
            return Ok(self.overridden().await);
        }

        if self.policy.pin_msg {
            if let Err(e) = self.services.gateway.pin_message(ballot_message, true).await {
                tracing::warn!(error = %e, "failed to pin ballot");
            }
        }
        if self.override_raised() {
            return Ok(self.overridden().await);
        }
        self.send_applicant_notice().await;

        let vote_time = Duration::from_secs(u64::from(self.policy.vote_time));
        *lock(&self.deadline) = Some(Instant::now() + vote_time);
        self.set_phase(Phase::BallotOpen);
        tracing::info!(vote_time = self.policy.vote_time, mode = ?self.mode(), "ballot open");

        let mut override_rx = self.override_tx.subscribe();
        tokio::select! {
            _ = async { let _ = override_rx.wait_for(|raised| *raised).await; } => {
                tracing::debug!("vote pre-empted by manual override");
                return Ok(self.overridden().await);
            }
            _ = tokio::time::sleep(vote_time) => {}
        }

        self.resolve_by_vote().await
    }

    /// Open a poll, or per-voter buttons if polls are off or fail.
    async fn open_ballot(&self, card: MessageRef) -> Option<Ballot> {
        let gateway = &self.services.gateway;

        if !self.policy.advanced_vote {
            let poll = PollRequest {
                chat: self.chat.id,
                question: self.text("jr_poll_question"),
                yes_option: self.text("jr_poll_yes"),
                no_option: self.text("jr_poll_no"),
                anonymous: self.policy.anonymous_vote,
                reply_to: Some(card.message_id),
            };
            match gateway.send_poll(&poll).await {
                Ok(handle) => {
                    let message = handle.message;
                    return Some(Ballot {
                        tally: Tally::Sealed(SealedTally::new(Arc::clone(gateway), handle)),
                        message,
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to open poll, falling back to per-voter ballot");
                    self.services.metrics.poll_fallbacks.inc();
                }
            }
        }

        let bot_username = self.bot_username().await;
        let ballot = OutgoingMessage::new(self.chat.id, self.text("jr_poll_question"))
            .reply_to(card.message_id)
            .keyboard(render::per_voter_keyboard(
                &self.services.texts,
                &self.policy.language,
                self.id,
                bot_username.as_deref(),
            ))
            .protected();
        match gateway.send_message(&ballot).await {
            Ok(message) => Some(Ballot {
                tally: Tally::PerVoter(PerVoterTally::new(self.policy.anonymous_vote)),
                message,
            }),
            Err(e) => {
                tracing::error!(error = %e, "failed to open per-voter ballot");
                None
            }
        }
    }

    async fn bot_username(&self) -> Option<String> {
        if let Some(username) = &self.services.settings.bot_username {
            return Some(username.clone());
        }
        match self.services.gateway.bot_identity().await {
            Ok(identity) => Some(identity.username),
            Err(e) => {
                tracing::warn!(error = %e, "bot username unknown, omitting live results link");
                None
            }
        }
    }

    async fn overridden(&self) -> SessionEnd {
        self.deliver_manual_outcome(false).await;
        SessionEnd::Overridden
    }

    /// Tell the applicant what an admin decided, exactly once.
    ///
    /// The handler replies to the applicant notice when one exists. Otherwise
    /// the task delivers it once it sees the override, as a plain private
    /// message if the notice was never sent.
    async fn deliver_manual_outcome(&self, needs_notice: bool) {
        let notice = self.messages().applicant_notice;
        if needs_notice && notice.is_none() {
            return;
        }
        let Some(key) = lock(&self.manual_outcome).take() else {
            return;
        };
        let mut message = OutgoingMessage::new(self.applicant.id.private_chat(), self.text(key));
        if let Some(notice) = notice {
            message = message.reply_to(notice.message_id);
        }
        if let Err(e) = self.services.gateway.send_message(&message).await {
            tracing::debug!(error = %e, "failed to send outcome to applicant");
        }
    }

    /// No ballot could be opened: deny the request so the applicant is not
    /// left waiting.
    async fn abort(&self) -> Result<SessionEnd, NodeError> {
        tracing::warn!("aborting session, declining request");
        self.set_phase(Phase::Resolving);

        let resolution = Resolution {
            result: false,
            admin: None,
            yes_votes: Some(0),
            no_votes: Some(0),
        };
        let recorded = self
            .services
            .ledger
            .conditional_update(&self.id, &resolution)
            .await;
        if let Ok(false) = recorded {
            return Ok(SessionEnd::Superseded);
        }

        self.set_phase(Phase::Resolved(Outcome::Aborted));
        self.edit_card(self.applicant_text("jr_status_rejected", None))
            .await;
        if let Err(e) = self
            .services
            .gateway
            .apply_decision(self.chat.id, self.applicant.id, Outcome::Aborted.decision())
            .await
        {
            tracing::error!(error = %e, "failed to decline join request");
        }
        self.services.metrics.record_outcome(Outcome::Aborted);
        self.set_phase(Phase::Terminal);

        // Surface a ledger failure only after the applicant has been declined.
        recorded?;
        Ok(SessionEnd::Decided(Outcome::Aborted))
    }

    /// Timeout path.
    async fn resolve_by_vote(&self) -> Result<SessionEnd, NodeError> {
        self.set_phase(Phase::Resolving);

        if self.services.ledger.get_waiting(&self.id).await? != Some(true) {
            tracing::debug!("request already resolved before the vote closed");
            return Ok(SessionEnd::Superseded);
        }
        let Some(ballot) = self.ballot.get() else {
            return Ok(SessionEnd::Superseded);
        };

        let counts = ballot.tally.finalize().await;
        if ballot.tally.mode() == VoteMode::PerVoter {
            let text = self.services.texts.resolve(
                &self.policy.language,
                "jr_final_votes",
                &[
                    ("yes_votes", counts.yes.to_string().as_str()),
                    ("no_votes", counts.no.to_string().as_str()),
                ],
            );
            if let Err(e) = self
                .services
                .gateway
                .edit_message_text(ballot.message, &text, None)
                .await
            {
                tracing::debug!(error = %e, "failed to show final votes");
            }
        }

        let outcome = decide(counts, self.policy.mini_voters);
        tracing::info!(
            yes = counts.yes,
            no = counts.no,
            mini_voters = self.policy.mini_voters,
            ?outcome,
            "vote closed"
        );

        let resolution = Resolution {
            result: outcome.decision().is_approve(),
            admin: None,
            yes_votes: Some(counts.yes),
            no_votes: Some(counts.no),
        };
        if !self
            .services
            .ledger
            .conditional_update(&self.id, &resolution)
            .await?
        {
            tracing::debug!("request resolved elsewhere while the vote closed");
            return Ok(SessionEnd::Superseded);
        }
        self.set_phase(Phase::Resolved(outcome));

        if let Err(e) = self
            .services
            .gateway
            .apply_decision(self.chat.id, self.applicant.id, outcome.decision())
            .await
        {
            tracing::error!(error = %e, "failed to apply vote decision");
        }

        let (status_key, group_key, private_key) = outcome_keys(outcome);
        self.announce_result(group_key).await;
        self.edit_card(self.applicant_text(status_key, None)).await;
        self.notify_applicant(private_key).await;
        self.edit_log(outcome.log_status(), Some(counts), None).await;
        self.services.metrics.record_outcome(outcome);

        self.cleanup().await;
        Ok(SessionEnd::Decided(outcome))
    }

    async fn cleanup(&self) {
        self.set_phase(Phase::Cleanup);
        tokio::time::sleep(self.services.settings.cleanup_delay).await;
        self.delete_quietly(self.ballot_message()).await;
        self.delete_quietly(self.messages().result_notice).await;
        self.set_phase(Phase::Terminal);
        tracing::debug!("session cleaned up");
    }

    /// Finalize the tally and remove the ballot message.
    async fn close_ballot(&self) {
        if let Some(ballot) = self.ballot.get() {
            ballot.tally.finalize().await;
            self.delete_quietly(Some(ballot.message)).await;
        }
    }

    // ── Best-effort messaging ───────────────────────────────────────────

    async fn edit_card(&self, text: String) {
        let Some(card) = self.messages().request_card else {
            return;
        };
        if let Err(e) = self
            .services
            .gateway
            .edit_message_text(card, &text, None)
            .await
        {
            tracing::warn!(error = %e, "failed to update request card");
        }
    }

    async fn delete_quietly(&self, message: Option<MessageRef>) {
        let Some(message) = message else {
            return;
        };
        if let Err(e) = self.services.gateway.delete_message(message).await {
            tracing::debug!(message_id = message.message_id, error = %e, "delete failed");
        }
    }

    async fn announce_result(&self, key: &str) {
        let Some(card) = self.messages().request_card else {
            return;
        };
        let announcement = OutgoingMessage::new(self.chat.id, self.text(key)).reply_to(card.message_id);
        match self.services.gateway.send_message(&announcement).await {
            Ok(sent) => lock(&self.messages).result_notice = Some(sent),
            Err(e) => tracing::warn!(error = %e, "failed to announce result"),
        }
    }

    async fn send_applicant_notice(&self) {
        let group_name = joinvote_utils::escape_html(&self.chat.display_title());
        let minutes = vote_minutes(self.policy.vote_time).to_string();
        let text = self.services.texts.resolve(
            &self.policy.language,
            "jr_apply_notice",
            &[
                ("group_name", group_name.as_str()),
                ("vote_minutes", minutes.as_str()),
            ],
        );
        let notice = OutgoingMessage::new(self.applicant.id.private_chat(), text);
        match self.services.gateway.send_message(&notice).await {
            Ok(sent) => lock(&self.messages).applicant_notice = Some(sent),
            // Applicants who never started the bot cannot be messaged.
            Err(e) => tracing::debug!(error = %e, "failed to notify applicant"),
        }
    }

    async fn notify_applicant(&self, key: &str) {
        let Some(notice) = self.messages().applicant_notice else {
            return;
        };
        let reply = OutgoingMessage::new(notice.chat, self.text(key)).reply_to(notice.message_id);
        if let Err(e) = self.services.gateway.send_message(&reply).await {
            tracing::debug!(error = %e, "failed to send outcome to applicant");
        }
    }

    async fn send_pending_log(&self) {
        let Some((channel, thread)) = self.services.settings.log_channel else {
            return;
        };
        let text = render::log_text(&self.chat, &self.applicant, "Pending", None, None);
        let entry = OutgoingMessage::new(channel, text)
            .thread(thread)
            .without_preview();
        match self.services.gateway.send_message(&entry).await {
            Ok(sent) => lock(&self.messages).log_entry = Some(sent),
            Err(e) => tracing::warn!(error = %e, "failed to write moderation log"),
        }
    }

    async fn edit_log(&self, status: &str, counts: Option<VoteCounts>, admin: Option<&User>) {
        let Some(entry) = self.messages().log_entry else {
            return;
        };
        let text = render::log_text(&self.chat, &self.applicant, status, counts, admin);
        if let Err(e) = self
            .services
            .gateway
            .edit_message_text(entry, &text, None)
            .await
        {
            tracing::warn!(error = %e, "failed to update moderation log");
        }
    }

    // ── Handlers ────────────────────────────────────────────────────────

    /// An admin tapped Approve, Reject or Ban on the request card.
    pub async fn handle_admin_action(&self, actor: &User, action: AdminAction) -> Ack {
        let gateway = &self.services.gateway;
        let ledger = &self.services.ledger;

        match gateway.get_member(self.chat.id, actor.id).await {
            Ok(status) if status.can_invite() => {}
            Ok(_) => return self.ack(AckKind::PermissionDenied, "insufficient_permissions").alert(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to check admin permission");
                return self.ack(AckKind::Unavailable, "unavailable").alert();
            }
        }

        match ledger.get_waiting(&self.id).await {
            Ok(Some(true)) => {}
            Ok(_) => return self.ack(AckKind::Expired, "expired"),
            Err(e) => {
                tracing::error!(error = %e, "failed to read request state");
                return self.ack(AckKind::Unavailable, "unavailable").alert();
            }
        }

        let counts = match self.ballot.get() {
            Some(ballot) => ballot.tally.counts_so_far().await,
            None => None,
        };
        let decision = action.decision();
        let resolution = Resolution {
            result: decision.is_approve(),
            admin: Some(actor.id),
            yes_votes: counts.map(|c| c.yes),
            no_votes: counts.map(|c| c.no),
        };
        match ledger.conditional_update(&self.id, &resolution).await {
            Ok(true) => {}
            // Another admin, or the timer, got there first.
            Ok(false) => return self.ack(AckKind::Expired, "expired"),
            Err(e) => {
                tracing::error!(error = %e, "failed to record manual decision");
                return self.ack(AckKind::Unavailable, "unavailable").alert();
            }
        }

        let outcome = if decision.is_approve() {
            Outcome::Approved
        } else {
            Outcome::Rejected { tie: false }
        };
        self.set_phase(Phase::Resolved(outcome));
        tracing::info!(admin = %actor.id, action = action.as_str(), "request resolved manually");
        self.services.metrics.manual_overrides.inc();
        self.services.metrics.record_outcome(outcome);

        if let Err(e) = gateway
            .apply_decision(self.chat.id, self.applicant.id, decision)
            .await
        {
            tracing::error!(error = %e, "failed to apply manual decision");
        }
        if action == AdminAction::Ban {
            if let Err(e) = gateway.ban_member(self.chat.id, self.applicant.id).await {
                tracing::error!(error = %e, "failed to ban applicant");
            }
        }

        let (status_key, private_key) = match action {
            AdminAction::Approve => ("jr_status_admin_approved", "jr_private_approved"),
            AdminAction::Reject => ("jr_status_admin_rejected", "jr_private_rejected"),
            AdminAction::Ban => ("jr_status_admin_banned", "jr_private_rejected"),
        };
        // Set before the override is raised so the task can deliver it.
        *lock(&self.manual_outcome) = Some(private_key);
        self.override_tx.send_replace(true);
        self.close_ballot().await;

        self.edit_card(self.applicant_text(status_key, Some(actor)))
            .await;
        self.deliver_manual_outcome(true).await;
        self.edit_log(outcome.log_status(), None, Some(actor)).await;
        self.set_phase(Phase::Terminal);

        self.ack(AckKind::Done, "done")
    }

    /// A member pressed Yes or No on a per-voter ballot.
    pub async fn handle_vote(&self, voter: &User, choice: VoteChoice) -> Ack {
        let Some(ballot) = self.ballot.get() else {
            return self.ack(AckKind::Expired, "expired");
        };

        match self.services.ledger.get_waiting(&self.id).await {
            Ok(Some(true)) => {}
            Ok(_) => return self.ack(AckKind::Expired, "expired"),
            Err(e) => {
                tracing::error!(error = %e, "failed to read request state");
                return self.ack(AckKind::Unavailable, "unavailable");
            }
        }

        match self.services.gateway.get_member(self.chat.id, voter.id).await {
            Ok(status) if status.is_member() => {}
            Ok(_) => return self.ack(AckKind::PermissionDenied, "insufficient_permissions").alert(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to check voter membership");
                return self.ack(AckKind::Unavailable, "unavailable");
            }
        }

        match ballot.tally.cast(voter.id, choice, &voter.full_name()).await {
            Ok(counts) => {
                self.services.metrics.votes_cast.inc();
                tracing::debug!(voter = %voter.id, choice = choice.as_str(), yes = counts.yes, no = counts.no, "vote recorded");
                self.ack(AckKind::Recorded, "jr_vote_recorded")
            }
            Err(TallyError::AlreadyVoted) => {
                self.ack(AckKind::AlreadyVoted, "jr_already_voted").alert()
            }
            // Closed, or a sealed poll that takes its votes on the platform.
            Err(TallyError::Closed | TallyError::WrongMode | TallyError::NotVoted) => {
                self.ack(AckKind::Expired, "expired")
            }
        }
    }

    /// Someone pressed Status on the request card.
    pub async fn handle_status_query(&self, caller: &User) -> Ack {
        match self.services.gateway.get_member(self.chat.id, caller.id).await {
            Ok(status) if status.is_member() => {}
            Ok(_) => return self.ack(AckKind::PermissionDenied, "insufficient_permissions").alert(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to check caller membership");
                return self.ack(AckKind::Unavailable, "unavailable");
            }
        }

        match self.services.ledger.get_waiting(&self.id).await {
            Ok(Some(true)) => {
                let remaining = match *lock(&self.deadline) {
                    Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                    None => Duration::from_secs(u64::from(self.policy.vote_time)),
                };
                let text = self.services.texts.resolve(
                    &self.policy.language,
                    "jr_vote_open",
                    &[("remaining", format_duration(remaining.as_secs()).as_str())],
                );
                Ack::new(AckKind::Info, text).alert()
            }
            Ok(_) => self.ack(AckKind::Expired, "jr_vote_over").alert(),
            Err(e) => {
                tracing::error!(error = %e, "failed to read request state");
                self.ack(AckKind::Unavailable, "unavailable")
            }
        }
    }

    /// A voter opened the live-results deep link.
    pub async fn handle_live_result_request(&self, caller: &User) -> Ack {
        match self.services.ledger.get_waiting(&self.id).await {
            Ok(Some(true)) => {}
            Ok(_) => return self.ack(AckKind::Expired, "expired"),
            Err(e) => {
                tracing::error!(error = %e, "failed to read request state");
                return self.ack(AckKind::Unavailable, "unavailable");
            }
        }

        match self.services.gateway.get_member(self.chat.id, caller.id).await {
            Ok(status) if status.is_member() => {}
            Ok(_) => return self.ack(AckKind::PermissionDenied, "insufficient_permissions"),
            Err(e) => {
                tracing::warn!(error = %e, "failed to check caller membership");
                return self.ack(AckKind::Unavailable, "unavailable");
            }
        }

        let Some(ballot) = self.ballot.get() else {
            return self.ack(AckKind::Expired, "expired");
        };
        match ballot.tally.live_results(caller.id).await {
            Ok(live) => Ack::new(
                AckKind::Info,
                render::live_results_text(&self.services.texts, &self.policy.language, &live),
            ),
            Err(TallyError::NotVoted) => self.ack(AckKind::NotVoted, "jr_not_voted"),
            Err(TallyError::WrongMode) => self.ack(AckKind::InvalidInput, "invalid_input"),
            Err(TallyError::Closed | TallyError::AlreadyVoted) => {
                self.ack(AckKind::Expired, "expired")
            }
        }
    }
}
