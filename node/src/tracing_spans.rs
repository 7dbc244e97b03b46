//! Pre-built [`tracing::Span`] constructors.
//!
//! Consistent span names and fields make one join request's lines easy to
//! pick out of the log stream.

use joinvote_types::{ChatId, RequestId, UserId};
use tracing::{info_span, Span};

/// Span covering one vote session's background task.
pub fn session_span(id: &RequestId, group: ChatId, user: UserId) -> Span {
    info_span!("vote_session", request = %id, group = %group, user = %user)
}

/// Span covering one button press or deep-link request aimed at a session.
pub fn interaction_span(kind: &str, id: &RequestId) -> Span {
    info_span!("interaction", kind = %kind, request = %id)
}

/// Span covering the routing of one inbound event.
pub fn event_span(kind: &str) -> Span {
    info_span!("inbound_event", kind = %kind)
}
