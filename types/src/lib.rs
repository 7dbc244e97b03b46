//! Fundamental types for the join-request voting bot.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! chat/user/request identifiers, timestamps, group policy, the durable
//! join-request record, vote and decision enums, and the typed interaction
//! protocol carried in callback buttons and deep links.

pub mod action;
pub mod error;
pub mod id;
pub mod policy;
pub mod record;
pub mod time;
pub mod vote;

pub use action::{CallbackAction, DeepLink};
pub use error::DecodeError;
pub use id::{ChatId, RequestId, UserId};
pub use policy::GroupPolicy;
pub use record::{JoinRequestRecord, Resolution};
pub use time::Timestamp;
pub use vote::{AdminAction, Decision, Outcome, VoteChoice, VoteCounts};
