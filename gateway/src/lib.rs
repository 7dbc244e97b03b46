//! Messaging gateway port.
//!
//! The voting engine talks to the chat platform only through the [`Gateway`]
//! trait and receives platform events as [`InboundEvent`]s. Adapters (the
//! Bot API client, the recording test double) live in other crates.

pub mod error;
pub mod event;
pub mod keyboard;
pub mod member;
pub mod message;
pub mod port;

pub use error::GatewayError;
pub use event::{Chat, InboundEvent, User};
pub use keyboard::{ButtonAction, InlineButton, InlineKeyboard};
pub use member::MemberStatus;
pub use message::{BotIdentity, MessageRef, OutgoingMessage, PollHandle, PollRequest};
pub use port::Gateway;
