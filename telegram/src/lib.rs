//! Telegram Bot API adapter.
//!
//! [`TelegramClient`] implements the [`Gateway`](joinvote_gateway::Gateway)
//! port over HTTPS, and [`UpdatePoller`] long-polls `getUpdates` and feeds
//! the resulting [`InboundEvent`](joinvote_gateway::InboundEvent)s into a
//! channel.

pub mod client;
pub mod poller;
pub mod wire;

pub use client::TelegramClient;
pub use poller::UpdatePoller;
