//! Shared utilities for the join-request voting bot.

pub mod html;
pub mod time;

pub use html::{escape_html, user_link};
pub use time::{format_duration, vote_minutes};
