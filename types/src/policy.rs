//! Per-group voting policy.
//!
//! A session reads the policy once at creation and keeps that snapshot for
//! its whole lifetime; later edits only affect new join requests.

use serde::{Deserialize, Serialize};

/// Shortest allowed voting window, in seconds.
pub const MIN_VOTE_TIME_SECS: u32 = 30;

/// Longest allowed voting window, in seconds.
pub const MAX_VOTE_TIME_SECS: u32 = 3600;

/// Voting policy of one group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPolicy {
    /// Whether join requests are put to a vote at all.
    #[serde(default = "default_true")]
    pub vote_to_join: bool,

    /// Length of the voting window in seconds (30..=3600).
    #[serde(default = "default_vote_time")]
    pub vote_time: u32,

    /// Minimum number of votes for the ballot to count.
    #[serde(default = "default_mini_voters")]
    pub mini_voters: u32,

    /// Whether voter identities are hidden.
    #[serde(default = "default_true")]
    pub anonymous_vote: bool,

    /// Use per-voter buttons instead of a native poll.
    #[serde(default)]
    pub advanced_vote: bool,

    /// Pin the ballot message.
    #[serde(default)]
    pub pin_msg: bool,

    /// Delete the service message the platform posts after the bot pins.
    #[serde(default)]
    pub clean_pinned_message: bool,

    /// Language code for every text this group sees.
    #[serde(default = "default_language")]
    pub language: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_vote_time() -> u32 {
    600
}

fn default_mini_voters() -> u32 {
    3
}

fn default_language() -> String {
    "zh_CN".to_string()
}

impl GroupPolicy {
    /// Clamp out-of-range values into their allowed ranges.
    pub fn normalized(mut self) -> Self {
        self.vote_time = self.vote_time.clamp(MIN_VOTE_TIME_SECS, MAX_VOTE_TIME_SECS);
        self.mini_voters = self.mini_voters.max(1);
        self
    }

    /// Whether every field is within its allowed range.
    pub fn is_valid(&self) -> bool {
        (MIN_VOTE_TIME_SECS..=MAX_VOTE_TIME_SECS).contains(&self.vote_time)
            && self.mini_voters >= 1
    }
}

impl Default for GroupPolicy {
    fn default() -> Self {
        Self {
            vote_to_join: default_true(),
            vote_time: default_vote_time(),
            mini_voters: default_mini_voters(),
            anonymous_vote: default_true(),
            advanced_vote: false,
            pin_msg: false,
            clean_pinned_message: false,
            language: default_language(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let policy = GroupPolicy::default();
        assert!(policy.is_valid());
        assert_eq!(policy.vote_time, 600);
        assert_eq!(policy.mini_voters, 3);
        assert!(policy.anonymous_vote);
    }

    #[test]
    fn normalized_clamps_vote_time_and_voters() {
        let policy = GroupPolicy {
            vote_time: 5,
            mini_voters: 0,
            ..Default::default()
        }
        .normalized();
        assert_eq!(policy.vote_time, MIN_VOTE_TIME_SECS);
        assert_eq!(policy.mini_voters, 1);

        let policy = GroupPolicy {
            vote_time: 100_000,
            ..Default::default()
        }
        .normalized();
        assert_eq!(policy.vote_time, MAX_VOTE_TIME_SECS);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let policy: GroupPolicy = toml::from_str("vote_time = 60\nadvanced_vote = true").unwrap();
        assert_eq!(policy.vote_time, 60);
        assert!(policy.advanced_vote);
        assert_eq!(policy.mini_voters, 3);
        assert_eq!(policy.language, "zh_CN");
    }
}
