//! Votes, admin actions and the decisions they lead to.

use serde::{Deserialize, Serialize};

/// A ballot choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteChoice {
    Yes,
    No,
}

impl VoteChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            _ => None,
        }
    }
}

/// A manual override invoked by an admin from the request card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdminAction {
    Approve,
    Reject,
    Ban,
}

impl AdminAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Ban => "ban",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            "ban" => Some(Self::Ban),
            _ => None,
        }
    }

    /// The admission decision this action applies.
    pub fn decision(&self) -> Decision {
        match self {
            Self::Approve => Decision::Approve,
            Self::Reject | Self::Ban => Decision::Decline,
        }
    }
}

/// What is applied to the pending join request on the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Approve,
    Decline,
}

impl Decision {
    pub fn is_approve(&self) -> bool {
        matches!(self, Self::Approve)
    }
}

/// Final yes/no counts of a ballot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounts {
    pub yes: u32,
    pub no: u32,
}

impl VoteCounts {
    pub fn new(yes: u32, no: u32) -> Self {
        Self { yes, no }
    }

    pub fn total(&self) -> u32 {
        self.yes.saturating_add(self.no)
    }
}

/// Terminal outcome of a vote session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// More yes than no votes, quorum met.
    Approved,
    /// No votes won, or the vote tied (`tie = true`).
    Rejected { tie: bool },
    /// Fewer votes than the group's minimum voter count.
    InsufficientVoters,
    /// The ballot could not be opened at all.
    Aborted,
}

impl Outcome {
    pub fn decision(&self) -> Decision {
        match self {
            Self::Approved => Decision::Approve,
            Self::Rejected { .. } | Self::InsufficientVoters | Self::Aborted => Decision::Decline,
        }
    }

    /// Short status used in the moderation log.
    pub fn log_status(&self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            _ => "Denied",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ban_and_reject_both_decline() {
        assert_eq!(AdminAction::Ban.decision(), Decision::Decline);
        assert_eq!(AdminAction::Reject.decision(), Decision::Decline);
        assert_eq!(AdminAction::Approve.decision(), Decision::Approve);
    }

    #[test]
    fn only_approved_outcome_approves() {
        assert!(Outcome::Approved.decision().is_approve());
        assert!(!Outcome::Rejected { tie: true }.decision().is_approve());
        assert!(!Outcome::InsufficientVoters.decision().is_approve());
        assert!(!Outcome::Aborted.decision().is_approve());
    }

    #[test]
    fn choice_and_action_parse_their_own_names() {
        for choice in [VoteChoice::Yes, VoteChoice::No] {
            assert_eq!(VoteChoice::parse(choice.as_str()), Some(choice));
        }
        for action in [AdminAction::Approve, AdminAction::Reject, AdminAction::Ban] {
            assert_eq!(AdminAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(AdminAction::parse("kick"), None);
    }
}
