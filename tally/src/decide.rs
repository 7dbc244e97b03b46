//! The decision rule.

use joinvote_types::{Outcome, VoteCounts};

/// Final outcome of a timed-out ballot.
///
/// Below quorum (`yes + no < mini_voters`) the request is denied for lack of
/// voters whatever the split. Otherwise a strict yes majority approves and a
/// tie rejects.
pub fn decide(counts: VoteCounts, mini_voters: u32) -> Outcome {
    if counts.total() < mini_voters {
        return Outcome::InsufficientVoters;
    }
    if counts.yes > counts.no {
        Outcome::Approved
    } else {
        Outcome::Rejected {
            tie: counts.yes == counts.no,
        }
    }
}
