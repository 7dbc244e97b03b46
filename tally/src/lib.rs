//! Vote tallies for join-request ballots.
//!
//! Two strategies share one interface:
//! - [`SealedTally`] delegates counting to a platform poll. Voting happens out
//!   of band, so `cast` is refused; `finalize` stops the poll.
//! - [`PerVoterTally`] records each voter by identity, one vote per voter,
//!   linearized under a per-ballot lock.
//!
//! [`decide`] turns final counts into an [`Outcome`](joinvote_types::Outcome).

pub mod decide;
pub mod error;
pub mod per_voter;
pub mod sealed;

pub use decide::decide;
pub use error::TallyError;
pub use per_voter::{LiveResults, PerVoterTally, Roster};
pub use sealed::SealedTally;

use joinvote_types::{UserId, VoteChoice, VoteCounts};

/// Which strategy a ballot uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteMode {
    Sealed,
    PerVoter,
}

/// A ballot's tally, whichever strategy backs it.
pub enum Tally {
    Sealed(SealedTally),
    PerVoter(PerVoterTally),
}

impl Tally {
    pub fn mode(&self) -> VoteMode {
        match self {
            Tally::Sealed(_) => VoteMode::Sealed,
            Tally::PerVoter(_) => VoteMode::PerVoter,
        }
    }

    /// Record a vote. Sealed ballots take votes on the platform, not here.
    pub async fn cast(
        &self,
        voter: UserId,
        choice: VoteChoice,
        display_name: &str,
    ) -> Result<VoteCounts, TallyError> {
        match self {
            Tally::Sealed(_) => Err(TallyError::WrongMode),
            Tally::PerVoter(t) => t.cast(voter, choice, display_name).await,
        }
    }

    /// Counts collected so far. Sealed polls expose none until closed.
    pub async fn counts_so_far(&self) -> Option<VoteCounts> {
        match self {
            Tally::Sealed(_) => None,
            Tally::PerVoter(t) => Some(t.snapshot().await),
        }
    }

    /// Live counts for a voter who has voted. Sealed polls show their own.
    pub async fn live_results(&self, voter: UserId) -> Result<LiveResults, TallyError> {
        match self {
            Tally::Sealed(_) => Err(TallyError::WrongMode),
            Tally::PerVoter(t) => t.live_results(voter).await,
        }
    }

    /// Close the ballot and return its final counts. Repeated calls return
    /// the same counts.
    pub async fn finalize(&self) -> VoteCounts {
        match self {
            Tally::Sealed(t) => t.finalize().await,
            Tally::PerVoter(t) => t.finalize().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use joinvote_gateway::{Gateway, PollRequest};
    use joinvote_nullables::NullGateway;
    use joinvote_types::ChatId;

    async fn sealed() -> Tally {
        let gateway = Arc::new(NullGateway::new());
        let poll = gateway
            .send_poll(&PollRequest {
                chat: ChatId(-1),
                question: "?".into(),
                yes_option: "yes".into(),
                no_option: "no".into(),
                anonymous: true,
                reply_to: None,
            })
            .await
            .unwrap();
        Tally::Sealed(SealedTally::new(gateway, poll))
    }

    #[tokio::test]
    async fn sealed_ballot_takes_no_votes_here() {
        let tally = sealed().await;
        assert_eq!(
            tally.cast(UserId(1), VoteChoice::Yes, "a").await,
            Err(TallyError::WrongMode)
        );
        assert_eq!(tally.counts_so_far().await, None);
        assert_eq!(
            tally.live_results(UserId(1)).await,
            Err(TallyError::WrongMode)
        );
    }

    #[tokio::test]
    async fn per_voter_ballot_reports_running_counts() {
        let tally = Tally::PerVoter(PerVoterTally::new(true));
        tally.cast(UserId(1), VoteChoice::No, "a").await.unwrap();
        assert_eq!(tally.counts_so_far().await, Some(VoteCounts::new(0, 1)));
        assert_eq!(tally.finalize().await, VoteCounts::new(0, 1));
        assert_eq!(
            tally.cast(UserId(2), VoteChoice::Yes, "b").await,
            Err(TallyError::Closed)
        );
    }
}
