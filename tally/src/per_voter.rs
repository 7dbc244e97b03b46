//! Per-voter ballots tracked by the bot.

use std::collections::HashSet;

use joinvote_types::{UserId, VoteChoice, VoteCounts};
use tokio::sync::Mutex;

use crate::TallyError;

/// Voter names on each side, in the order they voted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    pub yes: Vec<String>,
    pub no: Vec<String>,
}

/// What a voter sees when asking for live results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveResults {
    pub counts: VoteCounts,
    /// `None` on anonymous ballots.
    pub roster: Option<Roster>,
}

#[derive(Default)]
struct Ballots {
    voters: HashSet<UserId>,
    yes: Vec<(UserId, String)>,
    no: Vec<(UserId, String)>,
    closed: bool,
}

impl Ballots {
    fn counts(&self) -> VoteCounts {
        VoteCounts::new(self.yes.len() as u32, self.no.len() as u32)
    }

    fn roster(&self) -> Roster {
        Roster {
            yes: self.yes.iter().map(|(_, n)| n.clone()).collect(),
            no: self.no.iter().map(|(_, n)| n.clone()).collect(),
        }
    }
}

/// One vote per identity, no changing sides.
///
/// Every operation takes the same lock, so casts are linearized with each
/// other and with `finalize`; nothing is accepted once the ballot is closed.
pub struct PerVoterTally {
    ballots: Mutex<Ballots>,
    anonymous: bool,
}

impl PerVoterTally {
    pub fn new(anonymous: bool) -> Self {
        Self {
            ballots: Mutex::new(Ballots::default()),
            anonymous,
        }
    }

    /// Record `voter`'s choice. Returns the counts after the vote.
    pub async fn cast(
        &self,
        voter: UserId,
        choice: VoteChoice,
        display_name: &str,
    ) -> Result<VoteCounts, TallyError> {
        let mut ballots = self.ballots.lock().await;
        if ballots.closed {
            return Err(TallyError::Closed);
        }
        if !ballots.voters.insert(voter) {
            return Err(TallyError::AlreadyVoted);
        }
        let entry = (voter, display_name.to_string());
        match choice {
            VoteChoice::Yes => ballots.yes.push(entry),
            VoteChoice::No => ballots.no.push(entry),
        }
        Ok(ballots.counts())
    }

    pub async fn snapshot(&self) -> VoteCounts {
        self.ballots.lock().await.counts()
    }

    /// Live counts for a voter who has voted, with names unless anonymous.
    pub async fn live_results(&self, voter: UserId) -> Result<LiveResults, TallyError> {
        let ballots = self.ballots.lock().await;
        if !ballots.voters.contains(&voter) {
            return Err(TallyError::NotVoted);
        }
        Ok(LiveResults {
            counts: ballots.counts(),
            roster: (!self.anonymous).then(|| ballots.roster()),
        })
    }

    /// Close the ballot and return the final counts.
    pub async fn finalize(&self) -> VoteCounts {
        let mut ballots = self.ballots.lock().await;
        ballots.closed = true;
        ballots.counts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn second_vote_is_refused() {
        let tally = PerVoterTally::new(true);
        tally.cast(UserId(1), VoteChoice::Yes, "a").await.unwrap();
        assert_eq!(
            tally.cast(UserId(1), VoteChoice::No, "a").await,
            Err(TallyError::AlreadyVoted)
        );
        assert_eq!(tally.snapshot().await, VoteCounts::new(1, 0));
    }

    #[tokio::test]
    async fn no_votes_after_finalize() {
        let tally = PerVoterTally::new(true);
        tally.cast(UserId(1), VoteChoice::No, "a").await.unwrap();
        assert_eq!(tally.finalize().await, VoteCounts::new(0, 1));
        assert_eq!(
            tally.cast(UserId(2), VoteChoice::Yes, "b").await,
            Err(TallyError::Closed)
        );
        assert_eq!(tally.finalize().await, VoteCounts::new(0, 1));
    }

    #[tokio::test]
    async fn live_results_require_a_vote() {
        let tally = PerVoterTally::new(false);
        assert_eq!(
            tally.live_results(UserId(1)).await,
            Err(TallyError::NotVoted)
        );
        tally.cast(UserId(1), VoteChoice::Yes, "Ann").await.unwrap();
        tally.cast(UserId(2), VoteChoice::No, "Bob").await.unwrap();
        let live = tally.live_results(UserId(1)).await.unwrap();
        assert_eq!(live.counts, VoteCounts::new(1, 1));
        assert_eq!(
            live.roster,
            Some(Roster {
                yes: vec!["Ann".into()],
                no: vec!["Bob".into()],
            })
        );
    }

    #[tokio::test]
    async fn anonymous_ballot_hides_names() {
        let tally = PerVoterTally::new(true);
        tally.cast(UserId(1), VoteChoice::Yes, "Ann").await.unwrap();
        assert_eq!(tally.live_results(UserId(1)).await.unwrap().roster, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_casts_are_all_counted_once() {
        let tally = Arc::new(PerVoterTally::new(true));
        let mut handles = Vec::new();
        for voter in 0..50i64 {
            for _ in 0..2 {
                let tally = Arc::clone(&tally);
                handles.push(tokio::spawn(async move {
                    let choice = if voter % 2 == 0 { VoteChoice::Yes } else { VoteChoice::No };
                    tally.cast(UserId(voter), choice, "v").await
                }));
            }
        }
        let mut accepted = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 50);
        assert_eq!(tally.snapshot().await, VoteCounts::new(25, 25));
    }
}
