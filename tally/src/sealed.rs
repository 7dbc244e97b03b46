//! Sealed ballots backed by a platform poll.

use std::sync::Arc;

use joinvote_gateway::{Gateway, PollHandle};
use joinvote_types::VoteCounts;
use tokio::sync::Mutex;

pub struct SealedTally {
    gateway: Arc<dyn Gateway>,
    poll: PollHandle,
    final_counts: Mutex<Option<VoteCounts>>,
}

impl SealedTally {
    pub fn new(gateway: Arc<dyn Gateway>, poll: PollHandle) -> Self {
        Self {
            gateway,
            poll,
            final_counts: Mutex::new(None),
        }
    }

    /// Stop the poll and read its counts.
    ///
    /// If stopping fails the last known snapshot is used instead. The first
    /// result is kept, so the poll is stopped at most once.
    pub async fn finalize(&self) -> VoteCounts {
        let mut final_counts = self.final_counts.lock().await;
        if let Some(counts) = *final_counts {
            return counts;
        }
        let counts = match self.gateway.stop_poll(self.poll.message).await {
            Ok(counts) => counts,
            Err(e) => {
                tracing::warn!(
                    poll = %self.poll.poll_id,
                    error = %e,
                    "failed to stop poll, using last snapshot"
                );
                self.poll.snapshot
            }
        };
        *final_counts = Some(counts);
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use joinvote_gateway::PollRequest;
    use joinvote_nullables::{GatewayOp, NullGateway};
    use joinvote_types::ChatId;

    async fn open(gateway: &Arc<NullGateway>) -> PollHandle {
        gateway
            .send_poll(&PollRequest {
                chat: ChatId(-1),
                question: "?".into(),
                yes_option: "yes".into(),
                no_option: "no".into(),
                anonymous: true,
                reply_to: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn finalize_stops_poll_once() {
        let gateway = Arc::new(NullGateway::new());
        let poll = open(&gateway).await;
        gateway.set_poll_counts(poll.message, VoteCounts::new(4, 1));
        let tally = SealedTally::new(gateway.clone(), poll);

        assert_eq!(tally.finalize().await, VoteCounts::new(4, 1));
        assert_eq!(tally.finalize().await, VoteCounts::new(4, 1));
        let stops = gateway
            .calls()
            .into_iter()
            .filter(|c| matches!(c, joinvote_nullables::GatewayCall::StopPoll(_)))
            .count();
        assert_eq!(stops, 1);
    }

    #[tokio::test]
    async fn failed_stop_falls_back_to_snapshot() {
        let gateway = Arc::new(NullGateway::new());
        let mut poll = open(&gateway).await;
        poll.snapshot = VoteCounts::new(1, 1);
        gateway.fail(GatewayOp::StopPoll);
        let tally = SealedTally::new(gateway, poll);

        assert_eq!(tally.finalize().await, VoteCounts::new(1, 1));
    }
}
