//! Long-polling loop over `getUpdates`.

use std::sync::Arc;
use std::time::Duration;

use joinvote_gateway::InboundEvent;
use tokio::sync::{broadcast, mpsc};

use crate::TelegramClient;

/// First delay after a failed poll; doubled per consecutive failure.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Longest delay between failed polls.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

pub struct UpdatePoller {
    client: Arc<TelegramClient>,
    timeout_secs: u64,
    offset: i64,
    skip_pending: bool,
}

impl UpdatePoller {
    pub fn new(client: Arc<TelegramClient>, timeout_secs: u64) -> Self {
        Self {
            client,
            timeout_secs,
            offset: 0,
            skip_pending: true,
        }
    }

    /// Whether updates queued while the bot was offline are dropped at start.
    pub fn skip_pending(mut self, skip: bool) -> Self {
        self.skip_pending = skip;
        self
    }

    /// Poll until shutdown or until the receiving side goes away.
    pub async fn run(
        mut self,
        events: mpsc::Sender<InboundEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        if self.skip_pending {
            self.drop_backlog().await;
        }
        tracing::info!(offset = self.offset, "update poller started");

        let mut backoff = INITIAL_BACKOFF;
        loop {
            let polled = tokio::select! {
                _ = shutdown.recv() => break,
                polled = self.client.get_updates(self.offset, self.timeout_secs) => polled,
            };

            match polled {
                Ok(updates) => {
                    backoff = INITIAL_BACKOFF;
                    for update in updates {
                        self.offset = next_offset(self.offset, update.update_id);
                        let update_id = update.update_id;
                        let Some(event) = update.into_event() else {
                            tracing::trace!(update_id, "ignoring update");
                            continue;
                        };
                        if events.send(event).await.is_err() {
                            tracing::info!("event channel closed, stopping update poller");
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, retry_in = ?backoff, "getUpdates failed");
                    tokio::select! {
                        _ = shutdown.recv() => break,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
        tracing::info!("update poller stopped");
    }

    /// Advance the offset past whatever is already queued.
    async fn drop_backlog(&mut self) {
        match self.client.get_updates(-1, 0).await {
            Ok(updates) => {
                if let Some(last) = updates.last() {
                    self.offset = next_offset(self.offset, last.update_id);
                    tracing::info!(skipped_through = last.update_id, "skipped pending updates");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to skip pending updates"),
        }
    }
}

/// Offsets only move forward.
fn next_offset(current: i64, update_id: i64) -> i64 {
    current.max(update_id + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_never_moves_backwards() {
        assert_eq!(next_offset(0, 10), 11);
        assert_eq!(next_offset(11, 5), 11);
    }

    #[tokio::test]
    async fn stops_on_shutdown() {
        // Unroutable address: every poll fails and the loop sits in back-off.
        let client = Arc::new(TelegramClient::new("t", "http://127.0.0.1:9"));
        let poller = UpdatePoller::new(client, 0).skip_pending(false);
        let (tx, _rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(poller.run(tx, shutdown_rx));
        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(30), handle)
            .await
            .expect("poller did not stop")
            .unwrap();
    }
}
