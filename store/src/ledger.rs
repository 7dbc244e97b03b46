//! Join-request ledger trait.

use crate::StoreError;
use async_trait::async_trait;
use joinvote_types::{ChatId, JoinRequestRecord, RequestId, Resolution, UserId};

/// Durable, append-mostly store of join requests and their outcomes.
///
/// The `waiting` flag of a record is the single source of truth for whether a
/// request is still open. Implementations must make
/// [`conditional_update`](Ledger::conditional_update) atomic per record: of
/// any number of concurrent calls for the same id, at most one returns `true`.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Persist a new waiting record.
    ///
    /// Fails with [`StoreError::Duplicate`] if the id exists, or if the same
    /// (group, user) pair already has a waiting record.
    async fn create(&self, record: &JoinRequestRecord) -> Result<(), StoreError>;

    /// Resolve a record if, and only if, it is still waiting.
    ///
    /// Returns `Ok(true)` when this call flipped `waiting` to `false`,
    /// `Ok(false)` when the record was already resolved, and
    /// [`StoreError::NotFound`] when there is no such record.
    async fn conditional_update(
        &self,
        id: &RequestId,
        resolution: &Resolution,
    ) -> Result<bool, StoreError>;

    /// The `waiting` flag of a record, or `None` if it does not exist.
    async fn get_waiting(&self, id: &RequestId) -> Result<Option<bool>, StoreError>;

    /// Whether the (group, user) pair has a waiting record.
    async fn has_waiting(&self, group_id: ChatId, user_id: UserId) -> Result<bool, StoreError>;

    /// Fetch a full record.
    async fn get(&self, id: &RequestId) -> Result<Option<JoinRequestRecord>, StoreError>;
}
