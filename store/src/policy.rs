//! Group policy storage trait.

use crate::StoreError;
use async_trait::async_trait;
use joinvote_types::{ChatId, GroupPolicy};

/// Storage of per-group voting policies.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// The group's policy, creating it from `default` if the group has none.
    async fn get_or_create(
        &self,
        group_id: ChatId,
        default: &GroupPolicy,
    ) -> Result<GroupPolicy, StoreError>;

    /// Replace the group's policy.
    async fn put(&self, group_id: ChatId, policy: &GroupPolicy) -> Result<(), StoreError>;
}
