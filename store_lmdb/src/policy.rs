//! LMDB implementation of [`PolicyStore`].

use std::sync::Arc;

use async_trait::async_trait;
use heed::types::Bytes;
use heed::{Database, Env};
use joinvote_store::{PolicyStore, StoreError};
use joinvote_types::{ChatId, GroupPolicy};

use crate::{blocking, LmdbError};

#[derive(Clone)]
pub struct LmdbPolicyStore {
    pub(crate) env: Arc<Env>,
    pub(crate) policies_db: Database<Bytes, Bytes>,
}

impl LmdbPolicyStore {
    fn get_or_create_inner(
        &self,
        group_id: ChatId,
        default: &GroupPolicy,
    ) -> Result<GroupPolicy, LmdbError> {
        let key = group_id.as_i64().to_be_bytes();
        let mut wtxn = self.env.write_txn()?;
        if let Some(bytes) = self.policies_db.get(&wtxn, &key)? {
            return Ok(bincode::deserialize(bytes)?);
        }
        let policy = default.clone().normalized();
        self.policies_db
            .put(&mut wtxn, &key, &bincode::serialize(&policy)?)?;
        wtxn.commit()?;
        tracing::info!(group = %group_id, "created default group policy");
        Ok(policy)
    }

    fn put_inner(&self, group_id: ChatId, policy: &GroupPolicy) -> Result<(), LmdbError> {
        let bytes = bincode::serialize(policy)?;
        let mut wtxn = self.env.write_txn()?;
        self.policies_db
            .put(&mut wtxn, &group_id.as_i64().to_be_bytes(), &bytes)?;
        wtxn.commit()?;
        Ok(())
    }
}

#[async_trait]
impl PolicyStore for LmdbPolicyStore {
    async fn get_or_create(
        &self,
        group_id: ChatId,
        default: &GroupPolicy,
    ) -> Result<GroupPolicy, StoreError> {
        let store = self.clone();
        let default = default.clone();
        Ok(blocking(move || store.get_or_create_inner(group_id, &default)).await?)
    }

    async fn put(&self, group_id: ChatId, policy: &GroupPolicy) -> Result<(), StoreError> {
        let store = self.clone();
        let policy = policy.clone();
        Ok(blocking(move || store.put_inner(group_id, &policy)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;

    #[tokio::test]
    async fn get_or_create_persists_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
        let store = env.policy_store();

        let created = store
            .get_or_create(ChatId(-1), &GroupPolicy::default())
            .await
            .unwrap();
        assert_eq!(created, GroupPolicy::default());

        let custom = GroupPolicy {
            vote_time: 60,
            advanced_vote: true,
            ..Default::default()
        };
        store.put(ChatId(-1), &custom).await.unwrap();

        // The stored policy wins over the default passed in.
        let fetched = store
            .get_or_create(ChatId(-1), &GroupPolicy::default())
            .await
            .unwrap();
        assert_eq!(fetched, custom);
    }

    #[tokio::test]
    async fn out_of_range_defaults_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
        let default = GroupPolicy {
            vote_time: 1,
            ..Default::default()
        };
        let policy = env
            .policy_store()
            .get_or_create(ChatId(-5), &default)
            .await
            .unwrap();
        assert!(policy.is_valid());
    }
}
