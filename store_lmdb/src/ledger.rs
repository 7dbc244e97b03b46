//! LMDB implementation of the join-request [`Ledger`].
//!
//! Records live in `join_requests`, keyed by the 16 raw bytes of the request
//! id. The `waiting_index` database maps `group ‖ user` (big-endian i64s) to
//! the id of that pair's open request; an entry exists exactly while the
//! record is waiting. Both databases are written in one transaction, and LMDB
//! serializes writers, so the waiting check-and-set is atomic.

use std::sync::Arc;

use async_trait::async_trait;
use heed::types::Bytes;
use heed::{Database, Env};
use joinvote_store::{Ledger, StoreError};
use joinvote_types::{ChatId, JoinRequestRecord, RequestId, Resolution, UserId};

use crate::{blocking, LmdbError};

#[derive(Clone)]
pub struct LmdbLedger {
    pub(crate) env: Arc<Env>,
    pub(crate) join_requests_db: Database<Bytes, Bytes>,
    pub(crate) waiting_index_db: Database<Bytes, Bytes>,
}

fn waiting_key(group_id: ChatId, user_id: UserId) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&group_id.as_i64().to_be_bytes());
    key[8..].copy_from_slice(&user_id.as_i64().to_be_bytes());
    key
}

impl LmdbLedger {
    fn create_inner(&self, record: &JoinRequestRecord) -> Result<(), LmdbError> {
        let id_key = record.id.as_bytes();
        let pair_key = waiting_key(record.group_id, record.user_id);

        let mut wtxn = self.env.write_txn()?;
        if self.join_requests_db.get(&wtxn, id_key)?.is_some() {
            return Err(LmdbError::Duplicate(record.id.to_string()));
        }
        if record.waiting && self.waiting_index_db.get(&wtxn, &pair_key)?.is_some() {
            return Err(LmdbError::Duplicate(format!(
                "waiting request for user {} in group {}",
                record.user_id, record.group_id
            )));
        }

        let bytes = bincode::serialize(record)?;
        self.join_requests_db.put(&mut wtxn, id_key, &bytes)?;
        if record.waiting {
            self.waiting_index_db.put(&mut wtxn, &pair_key, id_key)?;
        }
        wtxn.commit()?;
        Ok(())
    }

    fn conditional_update_inner(
        &self,
        id: &RequestId,
        resolution: &Resolution,
    ) -> Result<bool, LmdbError> {
        let mut wtxn = self.env.write_txn()?;
        let mut record: JoinRequestRecord = match self.join_requests_db.get(&wtxn, id.as_bytes())? {
            Some(bytes) => bincode::deserialize(bytes)?,
            None => return Err(LmdbError::NotFound(id.to_string())),
        };

        if !record.resolve(resolution) {
            // Already resolved; dropping the txn aborts it.
            return Ok(false);
        }

        let bytes = bincode::serialize(&record)?;
        self.join_requests_db.put(&mut wtxn, id.as_bytes(), &bytes)?;
        self.waiting_index_db
            .delete(&mut wtxn, &waiting_key(record.group_id, record.user_id))?;
        wtxn.commit()?;
        Ok(true)
    }

    fn get_inner(&self, id: &RequestId) -> Result<Option<JoinRequestRecord>, LmdbError> {
        let rtxn = self.env.read_txn()?;
        match self.join_requests_db.get(&rtxn, id.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    fn has_waiting_inner(&self, group_id: ChatId, user_id: UserId) -> Result<bool, LmdbError> {
        let rtxn = self.env.read_txn()?;
        Ok(self
            .waiting_index_db
            .get(&rtxn, &waiting_key(group_id, user_id))?
            .is_some())
    }
}

#[async_trait]
impl Ledger for LmdbLedger {
    async fn create(&self, record: &JoinRequestRecord) -> Result<(), StoreError> {
        let ledger = self.clone();
        let owned = record.clone();
        blocking(move || ledger.create_inner(&owned)).await?;
        tracing::debug!(request_id = %record.id, group = %record.group_id, user = %record.user_id, "join request recorded");
        Ok(())
    }

    async fn conditional_update(
        &self,
        id: &RequestId,
        resolution: &Resolution,
    ) -> Result<bool, StoreError> {
        let ledger = self.clone();
        let (id, resolution) = (*id, *resolution);
        let applied = blocking(move || ledger.conditional_update_inner(&id, &resolution)).await?;
        tracing::debug!(request_id = %id, applied, result = resolution.result, "conditional update");
        Ok(applied)
    }

    async fn get_waiting(&self, id: &RequestId) -> Result<Option<bool>, StoreError> {
        Ok(self.get(id).await?.map(|r| r.waiting))
    }

    async fn has_waiting(&self, group_id: ChatId, user_id: UserId) -> Result<bool, StoreError> {
        let ledger = self.clone();
        Ok(blocking(move || ledger.has_waiting_inner(group_id, user_id)).await?)
    }

    async fn get(&self, id: &RequestId) -> Result<Option<JoinRequestRecord>, StoreError> {
        let ledger = self.clone();
        let id = *id;
        Ok(blocking(move || ledger.get_inner(&id)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;
    use joinvote_types::Timestamp;

    fn open() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
        (dir, env)
    }

    fn record(group: i64, user: i64) -> JoinRequestRecord {
        JoinRequestRecord::new(RequestId::new(), ChatId(group), UserId(user), Timestamp::new(1000))
    }

    fn approve(yes: u32, no: u32) -> Resolution {
        Resolution {
            result: true,
            admin: None,
            yes_votes: Some(yes),
            no_votes: Some(no),
        }
    }

    #[tokio::test]
    async fn create_then_get() {
        let (_dir, env) = open();
        let ledger = env.ledger();
        let r = record(-100, 1);
        ledger.create(&r).await.unwrap();

        assert_eq!(ledger.get(&r.id).await.unwrap(), Some(r.clone()));
        assert_eq!(ledger.get_waiting(&r.id).await.unwrap(), Some(true));
        assert!(ledger.has_waiting(ChatId(-100), UserId(1)).await.unwrap());
        assert!(!ledger.has_waiting(ChatId(-100), UserId(2)).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_waiting_pair_is_rejected() {
        let (_dir, env) = open();
        let ledger = env.ledger();
        ledger.create(&record(-100, 1)).await.unwrap();

        let err = ledger.create(&record(-100, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        // Another group is fine.
        ledger.create(&record(-200, 1)).await.unwrap();
    }

    #[tokio::test]
    async fn conditional_update_applies_once() {
        let (_dir, env) = open();
        let ledger = env.ledger();
        let r = record(-100, 1);
        ledger.create(&r).await.unwrap();

        assert!(ledger.conditional_update(&r.id, &approve(2, 0)).await.unwrap());
        let reject = Resolution {
            result: false,
            admin: Some(UserId(9)),
            yes_votes: None,
            no_votes: None,
        };
        assert!(!ledger.conditional_update(&r.id, &reject).await.unwrap());

        let stored = ledger.get(&r.id).await.unwrap().unwrap();
        assert!(!stored.waiting);
        assert_eq!(stored.result, Some(true));
        assert_eq!(stored.admin, None);
        assert_eq!(stored.yes_votes, Some(2));
        assert_eq!(stored.no_votes, Some(0));
    }

    #[tokio::test]
    async fn resolving_frees_the_pair_for_a_new_request() {
        let (_dir, env) = open();
        let ledger = env.ledger();
        let first = record(-100, 1);
        ledger.create(&first).await.unwrap();
        ledger.conditional_update(&first.id, &approve(0, 0)).await.unwrap();

        assert!(!ledger.has_waiting(ChatId(-100), UserId(1)).await.unwrap());
        let second = record(-100, 1);
        ledger.create(&second).await.unwrap();
        // The resolved record is kept as history.
        assert_eq!(ledger.get_waiting(&first.id).await.unwrap(), Some(false));
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let (_dir, env) = open();
        let ledger = env.ledger();
        let err = ledger
            .conditional_update(&RequestId::new(), &approve(0, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(ledger.get_waiting(&RequestId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let r = record(-100, 1);
        {
            let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
            env.ledger().create(&r).await.unwrap();
        }
        let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
        assert_eq!(env.ledger().get(&r.id).await.unwrap(), Some(r));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_updates_resolve_once() {
        let (_dir, env) = open();
        let ledger = env.ledger();
        let r = record(-100, 1);
        ledger.create(&r).await.unwrap();

        let mut handles = Vec::new();
        for admin in 0..16 {
            let ledger = ledger.clone();
            let id = r.id;
            handles.push(tokio::spawn(async move {
                let resolution = Resolution {
                    result: admin % 2 == 0,
                    admin: Some(UserId(admin)),
                    yes_votes: None,
                    no_votes: None,
                };
                ledger.conditional_update(&id, &resolution).await.unwrap()
            }));
        }
        let mut applied = 0;
        for h in handles {
            if h.await.unwrap() {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
        assert!(!ledger.has_waiting(ChatId(-100), UserId(1)).await.unwrap());
    }
}
