//! Nullable stores: thread-safe in-memory ledger and policy storage.

use async_trait::async_trait;
use joinvote_store::{Ledger, PolicyStore, StoreError};
use joinvote_types::{ChatId, GroupPolicy, JoinRequestRecord, RequestId, Resolution, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// An in-memory join-request ledger.
///
/// The whole check-and-set of [`Ledger::conditional_update`] runs under one
/// lock, so it is atomic like the LMDB implementation.
pub struct NullLedger {
    records: Mutex<HashMap<RequestId, JoinRequestRecord>>,
    applied_updates: AtomicUsize,
    fail_create: AtomicBool,
    fail_update: AtomicBool,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            applied_updates: AtomicUsize::new(0),
            fail_create: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `create` fail with a backend error.
    pub fn fail_creates(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `conditional_update` fail with a backend error.
    pub fn fail_updates(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }

    /// Number of conditional updates that actually flipped a record.
    pub fn applied_updates(&self) -> usize {
        self.applied_updates.load(Ordering::SeqCst)
    }

    /// Snapshot of one record.
    pub fn record(&self, id: &RequestId) -> Option<JoinRequestRecord> {
        self.records.lock().unwrap().get(id).cloned()
    }

    /// Snapshot of every record.
    pub fn records(&self) -> Vec<JoinRequestRecord> {
        self.records.lock().unwrap().values().cloned().collect()
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for NullLedger {
    async fn create(&self, record: &JoinRequestRecord) -> Result<(), StoreError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected create failure".into()));
        }
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.id) {
            return Err(StoreError::Duplicate(record.id.to_string()));
        }
        let pair_waiting = records
            .values()
            .any(|r| r.waiting && r.group_id == record.group_id && r.user_id == record.user_id);
        if record.waiting && pair_waiting {
            return Err(StoreError::Duplicate(format!(
                "waiting request for user {} in group {}",
                record.user_id, record.group_id
            )));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn conditional_update(
        &self,
        id: &RequestId,
        resolution: &Resolution,
    ) -> Result<bool, StoreError> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected update failure".into()));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let applied = record.resolve(resolution);
        if applied {
            self.applied_updates.fetch_add(1, Ordering::SeqCst);
        }
        Ok(applied)
    }

    async fn get_waiting(&self, id: &RequestId) -> Result<Option<bool>, StoreError> {
        Ok(self.records.lock().unwrap().get(id).map(|r| r.waiting))
    }

    async fn has_waiting(&self, group_id: ChatId, user_id: UserId) -> Result<bool, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .any(|r| r.waiting && r.group_id == group_id && r.user_id == user_id))
    }

    async fn get(&self, id: &RequestId) -> Result<Option<JoinRequestRecord>, StoreError> {
        Ok(self.records.lock().unwrap().get(id).cloned())
    }
}

/// An in-memory group policy store.
pub struct NullPolicyStore {
    policies: Mutex<HashMap<ChatId, GroupPolicy>>,
}

impl NullPolicyStore {
    pub fn new() -> Self {
        Self {
            policies: Mutex::new(HashMap::new()),
        }
    }

    /// Seed a group's policy.
    pub fn with_policy(self, group_id: ChatId, policy: GroupPolicy) -> Self {
        self.policies.lock().unwrap().insert(group_id, policy);
        self
    }

    /// Replace a group's policy directly (simulates an admin edit).
    pub fn set(&self, group_id: ChatId, policy: GroupPolicy) {
        self.policies.lock().unwrap().insert(group_id, policy);
    }
}

impl Default for NullPolicyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PolicyStore for NullPolicyStore {
    async fn get_or_create(
        &self,
        group_id: ChatId,
        default: &GroupPolicy,
    ) -> Result<GroupPolicy, StoreError> {
        Ok(self
            .policies
            .lock()
            .unwrap()
            .entry(group_id)
            .or_insert_with(|| default.clone().normalized())
            .clone())
    }

    async fn put(&self, group_id: ChatId, policy: &GroupPolicy) -> Result<(), StoreError> {
        self.policies
            .lock()
            .unwrap()
            .insert(group_id, policy.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use joinvote_types::Timestamp;

    fn record(user: i64) -> JoinRequestRecord {
        JoinRequestRecord::new(RequestId::new(), ChatId(-1), UserId(user), Timestamp::new(0))
    }

    #[tokio::test]
    async fn ledger_rejects_second_waiting_record_for_pair() {
        let ledger = NullLedger::new();
        ledger.create(&record(1)).await.unwrap();
        assert!(matches!(
            ledger.create(&record(1)).await,
            Err(StoreError::Duplicate(_))
        ));
        assert!(ledger.has_waiting(ChatId(-1), UserId(1)).await.unwrap());
    }

    #[tokio::test]
    async fn ledger_counts_only_applied_updates() {
        let ledger = NullLedger::new();
        let r = record(1);
        ledger.create(&r).await.unwrap();
        let resolution = Resolution {
            result: false,
            admin: None,
            yes_votes: Some(0),
            no_votes: Some(0),
        };
        assert!(ledger.conditional_update(&r.id, &resolution).await.unwrap());
        assert!(!ledger.conditional_update(&r.id, &resolution).await.unwrap());
        assert_eq!(ledger.applied_updates(), 1);
        assert_eq!(ledger.get_waiting(&r.id).await.unwrap(), Some(false));
    }

    #[tokio::test]
    async fn injected_failures_surface_as_backend_errors() {
        let ledger = NullLedger::new();
        ledger.fail_creates(true);
        assert!(matches!(
            ledger.create(&record(1)).await,
            Err(StoreError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn policy_store_keeps_seeded_policy() {
        let seeded = GroupPolicy {
            vote_time: 60,
            ..Default::default()
        };
        let store = NullPolicyStore::new().with_policy(ChatId(-1), seeded.clone());
        let got = store
            .get_or_create(ChatId(-1), &GroupPolicy::default())
            .await
            .unwrap();
        assert_eq!(got, seeded);
        let fresh = store
            .get_or_create(ChatId(-2), &GroupPolicy::default())
            .await
            .unwrap();
        assert_eq!(fresh, GroupPolicy::default());
    }
}
