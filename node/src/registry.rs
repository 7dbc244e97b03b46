//! Session registry: live vote sessions by request id.
//!
//! Every operation takes one registry-wide lock, does O(1) map work and
//! releases it; nothing awaits while the lock is held. A session's task
//! removes its own entry through a drop guard, so the entry goes away
//! whether the task returned, failed or was aborted.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use joinvote_types::RequestId;
use prometheus::IntGauge;
use thiserror::Error;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::Instrument;

use crate::session::{SessionEnd, VoteSession};
use crate::tracing_spans::session_span;
use crate::NodeError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("session {0} is already registered")]
    AlreadyRegistered(RequestId),
}

struct Entry {
    session: Arc<VoteSession>,
    /// `None` only between insertion and spawn.
    task: Option<AbortHandle>,
    generation: u64,
}

#[derive(Default)]
struct Entries {
    map: HashMap<RequestId, Entry>,
    next_generation: u64,
}

pub struct SessionRegistry {
    entries: Mutex<Entries>,
    active: Option<IntGauge>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            active: None,
        }
    }

    /// Keep `gauge` equal to the number of registered sessions.
    pub fn with_gauge(mut self, gauge: IntGauge) -> Self {
        self.active = Some(gauge);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_gauge(&self, entries: &Entries) {
        if let Some(gauge) = &self.active {
            gauge.set(entries.map.len() as i64);
        }
    }

    fn insert_locked(
        &self,
        entries: &mut Entries,
        id: RequestId,
        session: Arc<VoteSession>,
        task: Option<AbortHandle>,
    ) -> u64 {
        let generation = entries.next_generation;
        entries.next_generation += 1;
        entries.map.insert(
            id,
            Entry {
                session,
                task,
                generation,
            },
        );
        self.update_gauge(entries);
        generation
    }

    /// Register a session whose task is already running.
    ///
    /// Returns the entry's generation. The caller is responsible for calling
    /// [`unregister`](Self::unregister) when the task ends; prefer
    /// [`spawn`](Self::spawn), which does that itself.
    pub fn register(
        &self,
        id: RequestId,
        session: Arc<VoteSession>,
        task: AbortHandle,
    ) -> Result<u64, RegistryError> {
        let mut entries = self.lock();
        if entries.map.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        Ok(self.insert_locked(&mut entries, id, session, Some(task)))
    }

    /// Register `session` and start its task.
    pub fn spawn(
        self: &Arc<Self>,
        session: Arc<VoteSession>,
    ) -> Result<JoinHandle<()>, RegistryError> {
        let task = Arc::clone(&session).run();
        self.spawn_with(session, task)
    }

    /// Like [`spawn`](Self::spawn), but drive the session with `task`.
    pub fn spawn_with<F>(
        self: &Arc<Self>,
        session: Arc<VoteSession>,
        task: F,
    ) -> Result<JoinHandle<()>, RegistryError>
    where
        F: Future<Output = Result<SessionEnd, NodeError>> + Send + 'static,
    {
        let id = session.id();
        let span = session_span(&id, session.chat().id, session.applicant().id);

        // Insert first, attach the abort handle after spawning. The guard may
        // run at any point in between and still finds (or misses) the right
        // generation; the lock is never held across the spawn.
        let generation = {
            let mut entries = self.lock();
            if entries.map.contains_key(&id) {
                return Err(RegistryError::AlreadyRegistered(id));
            }
            self.insert_locked(&mut entries, id, session, None)
        };
        let guard = CompletionGuard {
            registry: Arc::clone(self),
            id,
            generation,
        };
        let handle = tokio::spawn(
            async move {
                let _guard = guard;
                match task.await {
                    Ok(end) => tracing::debug!(?end, "session finished"),
                    Err(e) => tracing::error!(error = %e, "session failed"),
                }
            }
            .instrument(span),
        );
        if let Some(entry) = self
            .lock()
            .map
            .get_mut(&id)
            .filter(|e| e.generation == generation)
        {
            entry.task = Some(handle.abort_handle());
        }
        Ok(handle)
    }

    pub fn lookup(&self, id: &RequestId) -> Option<Arc<VoteSession>> {
        self.lock().map.get(id).map(|e| Arc::clone(&e.session))
    }

    /// Remove `id` if present. Idempotent.
    pub fn unregister(&self, id: &RequestId) -> Option<Arc<VoteSession>> {
        let mut entries = self.lock();
        let removed = entries.map.remove(id).map(|e| e.session);
        self.update_gauge(&entries);
        removed
    }

    /// Remove `id` only if it is still the registration made at `generation`.
    fn unregister_generation(&self, id: &RequestId, generation: u64) {
        let mut entries = self.lock();
        if entries.map.get(id).is_some_and(|e| e.generation == generation) {
            entries.map.remove(id);
            self.update_gauge(&entries);
        }
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.lock().map.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().map.is_empty()
    }

    /// Abort every registered task. Entries are removed by the tasks'
    /// completion guards as they are dropped.
    pub fn abort_all(&self) -> usize {
        let handles: Vec<AbortHandle> = self
            .lock()
            .map
            .values()
            .filter_map(|e| e.task.clone())
            .collect();
        for handle in &handles {
            handle.abort();
        }
        if !handles.is_empty() {
            tracing::info!(count = handles.len(), "aborted live sessions");
        }
        handles.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Unregisters its session when the task's future is dropped.
struct CompletionGuard {
    registry: Arc<SessionRegistry>,
    id: RequestId,
    generation: u64,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.registry.unregister_generation(&self.id, self.generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{fixture, group, user};
    use crate::session::VoteSession;
    use joinvote_types::GroupPolicy;

    fn session() -> Arc<VoteSession> {
        Arc::new(VoteSession::new(
            fixture().services,
            group(),
            user(7),
            GroupPolicy::default(),
        ))
    }

    #[tokio::test]
    async fn register_rejects_duplicate_ids() {
        let registry = SessionRegistry::new();
        let s = session();
        let task = tokio::spawn(std::future::pending::<()>());
        registry
            .register(s.id(), Arc::clone(&s), task.abort_handle())
            .unwrap();
        assert_eq!(
            registry.register(s.id(), Arc::clone(&s), task.abort_handle()),
            Err(RegistryError::AlreadyRegistered(s.id()))
        );
        assert!(registry.lookup(&s.id()).is_some());
        task.abort();
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let registry = SessionRegistry::new();
        let s = session();
        let task = tokio::spawn(std::future::pending::<()>());
        registry
            .register(s.id(), Arc::clone(&s), task.abort_handle())
            .unwrap();
        assert!(registry.unregister(&s.id()).is_some());
        assert!(registry.unregister(&s.id()).is_none());
        assert!(registry.is_empty());
        task.abort();
    }

    #[tokio::test]
    async fn finished_task_removes_only_its_own_entry() {
        let registry = Arc::new(SessionRegistry::new());
        let done = session();
        let other = session();

        let pending = registry
            .spawn_with(Arc::clone(&other), std::future::pending())
            .unwrap();
        let handle = registry
            .spawn_with(Arc::clone(&done), async { Ok(SessionEnd::Superseded) })
            .unwrap();
        handle.await.unwrap();

        assert!(registry.lookup(&done.id()).is_none());
        assert!(registry.lookup(&other.id()).is_some());
        pending.abort();
    }

    #[tokio::test]
    async fn failed_task_is_unregistered() {
        let registry = Arc::new(SessionRegistry::new());
        let s = session();
        let handle = registry
            .spawn_with(Arc::clone(&s), async {
                Err(NodeError::Other("boom".to_string()))
            })
            .unwrap();
        handle.await.unwrap();
        assert!(!registry.contains(&s.id()));
    }

    #[tokio::test]
    async fn aborted_task_is_unregistered() {
        let registry = Arc::new(SessionRegistry::new());
        let s = session();
        let handle = registry
            .spawn_with(Arc::clone(&s), std::future::pending())
            .unwrap();
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.abort_all(), 1);
        assert!(handle.await.unwrap_err().is_cancelled());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn stale_guard_keeps_newer_registration() {
        let registry = Arc::new(SessionRegistry::new());
        let s = session();
        let first = registry
            .spawn_with(Arc::clone(&s), std::future::pending())
            .unwrap();
        // Replace the entry behind the running task's back.
        registry.unregister(&s.id());
        let task = tokio::spawn(std::future::pending::<()>());
        registry
            .register(s.id(), Arc::clone(&s), task.abort_handle())
            .unwrap();

        first.abort();
        let _ = first.await;
        assert!(registry.contains(&s.id()));
        task.abort();
    }

    #[tokio::test]
    async fn gauge_tracks_registrations() {
        let gauge = IntGauge::new("test_active", "test").unwrap();
        let registry = Arc::new(SessionRegistry::new().with_gauge(gauge.clone()));
        let s = session();
        let handle = registry
            .spawn_with(Arc::clone(&s), std::future::pending())
            .unwrap();
        assert_eq!(gauge.get(), 1);
        registry.abort_all();
        let _ = handle.await;
        assert_eq!(gauge.get(), 0);
    }
}
