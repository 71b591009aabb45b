//! Session store keyed by id with get / put / compare-and-swap semantics.
//! Compare-and-swap on a version number turns "one writer per session" into
//! a checked contract.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::SearchSession;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("session {0} already exists")]
    AlreadyExists(Uuid),

    #[error("session {0} not found")]
    NotFound(Uuid),

    #[error("session {id} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict { id: Uuid, expected: u64, actual: u64 },
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Option<SearchSession>;

    /// Inserts a new session. Fails if the id is taken.
    async fn put(&self, session: SearchSession) -> Result<(), StoreError>;

    /// Replaces the session only if its stored version is still `expected_version`.
    /// Returns the stored value with its new version.
    async fn compare_and_swap(
        &self,
        id: Uuid,
        expected_version: u64,
        next: SearchSession,
    ) -> Result<SearchSession, StoreError>;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, SearchSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: Uuid) -> Option<SearchSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    async fn put(&self, session: SearchSession) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(StoreError::AlreadyExists(session.id));
        }
        sessions.insert(session.id, session);
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        id: Uuid,
        expected_version: u64,
        mut next: SearchSession,
    ) -> Result<SearchSession, StoreError> {
        let mut sessions = self.sessions.write().await;
        let current = sessions.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if current.version != expected_version {
            return Err(StoreError::Conflict {
                id,
                expected: expected_version,
                actual: current.version,
            });
        }
        next.id = id;
        next.version = expected_version + 1;
        *current = next.clone();
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::criteria::SearchCriteria;
    use crate::session::SessionStatus;

    fn session() -> SearchSession {
        SearchSession::new(Uuid::new_v4(), SearchCriteria::default())
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let store = InMemorySessionStore::new();
        let s = session();
        store.put(s.clone()).await.unwrap();
        let loaded = store.get(s.id).await.unwrap();
        assert_eq!(loaded.id, s.id);
        assert_eq!(loaded.version, 0);
    }

    #[tokio::test]
    async fn test_put_rejects_existing_id() {
        let store = InMemorySessionStore::new();
        let s = session();
        store.put(s.clone()).await.unwrap();
        assert_eq!(store.put(s.clone()).await, Err(StoreError::AlreadyExists(s.id)));
    }

    #[tokio::test]
    async fn test_cas_bumps_version() {
        let store = InMemorySessionStore::new();
        let s = session();
        store.put(s.clone()).await.unwrap();

        let mut next = s.clone();
        next.transition(SessionStatus::Running).unwrap();
        let stored = store.compare_and_swap(s.id, 0, next).await.unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(store.get(s.id).await.unwrap().status, SessionStatus::Running);
    }

    #[tokio::test]
    async fn test_stale_writer_is_rejected() {
        let store = InMemorySessionStore::new();
        let s = session();
        store.put(s.clone()).await.unwrap();
        store.compare_and_swap(s.id, 0, s.clone()).await.unwrap();

        let err = store.compare_and_swap(s.id, 0, s.clone()).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Conflict {
                id: s.id,
                expected: 0,
                actual: 1
            }
        );
    }

    #[tokio::test]
    async fn test_cas_on_unknown_session() {
        let store = InMemorySessionStore::new();
        let s = session();
        assert_eq!(
            store.compare_and_swap(s.id, 0, s.clone()).await.unwrap_err(),
            StoreError::NotFound(s.id)
        );
    }
}
