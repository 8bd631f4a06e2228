//! Session storage behind a trait, with an in-memory implementation.

use crate::models::Session;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    NotFound(String),
}

/// Keyed session storage.
///
/// Reads return snapshots; writes replace the stored session wholesale.
/// Callers that read-modify-write hold [`SessionStore::lock`] for the key
/// across the whole sequence.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert `session`, replacing any session stored under the same key.
    async fn create(&self, session: Session);

    async fn get(&self, session_id: &str) -> Option<Session>;

    /// Replace an existing session.
    async fn update(&self, session: Session) -> Result<(), StoreError>;

    async fn delete(&self, session_id: &str) -> Result<(), StoreError>;

    /// Exclusive access to one session key until the guard is dropped.
    async fn lock(&self, session_id: &str) -> KeyGuard;
}

type LockMap = DashMap<String, Arc<Mutex<()>>>;

/// Per-key async mutexes.
///
/// An entry exists only while its key is held or awaited; the last guard to
/// release a key removes it, so unknown keys leave nothing behind.
#[derive(Default)]
pub struct KeyedLocks {
    locks: Arc<LockMap>,
}

impl KeyedLocks {
    pub async fn acquire(&self, key: &str) -> KeyGuard {
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        KeyGuard {
            guard: Some(mutex.lock_owned().await),
            key: key.to_string(),
            locks: self.locks.clone(),
        }
    }

    /// Keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Held lock on one key.
pub struct KeyGuard {
    guard: Option<OwnedMutexGuard<()>>,
    key: String,
    locks: Arc<LockMap>,
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        // Unlock first: afterwards the map's own handle is the only one left
        // unless another task is waiting on this key.
        drop(self.guard.take());
        self.locks
            .remove_if(self.key.as_str(), |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

/// Process-local store. Sessions live until deleted or the process exits.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Session>,
    locks: KeyedLocks,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Keys currently locked or awaited.
    pub fn lock_entries(&self) -> usize {
        self.locks.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: Session) {
        self.sessions.insert(session.session_id.clone(), session);
    }

    async fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.get(session_id).map(|entry| entry.value().clone())
    }

    async fn update(&self, session: Session) -> Result<(), StoreError> {
        match self.sessions.get_mut(&session.session_id) {
            Some(mut entry) => {
                *entry = session;
                Ok(())
            }
            None => Err(StoreError::NotFound(session.session_id)),
        }
    }

    async fn delete(&self, session_id: &str) -> Result<(), StoreError> {
        self.sessions
            .remove(session_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(session_id.to_string()))
    }

    async fn lock(&self, session_id: &str) -> KeyGuard {
        self.locks.acquire(session_id).await
    }
}
