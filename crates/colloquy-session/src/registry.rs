use async_trait::async_trait;
use chrono::{DateTime, Utc};
use colloquy_core::TranscriptRef;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

/// What the registry knows about an active session.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    /// Where the transcript lives on disk.
    pub transcript: TranscriptRef,
    /// When the session was created or resumed.
    pub started_at: DateTime<Utc>,
}

impl SessionEntry {
    /// Creates an entry starting now.
    pub fn new(transcript: TranscriptRef) -> Self {
        Self {
            transcript,
            started_at: Utc::now(),
        }
    }
}

/// Process-lifetime mapping from session token to transcript reference.
///
/// Entries are bound on start/signup/login and released on completion. The
/// registry is never persisted: a restart invalidates all active sessions,
/// recoverable only through the password-based resume path, which re-derives
/// the mapping from the stored transcript instead.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Registers a session.
    async fn bind(&self, id: Uuid, entry: SessionEntry);
    /// Looks up a session.
    async fn resolve(&self, id: Uuid) -> Option<SessionEntry>;
    /// Drops a session. Unknown ids are ignored.
    async fn release(&self, id: Uuid);
    /// Number of active sessions.
    async fn len(&self) -> usize;
    /// True when no sessions are active.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// The default registry: a mutex-guarded map.
#[derive(Default)]
pub struct InMemorySessionRegistry {
    map: Mutex<HashMap<Uuid, SessionEntry>>,
}

impl InMemorySessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn bind(&self, id: Uuid, entry: SessionEntry) {
        self.map.lock().insert(id, entry);
    }

    async fn resolve(&self, id: Uuid) -> Option<SessionEntry> {
        self.map.lock().get(&id).cloned()
    }

    async fn release(&self, id: Uuid) {
        self.map.lock().remove(&id);
    }

    async fn len(&self) -> usize {
        self.map.lock().len()
    }
}

/// Keyed set of per-session mutexes.
///
/// Every read-modify-write cycle on a transcript runs under its session's
/// lock, so overlapping requests for one session are serialized server-side
/// instead of relying on the front end disabling input.
#[derive(Default)]
pub struct SessionLocks {
    inner: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLocks {
    /// Creates an empty lock set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for a session, creating it on first use. The guard
    /// is held across await points for the duration of the mutation.
    pub async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock();
            Arc::clone(map.entry(id).or_default())
        };
        lock.lock_owned().await
    }

    /// Forgets a session's lock once the session is released.
    pub fn discard(&self, id: Uuid) {
        self.inner.lock().remove(&id);
    }
}
