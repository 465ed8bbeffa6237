//! Session registry: the set of live WebSocket connections.
//!
//! Each connection gets a generated `SessionId` and a `SessionHandle`
//! holding its outbound channel and per-session click count. The registry
//! is the sole owner of per-session state; removal discards it.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

use super::ConnectionSender;

/// Identifier assigned to a connection for its lifetime. Ids come from a
/// monotonic counter and are never reused; a reconnect gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Invariant violation: the allocated id was already registered.
    #[error("session {0} is already registered")]
    DuplicateSession(SessionId),
}

/// Per-session state owned by the registry while the connection is live.
#[derive(Debug)]
pub struct SessionHandle {
    sender: ConnectionSender,
    clicks: AtomicU64,
}

impl SessionHandle {
    fn new(sender: ConnectionSender) -> Self {
        Self {
            sender,
            clicks: AtomicU64::new(0),
        }
    }

    /// Bump this session's own click count and return the new value.
    fn record_click(&self) -> u64 {
        self.clicks.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Live-session registry. Shared behind `Arc` so the axum state, the
/// per-connection actors, and the broadcast path all see the same map.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, SessionHandle>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id and register the session with a zero click count.
    /// `DuplicateSession` means the allocator invariant broke; it fails only
    /// this connection attempt.
    pub fn add(&self, sender: ConnectionSender) -> Result<SessionId, RegistryError> {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        match self.sessions.entry(id) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateSession(id)),
            Entry::Vacant(entry) => {
                entry.insert(SessionHandle::new(sender));
                Ok(id)
            }
        }
    }

    /// Remove a session if present, discarding its state. Idempotent:
    /// disconnect cleanup and failed-send eviction may race on the same id.
    pub fn remove(&self, id: SessionId) {
        self.sessions.remove(&id);
    }

    /// Point-in-time list of (id, sender) pairs for fan-out. Sessions added
    /// or removed while the caller iterates the result are not reflected.
    pub fn snapshot(&self) -> Vec<(SessionId, ConnectionSender)> {
        self.sessions
            .iter()
            .map(|entry| (*entry.key(), entry.value().sender.clone()))
            .collect()
    }

    /// Bump the click count of a registered session; `None` if it is gone.
    pub fn record_click(&self, id: SessionId) -> Option<u64> {
        self.sessions.get(&id).map(|handle| handle.record_click())
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Shared handle to the registry.
pub type SharedRegistry = Arc<SessionRegistry>;

/// Create a new empty session registry.
pub fn new_session_registry() -> SharedRegistry {
    Arc::new(SessionRegistry::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn dummy_sender() -> ConnectionSender {
        let (tx, _rx) = mpsc::unbounded_channel();
        tx
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let registry = SessionRegistry::new();
        let a = registry.add(dummy_sender()).unwrap();
        let b = registry.add(dummy_sender()).unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = SessionRegistry::new();
        let id = registry.add(dummy_sender()).unwrap();
        registry.remove(id);
        assert!(registry.is_empty());
        // A second remove of the same id is a no-op, not an error.
        registry.remove(id);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_excludes_removed_sessions() {
        let registry = SessionRegistry::new();
        let a = registry.add(dummy_sender()).unwrap();
        let b = registry.add(dummy_sender()).unwrap();
        registry.remove(a);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].0, b);
    }

    #[test]
    fn test_record_click_counts_per_session() {
        let registry = SessionRegistry::new();
        let a = registry.add(dummy_sender()).unwrap();
        let b = registry.add(dummy_sender()).unwrap();

        assert_eq!(registry.record_click(a), Some(1));
        assert_eq!(registry.record_click(a), Some(2));
        assert_eq!(registry.record_click(b), Some(1));
    }

    #[test]
    fn test_record_click_for_removed_session() {
        let registry = SessionRegistry::new();
        let id = registry.add(dummy_sender()).unwrap();
        registry.remove(id);
        assert_eq!(registry.record_click(id), None);
    }
}
