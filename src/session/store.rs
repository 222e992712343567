//! Session store: one isolated conversation per opaque key.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::OrderReceipt;
use crate::dialogue::ConversationState;

/// A conversation and its bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub state: ConversationState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set once the finished order was accepted by the catalog service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<OrderReceipt>,
}

impl Session {
    fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            state: ConversationState::new(),
            created_at: now,
            updated_at: now,
            receipt: None,
        }
    }

    /// Whether the last turn was at least `idle_timeout` before `now`.
    fn is_idle(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        now.signed_duration_since(self.updated_at)
            .to_std()
            .is_ok_and(|age| age >= idle_timeout)
    }
}

/// In-memory map of sessions. Each session sits behind its own mutex so a
/// turn holds exclusive access to one conversation without blocking others.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh session and return its key.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(Session::new(id))));
        info!(session_id = %id, "Session created");
        id
    }

    /// Shared handle for driving a turn.
    pub async fn handle(&self, id: Uuid) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Point-in-time copy of a session.
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        let handle = self.handle(id).await?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    /// Drop a session. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "Session removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Remove every session whose conversation has ended or that has seen no
    /// turn for `idle_timeout`. Sessions busy with a turn are left for the
    /// next sweep.
    pub async fn prune_stale(&self, idle_timeout: Duration) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => !session.state.ended && !session.is_idle(now, idle_timeout),
            Err(_) => true,
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!(pruned, "Pruned stale sessions");
        }
        pruned
    }
}

/// Spawn a background task that sweeps ended and idle sessions every `every`.
pub fn spawn_prune_task(
    store: Arc<SessionStore>,
    every: Duration,
    idle_timeout: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await; // first tick fires immediately
        loop {
            interval.tick().await;
            store.prune_stale(idle_timeout).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn create_and_get() {
        let store = SessionStore::new();
        assert!(store.is_empty().await);

        let id = store.create().await;
        assert_eq!(store.len().await, 1);

        let session = store.get(id).await.unwrap();
        assert_eq!(session.id, id);
        assert_eq!(session.state, ConversationState::new());
        assert!(session.receipt.is_none());
    }

    #[tokio::test]
    async fn unknown_session_is_none() {
        let store = SessionStore::new();
        assert!(store.get(Uuid::new_v4()).await.is_none());
        assert!(store.handle(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn remove_session() {
        let store = SessionStore::new();
        let id = store.create().await;

        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn prune_only_ended() {
        let store = SessionStore::new();
        let open = store.create().await;
        let done = store.create().await;

        store.handle(done).await.unwrap().lock().await.state.ended = true;

        assert_eq!(store.prune_stale(IDLE).await, 1);
        assert!(store.get(open).await.is_some());
        assert!(store.get(done).await.is_none());
    }

    #[tokio::test]
    async fn sessions_do_not_share_state() {
        let store = SessionStore::new();
        let a = store.create().await;
        let b = store.create().await;

        store.handle(a).await.unwrap().lock().await.state.active_order = true;

        assert!(store.get(a).await.unwrap().state.active_order);
        assert!(!store.get(b).await.unwrap().state.active_order);
    }

    #[tokio::test]
    async fn prune_drops_idle_sessions() {
        let store = SessionStore::new();
        let fresh = store.create().await;
        let abandoned = store.create().await;

        store.handle(abandoned).await.unwrap().lock().await.updated_at =
            Utc::now() - chrono::Duration::days(1);

        assert_eq!(store.prune_stale(IDLE).await, 1);
        assert!(store.get(fresh).await.is_some());
        assert!(store.get(abandoned).await.is_none());
    }

    #[tokio::test]
    async fn prune_keeps_busy_sessions() {
        let store = SessionStore::new();
        let id = store.create().await;
        let handle = store.handle(id).await.unwrap();
        let mut session = handle.lock().await;
        session.state.ended = true;

        assert_eq!(store.prune_stale(IDLE).await, 0);
        drop(session);
        assert_eq!(store.prune_stale(IDLE).await, 1);
    }

    #[tokio::test]
    async fn prune_task_sweeps_ended_sessions() {
        let store = Arc::new(SessionStore::new());
        let id = store.create().await;
        store.handle(id).await.unwrap().lock().await.state.ended = true;

        let handle = spawn_prune_task(Arc::clone(&store), Duration::from_millis(10), IDLE);
        tokio::time::timeout(Duration::from_secs(5), async {
            while !store.is_empty().await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        handle.abort();
    }
}
