use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use storefront_llm::Message;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::session::ChatSession;

/// Keyed storage for live chat sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Append to the user's transcript, creating the session on first use.
    /// Returns a snapshot taken after the append.
    async fn append(&self, user_id: &str, message: Message) -> ChatSession;

    async fn get(&self, user_id: &str) -> Option<ChatSession>;

    async fn remove(&self, user_id: &str) -> Option<ChatSession>;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop expired sessions, returning how many were removed
    async fn purge_expired(&self) -> usize;
}

#[derive(Debug, Clone)]
struct SessionEntry {
    session: ChatSession,
    expires_at: Instant,
}

impl SessionEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Capacity-bounded LRU session store with an idle TTL.
///
/// Each append refreshes the session's expiry. Expired sessions are dropped
/// on access and by [`SessionStore::purge_expired`].
#[derive(Clone)]
pub struct LruSessionStore {
    sessions: Arc<RwLock<LruCache<String, SessionEntry>>>,
    ttl: Duration,
}

impl LruSessionStore {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(n) => n,
        None => unreachable!(),
    };

    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            sessions: Arc::new(RwLock::new(LruCache::new(capacity))),
            ttl,
        }
    }

    /// Periodically purge expired sessions until the store is dropped
    pub fn spawn_cleanup(&self, every: Duration) -> JoinHandle<()> {
        let sessions = Arc::downgrade(&self.sessions);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let Some(sessions) = sessions.upgrade() else {
                    break;
                };
                let removed = Self::purge(&sessions).await;
                if removed > 0 {
                    tracing::debug!(removed, "Purged expired chat sessions");
                }
            }
        })
    }

    async fn purge(sessions: &RwLock<LruCache<String, SessionEntry>>) -> usize {
        let mut guard = sessions.write().await;
        let expired: Vec<String> = guard
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            guard.pop(key);
        }
        expired.len()
    }
}

#[async_trait]
impl SessionStore for LruSessionStore {
    async fn append(&self, user_id: &str, message: Message) -> ChatSession {
        let mut guard = self.sessions.write().await;

        let mut session = match guard.pop(user_id) {
            Some(entry) if !entry.is_expired() => entry.session,
            _ => ChatSession::new(user_id),
        };
        session.push(message);

        let entry = SessionEntry {
            session: session.clone(),
            expires_at: Instant::now() + self.ttl,
        };
        if let Some((evicted, _)) = guard.push(user_id.to_string(), entry) {
            if evicted != user_id {
                tracing::debug!(user_id = %evicted, "Evicted least recently used chat session");
            }
        }
        session
    }

    async fn get(&self, user_id: &str) -> Option<ChatSession> {
        let mut guard = self.sessions.write().await;
        let expired = guard.get(user_id)?.is_expired();
        if expired {
            guard.pop(user_id);
            return None;
        }
        guard.peek(user_id).map(|entry| entry.session.clone())
    }

    async fn remove(&self, user_id: &str) -> Option<ChatSession> {
        self.sessions.write().await.pop(user_id).map(|entry| entry.session)
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn purge_expired(&self) -> usize {
        Self::purge(&self.sessions).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_creates_and_extends() {
        let store = LruSessionStore::new(10, Duration::from_secs(60));
        store.append("u1", Message::human("hi")).await;
        let session = store.append("u1", Message::ai("hello")).await;

        assert_eq!(session.transcript.len(), 2);
        assert_eq!(session.thread_token, "user_u1");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recent() {
        let store = LruSessionStore::new(2, Duration::from_secs(60));
        store.append("a", Message::human("1")).await;
        store.append("b", Message::human("2")).await;
        store.append("a", Message::human("3")).await;
        store.append("c", Message::human("4")).await;

        assert!(store.get("b").await.is_none());
        assert_eq!(store.get("a").await.unwrap().transcript.len(), 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_expired_session_starts_fresh() {
        let store = LruSessionStore::new(10, Duration::ZERO);
        store.append("a", Message::human("old")).await;

        assert!(store.get("a").await.is_none());
        let session = store.append("a", Message::human("new")).await;
        assert_eq!(session.transcript, vec![Message::human("new")]);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = LruSessionStore::new(10, Duration::ZERO);
        store.append("a", Message::human("x")).await;
        store.append("b", Message::human("y")).await;

        assert_eq!(store.purge_expired().await, 2);
        assert!(store.is_empty().await);
    }
}
